//! Data transfer objects for requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for caller inputs
//! - Response DTOs for serializing outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{PaginationQuery, ReactRequest, SendMessageRequest};
pub use responses::{
    MessageResponse, PaginatedResponse, ReactionResponse, RelationshipResponse, RelationshipView,
};
