//! # match-service
//!
//! Application layer: reactions, gated messaging, unblock cleanup, and
//! relationship listings, plus the DTOs they exchange.

pub mod bootstrap;
pub mod dto;
pub mod services;

pub use bootstrap::{build_context, init_telemetry};
pub use services::{
    ConversationService, Delivery, IcebreakerDelivery, MatchingSettings, ReactionOutcome,
    ReactionService, RelationshipService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, UnblockCompensator, UnblockReport,
};
