//! # match-core
//!
//! Domain layer for the matching service: relationship and message entities,
//! the reaction and messaging rules, and the repository traits the storage
//! layer implements. This crate has no dependency on a database or transport.

pub mod entities;
pub mod error;
pub mod rules;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Message, MessageBody, MessageKind, Reaction, ReactionRequest, Relationship,
    RelationshipStatus, Side,
};
pub use error::DomainError;
pub use rules::{
    Compensation, GateDenial, History, IcebreakerGate, MessageGate, Transition,
};
pub use traits::{
    ConversationRepository, Page, PageRequest, PairRepository, RelationshipFilter, RepoResult,
    UserDirectory,
};
pub use value_objects::{PairKey, Snowflake, SnowflakeGenerator, SnowflakeParseError};
