//! Database models - SQLx-compatible structs for PostgreSQL tables

mod message;
mod relationship;

pub use message::MessageModel;
pub use relationship::RelationshipModel;
