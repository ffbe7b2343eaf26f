//! Entity to model mappers
//!
//! - `TryFrom<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database operations

mod message;
mod relationship;

pub use message::MessageInsert;
pub(crate) use message::messages_from_models;
pub use relationship::RelationshipInsert;
