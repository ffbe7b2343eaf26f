//! Domain entities - core business objects

mod message;
mod reaction;
mod relationship;

pub use message::{Message, MessageBody, MessageKind};
pub use reaction::{Reaction, ReactionRequest};
pub use relationship::{Relationship, RelationshipStatus, Side};
