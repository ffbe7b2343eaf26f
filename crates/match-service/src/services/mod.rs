//! Business logic services
//!
//! Services read state through the repository ports, consult the pure rules
//! in `match_core::rules`, and persist the outcome.

pub mod context;
pub mod conversation;
pub mod error;
pub mod locks;
pub mod reaction;
pub mod relationship;
pub mod unblock;


// Re-export all services for convenience
pub use context::{MatchingSettings, ServiceContext, ServiceContextBuilder};
pub use conversation::{ConversationService, Delivery};
pub use error::{ServiceError, ServiceResult};
pub use locks::{KeyGuard, KeyedLocks};
pub use reaction::{IcebreakerDelivery, ReactionOutcome, ReactionService};
pub use relationship::RelationshipService;
pub use unblock::{UnblockCompensator, UnblockReport};
