//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in match-core.

mod conversation;
mod error;
mod pair;
mod user_directory;

pub use conversation::PgConversationRepository;
pub use pair::PgPairRepository;
pub use user_directory::PgUserDirectory;
