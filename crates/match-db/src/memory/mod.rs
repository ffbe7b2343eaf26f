//! In-memory repository implementations
//!
//! Same contracts as the PostgreSQL repositories, held behind `parking_lot`
//! locks. Used by the service tests and for running without a database.

mod conversation;
mod pair;
mod user_directory;

pub use conversation::InMemoryConversationRepository;
pub use pair::InMemoryPairRepository;
pub use user_directory::InMemoryUserDirectory;
