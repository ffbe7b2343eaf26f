//! # match-db
//!
//! Database layer implementing the repository traits from `match-core`.
//!
//! ## Overview
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repository implementations
//! - In-memory implementations of the same traits for tests and local runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use match_db::{create_pool, run_migrations, DatabaseConfig, PgPairRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     run_migrations(&pool).await?;
//!     let pairs = PgPairRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{InMemoryConversationRepository, InMemoryPairRepository, InMemoryUserDirectory};
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgConversationRepository, PgPairRepository, PgUserDirectory};
