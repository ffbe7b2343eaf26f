//! In-memory UserDirectory

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::instrument;

use match_core::traits::{RepoResult, UserDirectory};
use match_core::value_objects::Snowflake;

/// Set of known user ids
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashSet<Snowflake>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = Snowflake>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().collect()),
        }
    }

    pub fn register(&self, user_id: Snowflake) {
        self.users.write().insert(user_id);
    }

    pub fn remove(&self, user_id: Snowflake) -> bool {
        self.users.write().remove(&user_id)
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    #[instrument(skip(self))]
    async fn exists(&self, user_id: Snowflake) -> RepoResult<bool> {
        Ok(self.users.read().contains(&user_id))
    }
}
