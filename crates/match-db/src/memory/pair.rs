//! In-memory PairRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::instrument;

use match_core::entities::{Relationship, RelationshipStatus};
use match_core::error::DomainError;
use match_core::traits::{Page, PageRequest, PairRepository, RelationshipFilter, RepoResult};
use match_core::value_objects::{PairKey, Snowflake};

#[derive(Debug, Default)]
struct PairTable {
    by_id: HashMap<Snowflake, Relationship>,
    by_pair: HashMap<PairKey, Snowflake>,
}

/// In-memory relationships with a unique index on the unordered pair
#[derive(Debug, Default)]
pub struct InMemoryPairRepository {
    table: RwLock<PairTable>,
}

impl InMemoryPairRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored relationships
    pub fn len(&self) -> usize {
        self.table.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` with the stored version of `id` while holding the table lock
    pub(crate) fn with_version<R>(&self, id: Snowflake, f: impl FnOnce(Option<i32>) -> R) -> R {
        let table = self.table.read();
        f(table.by_id.get(&id).map(|rel| rel.version))
    }
}

#[async_trait]
impl PairRepository for InMemoryPairRepository {
    #[instrument(skip(self))]
    async fn find_by_pair(&self, key: PairKey) -> RepoResult<Option<Relationship>> {
        let table = self.table.read();
        Ok(table
            .by_pair
            .get(&key)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Relationship>> {
        Ok(self.table.read().by_id.get(&id).cloned())
    }

    #[instrument(skip(self, relationship), fields(relationship_id = %relationship.id))]
    async fn create(&self, relationship: &Relationship) -> RepoResult<()> {
        let key = relationship.pair_key();
        if key.is_degenerate() {
            return Err(DomainError::ValidationError(
                "relationship needs two distinct users".to_string(),
            ));
        }

        let mut table = self.table.write();
        if table.by_pair.contains_key(&key) || table.by_id.contains_key(&relationship.id) {
            return Err(DomainError::RelationshipConflict);
        }
        table.by_pair.insert(key, relationship.id);
        table.by_id.insert(relationship.id, relationship.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: Snowflake,
        expected_version: i32,
        status: RelationshipStatus,
    ) -> RepoResult<Option<Relationship>> {
        let mut table = self.table.write();
        let Some(stored) = table.by_id.get_mut(&id) else {
            return Ok(None);
        };
        if stored.version != expected_version {
            return Ok(None);
        }

        stored.status = status;
        stored.version += 1;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let mut table = self.table.write();
        match table.by_id.remove(&id) {
            Some(relationship) => {
                table.by_pair.remove(&relationship.pair_key());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        user_id: Snowflake,
        filter: RelationshipFilter,
        page: PageRequest,
    ) -> RepoResult<Page<Relationship>> {
        let mut matching: Vec<Relationship> = self
            .table
            .read()
            .by_id
            .values()
            .filter(|rel| filter.matches(rel, user_id))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();

        Ok(Page::new(items, total))
    }
}
