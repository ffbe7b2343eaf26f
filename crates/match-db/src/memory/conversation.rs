//! In-memory ConversationRepository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::instrument;

use match_core::entities::{Message, MessageKind};
use match_core::traits::{ConversationRepository, Page, PageRequest, RepoResult};
use match_core::value_objects::Snowflake;

use super::InMemoryPairRepository;

/// In-memory messages grouped by relationship, kept sorted by id
///
/// When linked to a pair store, conditional appends also check the
/// relationship version; unlinked, only the message count is checked.
#[derive(Debug, Default)]
pub struct InMemoryConversationRepository {
    threads: RwLock<HashMap<Snowflake, Vec<Message>>>,
    pairs: Option<Arc<InMemoryPairRepository>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversation store that validates appends against `pairs`
    pub fn linked(pairs: Arc<InMemoryPairRepository>) -> Self {
        Self {
            threads: RwLock::default(),
            pairs: Some(pairs),
        }
    }

    /// Total messages across every relationship
    pub fn total_messages(&self) -> usize {
        self.threads.read().values().map(Vec::len).sum()
    }
}

fn insert_sorted(thread: &mut Vec<Message>, message: &Message) {
    let at = thread.partition_point(|existing| existing.id < message.id);
    thread.insert(at, message.clone());
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn append(&self, message: &Message) -> RepoResult<()> {
        let mut threads = self.threads.write();
        insert_sorted(threads.entry(message.relationship_id).or_default(), message);
        Ok(())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn append_if_count(
        &self,
        message: &Message,
        expected_count: u64,
        relationship_version: i32,
    ) -> RepoResult<bool> {
        let mut threads = self.threads.write();
        let mut append = || {
            let thread = threads.entry(message.relationship_id).or_default();
            if thread.len() as u64 != expected_count {
                return false;
            }
            insert_sorted(thread, message);
            true
        };

        Ok(match &self.pairs {
            Some(pairs) => pairs.with_version(message.relationship_id, |version| {
                version == Some(relationship_version) && append()
            }),
            None => append(),
        })
    }

    #[instrument(skip(self))]
    async fn count(&self, relationship_id: Snowflake) -> RepoResult<u64> {
        Ok(self
            .threads
            .read()
            .get(&relationship_id)
            .map_or(0, |thread| thread.len() as u64))
    }

    #[instrument(skip(self))]
    async fn first_n(&self, relationship_id: Snowflake, n: usize) -> RepoResult<Vec<Message>> {
        Ok(self
            .threads
            .read()
            .get(&relationship_id)
            .map(|thread| thread.iter().take(n).cloned().collect())
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn exists(&self, relationship_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .threads
            .read()
            .get(&relationship_id)
            .is_some_and(|thread| !thread.is_empty()))
    }

    #[instrument(skip(self))]
    async fn find_photo_reveals(&self, relationship_id: Snowflake) -> RepoResult<Vec<Message>> {
        Ok(self
            .threads
            .read()
            .get(&relationship_id)
            .map(|thread| {
                thread
                    .iter()
                    .filter(|message| message.body.kind() == MessageKind::PhotoReveal)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_by_ids(&self, relationship_id: Snowflake, ids: &[Snowflake]) -> RepoResult<u64> {
        let mut threads = self.threads.write();
        let Some(thread) = threads.get_mut(&relationship_id) else {
            return Ok(0);
        };
        let before = thread.len();
        thread.retain(|message| !ids.contains(&message.id));
        Ok((before - thread.len()) as u64)
    }

    #[instrument(skip(self))]
    async fn delete_by_relationship(&self, relationship_id: Snowflake) -> RepoResult<u64> {
        Ok(self
            .threads
            .write()
            .remove(&relationship_id)
            .map_or(0, |thread| thread.len() as u64))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        relationship_id: Snowflake,
        page: PageRequest,
    ) -> RepoResult<Page<Message>> {
        let threads = self.threads.read();
        let Some(thread) = threads.get(&relationship_id) else {
            return Ok(Page::new(Vec::new(), 0));
        };

        let items = thread
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok(Page::new(items, thread.len() as u64))
    }
}
