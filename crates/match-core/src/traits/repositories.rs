//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Implementations must keep at most one
//! relationship per unordered pair and must apply status updates as
//! compare-and-swap on `version`.

use async_trait::async_trait;

use crate::entities::{Message, Relationship, RelationshipStatus};
use crate::error::DomainError;
use crate::value_objects::{PairKey, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Pagination
// ============================================================================

/// 1-based page request with a clamped page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total across all pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }

    /// Number of pages for the given page size
    pub fn pages(&self, limit: u32) -> u64 {
        self.total.div_ceil(u64::from(limit.max(1)))
    }
}

// ============================================================================
// Pair Repository
// ============================================================================

/// Selects relationships from one user's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipFilter {
    /// Either side, exact status
    WithStatus(RelationshipStatus),
    /// User is initiator; pending or matched
    SentLikes,
    /// User is responder; still pending
    LikeRequests,
    /// Blocks the user holds
    BlockedByUser,
}

impl RelationshipFilter {
    pub fn matches(&self, rel: &Relationship, user_id: Snowflake) -> bool {
        use RelationshipStatus as S;
        match *self {
            Self::WithStatus(status) => rel.involves(user_id) && rel.status == status,
            Self::SentLikes => {
                rel.initiator == user_id && matches!(rel.status, S::PendingInterest | S::MutualMatch)
            }
            Self::LikeRequests => rel.responder == user_id && rel.status == S::PendingInterest,
            Self::BlockedByUser => {
                (rel.initiator == user_id && rel.status == S::BlockedByInitiator)
                    || (rel.responder == user_id && rel.status == S::BlockedByResponder)
            }
        }
    }
}

#[async_trait]
pub trait PairRepository: Send + Sync {
    /// Find the relationship for an unordered pair
    async fn find_by_pair(&self, key: PairKey) -> RepoResult<Option<Relationship>>;

    /// Find relationship by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Relationship>>;

    /// Insert a new relationship
    ///
    /// Fails with `RelationshipConflict` if the pair already has one.
    async fn create(&self, relationship: &Relationship) -> RepoResult<()>;

    /// Set `status` if the stored version still equals `expected_version`
    ///
    /// Returns the updated relationship, or `None` when the version moved
    /// or the relationship no longer exists.
    async fn update_status(
        &self,
        id: Snowflake,
        expected_version: i32,
        status: RelationshipStatus,
    ) -> RepoResult<Option<Relationship>>;

    /// Delete relationship; returns whether a row was removed
    async fn delete(&self, id: Snowflake) -> RepoResult<bool>;

    /// List relationships for a user, most recently updated first
    async fn list(
        &self,
        user_id: Snowflake,
        filter: RelationshipFilter,
        page: PageRequest,
    ) -> RepoResult<Page<Relationship>>;
}

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Append a message unconditionally
    async fn append(&self, message: &Message) -> RepoResult<()>;

    /// Append only if the conversation is still in the state the gate saw
    ///
    /// The relationship must still exist at `relationship_version` and hold
    /// exactly `expected_count` messages. Returns `false` without writing
    /// otherwise.
    async fn append_if_count(
        &self,
        message: &Message,
        expected_count: u64,
        relationship_version: i32,
    ) -> RepoResult<bool>;

    /// Count messages in a relationship
    async fn count(&self, relationship_id: Snowflake) -> RepoResult<u64>;

    /// Oldest `n` messages in insertion order
    async fn first_n(&self, relationship_id: Snowflake, n: usize) -> RepoResult<Vec<Message>>;

    /// Whether the relationship has any message
    async fn exists(&self, relationship_id: Snowflake) -> RepoResult<bool>;

    /// Photo-reveal messages of a relationship
    async fn find_photo_reveals(&self, relationship_id: Snowflake) -> RepoResult<Vec<Message>>;

    /// Delete the given messages of a relationship; returns rows removed
    async fn delete_by_ids(&self, relationship_id: Snowflake, ids: &[Snowflake]) -> RepoResult<u64>;

    /// Delete every message of a relationship; returns rows removed
    async fn delete_by_relationship(&self, relationship_id: Snowflake) -> RepoResult<u64>;

    /// Page through messages, oldest first
    async fn list(
        &self,
        relationship_id: Snowflake,
        page: PageRequest,
    ) -> RepoResult<Page<Message>>;
}

// ============================================================================
// User Directory
// ============================================================================

/// Read-only view of the user store owned elsewhere
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn exists(&self, user_id: Snowflake) -> RepoResult<bool>;
}
