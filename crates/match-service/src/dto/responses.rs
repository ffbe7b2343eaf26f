//! Response DTOs
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

use match_core::{MessageKind, RelationshipStatus, Transition};

// ============================================================================
// Common Response Types
// ============================================================================

/// Page-numbered listing
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    /// 1-based page that was returned
    pub page: u32,
    /// Number of pages available at the requested limit
    pub pages: u64,
    /// Total matching items across all pages
    pub total: u64,
    pub data: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, pages: u64, total: u64) -> Self {
        Self {
            page,
            pages,
            total,
            data,
        }
    }

    #[inline]
    pub fn has_more(&self) -> bool {
        u64::from(self.page) < self.pages
    }
}

// ============================================================================
// Relationship Responses
// ============================================================================

/// Stored relationship record
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipResponse {
    pub id: String,
    pub initiator_id: String,
    pub responder_id: String,
    pub status: RelationshipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Relationship as seen by one of its participants
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipView {
    pub relationship_id: String,
    pub counterpart_id: String,
    pub status: RelationshipStatus,
    /// Whether the viewer sent the first reaction
    pub is_initiator: bool,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Reaction Responses
// ============================================================================

/// Result of a reaction
#[derive(Debug, Clone, Serialize)]
pub struct ReactionResponse {
    pub transition: Transition,
    /// Relationship after the reaction, absent once it has been removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationshipResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icebreaker_message_id: Option<String>,
    /// Photo URLs whose reveals were purged by an unblock
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub purged_photo_urls: Vec<String>,
}

// ============================================================================
// Message Responses
// ============================================================================

/// Conversation message
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub relationship_id: String,
    pub from: String,
    pub to: String,
    pub kind: MessageKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
