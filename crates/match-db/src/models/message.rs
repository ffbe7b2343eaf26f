//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for relationship_messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub relationship_id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub kind: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MessageModel {
    /// Check if the row is a photo reveal
    #[inline]
    pub fn is_photo_reveal(&self) -> bool {
        self.kind == "photo_reveal"
    }
}
