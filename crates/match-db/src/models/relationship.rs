//! Relationship database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for relationships table
#[derive(Debug, Clone, FromRow)]
pub struct RelationshipModel {
    pub id: i64,
    pub initiator_id: i64,
    pub responder_id: i64,
    pub status: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
