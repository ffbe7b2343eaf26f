//! Relationship entity <-> model mapper

use match_core::entities::{Relationship, RelationshipStatus};
use match_core::error::DomainError;
use match_core::value_objects::Snowflake;

use crate::models::RelationshipModel;

/// Convert RelationshipModel to Relationship entity
impl TryFrom<RelationshipModel> for Relationship {
    type Error = DomainError;

    fn try_from(model: RelationshipModel) -> Result<Self, Self::Error> {
        let status: RelationshipStatus = model
            .status
            .parse()
            .map_err(DomainError::DatabaseError)?;

        Ok(Relationship {
            id: Snowflake::new(model.id),
            initiator: Snowflake::new(model.initiator_id),
            responder: Snowflake::new(model.responder_id),
            status,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Relationship values for database insertion
pub struct RelationshipInsert {
    pub id: i64,
    pub initiator_id: i64,
    pub responder_id: i64,
    pub status: &'static str,
    pub version: i32,
}

impl RelationshipInsert {
    pub fn new(relationship: &Relationship) -> Self {
        Self {
            id: relationship.id.into_inner(),
            initiator_id: relationship.initiator.into_inner(),
            responder_id: relationship.responder.into_inner(),
            status: relationship.status.as_str(),
            version: relationship.version,
        }
    }
}
