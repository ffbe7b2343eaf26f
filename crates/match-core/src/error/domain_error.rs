//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::entities::{Reaction, RelationshipStatus};
use crate::rules::{Compensation, GateDenial};
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a participant of this relationship")]
    NotParticipant,

    // =========================================================================
    // Reaction Rule Violations
    // =========================================================================
    #[error("Cannot {reaction} from {}", describe_state(.from))]
    InvalidTransition {
        from: Option<RelationshipStatus>,
        reaction: Reaction,
    },

    #[error("Icebreaker rejected ({reason}); {compensation}")]
    IcebreakerRejected {
        compensation: Compensation,
        reason: GateDenial,
    },

    // =========================================================================
    // Messaging Rule Violations
    // =========================================================================
    #[error("Relationship does not allow messages")]
    NotMessageable,

    #[error("A photo reveal must be sent first")]
    IcebreakerRequired,

    #[error("Message limit reached until the other user responds")]
    MessageCapExceeded,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Relationship was modified concurrently")]
    RelationshipConflict,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

fn describe_state(status: &Option<RelationshipStatus>) -> String {
    match status {
        Some(status) => format!("status {status}"),
        None => "no relationship".to_string(),
    }
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::RelationshipNotFound(_) => "UNKNOWN_RELATIONSHIP",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",

            // Authorization
            Self::NotParticipant => "NOT_PARTICIPANT",

            // Rules
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::IcebreakerRejected { .. } => "ICEBREAKER_REJECTED",
            Self::NotMessageable => "NOT_MESSAGEABLE",
            Self::IcebreakerRequired => "ICEBREAKER_REQUIRED",
            Self::MessageCapExceeded => "MESSAGE_CAP_EXCEEDED",

            // Conflict
            Self::RelationshipConflict => "RELATIONSHIP_CONFLICT",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::RelationshipNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::ContentTooLong { .. })
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotParticipant)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::RelationshipConflict)
    }

    /// Reaction or messaging rule rejected the request
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. }
                | Self::IcebreakerRejected { .. }
                | Self::NotMessageable
                | Self::IcebreakerRequired
                | Self::MessageCapExceeded
        )
    }

    /// Whether repeating the same call may succeed
    ///
    /// A rejected icebreaker has already been compensated, so the reaction
    /// can be submitted again as a fresh request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::IcebreakerRejected { .. } | Self::RelationshipConflict | Self::DatabaseError(_)
        )
    }
}

impl From<GateDenial> for DomainError {
    fn from(denial: GateDenial) -> Self {
        match denial {
            GateDenial::NotMessageable => Self::NotMessageable,
            GateDenial::IcebreakerRequired => Self::IcebreakerRequired,
            GateDenial::MessageCapExceeded => Self::MessageCapExceeded,
        }
    }
}
