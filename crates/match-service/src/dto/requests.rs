//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use match_core::{MessageBody, MessageKind, Reaction, ReactionRequest, Snowflake};

/// Longest photo URL or message content accepted
pub const MAX_CONTENT_LENGTH: u64 = 2048;

// ============================================================================
// Reaction Requests
// ============================================================================

/// React to another user
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_photo_with_like", skip_on_field_errors = false))]
pub struct ReactRequest {
    pub target_id: Snowflake,

    pub reaction: Reaction,

    /// Icebreaker photo delivered together with a like
    #[validate(length(min = 1, max = 2048, message = "Photo URL must be 1-2048 characters"))]
    pub photo_url: Option<String>,
}

fn validate_photo_with_like(request: &ReactRequest) -> Result<(), ValidationError> {
    match (&request.photo_url, request.reaction) {
        (Some(_), reaction) if reaction != Reaction::Like => {
            let mut err = ValidationError::new("photo_requires_like");
            err.message = Some("photo_url is only accepted with a like".into());
            Err(err)
        }
        (Some(url), _) if url.trim().is_empty() => {
            let mut err = ValidationError::new("blank_photo_url");
            err.message = Some("photo_url must not be blank".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl From<ReactRequest> for ReactionRequest {
    fn from(request: ReactRequest) -> Self {
        Self {
            target_id: request.target_id,
            reaction: request.reaction,
            photo_url: request.photo_url,
        }
    }
}

// ============================================================================
// Message Requests
// ============================================================================

/// Send a message within a relationship
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub kind: MessageKind,

    #[validate(length(min = 1, max = 2048, message = "Content must be 1-2048 characters"))]
    pub content: String,
}

impl SendMessageRequest {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            content: content.into(),
        }
    }

    pub fn photo(url: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::PhotoReveal,
            content: url.into(),
        }
    }

    pub fn into_body(self) -> MessageBody {
        MessageBody::from_parts(self.kind, self.content)
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// 1-based page selection
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct PaginationQuery {
    #[validate(range(min = 1, message = "Page starts at 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100, message = "Limit must be 1-100"))]
    pub limit: Option<u32>,
}

impl PaginationQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }
}
