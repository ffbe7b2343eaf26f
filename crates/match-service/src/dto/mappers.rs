//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use match_core::{Message, Page, PageRequest, Relationship, Side, Snowflake};

use crate::services::{IcebreakerDelivery, ReactionOutcome};

use super::responses::{
    MessageResponse, PaginatedResponse, ReactionResponse, RelationshipResponse, RelationshipView,
};

// ============================================================================
// Relationship Mappers
// ============================================================================

impl From<&Relationship> for RelationshipResponse {
    fn from(rel: &Relationship) -> Self {
        Self {
            id: rel.id.to_string(),
            initiator_id: rel.initiator.to_string(),
            responder_id: rel.responder.to_string(),
            status: rel.status,
            created_at: rel.created_at,
            updated_at: rel.updated_at,
        }
    }
}

impl From<Relationship> for RelationshipResponse {
    fn from(rel: Relationship) -> Self {
        Self::from(&rel)
    }
}

impl RelationshipView {
    /// Project a relationship for `viewer`; `None` if they are not a party
    pub fn for_viewer(rel: &Relationship, viewer: Snowflake) -> Option<Self> {
        let side = rel.side_of(viewer)?;
        let counterpart = rel.counterpart(viewer)?;
        Some(Self {
            relationship_id: rel.id.to_string(),
            counterpart_id: counterpart.to_string(),
            status: rel.status,
            is_initiator: side == Side::Initiator,
            updated_at: rel.updated_at,
        })
    }
}

// ============================================================================
// Reaction Mappers
// ============================================================================

impl From<ReactionOutcome> for ReactionResponse {
    fn from(outcome: ReactionOutcome) -> Self {
        let icebreaker_message_id = match outcome.icebreaker {
            IcebreakerDelivery::Delivered { message_id } => Some(message_id.to_string()),
            IcebreakerDelivery::NotRequested => None,
        };
        Self {
            transition: outcome.transition,
            relationship: outcome.relationship.as_ref().map(RelationshipResponse::from),
            icebreaker_message_id,
            purged_photo_urls: outcome
                .unblock
                .map(|report| report.purged_photo_urls)
                .unwrap_or_default(),
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            relationship_id: message.relationship_id.to_string(),
            from: message.from.to_string(),
            to: message.to.to_string(),
            kind: message.body.kind(),
            content: message.body.content().to_string(),
            created_at: message.created_at,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self::from(&message)
    }
}

// ============================================================================
// Pagination Mappers
// ============================================================================

impl<T> PaginatedResponse<T> {
    /// Convert a storage page, mapping each item
    pub fn from_page<U>(page: Page<U>, request: PageRequest, f: impl FnMut(U) -> T) -> Self {
        let pages = page.pages(request.limit);
        let total = page.total;
        Self::new(page.items.into_iter().map(f).collect(), request.page, pages, total)
    }
}
