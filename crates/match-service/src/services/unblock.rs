//! Unblock compensator
//!
//! Lifting a block removes the relationship entirely. Photo reveals are
//! purged first and reported so the caller can revoke the hosted images,
//! then the rest of the conversation and the relationship record go.

use match_core::{Relationship, Snowflake};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// What an unblock removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnblockReport {
    pub relationship_id: Snowflake,
    /// URLs of the photo reveals that were purged
    pub purged_photo_urls: Vec<String>,
    /// Messages deleted, photo reveals included
    pub deleted_messages: u64,
    /// False when the relationship was already gone
    pub relationship_removed: bool,
}

/// Unblock compensator
pub struct UnblockCompensator<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UnblockCompensator<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Purge `relationship` and everything said within it
    ///
    /// Idempotent: running it again after a partial failure finishes the job.
    #[instrument(skip(self, relationship), fields(relationship_id = %relationship.id))]
    pub async fn unblock(&self, relationship: &Relationship) -> ServiceResult<UnblockReport> {
        let relationship_id = relationship.id;
        let _guard = self.ctx.relationship_locks().lock(relationship_id).await;
        let conversations = self.ctx.conversation_repo();

        let reveals = conversations.find_photo_reveals(relationship_id).await?;
        let reveal_ids: Vec<Snowflake> = reveals.iter().map(|message| message.id).collect();
        let purged_photo_urls: Vec<String> = reveals
            .iter()
            .filter_map(|message| message.body.photo_url().map(str::to_owned))
            .collect();

        let mut deleted_messages = 0;
        if !reveal_ids.is_empty() {
            deleted_messages += conversations
                .delete_by_ids(relationship_id, &reveal_ids)
                .await?;
        }
        deleted_messages += conversations.delete_by_relationship(relationship_id).await?;

        let relationship_removed = self.ctx.pair_repo().delete(relationship_id).await?;
        if !relationship_removed {
            warn!("Relationship already removed before unblock finished");
        }

        info!(
            purged_photos = ?purged_photo_urls,
            deleted_messages,
            "Relationship unblocked and purged"
        );

        Ok(UnblockReport {
            relationship_id,
            purged_photo_urls,
            deleted_messages,
            relationship_removed,
        })
    }
}
