//! Reaction service
//!
//! Applies likes, dislikes, blocks, and unblocks to the relationship between
//! two users. All reactions on one unordered pair are serialized by the pair
//! lock; the store's unique index and versioned updates catch writers in
//! other processes, in which case the decision is retried on fresh state.

use match_core::rules::transition;
use match_core::{
    Compensation, DomainError, MessageBody, PairKey, Reaction, ReactionRequest, Relationship,
    RelationshipStatus, Snowflake, Transition,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use crate::dto::ReactRequest;

use super::context::ServiceContext;
use super::conversation::{ConversationService, Delivery, MAX_ATTEMPTS};
use super::error::{ServiceError, ServiceResult};
use super::unblock::{UnblockCompensator, UnblockReport};

/// What happened to the icebreaker photo of a like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IcebreakerDelivery {
    NotRequested,
    Delivered { message_id: Snowflake },
}

/// Result of a successful reaction
#[derive(Debug, Clone)]
pub struct ReactionOutcome {
    pub transition: Transition,
    /// Relationship after the reaction, `None` once an unblock removed it
    pub relationship: Option<Relationship>,
    pub icebreaker: IcebreakerDelivery,
    pub unblock: Option<UnblockReport>,
}

/// State change persisted by one attempt
struct Applied {
    transition: Transition,
    relationship: Option<Relationship>,
    unblock: Option<UnblockReport>,
}

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// React to another user
    #[instrument(
        skip(self, request),
        fields(target_id = %request.target_id, reaction = %request.reaction)
    )]
    pub async fn react(
        &self,
        actor: Snowflake,
        request: ReactRequest,
    ) -> ServiceResult<ReactionOutcome> {
        request.validate()?;
        self.apply(actor, ReactionRequest::from(request)).await
    }

    /// Apply an already validated reaction
    #[instrument(
        skip(self, request),
        fields(target_id = %request.target_id, reaction = %request.reaction)
    )]
    pub async fn apply(
        &self,
        actor: Snowflake,
        request: ReactionRequest,
    ) -> ServiceResult<ReactionOutcome> {
        if request.photo_url.is_some() && request.reaction != Reaction::Like {
            return Err(ServiceError::validation(
                "photo_url is only accepted with a like",
            ));
        }

        let target = request.target_id;
        if !self.ctx.user_directory().exists(target).await? {
            return Err(DomainError::UserNotFound(target).into());
        }

        let _guard = self.ctx.pair_locks().lock(PairKey::new(actor, target)).await;

        let mut attempt = 0;
        let applied = loop {
            attempt += 1;
            match self.persist(actor, target, request.reaction).await {
                Ok(applied) => break applied,
                Err(ServiceError::Domain(DomainError::RelationshipConflict))
                    if attempt < MAX_ATTEMPTS =>
                {
                    warn!(
                        %actor,
                        %target,
                        attempt,
                        "Pair changed concurrently, retrying reaction"
                    );
                }
                Err(ServiceError::Domain(DomainError::RelationshipConflict)) => {
                    return Err(ServiceError::conflict(format!(
                        "relationship between {actor} and {target} kept changing"
                    )));
                }
                Err(err) => return Err(err),
            }
        };

        let icebreaker = match (request.photo_url, &applied.relationship) {
            (Some(url), Some(relationship)) => {
                self.deliver_icebreaker(actor, relationship, applied.transition, url)
                    .await?
            }
            _ => IcebreakerDelivery::NotRequested,
        };

        Ok(ReactionOutcome {
            transition: applied.transition,
            relationship: applied.relationship,
            icebreaker,
            unblock: applied.unblock,
        })
    }

    /// Read the pair, decide, and write the decision
    async fn persist(
        &self,
        actor: Snowflake,
        target: Snowflake,
        reaction: Reaction,
    ) -> ServiceResult<Applied> {
        let pairs = self.ctx.pair_repo();
        let existing = pairs.find_by_pair(PairKey::new(actor, target)).await?;
        let transition = transition::decide(existing.as_ref(), actor, target, reaction)?;

        match (transition, existing) {
            (Transition::Create { status }, _) => {
                let relationship =
                    Relationship::new(self.ctx.generate_id(), actor, target, status);
                pairs.create(&relationship).await?;

                info!(
                    relationship_id = %relationship.id,
                    %actor,
                    %target,
                    to = %status,
                    "Relationship created"
                );
                Ok(Applied {
                    transition,
                    relationship: Some(relationship),
                    unblock: None,
                })
            }
            (Transition::Update { from, to }, Some(current)) => {
                // Pair lock is already held; appends to this conversation wait
                let _guard = self.ctx.relationship_locks().lock(current.id).await;
                let updated = pairs
                    .update_status(current.id, current.version, to)
                    .await?
                    .ok_or(DomainError::RelationshipConflict)?;

                info!(
                    relationship_id = %updated.id,
                    %actor,
                    %from,
                    %to,
                    "Relationship status changed"
                );
                Ok(Applied {
                    transition,
                    relationship: Some(updated),
                    unblock: None,
                })
            }
            (Transition::Unblock, Some(current)) => {
                let report = UnblockCompensator::new(self.ctx).unblock(&current).await?;
                info!(
                    relationship_id = %current.id,
                    %actor,
                    from = %current.status,
                    "Relationship removed by unblock"
                );
                Ok(Applied {
                    transition,
                    relationship: None,
                    unblock: Some(report),
                })
            }
            (Transition::Update { .. } | Transition::Unblock, None) => Err(
                ServiceError::internal("transition requires an existing relationship"),
            ),
        }
    }

    /// Send the photo of a like as the icebreaker, undoing the like if refused
    async fn deliver_icebreaker(
        &self,
        actor: Snowflake,
        relationship: &Relationship,
        transition: Transition,
        url: String,
    ) -> ServiceResult<IcebreakerDelivery> {
        let delivery = ConversationService::new(self.ctx)
            .try_append(relationship.id, actor, MessageBody::photo(url))
            .await;

        match delivery {
            Ok(Delivery::Appended(message)) => {
                debug!(
                    relationship_id = %relationship.id,
                    message_id = %message.id,
                    "Icebreaker delivered"
                );
                Ok(IcebreakerDelivery::Delivered {
                    message_id: message.id,
                })
            }
            Ok(Delivery::Denied(reason)) => {
                let Some(compensation) = transition.compensation() else {
                    return Err(DomainError::from(reason).into());
                };
                self.compensate(relationship, compensation).await?;
                Err(DomainError::IcebreakerRejected {
                    compensation,
                    reason,
                }
                .into())
            }
            Err(err) => {
                if let Some(compensation) = transition.compensation() {
                    if let Err(rollback) = self.compensate(relationship, compensation).await {
                        error!(
                            relationship_id = %relationship.id,
                            error = %rollback,
                            "Icebreaker rollback failed"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    /// Undo the state change of a like whose icebreaker was not delivered
    ///
    /// Safe to repeat: a missing relationship or one that already moved on
    /// is left alone.
    async fn compensate(
        &self,
        relationship: &Relationship,
        compensation: Compensation,
    ) -> ServiceResult<()> {
        let _guard = self.ctx.relationship_locks().lock(relationship.id).await;

        match compensation {
            Compensation::RelationshipDeleted => {
                self.ctx
                    .conversation_repo()
                    .delete_by_relationship(relationship.id)
                    .await?;
                if !self.ctx.pair_repo().delete(relationship.id).await? {
                    warn!(relationship_id = %relationship.id, "Relationship already deleted");
                }
            }
            Compensation::RevertedToPending => {
                let reverted = self
                    .ctx
                    .pair_repo()
                    .update_status(
                        relationship.id,
                        relationship.version,
                        RelationshipStatus::PendingInterest,
                    )
                    .await?;
                if reverted.is_none() {
                    warn!(
                        relationship_id = %relationship.id,
                        "Relationship changed before revert, leaving it as is"
                    );
                }
            }
        }

        warn!(
            relationship_id = %relationship.id,
            %compensation,
            "Icebreaker rejected, reaction compensated"
        );
        Ok(())
    }
}
