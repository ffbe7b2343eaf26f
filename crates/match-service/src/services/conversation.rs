//! Conversation service
//!
//! Appends messages through the message gate and lists conversations.
//! Every append for a relationship runs under that relationship's lock, and
//! the store re-checks the message count so a writer outside this process
//! cannot slip past the gate either.

use match_core::rules::gate::HISTORY_WINDOW;
use match_core::{DomainError, GateDenial, History, Message, MessageBody, Relationship, Snowflake};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::dto::{MessageResponse, PaginatedResponse, PaginationQuery, SendMessageRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Attempts at a gated append before giving up on a racing writer
pub(crate) const MAX_ATTEMPTS: usize = 3;

/// Result of a gated append
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Appended(Message),
    Denied(GateDenial),
}

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    /// Create a new ConversationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a message from `sender` within a relationship
    #[instrument(skip(self, request))]
    pub async fn send_message(
        &self,
        relationship_id: Snowflake,
        sender: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        request.validate()?;

        let body = request.into_body();
        if let MessageBody::Text(text) = &body {
            let max = self.ctx.settings().max_text_length;
            if text.chars().count() > max {
                return Err(DomainError::ContentTooLong { max }.into());
            }
        }

        let relationship = self.participant_relationship(relationship_id, sender).await?;

        match self.try_append(relationship.id, sender, body).await? {
            Delivery::Appended(message) => {
                info!(
                    message_id = %message.id,
                    relationship_id = %relationship_id,
                    kind = message.body.kind().as_str(),
                    "Message appended"
                );
                Ok(MessageResponse::from(message))
            }
            Delivery::Denied(reason) => {
                debug!(relationship_id = %relationship_id, %reason, "Message refused by gate");
                Err(DomainError::from(reason).into())
            }
        }
    }

    /// Append `body` if the gate allows it
    ///
    /// Reads the relationship and history, asks the gate, and stores the
    /// message only if neither the history nor the relationship changed in
    /// between. A lost race is retried against fresh state, so a block that
    /// commits mid-send ends in a gate denial.
    #[instrument(skip(self, body), fields(kind = body.kind().as_str()))]
    pub async fn try_append(
        &self,
        relationship_id: Snowflake,
        sender: Snowflake,
        body: MessageBody,
    ) -> ServiceResult<Delivery> {
        let _guard = self.ctx.relationship_locks().lock(relationship_id).await;
        let repo = self.ctx.conversation_repo();

        for attempt in 1..=MAX_ATTEMPTS {
            let relationship = self
                .ctx
                .pair_repo()
                .find_by_id(relationship_id)
                .await?
                .ok_or(DomainError::RelationshipNotFound(relationship_id))?;
            let recipient = relationship
                .counterpart(sender)
                .ok_or(DomainError::NotParticipant)?;

            let total = repo.count(relationship_id).await?;
            let head = repo.first_n(relationship_id, HISTORY_WINDOW).await?;

            if let Err(reason) = self.ctx.message_gate().check(
                &relationship,
                sender,
                &body,
                History::new(&head, total),
            ) {
                return Ok(Delivery::Denied(reason));
            }

            let message = Message::new(
                self.ctx.generate_id(),
                relationship_id,
                sender,
                recipient,
                body.clone(),
            );
            if repo
                .append_if_count(&message, total, relationship.version)
                .await?
            {
                return Ok(Delivery::Appended(message));
            }

            warn!(
                relationship_id = %relationship_id,
                attempt,
                "Conversation changed during append, retrying"
            );
        }

        Err(DomainError::RelationshipConflict.into())
    }

    /// List messages oldest first, visible only to the two participants
    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        relationship_id: Snowflake,
        viewer: Snowflake,
        query: PaginationQuery,
    ) -> ServiceResult<PaginatedResponse<MessageResponse>> {
        query.validate()?;
        self.participant_relationship(relationship_id, viewer).await?;

        let request = self.ctx.page_request(query.page, query.limit);
        let page = self
            .ctx
            .conversation_repo()
            .list(relationship_id, request)
            .await?;

        Ok(PaginatedResponse::from_page(page, request, MessageResponse::from))
    }

    async fn participant_relationship(
        &self,
        relationship_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Relationship> {
        let relationship = self
            .ctx
            .pair_repo()
            .find_by_id(relationship_id)
            .await?
            .ok_or(DomainError::RelationshipNotFound(relationship_id))?;

        if !relationship.involves(user_id) {
            return Err(ServiceError::from(DomainError::NotParticipant));
        }
        Ok(relationship)
    }
}
