//! Relationship service
//!
//! Read-only listings of a user's relationships.

use match_core::{DomainError, PairKey, RelationshipFilter, RelationshipStatus, Snowflake};
use tracing::instrument;
use validator::Validate;

use crate::dto::{PaginatedResponse, PaginationQuery, RelationshipView};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Relationship service
pub struct RelationshipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RelationshipService<'a> {
    /// Create a new RelationshipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Relationships on either side with the given status
    #[instrument(skip(self))]
    pub async fn list_by_status(
        &self,
        user_id: Snowflake,
        status: RelationshipStatus,
        query: PaginationQuery,
    ) -> ServiceResult<PaginatedResponse<RelationshipView>> {
        self.list(user_id, RelationshipFilter::WithStatus(status), query)
            .await
    }

    /// Likes the user sent that are still pending or became a match
    #[instrument(skip(self))]
    pub async fn list_sent_likes(
        &self,
        user_id: Snowflake,
        query: PaginationQuery,
    ) -> ServiceResult<PaginatedResponse<RelationshipView>> {
        self.list(user_id, RelationshipFilter::SentLikes, query).await
    }

    /// Pending likes the user has received
    #[instrument(skip(self))]
    pub async fn list_like_requests(
        &self,
        user_id: Snowflake,
        query: PaginationQuery,
    ) -> ServiceResult<PaginatedResponse<RelationshipView>> {
        self.list(user_id, RelationshipFilter::LikeRequests, query)
            .await
    }

    /// Users this user has blocked
    #[instrument(skip(self))]
    pub async fn list_blocked(
        &self,
        user_id: Snowflake,
        query: PaginationQuery,
    ) -> ServiceResult<PaginatedResponse<RelationshipView>> {
        self.list(user_id, RelationshipFilter::BlockedByUser, query)
            .await
    }

    /// The relationship between `user_id` and `other_id`, from `user_id`'s side
    #[instrument(skip(self))]
    pub async fn find_between(
        &self,
        user_id: Snowflake,
        other_id: Snowflake,
    ) -> ServiceResult<RelationshipView> {
        let missing = || ServiceError::not_found("Relationship", other_id.to_string());

        let relationship = self
            .ctx
            .pair_repo()
            .find_by_pair(PairKey::new(user_id, other_id))
            .await?
            .ok_or_else(missing)?;

        RelationshipView::for_viewer(&relationship, user_id).ok_or_else(missing)
    }

    async fn list(
        &self,
        user_id: Snowflake,
        filter: RelationshipFilter,
        query: PaginationQuery,
    ) -> ServiceResult<PaginatedResponse<RelationshipView>> {
        query.validate()?;
        let request = self.ctx.page_request(query.page, query.limit);

        let page = self
            .ctx
            .pair_repo()
            .list(user_id, filter, request)
            .await?;

        let mut views = Vec::with_capacity(page.items.len());
        for relationship in &page.items {
            let view = RelationshipView::for_viewer(relationship, user_id)
                .ok_or_else(|| {
                    DomainError::InternalError(format!(
                        "listing for {user_id} returned foreign relationship {}",
                        relationship.id
                    ))
                })?;
            views.push(view);
        }

        let pages = page.pages(request.limit);
        Ok(PaginatedResponse::new(views, request.page, pages, page.total))
    }
}
