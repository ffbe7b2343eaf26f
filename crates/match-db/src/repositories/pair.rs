//! PostgreSQL implementation of PairRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use match_core::entities::{Relationship, RelationshipStatus};
use match_core::error::DomainError;
use match_core::traits::{Page, PageRequest, PairRepository, RelationshipFilter, RepoResult};
use match_core::value_objects::{PairKey, Snowflake};

use crate::mappers::RelationshipInsert;
use crate::models::RelationshipModel;

use super::error::{count_to_u64, map_db_error, map_unique_violation};

const COLUMNS: &str = "id, initiator_id, responder_id, status, version, created_at, updated_at";

/// PostgreSQL implementation of PairRepository
#[derive(Clone)]
pub struct PgPairRepository {
    pool: PgPool,
}

impl PgPairRepository {
    /// Create a new PgPairRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the WHERE clause selecting `filter` for `user_id`
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, user_id: i64, filter: RelationshipFilter) {
    use RelationshipStatus as S;

    match filter {
        RelationshipFilter::WithStatus(status) => {
            builder
                .push(" WHERE (initiator_id = ")
                .push_bind(user_id)
                .push(" OR responder_id = ")
                .push_bind(user_id)
                .push(") AND status = ")
                .push_bind(status.as_str());
        }
        RelationshipFilter::SentLikes => {
            builder
                .push(" WHERE initiator_id = ")
                .push_bind(user_id)
                .push(" AND status IN (")
                .push_bind(S::PendingInterest.as_str())
                .push(", ")
                .push_bind(S::MutualMatch.as_str())
                .push(")");
        }
        RelationshipFilter::LikeRequests => {
            builder
                .push(" WHERE responder_id = ")
                .push_bind(user_id)
                .push(" AND status = ")
                .push_bind(S::PendingInterest.as_str());
        }
        RelationshipFilter::BlockedByUser => {
            builder
                .push(" WHERE (initiator_id = ")
                .push_bind(user_id)
                .push(" AND status = ")
                .push_bind(S::BlockedByInitiator.as_str())
                .push(") OR (responder_id = ")
                .push_bind(user_id)
                .push(" AND status = ")
                .push_bind(S::BlockedByResponder.as_str())
                .push(")");
        }
    }
}

#[async_trait]
impl PairRepository for PgPairRepository {
    #[instrument(skip(self))]
    async fn find_by_pair(&self, key: PairKey) -> RepoResult<Option<Relationship>> {
        let result = sqlx::query_as::<_, RelationshipModel>(
            r#"
            SELECT id, initiator_id, responder_id, status, version, created_at, updated_at
            FROM relationships
            WHERE LEAST(initiator_id, responder_id) = $1
              AND GREATEST(initiator_id, responder_id) = $2
            "#,
        )
        .bind(key.low().into_inner())
        .bind(key.high().into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Relationship::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Relationship>> {
        let result = sqlx::query_as::<_, RelationshipModel>(
            r#"
            SELECT id, initiator_id, responder_id, status, version, created_at, updated_at
            FROM relationships
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Relationship::try_from).transpose()
    }

    #[instrument(skip(self, relationship), fields(relationship_id = %relationship.id))]
    async fn create(&self, relationship: &Relationship) -> RepoResult<()> {
        let insert = RelationshipInsert::new(relationship);

        sqlx::query(
            r#"
            INSERT INTO relationships (id, initiator_id, responder_id, status, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(insert.id)
        .bind(insert.initiator_id)
        .bind(insert.responder_id)
        .bind(insert.status)
        .bind(insert.version)
        .bind(relationship.created_at)
        .bind(relationship.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::RelationshipConflict))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: Snowflake,
        expected_version: i32,
        status: RelationshipStatus,
    ) -> RepoResult<Option<Relationship>> {
        let result = sqlx::query_as::<_, RelationshipModel>(
            r#"
            UPDATE relationships
            SET status = $3, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING id, initiator_id, responder_id, status, version, created_at, updated_at
            "#,
        )
        .bind(id.into_inner())
        .bind(expected_version)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Relationship::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM relationships WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        user_id: Snowflake,
        filter: RelationshipFilter,
        page: PageRequest,
    ) -> RepoResult<Page<Relationship>> {
        let user = user_id.into_inner();

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM relationships");
        push_filter(&mut count_query, user, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM relationships"));
        push_filter(&mut select, user, filter);
        select
            .push(" ORDER BY updated_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows = select
            .build_query_as::<RelationshipModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let items = rows
            .into_iter()
            .map(Relationship::try_from)
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(Page::new(items, count_to_u64(total)))
    }
}
