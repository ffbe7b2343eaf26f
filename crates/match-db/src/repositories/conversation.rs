//! PostgreSQL implementation of ConversationRepository

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use match_core::entities::{Message, MessageKind};
use match_core::traits::{ConversationRepository, Page, PageRequest, RepoResult};
use match_core::value_objects::Snowflake;

use crate::mappers::{messages_from_models, MessageInsert};
use crate::models::MessageModel;

use super::error::{count_to_u64, map_db_error};

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    /// Create a new PgConversationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_message(conn: &mut PgConnection, message: &Message) -> RepoResult<()> {
    let insert = MessageInsert::new(message);

    sqlx::query(
        r#"
        INSERT INTO relationship_messages (id, relationship_id, sender_id, recipient_id, kind, content, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(insert.id)
    .bind(insert.relationship_id)
    .bind(insert.sender_id)
    .bind(insert.recipient_id)
    .bind(insert.kind)
    .bind(insert.content)
    .bind(message.created_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;

    Ok(())
}

async fn count_messages(conn: &mut PgConnection, relationship_id: Snowflake) -> RepoResult<u64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM relationship_messages WHERE relationship_id = $1")
            .bind(relationship_id.into_inner())
            .fetch_one(conn)
            .await
            .map_err(map_db_error)?;

    Ok(count_to_u64(count))
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn append(&self, message: &Message) -> RepoResult<()> {
        let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
        insert_message(&mut conn, message).await
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, relationship_id = %message.relationship_id))]
    async fn append_if_count(
        &self,
        message: &Message,
        expected_count: u64,
        relationship_version: i32,
    ) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Serializes appends per relationship across every process
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(message.relationship_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        // Holds off status updates and deletes until this transaction ends
        let version: Option<i32> =
            sqlx::query_scalar("SELECT version FROM relationships WHERE id = $1 FOR SHARE")
                .bind(message.relationship_id.into_inner())
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_error)?;
        if version != Some(relationship_version) {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(false);
        }

        let current = count_messages(&mut tx, message.relationship_id).await?;
        if current != expected_count {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(false);
        }

        insert_message(&mut tx, message).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(true)
    }

    #[instrument(skip(self))]
    async fn count(&self, relationship_id: Snowflake) -> RepoResult<u64> {
        let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
        count_messages(&mut conn, relationship_id).await
    }

    #[instrument(skip(self))]
    async fn first_n(&self, relationship_id: Snowflake, n: usize) -> RepoResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT id, relationship_id, sender_id, recipient_id, kind, content, created_at
            FROM relationship_messages
            WHERE relationship_id = $1
            ORDER BY id ASC
            LIMIT $2
            "#,
        )
        .bind(relationship_id.into_inner())
        .bind(n as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        messages_from_models(rows)
    }

    #[instrument(skip(self))]
    async fn exists(&self, relationship_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM relationship_messages WHERE relationship_id = $1)",
        )
        .bind(relationship_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_photo_reveals(&self, relationship_id: Snowflake) -> RepoResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT id, relationship_id, sender_id, recipient_id, kind, content, created_at
            FROM relationship_messages
            WHERE relationship_id = $1 AND kind = $2
            ORDER BY id ASC
            "#,
        )
        .bind(relationship_id.into_inner())
        .bind(MessageKind::PhotoReveal.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        messages_from_models(rows)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_by_ids(&self, relationship_id: Snowflake, ids: &[Snowflake]) -> RepoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let ids: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();

        let result = sqlx::query(
            "DELETE FROM relationship_messages WHERE relationship_id = $1 AND id = ANY($2)",
        )
        .bind(relationship_id.into_inner())
        .bind(&ids)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_by_relationship(&self, relationship_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM relationship_messages WHERE relationship_id = $1")
            .bind(relationship_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        relationship_id: Snowflake,
        page: PageRequest,
    ) -> RepoResult<Page<Message>> {
        let total = self.count(relationship_id).await?;

        let rows = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT id, relationship_id, sender_id, recipient_id, kind, content, created_at
            FROM relationship_messages
            WHERE relationship_id = $1
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(relationship_id.into_inner())
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page::new(messages_from_models(rows)?, total))
    }
}
