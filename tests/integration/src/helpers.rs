//! Test helpers for integration tests
//!
//! Provides ready-wired service contexts over the in-memory stores or a
//! PostgreSQL database, and assertions on service errors.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use match_common::AppConfig;
use match_core::traits::{ConversationRepository, PairRepository};
use match_core::{DomainError, MessageGate, PairKey, Relationship, Snowflake};
use match_db::{
    create_pool, DatabaseConfig, InMemoryConversationRepository, InMemoryPairRepository,
    InMemoryUserDirectory, PgPool,
};
use match_service::dto::{MessageResponse, ReactRequest, SendMessageRequest};
use match_service::{
    build_context, ConversationService, ReactionOutcome, ReactionService, RelationshipService,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};

use crate::fixtures::SlowHistory;

/// Service context over in-memory stores, with handles for inspection
pub struct TestApp {
    pub ctx: ServiceContext,
    pub pairs: Arc<InMemoryPairRepository>,
    pub messages: Arc<InMemoryConversationRepository>,
    pub directory: Arc<InMemoryUserDirectory>,
}

impl TestApp {
    /// Wire the default icebreaker gate
    pub fn start() -> Self {
        Self::build(None, None)
    }

    /// Wire a custom gate
    pub fn start_with_gate(gate: impl MessageGate + 'static) -> Self {
        Self::build(Some(Arc::new(gate)), None)
    }

    /// Wire the default gate over a conversation store with slow history reads
    pub fn start_with_slow_history(delay: Duration) -> Self {
        Self::build(None, Some(delay))
    }

    fn build(gate: Option<Arc<dyn MessageGate>>, history_delay: Option<Duration>) -> Self {
        let pairs = Arc::new(InMemoryPairRepository::new());
        let messages = Arc::new(InMemoryConversationRepository::linked(pairs.clone()));
        let directory = Arc::new(InMemoryUserDirectory::new());

        let conversations: Arc<dyn ConversationRepository> = match history_delay {
            Some(delay) => Arc::new(SlowHistory::new(messages.clone(), delay)),
            None => messages.clone(),
        };

        let mut builder = ServiceContextBuilder::new()
            .pair_repo(pairs.clone())
            .conversation_repo(conversations)
            .user_directory(directory.clone());
        if let Some(gate) = gate {
            builder = builder.message_gate(gate);
        }

        let ctx = match builder.build() {
            Ok(ctx) => ctx,
            Err(e) => panic!("in-memory context must build: {e}"),
        };

        Self {
            ctx,
            pairs,
            messages,
            directory,
        }
    }

    /// Register a user with a fixed id
    pub fn register(&self, user_id: Snowflake) -> Snowflake {
        self.directory.register(user_id);
        user_id
    }

    /// Register a fresh user
    pub fn user(&self) -> Snowflake {
        self.register(self.ctx.generate_id())
    }

    pub async fn react(
        &self,
        actor: Snowflake,
        request: ReactRequest,
    ) -> ServiceResult<ReactionOutcome> {
        ReactionService::new(&self.ctx).react(actor, request).await
    }

    pub async fn send(
        &self,
        relationship_id: Snowflake,
        sender: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        ConversationService::new(&self.ctx)
            .send_message(relationship_id, sender, request)
            .await
    }

    pub fn relationships(&self) -> RelationshipService<'_> {
        RelationshipService::new(&self.ctx)
    }

    /// Stored relationship for the pair, if any
    pub async fn relationship_between(&self, a: Snowflake, b: Snowflake) -> Option<Relationship> {
        match self.pairs.find_by_pair(PairKey::new(a, b)).await {
            Ok(found) => found,
            Err(e) => panic!("in-memory lookup failed: {e}"),
        }
    }
}

/// Create a test configuration
pub fn test_config() -> Result<AppConfig> {
    // Load from environment or use defaults
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    Ok(config)
}

/// Helper to check if test environment is available
pub fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }
    true
}

/// Service context over PostgreSQL plus a pool for seeding users
pub async fn postgres_app() -> Result<(ServiceContext, PgPool)> {
    let config = test_config()?;
    let ctx = build_context(&config).await?;
    let pool = create_pool(&DatabaseConfig::from(&config.database)).await?;
    Ok((ctx, pool))
}

/// Insert a user row and return its id
pub async fn insert_user(ctx: &ServiceContext, pool: &PgPool) -> Result<Snowflake> {
    let id = ctx.generate_id();
    sqlx::query("INSERT INTO users (id) VALUES ($1)")
        .bind(id.into_inner())
        .execute(pool)
        .await?;
    Ok(id)
}

/// Remove user rows created by a test
pub async fn delete_users(pool: &PgPool, ids: &[Snowflake]) -> Result<()> {
    let raw: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();
    sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(raw)
        .execute(pool)
        .await?;
    Ok(())
}

/// Assert that a service call failed with the given error code
pub fn assert_error<T: std::fmt::Debug>(
    result: ServiceResult<T>,
    expected_code: &str,
) -> Result<ServiceError> {
    match result {
        Ok(value) => anyhow::bail!("Expected error {expected_code}, got Ok({value:?})"),
        Err(err) if err.error_code() == expected_code => Ok(err),
        Err(err) => anyhow::bail!(
            "Expected error {expected_code}, got {}: {err}",
            err.error_code()
        ),
    }
}

/// Assert that a service call failed with a domain error matching `predicate`
pub fn assert_domain<T: std::fmt::Debug>(
    result: ServiceResult<T>,
    predicate: impl FnOnce(&DomainError) -> bool,
) -> Result<()> {
    match result {
        Ok(value) => anyhow::bail!("Expected domain error, got Ok({value:?})"),
        Err(err) => match err.as_domain() {
            Some(domain) if predicate(domain) => Ok(()),
            _ => anyhow::bail!("Unexpected error {}: {err}", err.error_code()),
        },
    }
}
