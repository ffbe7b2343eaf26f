//! Wiring from configuration to a ready `ServiceContext`

use std::sync::Arc;

use match_common::{try_init_tracing_with_config, AppConfig, AppError, AppResult, TracingConfig};
use match_core::SnowflakeGenerator;
use match_db::{
    create_pool, run_migrations, DatabaseConfig, PgConversationRepository, PgPairRepository,
    PgUserDirectory,
};

use crate::services::{MatchingSettings, ServiceContext, ServiceContextBuilder};

/// Install the tracing subscriber described by `config`
///
/// Returns `false` when a subscriber was already installed.
pub fn init_telemetry(config: &AppConfig) -> bool {
    try_init_tracing_with_config(TracingConfig::from_app_config(config)).is_ok()
}

/// Connect to PostgreSQL, apply migrations, and build the service context
pub async fn build_context(config: &AppConfig) -> AppResult<ServiceContext> {
    tracing::info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let context = ServiceContextBuilder::new()
        .pair_repo(Arc::new(PgPairRepository::new(pool.clone())))
        .conversation_repo(Arc::new(PgConversationRepository::new(pool.clone())))
        .user_directory(Arc::new(PgUserDirectory::new(pool)))
        .snowflake_generator(snowflake_generator)
        .settings(MatchingSettings::from(&config.matching))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    tracing::info!(
        app = %config.app.name,
        worker_id = config.snowflake.worker_id,
        "Service context ready"
    );
    Ok(context)
}
