//! Service context - dependency container for services
//!
//! Holds the repositories, the message gate, the id generator, and the
//! per-key lock tables shared by every service.

use std::sync::Arc;

use match_common::MatchingConfig;
use match_core::traits::{ConversationRepository, PageRequest, PairRepository, UserDirectory};
use match_core::{IcebreakerGate, MessageGate, PairKey, Snowflake, SnowflakeGenerator};

use super::error::{ServiceError, ServiceResult};
use super::locks::KeyedLocks;

/// Limits applied by the services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingSettings {
    /// Page size when a listing does not specify one
    pub page_size: u32,
    /// Maximum characters in a text message
    pub max_text_length: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self::from(&MatchingConfig::default())
    }
}

impl From<&MatchingConfig> for MatchingSettings {
    fn from(config: &MatchingConfig) -> Self {
        Self {
            page_size: config.page_size.clamp(1, PageRequest::MAX_LIMIT),
            max_text_length: config.max_text_length,
        }
    }
}

/// Service context containing all dependencies
///
/// Cheap to clone; every field is shared. Lock tables live here so that all
/// services built from the same context serialize on the same keys.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    pair_repo: Arc<dyn PairRepository>,
    conversation_repo: Arc<dyn ConversationRepository>,
    user_directory: Arc<dyn UserDirectory>,

    // Rules
    message_gate: Arc<dyn MessageGate>,

    // Concurrency
    pair_locks: Arc<KeyedLocks<PairKey>>,
    relationship_locks: Arc<KeyedLocks<Snowflake>>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    settings: MatchingSettings,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        pair_repo: Arc<dyn PairRepository>,
        conversation_repo: Arc<dyn ConversationRepository>,
        user_directory: Arc<dyn UserDirectory>,
        message_gate: Arc<dyn MessageGate>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        settings: MatchingSettings,
    ) -> Self {
        Self {
            pair_repo,
            conversation_repo,
            user_directory,
            message_gate,
            pair_locks: Arc::new(KeyedLocks::new()),
            relationship_locks: Arc::new(KeyedLocks::new()),
            snowflake_generator,
            settings,
        }
    }

    // === Repositories ===

    /// Get the pair repository
    pub fn pair_repo(&self) -> &dyn PairRepository {
        self.pair_repo.as_ref()
    }

    /// Get the conversation repository
    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    /// Get the user directory
    pub fn user_directory(&self) -> &dyn UserDirectory {
        self.user_directory.as_ref()
    }

    // === Rules ===

    /// Get the message gate consulted before every append
    pub fn message_gate(&self) -> &dyn MessageGate {
        self.message_gate.as_ref()
    }

    // === Concurrency ===

    /// Locks serializing reactions per unordered pair
    pub fn pair_locks(&self) -> &KeyedLocks<PairKey> {
        &self.pair_locks
    }

    /// Locks serializing conversation writes per relationship
    pub fn relationship_locks(&self) -> &KeyedLocks<Snowflake> {
        &self.relationship_locks
    }

    // === Settings ===

    pub fn settings(&self) -> &MatchingSettings {
        &self.settings
    }

    /// Page request with the configured default size
    pub fn page_request(&self, page: Option<u32>, limit: Option<u32>) -> PageRequest {
        PageRequest::new(page, Some(limit.unwrap_or(self.settings.page_size)))
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("pair_locks", &self.pair_locks)
            .field("relationship_locks", &self.relationship_locks)
            .field("snowflake_generator", &self.snowflake_generator)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pair_repo: Option<Arc<dyn PairRepository>>,
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    user_directory: Option<Arc<dyn UserDirectory>>,
    message_gate: Option<Arc<dyn MessageGate>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    settings: MatchingSettings,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair_repo(mut self, repo: Arc<dyn PairRepository>) -> Self {
        self.pair_repo = Some(repo);
        self
    }

    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    pub fn user_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.user_directory = Some(directory);
        self
    }

    /// Replace the default [`IcebreakerGate`]
    pub fn message_gate(mut self, gate: Arc<dyn MessageGate>) -> Self {
        self.message_gate = Some(gate);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: MatchingSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a repository is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.pair_repo
                .ok_or_else(|| ServiceError::validation("pair_repo is required"))?,
            self.conversation_repo
                .ok_or_else(|| ServiceError::validation("conversation_repo is required"))?,
            self.user_directory
                .ok_or_else(|| ServiceError::validation("user_directory is required"))?,
            self.message_gate
                .unwrap_or_else(|| Arc::new(IcebreakerGate) as Arc<dyn MessageGate>),
            self.snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            self.settings,
        ))
    }
}
