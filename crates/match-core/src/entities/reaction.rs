//! Reaction - what one user expresses toward another

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Reaction a user may request toward another user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Like,
    Dislike,
    Block,
    Unblock,
}

impl Reaction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Block => "block",
            Self::Unblock => "unblock",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient input to the reaction engine
///
/// `photo_url` is only meaningful with [`Reaction::Like`]: the like then
/// also delivers the photo as the icebreaker message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionRequest {
    pub target_id: Snowflake,
    pub reaction: Reaction,
    pub photo_url: Option<String>,
}

impl ReactionRequest {
    pub fn new(target_id: Snowflake, reaction: Reaction) -> Self {
        Self {
            target_id,
            reaction,
            photo_url: None,
        }
    }

    /// A like that also delivers an icebreaker photo
    pub fn like_with_photo(target_id: Snowflake, photo_url: impl Into<String>) -> Self {
        Self {
            target_id,
            reaction: Reaction::Like,
            photo_url: Some(photo_url.into()),
        }
    }

    #[inline]
    pub fn carries_photo(&self) -> bool {
        self.photo_url.is_some()
    }
}
