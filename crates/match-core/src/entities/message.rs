//! Message entity - one entry in a relationship's conversation

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Storage discriminator for [`MessageBody`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    PhotoReveal,
}

impl MessageKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::PhotoReveal => "photo_reveal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "photo_reveal" => Some(Self::PhotoReveal),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message payload
///
/// `PhotoReveal` is the icebreaker sentinel: the mandatory photo reveal that
/// has to open each side's part of the conversation before free text unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum MessageBody {
    Text(String),
    PhotoReveal(String),
}

impl MessageBody {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn photo(url: impl Into<String>) -> Self {
        Self::PhotoReveal(url.into())
    }

    /// Rebuild a body from its stored parts
    pub fn from_parts(kind: MessageKind, content: String) -> Self {
        match kind {
            MessageKind::Text => Self::Text(content),
            MessageKind::PhotoReveal => Self::PhotoReveal(content),
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text(_) => MessageKind::Text,
            Self::PhotoReveal(_) => MessageKind::PhotoReveal,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Text(content) | Self::PhotoReveal(content) => content,
        }
    }

    /// True for a photo reveal that actually carries a URL
    pub fn is_icebreaker(&self) -> bool {
        matches!(self, Self::PhotoReveal(url) if !url.trim().is_empty())
    }

    pub fn photo_url(&self) -> Option<&str> {
        match self {
            Self::PhotoReveal(url) => Some(url),
            Self::Text(_) => None,
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub relationship_id: Snowflake,
    pub from: Snowflake,
    pub to: Snowflake,
    pub body: MessageBody,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new Message
    pub fn new(
        id: Snowflake,
        relationship_id: Snowflake,
        from: Snowflake,
        to: Snowflake,
        body: MessageBody,
    ) -> Self {
        Self {
            id,
            relationship_id,
            from,
            to,
            body,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_from(&self, user_id: Snowflake) -> bool {
        self.from == user_id
    }
}
