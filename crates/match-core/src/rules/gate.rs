//! Message gate - who may append what to a conversation
//!
//! Before a mutual match only the initiator can write: an opening photo
//! reveal plus at most one follow-up. After a match each side has to open
//! with its own photo reveal before free text unlocks.

use std::fmt;

use serde::Serialize;

use crate::entities::{Message, MessageBody, Relationship, RelationshipStatus};
use crate::value_objects::Snowflake;

/// Number of leading messages inspected for the post-match reveal check
pub const HISTORY_WINDOW: usize = 5;

/// One-sided messages allowed while interest is still pending
pub const PENDING_MESSAGE_CAP: u64 = 2;

/// Why a message was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDenial {
    NotMessageable,
    IcebreakerRequired,
    MessageCapExceeded,
}

impl fmt::Display for GateDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMessageable => f.write_str("relationship not messageable"),
            Self::IcebreakerRequired => f.write_str("icebreaker required"),
            Self::MessageCapExceeded => f.write_str("message cap exceeded"),
        }
    }
}

/// Snapshot of a conversation as seen by the gate
///
/// `head` holds the oldest messages in insertion order (at most
/// [`HISTORY_WINDOW`] are consulted); `total` is the full message count.
#[derive(Debug, Clone, Copy)]
pub struct History<'a> {
    pub head: &'a [Message],
    pub total: u64,
}

impl<'a> History<'a> {
    pub fn new(head: &'a [Message], total: u64) -> Self {
        Self { head, total }
    }

    pub const fn empty() -> Self {
        Self { head: &[], total: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    fn first_sender(&self) -> Option<Snowflake> {
        self.head.first().map(|message| message.from)
    }

    fn window_has_message_from(&self, user_id: Snowflake) -> bool {
        self.head
            .iter()
            .take(HISTORY_WINDOW)
            .any(|message| message.is_from(user_id))
    }
}

/// Policy deciding whether a message may be appended
pub trait MessageGate: Send + Sync {
    fn check(
        &self,
        relationship: &Relationship,
        sender: Snowflake,
        body: &MessageBody,
        history: History<'_>,
    ) -> Result<(), GateDenial>;
}

/// Default gate implementing the photo-reveal protocol
#[derive(Debug, Clone, Copy, Default)]
pub struct IcebreakerGate;

impl MessageGate for IcebreakerGate {
    fn check(
        &self,
        relationship: &Relationship,
        sender: Snowflake,
        body: &MessageBody,
        history: History<'_>,
    ) -> Result<(), GateDenial> {
        evaluate(relationship, sender, body, history)
    }
}

/// Evaluate the photo-reveal protocol for one message
pub fn evaluate(
    relationship: &Relationship,
    sender: Snowflake,
    body: &MessageBody,
    history: History<'_>,
) -> Result<(), GateDenial> {
    match relationship.status {
        RelationshipStatus::PendingInterest if history.is_empty() => {
            if body.is_icebreaker() && sender == relationship.initiator {
                Ok(())
            } else {
                Err(GateDenial::IcebreakerRequired)
            }
        }
        RelationshipStatus::PendingInterest => {
            if history.total < PENDING_MESSAGE_CAP && history.first_sender() == Some(sender) {
                Ok(())
            } else {
                Err(GateDenial::MessageCapExceeded)
            }
        }
        RelationshipStatus::MutualMatch => {
            let first_own_message = history.total <= PENDING_MESSAGE_CAP
                && !history.window_has_message_from(sender);
            if first_own_message && !body.is_icebreaker() {
                Err(GateDenial::IcebreakerRequired)
            } else {
                Ok(())
            }
        }
        _ => Err(GateDenial::NotMessageable),
    }
}
