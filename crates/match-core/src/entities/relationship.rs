//! Relationship entity - the single record tracking interest between two users

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{PairKey, Snowflake};

/// State of a relationship between two users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    PendingInterest,
    MutualMatch,
    Declined,
    BlockedByInitiator,
    BlockedByResponder,
}

impl RelationshipStatus {
    pub const ALL: [Self; 5] = [
        Self::PendingInterest,
        Self::MutualMatch,
        Self::Declined,
        Self::BlockedByInitiator,
        Self::BlockedByResponder,
    ];

    /// Stable storage representation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingInterest => "pending_interest",
            Self::MutualMatch => "mutual_match",
            Self::Declined => "declined",
            Self::BlockedByInitiator => "blocked_by_initiator",
            Self::BlockedByResponder => "blocked_by_responder",
        }
    }

    /// Only pending and matched pairs may exchange messages
    #[inline]
    pub fn is_messageable(self) -> bool {
        matches!(self, Self::PendingInterest | Self::MutualMatch)
    }

    #[inline]
    pub fn is_blocked(self) -> bool {
        matches!(self, Self::BlockedByInitiator | Self::BlockedByResponder)
    }

    /// Block status recorded when `side` performs the block
    pub fn blocked_by(side: Side) -> Self {
        match side {
            Side::Initiator => Self::BlockedByInitiator,
            Side::Responder => Self::BlockedByResponder,
        }
    }

    /// The side holding the block, if any
    pub fn block_holder(self) -> Option<Side> {
        match self {
            Self::BlockedByInitiator => Some(Side::Initiator),
            Self::BlockedByResponder => Some(Side::Responder),
            _ => None,
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown relationship status '{s}'"))
    }
}

/// Which end of a relationship a user occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The user who performed the first recorded reaction
    Initiator,
    /// The other party
    Responder,
}

/// Relationship entity
///
/// `initiator` and `responder` are explicit fields; their order is the
/// order of the first reaction and never changes for the lifetime of the
/// record. `version` increases on every status change and backs
/// compare-and-swap updates in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: Snowflake,
    pub initiator: Snowflake,
    pub responder: Snowflake,
    pub status: RelationshipStatus,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    /// Create a new Relationship from a first reaction by `initiator`
    pub fn new(
        id: Snowflake,
        initiator: Snowflake,
        responder: Snowflake,
        status: RelationshipStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            initiator,
            responder,
            status,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.initiator, self.responder)
    }

    pub fn side_of(&self, user_id: Snowflake) -> Option<Side> {
        if user_id == self.initiator {
            Some(Side::Initiator)
        } else if user_id == self.responder {
            Some(Side::Responder)
        } else {
            None
        }
    }

    #[inline]
    pub fn involves(&self, user_id: Snowflake) -> bool {
        self.side_of(user_id).is_some()
    }

    /// The other party from `user_id`'s point of view
    pub fn counterpart(&self, user_id: Snowflake) -> Option<Snowflake> {
        match self.side_of(user_id)? {
            Side::Initiator => Some(self.responder),
            Side::Responder => Some(self.initiator),
        }
    }

    /// Apply a status change locally, mirroring what the store does
    pub fn with_status(mut self, status: RelationshipStatus) -> Self {
        self.status = status;
        self.version += 1;
        self.updated_at = Utc::now();
        self
    }
}
