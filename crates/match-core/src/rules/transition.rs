//! Reaction engine - legal relationship transitions

use std::fmt;

use serde::Serialize;

use crate::entities::{Reaction, Relationship, RelationshipStatus, Side};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Outcome of applying a reaction to the current pair state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    /// No relationship existed; create one with the actor as initiator
    Create { status: RelationshipStatus },
    /// Change the status of the existing relationship
    Update {
        from: RelationshipStatus,
        to: RelationshipStatus,
    },
    /// Purge the relationship and its messages
    Unblock,
}

impl Transition {
    /// Status the relationship holds afterwards, `None` when it is removed
    pub fn resulting_status(&self) -> Option<RelationshipStatus> {
        match *self {
            Self::Create { status } => Some(status),
            Self::Update { to, .. } => Some(to),
            Self::Unblock => None,
        }
    }

    /// How to undo this transition if its icebreaker cannot be delivered
    pub fn compensation(&self) -> Option<Compensation> {
        match *self {
            Self::Create {
                status: RelationshipStatus::PendingInterest,
            } => Some(Compensation::RelationshipDeleted),
            Self::Update {
                from: RelationshipStatus::PendingInterest,
                to: RelationshipStatus::MutualMatch,
            } => Some(Compensation::RevertedToPending),
            _ => None,
        }
    }
}

/// Corrective action taken after a like-with-photo lost its icebreaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compensation {
    /// The relationship created by the like was removed
    RelationshipDeleted,
    /// The match was downgraded back to pending interest
    RevertedToPending,
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelationshipDeleted => f.write_str("relationship deleted"),
            Self::RevertedToPending => f.write_str("reverted to pending interest"),
        }
    }
}

/// Decide what `reaction` from `actor` toward `target` does to the pair
///
/// `existing` must be the relationship stored for the unordered pair, if any.
/// Declined is terminal: once recorded, no further reaction applies.
pub fn decide(
    existing: Option<&Relationship>,
    actor: Snowflake,
    target: Snowflake,
    reaction: Reaction,
) -> Result<Transition, DomainError> {
    let invalid = || DomainError::InvalidTransition {
        from: existing.map(|rel| rel.status),
        reaction,
    };

    if actor == target {
        return Err(invalid());
    }

    let Some(rel) = existing else {
        return match reaction {
            Reaction::Like => Ok(Transition::Create {
                status: RelationshipStatus::PendingInterest,
            }),
            Reaction::Dislike => Ok(Transition::Create {
                status: RelationshipStatus::Declined,
            }),
            Reaction::Block | Reaction::Unblock => Err(invalid()),
        };
    };

    if rel.counterpart(actor) != Some(target) {
        return Err(invalid());
    }
    let side = rel.side_of(actor).ok_or_else(invalid)?;

    use RelationshipStatus as S;
    let to = match (rel.status, side, reaction) {
        (S::PendingInterest, Side::Responder, Reaction::Like) => S::MutualMatch,
        (S::PendingInterest, Side::Responder, Reaction::Dislike) => S::Declined,
        (S::PendingInterest | S::MutualMatch, side, Reaction::Block) => {
            RelationshipStatus::blocked_by(side)
        }
        (status, side, Reaction::Unblock) if status.block_holder() == Some(side) => {
            return Ok(Transition::Unblock);
        }
        _ => return Err(invalid()),
    };

    Ok(Transition::Update {
        from: rel.status,
        to,
    })
}
