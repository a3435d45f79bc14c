//! Lease messages.
//!
//! Participants send [`LeaseMessage`]s to the arbiter; they are advisory
//! requests, never direct writes. The arbiter answers every accepted change
//! with a [`LeaseNotice`] broadcast to all participants.

use kinetra_physics::BodyId;
use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;

/// Participant-to-arbiter message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LeaseMessage {
    /// The participant's body started touching `body`.
    ContactBegin { body: BodyId, participant: ParticipantId },
    /// The participant's body stopped touching `body`.
    ContactEnd { body: BodyId, participant: ParticipantId },
    /// Explicit lease request (grab). Granted leases are pinned until released.
    Request { body: BodyId, participant: ParticipantId },
    /// Give a lease back.
    Release { body: BodyId, participant: ParticipantId },
}

impl LeaseMessage {
    pub fn body(&self) -> BodyId {
        match *self {
            Self::ContactBegin { body, .. }
            | Self::ContactEnd { body, .. }
            | Self::Request { body, .. }
            | Self::Release { body, .. } => body,
        }
    }

    pub fn participant(&self) -> ParticipantId {
        match *self {
            Self::ContactBegin { participant, .. }
            | Self::ContactEnd { participant, .. }
            | Self::Request { participant, .. }
            | Self::Release { participant, .. } => participant,
        }
    }
}

/// Arbiter-to-participant notice of a lease change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaseNotice {
    Granted { body: BodyId, holder: ParticipantId },
    /// Authority went back to the host.
    Revoked { body: BodyId, previous: ParticipantId },
}

impl LeaseNotice {
    pub fn body(&self) -> BodyId {
        match *self {
            Self::Granted { body, .. } | Self::Revoked { body, .. } => body,
        }
    }

    /// Holder after this notice, `None` when the body is free.
    pub fn holder(&self) -> Option<ParticipantId> {
        match *self {
            Self::Granted { holder, .. } => Some(holder),
            Self::Revoked { .. } => None,
        }
    }
}
