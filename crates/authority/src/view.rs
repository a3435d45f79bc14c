//! Participant-side view of who holds what.

use std::collections::BTreeMap;

use kinetra_physics::BodyId;
use tracing::trace;

use crate::message::LeaseNotice;
use crate::participant::ParticipantId;

/// Read access to lease holders.
pub trait HasAuthority {
    /// Current holder of `body`, `None` when it is free.
    fn holder(&self, body: BodyId) -> Option<ParticipantId>;

    fn has_authority(&self, body: BodyId, participant: ParticipantId) -> bool {
        self.holder(body) == Some(participant)
    }

    fn is_free(&self, body: BodyId) -> bool {
        self.holder(body).is_none()
    }
}

/// Replicated holder table built from arbiter notices.
///
/// Applying a notice is idempotent, so duplicated or re-delivered notices
/// are harmless.
#[derive(Debug, Clone, Default)]
pub struct AuthorityView {
    holders: BTreeMap<BodyId, ParticipantId>,
}

impl AuthorityView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one notice in. Returns `true` if the view changed.
    pub fn apply(&mut self, notice: &LeaseNotice) -> bool {
        let changed = match *notice {
            LeaseNotice::Granted { body, holder } => self.holders.insert(body, holder) != Some(holder),
            LeaseNotice::Revoked { body, previous } => {
                // A revoke that crossed a newer grant must not clear it
                if self.holders.get(&body) == Some(&previous) {
                    self.holders.remove(&body);
                    true
                } else {
                    false
                }
            }
        };
        if !changed {
            trace!(?notice, "notice already applied");
        }
        changed
    }

    /// Bodies held by `participant`.
    pub fn held_by(&self, participant: ParticipantId) -> impl Iterator<Item = BodyId> + '_ {
        self.holders
            .iter()
            .filter(move |(_, holder)| **holder == participant)
            .map(|(body, _)| *body)
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }
}

impl HasAuthority for AuthorityView {
    fn holder(&self, body: BodyId) -> Option<ParticipantId> {
        self.holders.get(&body).copied()
    }
}
