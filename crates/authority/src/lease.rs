//! The per-body lease state machine.
//!
//! A body is either **Free** (no record) or **Leased** to exactly one
//! participant. Contact grants a lease to the first participant that touches
//! a free body; losing contact starts a grace countdown and the periodic
//! sweep revokes leases whose countdown ran out. A second participant's
//! contact on a leased body is ignored until the lease is revoked.
//!
//! Explicit requests (grabs) create pinned leases that the sweep leaves
//! alone until the holder releases them.

use std::collections::BTreeMap;

use kinetra_physics::BodyId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::message::{LeaseMessage, LeaseNotice};
use crate::participant::ParticipantId;
use crate::view::HasAuthority;

/// Lease tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseConfig {
    /// Time a lease survives after contact ends (seconds).
    pub grace_period: f32,
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self { grace_period: 0.2 }
    }
}

/// State of one leased body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub holder: ParticipantId,
    /// Last time contact began or ended (seconds).
    pub last_contact: f64,
    pub in_contact: bool,
    /// Exempt from the sweep until released.
    pub pinned: bool,
}

impl LeaseRecord {
    /// Whether the sweep at `now` should revoke this lease.
    pub fn expired(&self, now: f64, grace: f64) -> bool {
        !self.pinned && !self.in_contact && now - self.last_contact > grace
    }
}

/// Lease records for every contested body.
///
/// Only the arbiter owns one of these; participants see the result through
/// notices.
#[derive(Debug, Clone, Default)]
pub struct LeaseTable {
    records: BTreeMap<BodyId, LeaseRecord>,
    grace: f64,
}

impl LeaseTable {
    pub fn new(config: &LeaseConfig) -> Self {
        Self {
            records: BTreeMap::new(),
            grace: f64::from(config.grace_period.max(0.0)),
        }
    }

    pub fn grace_period(&self) -> f64 {
        self.grace
    }

    pub fn record(&self, body: BodyId) -> Option<&LeaseRecord> {
        self.records.get(&body)
    }

    /// Number of leased bodies.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &LeaseRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// Apply one advisory message at `now`.
    pub fn apply(&mut self, message: &LeaseMessage, now: f64) -> Option<LeaseNotice> {
        match *message {
            LeaseMessage::ContactBegin { body, participant } => self.contact_begin(body, participant, now),
            LeaseMessage::ContactEnd { body, participant } => {
                self.contact_end(body, participant, now);
                None
            }
            LeaseMessage::Request { body, participant } => self.request(body, participant, now),
            LeaseMessage::Release { body, participant } => self.release(body, participant),
        }
    }

    /// A participant started touching `body`. Grants the lease if the body is free.
    pub fn contact_begin(&mut self, body: BodyId, participant: ParticipantId, now: f64) -> Option<LeaseNotice> {
        match self.records.get_mut(&body) {
            None => {
                self.records.insert(
                    body,
                    LeaseRecord {
                        holder: participant,
                        last_contact: now,
                        in_contact: true,
                        pinned: false,
                    },
                );
                info!(%body, holder = %participant, "lease granted on contact");
                Some(LeaseNotice::Granted { body, holder: participant })
            }
            Some(record) if record.holder == participant => {
                record.last_contact = now;
                record.in_contact = true;
                None
            }
            Some(record) => {
                trace!(%body, holder = %record.holder, claimant = %participant, "contact on leased body ignored");
                None
            }
        }
    }

    /// A participant stopped touching `body`. Starts the grace countdown.
    pub fn contact_end(&mut self, body: BodyId, participant: ParticipantId, now: f64) {
        if let Some(record) = self.records.get_mut(&body).filter(|r| r.holder == participant) {
            record.in_contact = false;
            record.last_contact = now;
        }
    }

    /// Explicit lease request. Grants a pinned lease on a free body, pins an
    /// existing lease of the same participant, and rejects anything else.
    pub fn request(&mut self, body: BodyId, participant: ParticipantId, now: f64) -> Option<LeaseNotice> {
        match self.records.get_mut(&body) {
            None => {
                self.records.insert(
                    body,
                    LeaseRecord {
                        holder: participant,
                        last_contact: now,
                        in_contact: false,
                        pinned: true,
                    },
                );
                info!(%body, holder = %participant, "lease granted on request");
                Some(LeaseNotice::Granted { body, holder: participant })
            }
            Some(record) if record.holder == participant => {
                record.pinned = true;
                None
            }
            Some(record) => {
                debug!(%body, holder = %record.holder, claimant = %participant, "lease request rejected");
                None
            }
        }
    }

    /// Give a lease back. Releasing a lease held by someone else is a no-op.
    pub fn release(&mut self, body: BodyId, participant: ParticipantId) -> Option<LeaseNotice> {
        if self.holder(body) != Some(participant) {
            return None;
        }
        self.records.remove(&body);
        info!(%body, previous = %participant, "lease released");
        Some(LeaseNotice::Revoked { body, previous: participant })
    }

    /// Revoke every lease whose grace period ran out by `now`.
    pub fn sweep(&mut self, now: f64) -> Vec<LeaseNotice> {
        let grace = self.grace;
        let mut revoked = Vec::new();
        self.records.retain(|&body, record| {
            if record.expired(now, grace) {
                info!(%body, previous = %record.holder, idle = now - record.last_contact, "lease expired");
                revoked.push(LeaseNotice::Revoked { body, previous: record.holder });
                false
            } else {
                true
            }
        });
        revoked
    }

    /// Drop a despawned body's lease.
    pub fn forget(&mut self, body: BodyId) -> Option<LeaseNotice> {
        self.records
            .remove(&body)
            .map(|record| LeaseNotice::Revoked { body, previous: record.holder })
    }
}

impl HasAuthority for LeaseTable {
    fn holder(&self, body: BodyId) -> Option<ParticipantId> {
        self.records.get(&body).map(|r| r.holder)
    }
}
