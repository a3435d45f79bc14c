//! The single-writer lease arbiter.
//!
//! All lease mutations are serialized here. Participants hold an
//! [`ArbiterLink`] and push encoded [`LeaseMessage`]s into one shared inbox;
//! once per tick the host calls [`LeaseArbiter::pump`], which drains the
//! inbox in arrival order, runs the expiry sweep and broadcasts the
//! resulting notices to every link.

use crossbeam_channel::{unbounded, Receiver, Sender};
use kinetra_physics::BodyId;
use tracing::{debug, warn};

use crate::codec::{decode, encode};
use crate::lease::{LeaseConfig, LeaseTable};
use crate::link::ArbiterLink;
use crate::message::{LeaseMessage, LeaseNotice};
use crate::participant::ParticipantId;

/// Owns the lease table and the message queues around it.
#[derive(Debug)]
pub struct LeaseArbiter {
    table: LeaseTable,
    inbox: Receiver<Vec<u8>>,
    outbox: Sender<Vec<u8>>,
    subscribers: Vec<(ParticipantId, Sender<Vec<u8>>)>,
}

impl LeaseArbiter {
    pub fn new(config: &LeaseConfig) -> Self {
        let (outbox, inbox) = unbounded();
        Self {
            table: LeaseTable::new(config),
            inbox,
            outbox,
            subscribers: Vec::new(),
        }
    }

    /// Connect a participant. The link sends into the shared inbox and
    /// receives every notice broadcast after this call.
    ///
    /// Leases already granted are queued to the new link first, so its
    /// first poll sees the current holders.
    pub fn connect(&mut self, participant: ParticipantId) -> ArbiterLink {
        let (notice_tx, notice_rx) = unbounded();
        for (body, record) in self.table.iter() {
            let notice = LeaseNotice::Granted {
                body,
                holder: record.holder,
            };
            match encode(&notice) {
                Ok(bytes) => {
                    // The receiver is alive until this function returns
                    let _ = notice_tx.send(bytes);
                }
                Err(err) => warn!(%err, ?notice, "failed to encode lease notice"),
            }
        }
        debug!(%participant, leases = self.table.len(), "participant connected to arbiter");
        self.subscribers.push((participant, notice_tx));
        ArbiterLink::new(participant, self.outbox.clone(), notice_rx)
    }

    pub fn table(&self) -> &LeaseTable {
        &self.table
    }

    /// Messages waiting in the inbox.
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    /// Drain the inbox, sweep expired leases and broadcast the changes.
    pub fn pump(&mut self, now: f64) -> Vec<LeaseNotice> {
        let mut notices = Vec::new();

        while let Ok(bytes) = self.inbox.try_recv() {
            match decode::<LeaseMessage>(&bytes) {
                Ok(message) => notices.extend(self.table.apply(&message, now)),
                Err(err) => warn!(%err, len = bytes.len(), "dropping undecodable lease message"),
            }
        }

        notices.extend(self.table.sweep(now));
        self.broadcast(&notices);
        notices
    }

    /// Drop the lease on a body that left the simulation.
    pub fn forget(&mut self, body: BodyId) -> Option<LeaseNotice> {
        let notice = self.table.forget(body)?;
        self.broadcast(std::slice::from_ref(&notice));
        Some(notice)
    }

    fn broadcast(&mut self, notices: &[LeaseNotice]) {
        for notice in notices {
            let bytes = match encode(notice) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(%err, ?notice, "failed to encode lease notice");
                    continue;
                }
            };
            self.subscribers.retain(|(participant, tx)| {
                let alive = tx.send(bytes.clone()).is_ok();
                if !alive {
                    debug!(%participant, "participant disconnected from arbiter");
                }
                alive
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::AuthorityChannel;
    use crate::view::HasAuthority;

    const BOX: BodyId = BodyId(10);
    const A: ParticipantId = ParticipantId(1);
    const B: ParticipantId = ParticipantId(2);

    #[test]
    fn test_grant_reaches_every_participant() {
        let mut arbiter = LeaseArbiter::new(&LeaseConfig::default());
        let mut a = arbiter.connect(A);
        let mut b = arbiter.connect(B);

        a.contact_begin(BOX);
        b.contact_begin(BOX);
        assert_eq!(arbiter.pending(), 2);

        let notices = arbiter.pump(0.0);
        assert_eq!(notices, vec![LeaseNotice::Granted { body: BOX, holder: A }]);

        a.poll();
        b.poll();
        assert!(a.view().has_authority(BOX, A));
        assert_eq!(b.view().holder(BOX), Some(A));
    }

    #[test]
    fn test_redelivered_messages_are_harmless() {
        let mut arbiter = LeaseArbiter::new(&LeaseConfig::default());
        let mut a = arbiter.connect(A);

        a.request_lease(BOX);
        a.request_lease(BOX);
        assert_eq!(arbiter.pump(0.0).len(), 1);

        a.release_lease(BOX);
        a.release_lease(BOX);
        assert_eq!(
            arbiter.pump(0.1),
            vec![LeaseNotice::Revoked { body: BOX, previous: A }]
        );

        assert_eq!(a.poll().len(), 2);
        assert!(a.view().is_free(BOX));
    }

    #[test]
    fn test_late_contact_end_expires_on_later_sweep() {
        let mut arbiter = LeaseArbiter::new(&LeaseConfig::default());
        let mut a = arbiter.connect(A);

        a.contact_begin(BOX);
        arbiter.pump(0.0);
        a.contact_end(BOX);
        arbiter.pump(0.05);

        assert!(arbiter.pump(0.24).is_empty());
        assert_eq!(arbiter.pump(0.26).len(), 1);
        a.poll();
        assert!(a.view().is_free(BOX));
    }

    #[test]
    fn test_garbage_bytes_are_dropped() {
        let mut arbiter = LeaseArbiter::new(&LeaseConfig::default());
        let a = arbiter.connect(A);
        a.send_raw(vec![0xff, 0xff, 0xff]);
        a.contact_begin(BOX);
        assert_eq!(arbiter.pump(0.0).len(), 1);
    }

    #[test]
    fn test_disconnected_link_is_pruned() {
        let mut arbiter = LeaseArbiter::new(&LeaseConfig::default());
        let a = arbiter.connect(A);
        let mut b = arbiter.connect(B);
        drop(a);

        b.contact_begin(BOX);
        arbiter.pump(0.0);
        assert_eq!(b.poll().len(), 1);
        assert_eq!(arbiter.subscribers.len(), 1);
    }

    #[test]
    fn test_late_joiner_sees_existing_leases() {
        let mut arbiter = LeaseArbiter::new(&LeaseConfig::default());
        let a = arbiter.connect(A);
        a.contact_begin(BOX);
        a.request_lease(BodyId(11));
        arbiter.pump(0.0);

        let mut b = arbiter.connect(B);
        let seeded = b.poll();
        assert_eq!(seeded.len(), 2);
        assert_eq!(b.view().holder(BOX), Some(A));
        assert_eq!(b.view().holder(BodyId(11)), Some(A));
        assert!(!b.view().is_free(BOX));

        // Later changes still arrive
        a.release_lease(BodyId(11));
        arbiter.pump(0.1);
        b.poll();
        assert!(b.view().is_free(BodyId(11)));
    }

    #[test]
    fn test_forget_broadcasts_revoke() {
        let mut arbiter = LeaseArbiter::new(&LeaseConfig::default());
        let mut a = arbiter.connect(A);
        a.request_lease(BOX);
        arbiter.pump(0.0);
        assert!(arbiter.forget(BOX).is_some());
        a.poll();
        assert!(a.view().is_free(BOX));
        assert_eq!(arbiter.forget(BOX), None);
    }
}
