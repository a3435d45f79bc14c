//! Participant end of the authority channel.

use crossbeam_channel::{Receiver, Sender};
use kinetra_physics::BodyId;
use tracing::{debug, trace, warn};

use crate::codec::{decode, encode};
use crate::message::{LeaseMessage, LeaseNotice};
use crate::participant::ParticipantId;
use crate::view::{AuthorityView, HasAuthority};

/// Fire-and-forget lease traffic on behalf of one participant.
///
/// Sends never block and never fail loudly; delivery is reconciled by the
/// arbiter's next pump.
pub trait AuthorityChannel {
    fn participant(&self) -> ParticipantId;

    fn send(&self, message: LeaseMessage);

    fn request_lease(&self, body: BodyId) {
        let participant = self.participant();
        self.send(LeaseMessage::Request { body, participant });
    }

    fn release_lease(&self, body: BodyId) {
        let participant = self.participant();
        self.send(LeaseMessage::Release { body, participant });
    }

    fn contact_begin(&self, body: BodyId) {
        let participant = self.participant();
        self.send(LeaseMessage::ContactBegin { body, participant });
    }

    fn contact_end(&self, body: BodyId) {
        let participant = self.participant();
        self.send(LeaseMessage::ContactEnd { body, participant });
    }
}

/// Encoded message queue to the arbiter plus the notice feed back from it.
#[derive(Debug)]
pub struct ArbiterLink {
    participant: ParticipantId,
    outbox: Sender<Vec<u8>>,
    notices: Receiver<Vec<u8>>,
    view: AuthorityView,
}

impl ArbiterLink {
    pub(crate) fn new(participant: ParticipantId, outbox: Sender<Vec<u8>>, notices: Receiver<Vec<u8>>) -> Self {
        Self {
            participant,
            outbox,
            notices,
            view: AuthorityView::new(),
        }
    }

    /// Replicated holder table as of the last [`poll`](Self::poll).
    pub fn view(&self) -> &AuthorityView {
        &self.view
    }

    /// Whether this participant holds `body` as far as it knows.
    pub fn holds(&self, body: BodyId) -> bool {
        self.view.has_authority(body, self.participant)
    }

    /// Drain pending notices into the view and return them.
    pub fn poll(&mut self) -> Vec<LeaseNotice> {
        let mut received = Vec::new();
        while let Ok(bytes) = self.notices.try_recv() {
            match decode::<LeaseNotice>(&bytes) {
                Ok(notice) => {
                    self.view.apply(&notice);
                    received.push(notice);
                }
                Err(err) => warn!(participant = %self.participant, %err, "dropping undecodable lease notice"),
            }
        }
        received
    }

    pub(crate) fn send_raw(&self, bytes: Vec<u8>) {
        if self.outbox.send(bytes).is_err() {
            debug!(participant = %self.participant, "arbiter gone; lease message dropped");
        }
    }
}

impl AuthorityChannel for ArbiterLink {
    fn participant(&self) -> ParticipantId {
        self.participant
    }

    fn send(&self, message: LeaseMessage) {
        match encode(&message) {
            Ok(bytes) => {
                trace!(?message, "lease message sent");
                self.send_raw(bytes);
            }
            Err(err) => warn!(?message, %err, "failed to encode lease message"),
        }
    }
}
