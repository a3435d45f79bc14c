//! Kinetra Authority
//!
//! Ownership leases for contested dynamic bodies.
//!
//! A participant may only apply forces to a body it holds a lease on. Leases
//! are granted on first contact (or on an explicit grab request), survive a
//! short grace period after contact ends, and then return to the host. All
//! lease state lives in one [`LeaseArbiter`]; participants talk to it over an
//! [`AuthorityChannel`] and learn the outcome from broadcast notices.

pub mod arbiter;
pub mod codec;
pub mod lease;
pub mod link;
pub mod message;
pub mod participant;
pub mod view;

pub use arbiter::LeaseArbiter;
pub use codec::CodecError;
pub use lease::{LeaseConfig, LeaseRecord, LeaseTable};
pub use link::{ArbiterLink, AuthorityChannel};
pub use message::{LeaseMessage, LeaseNotice};
pub use participant::ParticipantId;
pub use view::{AuthorityView, HasAuthority};
