//! # ot-sim-bus::pusher
//!
//! The outbound half of the message bus client (§4.2). Wraps a
//! `PushTransport` and handles envelope encoding.

use ot_sim_types::envelope::{self, Envelope};
use ot_sim_types::errors::BusError;

use crate::transport::PushTransport;

/// `push(topic, envelope)`. Nonblocking from the caller's perspective; the
/// underlying transport may return `BusError::Overflow` if its queue bound
/// is exceeded.
pub struct Pusher<T: PushTransport> {
    transport: T,
}

impl<T: PushTransport> Pusher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn push(&self, topic: &str, env: &Envelope) -> Result<(), BusError> {
        let bytes = envelope::encode(env);
        self.transport.send(topic, bytes)
    }

    pub fn close(&self) {
        self.transport.close();
    }
}
