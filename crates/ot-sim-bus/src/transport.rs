//! # ot-sim-bus::transport
//!
//! The wire-level transport boundary (§6.2): a connect-style push socket
//! sending two-frame `[topic, payload]` messages, and a subscribe-style
//! socket topic-prefix filtering the same. The real deployment transport
//! (ZeroMQ or similar, per §1's "out of scope: ... underlying ... transport
//! library") is an external collaborator; this crate defines the trait
//! boundary it must satisfy and ships an in-process default implementation
//! built on `crossbeam-channel`, so the bus layer is runnable and testable
//! standalone — the same shape as the teacher's `Store`/`MemStore` split.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use ot_sim_types::errors::BusError;

/// The outbound half of the transport: a PUSH-style, connect-mode socket.
/// `send` is nonblocking from the caller's perspective; once the
/// implementation's internal queue bound is exceeded it returns
/// `BusError::Overflow` rather than blocking indefinitely (§4.2).
pub trait PushTransport: Send + Sync {
    fn send(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError>;
    /// Closes the socket with linger 0 (§6.2): any still-queued sends are
    /// dropped, the call does not wait for them to flush.
    fn close(&self);
}

/// The inbound half: a SUB-style, topic-prefix-filtered socket.
pub trait SubTransport: Send {
    /// Blocks for up to `timeout` waiting for the next `(topic, payload)`
    /// frame pair. Returns `None` on timeout, which is how `stop()` is able
    /// to unblock an in-progress receive promptly (§4.2: within ~100 ms).
    fn recv_timeout(&mut self, timeout: Duration) -> Option<(String, Vec<u8>)>;
}

const DEFAULT_QUEUE_BOUND: usize = 4096;

/// An in-process broker giving every registered subscriber its own bounded
/// `crossbeam-channel`, so a push fans the frame out to each one (true
/// PUB/SUB, per §6.2) rather than being work-stolen by whichever
/// subscriber happens to win the race on a shared receiver. This is the
/// default, self-contained wiring `ot-sim-cli` uses when no external
/// transport endpoint is configured; a module with several co-hosted
/// devices calling `subscriber_half()` on the same broker each get their
/// own delivery of every matching frame.
pub struct InProcessBroker {
    bound: usize,
    subscribers: Arc<Mutex<Vec<Sender<(String, Vec<u8>)>>>>,
}

impl InProcessBroker {
    pub fn new() -> Self {
        Self::with_bound(DEFAULT_QUEUE_BOUND)
    }

    pub fn with_bound(bound: usize) -> Self {
        Self { bound, subscribers: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn pusher_half(&self) -> InProcessPush {
        InProcessPush { subscribers: self.subscribers.clone() }
    }

    /// Registers a fresh, independent channel and returns its receiving
    /// half. Every frame a `Pusher` built from this broker sends after this
    /// call is cloned into this subscriber's own queue.
    pub fn subscriber_half(&self) -> InProcessSub {
        let (tx, rx) = crossbeam_channel::bounded(self.bound);
        self.subscribers.lock().expect("broker subscribers lock poisoned").push(tx);
        InProcessSub { rx }
    }
}

impl Default for InProcessBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct InProcessPush {
    subscribers: Arc<Mutex<Vec<Sender<(String, Vec<u8>)>>>>,
}

impl PushTransport for InProcessPush {
    fn send(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError> {
        let mut subscribers =
            self.subscribers.lock().expect("broker subscribers lock poisoned");
        let mut overflowed = false;
        subscribers.retain(|tx| match tx.try_send((topic.to_string(), payload.clone())) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                // A full subscriber queue means that subscriber is behind,
                // not gone; keep it registered and report the overflow.
                overflowed = true;
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
        drop(subscribers);

        if overflowed {
            ::metrics::counter!(
                ot_sim_types::metrics::MET_BUS_SEND_OVERFLOW,
                ot_sim_types::metrics::LBL_TOPIC => topic.to_string()
            )
            .increment(1);
            Err(BusError::Overflow)
        } else {
            Ok(())
        }
    }

    fn close(&self) {}
}

pub struct InProcessSub {
    rx: Receiver<(String, Vec<u8>)>,
}

impl SubTransport for InProcessSub {
    fn recv_timeout(&mut self, timeout: Duration) -> Option<(String, Vec<u8>)> {
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => Some(frame),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_sub_delivers_frame() {
        let broker = InProcessBroker::new();
        let push = broker.pusher_half();
        let mut sub = broker.subscriber_half();
        push.send("RUNTIME", b"hello".to_vec()).unwrap();
        let (topic, payload) = sub.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(topic, "RUNTIME");
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn recv_times_out_when_empty() {
        let broker = InProcessBroker::new();
        let mut sub = broker.subscriber_half();
        assert!(sub.recv_timeout(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn overflow_once_bound_exceeded() {
        let broker = InProcessBroker::with_bound(1);
        let push = broker.pusher_half();
        let _sub = broker.subscriber_half();
        push.send("t", vec![1]).unwrap();
        assert_eq!(push.send("t", vec![2]), Err(BusError::Overflow));
    }

    #[test]
    fn push_fans_out_to_every_registered_subscriber() {
        let broker = InProcessBroker::new();
        let mut sub_a = broker.subscriber_half();
        let mut sub_b = broker.subscriber_half();
        let push = broker.pusher_half();

        push.send("RUNTIME", b"hello".to_vec()).unwrap();

        let (topic_a, payload_a) = sub_a.recv_timeout(Duration::from_millis(100)).unwrap();
        let (topic_b, payload_b) = sub_b.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!((topic_a.as_str(), payload_a.as_slice()), ("RUNTIME", b"hello".as_slice()));
        assert_eq!((topic_b.as_str(), payload_b.as_slice()), ("RUNTIME", b"hello".as_slice()));
    }

    #[test]
    fn subscriber_registered_after_a_send_does_not_see_it() {
        let broker = InProcessBroker::new();
        let push = broker.pusher_half();
        push.send("RUNTIME", b"before".to_vec()).unwrap();
        let mut late_sub = broker.subscriber_half();
        assert!(late_sub.recv_timeout(Duration::from_millis(20)).is_none());
    }
}
