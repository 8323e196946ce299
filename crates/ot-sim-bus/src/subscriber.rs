//! # ot-sim-bus::subscriber
//!
//! The inbound half of the message bus client (§4.2): a single receiver
//! thread that reads topic-filtered two-frame messages, decodes them, and
//! dispatches them serially through every handler registered for that
//! envelope's kind. Mirrors the original `otsim::msgbus::Subscriber`'s
//! per-kind handler vectors and `Start`/`Stop` lifecycle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use ot_sim_types::envelope::{self, Envelope, Kind};

use crate::transport::SubTransport;

/// A handler invoked for every decoded envelope of its registered kind, in
/// registration order. Handlers run to completion before the next envelope
/// is dequeued (§5 ordering guarantees) — a slow handler delays the
/// subscriber by design. The returned map is `tag -> reason` for any point
/// in the envelope the handler could not write through (§7 `PointUnknown`);
/// an Update handler that writes through cleanly returns an empty map.
pub type Handler = Box<dyn Fn(&Envelope) -> HashMap<String, String> + Send>;

/// How promptly `stop()` must unblock an in-progress receive (§4.2).
const RECV_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A not-yet-started subscriber: handlers are registered here, then
/// `start` consumes it and spawns the receiver thread.
pub struct Subscriber<S> {
    transport: S,
    handlers: HashMap<Kind, Vec<Handler>>,
}

impl<S: SubTransport + Send + 'static> Subscriber<S> {
    pub fn new(transport: S) -> Self {
        Self { transport, handlers: HashMap::new() }
    }

    /// Registers a handler for `kind`. Handlers for the same kind run in
    /// the order they were registered.
    pub fn on(&mut self, kind: Kind, handler: Handler) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Starts the receiver thread, filtering to messages whose topic
    /// equals `topic`. `self_id` is this module's identifier, used to drop
    /// self-published envelopes before any handler runs (§3 invariant 3).
    /// `on_confirm` is invoked after all handlers have run for a decoded
    /// `Update` whose `confirm` field is non-empty (§4.2); it is expected
    /// to push the resulting `Confirmation` envelope on `"RUNTIME"`.
    pub fn start(
        mut self,
        topic: String,
        self_id: String,
        on_confirm: impl Fn(Envelope) + Send + 'static,
    ) -> SubscriberHandle {
        let running = Arc::new(AtomicBool::new(true));
        let running_thread = running.clone();

        let join = std::thread::Builder::new()
            .name(format!("ot-sim-subscriber-{topic}"))
            .spawn(move || {
                while running_thread.load(Ordering::Acquire) {
                    let Some((frame_topic, payload)) =
                        self.transport.recv_timeout(RECV_POLL_INTERVAL)
                    else {
                        continue;
                    };

                    if frame_topic != topic {
                        continue;
                    }

                    let env = match envelope::decode(&payload) {
                        Ok(env) => env,
                        Err(err) => {
                            tracing::warn!(error = %err, "dropping envelope that failed to decode");
                            ::metrics::counter!(
                                ot_sim_types::metrics::MET_BUS_ENVELOPE_DROPPED,
                                ot_sim_types::metrics::LBL_REASON => "decode_error",
                                ot_sim_types::metrics::LBL_TOPIC => frame_topic.clone()
                            )
                            .increment(1);
                            continue;
                        }
                    };

                    if env.metadata.sender == self_id {
                        continue; // self-loop suppression
                    }

                    let kind = env.kind();
                    let mut errors = HashMap::new();
                    if let Some(hs) = self.handlers.get(&kind) {
                        for h in hs {
                            errors.extend(h(&env));
                        }
                    }

                    if let envelope::Contents::Update(ref u) = env.contents {
                        if !u.confirm.is_empty() {
                            on_confirm(Envelope::confirmation(
                                self_id.clone(),
                                u.confirm.clone(),
                                errors,
                            ));
                        }
                    }
                }
            })
            .expect("failed to spawn subscriber thread");

        SubscriberHandle { running, join: Some(join) }
    }
}

/// A handle to a running subscriber. Dropping it without calling `stop`
/// leaves the thread running; callers should always `stop` during shutdown.
pub struct SubscriberHandle {
    running: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl SubscriberHandle {
    /// Signals the receiver thread to stop and joins it. The thread
    /// observes the flag at its next `recv_timeout` wakeup, which is bounded
    /// by `RECV_POLL_INTERVAL`, satisfying the ≤100 ms unblock requirement.
    pub fn stop(mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InProcessBroker;
    use ot_sim_types::point::Point;
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn dispatches_to_registered_handler() {
        let broker = InProcessBroker::new();
        let push = broker.pusher_half();
        let sub = Subscriber::new(broker.subscriber_half());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        let mut sub = sub;
        sub.on(
            Kind::Status,
            Box::new(move |env| {
                seen2.lock().unwrap().push(env.metadata.sender.clone());
                HashMap::new()
            }),
        );

        let handle = sub.start("RUNTIME".to_string(), "self".to_string(), |_| {});

        use crate::transport::PushTransport;
        let env = Envelope::status("peer", vec![Point::new("t", 1.0, 1)]);
        push.send("RUNTIME", envelope::encode(&env)).unwrap();

        std::thread::sleep(Duration::from_millis(150));
        handle.stop();

        assert_eq!(seen.lock().unwrap().as_slice(), &["peer".to_string()]);
    }

    #[test]
    fn self_loop_is_suppressed() {
        let broker = InProcessBroker::new();
        let push = broker.pusher_half();
        let mut sub = Subscriber::new(broker.subscriber_half());

        let called = Arc::new(AtomicBool::new(false));
        let called2 = called.clone();
        sub.on(
            Kind::Status,
            Box::new(move |_| {
                called2.store(true, Ordering::SeqCst);
                HashMap::new()
            }),
        );

        let handle = sub.start("RUNTIME".to_string(), "io-A".to_string(), |_| {});

        use crate::transport::PushTransport;
        let env = Envelope::status("io-A", vec![]);
        push.send("RUNTIME", envelope::encode(&env)).unwrap();

        std::thread::sleep(Duration::from_millis(150));
        handle.stop();

        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn mismatched_topic_is_dropped() {
        let broker = InProcessBroker::new();
        let push = broker.pusher_half();
        let mut sub = Subscriber::new(broker.subscriber_half());

        let called = Arc::new(AtomicBool::new(false));
        let called2 = called.clone();
        sub.on(
            Kind::Metric,
            Box::new(move |_| {
                called2.store(true, Ordering::SeqCst);
                HashMap::new()
            }),
        );

        let handle = sub.start("HEALTH".to_string(), "self".to_string(), |_| {});

        use crate::transport::PushTransport;
        let env = Envelope::metric("peer", vec![]);
        push.send("RUNTIME", envelope::encode(&env)).unwrap();

        std::thread::sleep(Duration::from_millis(150));
        handle.stop();

        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn confirm_field_triggers_confirmation_callback() {
        let broker = InProcessBroker::new();
        let push = broker.pusher_half();
        let sub = Subscriber::new(broker.subscriber_half());

        let confirmed = Arc::new(Mutex::new(None));
        let confirmed2 = confirmed.clone();
        let handle = sub.start("RUNTIME".to_string(), "self".to_string(), move |env| {
            *confirmed2.lock().unwrap() = Some(env);
        });

        use crate::transport::PushTransport;
        let env = Envelope::update("peer", vec![Point::new("t", 1.0, 1)], "", "req-1");
        push.send("RUNTIME", envelope::encode(&env)).unwrap();

        std::thread::sleep(Duration::from_millis(150));
        handle.stop();

        let confirmed = confirmed.lock().unwrap();
        let env = confirmed.as_ref().expect("confirmation should have fired");
        match &env.contents {
            envelope::Contents::Confirmation(c) => assert_eq!(c.confirm, "req-1"),
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn handler_errors_are_carried_into_the_confirmation() {
        let broker = InProcessBroker::new();
        let push = broker.pusher_half();
        let mut sub = Subscriber::new(broker.subscriber_half());

        sub.on(
            Kind::Update,
            Box::new(|_| {
                let mut errors = HashMap::new();
                errors.insert("unknown.tag".to_string(), "point unknown".to_string());
                errors
            }),
        );

        let confirmed = Arc::new(Mutex::new(None));
        let confirmed2 = confirmed.clone();
        let handle = sub.start("RUNTIME".to_string(), "self".to_string(), move |env| {
            *confirmed2.lock().unwrap() = Some(env);
        });

        use crate::transport::PushTransport;
        let env = Envelope::update("peer", vec![Point::new("unknown.tag", 1.0, 1)], "", "req-2");
        push.send("RUNTIME", envelope::encode(&env)).unwrap();

        std::thread::sleep(Duration::from_millis(150));
        handle.stop();

        let confirmed = confirmed.lock().unwrap();
        let env = confirmed.as_ref().expect("confirmation should have fired");
        match &env.contents {
            envelope::Contents::Confirmation(c) => {
                assert_eq!(c.confirm, "req-2");
                assert_eq!(c.errors.get("unknown.tag").map(String::as_str), Some("point unknown"));
            }
            _ => panic!("wrong kind"),
        }
    }
}
