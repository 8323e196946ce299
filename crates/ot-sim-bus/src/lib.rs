//! # ot-sim-bus
//!
//! The message bus client (§4.2): envelope transport, the push/subscribe
//! client pair, and the metrics aggregator that rides on top of them.

#![forbid(unsafe_code)]

pub mod metrics;
pub mod pusher;
pub mod subscriber;
pub mod transport;

pub use metrics::MetricsAggregator;
pub use pusher::Pusher;
pub use subscriber::{Handler, Subscriber, SubscriberHandle};
pub use transport::{InProcessBroker, PushTransport, SubTransport};
