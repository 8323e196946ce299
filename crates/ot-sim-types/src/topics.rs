//! # ot-sim-types::topics
//!
//! Well-known message-bus topic names. Centralized so adapters and the bus
//! layer agree on them without string literals scattered across crates.

/// Status, Update, and Confirmation envelopes travel on this topic.
pub const RUNTIME: &str = "RUNTIME";

/// Metrics envelopes travel on this topic.
pub const HEALTH: &str = "HEALTH";
