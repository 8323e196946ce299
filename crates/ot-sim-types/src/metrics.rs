//! # ot-sim-types::metrics
//!
//! Name and label constants for the `metrics` crate counters emitted across
//! the workspace (bus drops, malformed envelopes, write suppressions).
//! Centralized here so the emitting site and any consumer agree on spelling.
//! Distinct from [`crate::envelope::Contents::Metric`], the bus-carried
//! module health sample a deployment's own `MetricsAggregator` publishes.

// --- Metric names ---
pub const MET_BUS_ENVELOPE_DROPPED: &str = "ot_sim_bus_envelope_dropped_total";
pub const MET_BUS_SEND_OVERFLOW: &str = "ot_sim_bus_send_overflow_total";
pub const MET_WRITE_SUPPRESSED: &str = "ot_sim_write_suppressed_total";

// --- Label keys ---
pub const LBL_REASON: &str = "reason";
pub const LBL_TOPIC: &str = "topic";
pub const LBL_MODULE: &str = "module";
