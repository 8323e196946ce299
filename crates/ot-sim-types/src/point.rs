//! # ot-sim-types::point
//!
//! The atomic unit of data carried between an adapter's protocol database
//! and the tag store: a named measurement with a value and a timestamp.
//! Booleans ride as 0.0/1.0, per the wire format.

use serde::{Deserialize, Serialize};

/// A tag is a textual identifier chosen by configuration; it is the logical
/// identity shared by every adapter that publishes or consumes it.
pub type Tag = String;

/// A single `(tag, value, timestamp)` measurement.
///
/// A timestamp of 0 means "unset". Timestamps are not required to be
/// monotonic: a store accepts updates last-write-wins by arrival, not by
/// timestamp ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub tag: Tag,
    pub value: f64,
    #[serde(default)]
    pub ts: u64,
}

impl Point {
    pub fn new(tag: impl Into<Tag>, value: f64, ts: u64) -> Self {
        Self { tag: tag.into(), value, ts }
    }

    /// Interprets the point's value as a boolean (`value != 0.0`).
    pub fn as_bool(&self) -> bool {
        self.value != 0.0
    }

    pub fn from_bool(tag: impl Into<Tag>, value: bool, ts: u64) -> Self {
        Self::new(tag, if value { 1.0 } else { 0.0 }, ts)
    }
}

/// Returns the current wall-clock time as milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
