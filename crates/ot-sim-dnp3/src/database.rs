//! # ot-sim-dnp3::database
//!
//! The DNP3-style static database (§4.6): binary inputs, analog inputs,
//! binary output status, and analog output status, each keyed by a 16-bit
//! index. Values are applied in a batch once per scan cycle; analog inputs
//! additionally track the last-*reported* value for deadband filtering
//! (the static value itself always updates, per §4.6/§8).

use std::sync::Mutex;

use fxhash::FxHashMap;
use ot_sim_sdk::registry::PointRegistry;

use crate::point::{AnalogPointDef, BinaryPointDef};

/// A single accepted value update, batched for one scan cycle's Apply.
#[derive(Debug, Clone, Copy)]
pub struct BinaryUpdate {
    pub index: u16,
    pub value: bool,
    pub ts: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct AnalogUpdate {
    pub index: u16,
    pub value: f64,
    pub ts: u64,
    /// Whether this update also crossed the deadband and must be reported
    /// as an event (not merely a static value change).
    pub is_event: bool,
}

/// The four point registries plus the live static values the scan loop
/// reads and writes.
pub struct Database {
    pub binary_inputs: PointRegistry<u16, BinaryPointDef>,
    pub analog_inputs: PointRegistry<u16, AnalogPointDef>,
    pub binary_output_status: PointRegistry<u16, BinaryPointDef>,
    pub analog_output_status: PointRegistry<u16, AnalogPointDef>,

    binary_input_values: Mutex<FxHashMap<u16, bool>>,
    analog_input_values: Mutex<FxHashMap<u16, f64>>,
    analog_input_last_reported: Mutex<FxHashMap<u16, f64>>,
    binary_output_values: Mutex<FxHashMap<u16, bool>>,
    analog_output_values: Mutex<FxHashMap<u16, f64>>,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            binary_inputs: PointRegistry::new(),
            analog_inputs: PointRegistry::new(),
            binary_output_status: PointRegistry::new(),
            analog_output_status: PointRegistry::new(),
            binary_input_values: Mutex::new(FxHashMap::default()),
            analog_input_values: Mutex::new(FxHashMap::default()),
            analog_input_last_reported: Mutex::new(FxHashMap::default()),
            binary_output_values: Mutex::new(FxHashMap::default()),
            analog_output_values: Mutex::new(FxHashMap::default()),
        }
    }
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_binary_input(&mut self, index: u16, def: BinaryPointDef) {
        self.binary_inputs.add_input(index, def);
    }

    pub fn add_analog_input(&mut self, index: u16, def: AnalogPointDef) {
        self.analog_inputs.add_input(index, def);
    }

    pub fn add_binary_output(&mut self, index: u16, def: BinaryPointDef) {
        self.binary_output_status.add_output(index, def);
    }

    pub fn add_analog_output(&mut self, index: u16, def: AnalogPointDef) {
        self.analog_output_status.add_output(index, def);
    }

    pub fn binary_output_status_value(&self, index: u16) -> Option<bool> {
        self.binary_output_values.lock().expect("db lock poisoned").get(&index).copied()
    }

    pub fn analog_output_status_value(&self, index: u16) -> Option<f64> {
        self.analog_output_values.lock().expect("db lock poisoned").get(&index).copied()
    }

    pub fn binary_input_value(&self, index: u16) -> Option<bool> {
        self.binary_input_values.lock().expect("db lock poisoned").get(&index).copied()
    }

    pub fn analog_input_value(&self, index: u16) -> Option<f64> {
        self.analog_input_values.lock().expect("db lock poisoned").get(&index).copied()
    }

    /// Stages a binary input value; the static value always updates
    /// unconditionally (binary points have no deadband concept).
    pub fn stage_binary_input(&self, index: u16, value: bool) {
        self.binary_input_values.lock().expect("db lock poisoned").insert(index, value);
    }

    pub fn stage_binary_output(&self, index: u16, value: bool) {
        self.binary_output_values.lock().expect("db lock poisoned").insert(index, value);
    }

    pub fn stage_analog_output(&self, index: u16, value: f64) {
        self.analog_output_values.lock().expect("db lock poisoned").insert(index, value);
    }

    /// Stages an analog input value. Returns `true` if this update should
    /// be reported as an *event* — the configured deadband was exceeded
    /// relative to the last *reported* value. The static value is updated
    /// unconditionally regardless of the return value (§4.6, §8).
    pub fn stage_analog_input(&self, index: u16, value: f64, deadband: f64) -> bool {
        self.analog_input_values.lock().expect("db lock poisoned").insert(index, value);

        let mut last = self.analog_input_last_reported.lock().expect("db lock poisoned");
        let is_event = match last.get(&index) {
            None => true, // first observation is always reported
            Some(&prev) => (value - prev).abs() >= deadband,
        };
        if is_event {
            last.insert(index, value);
        }
        is_event
    }

    pub fn all_output_indices(&self) -> Vec<(u16, bool)> {
        let mut out = Vec::new();
        for (idx, _, _) in self.binary_output_status.iter() {
            out.push((*idx, true));
        }
        for (idx, _, _) in self.analog_output_status.iter() {
            out.push((*idx, false));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadband_sequence_reports_three_events() {
        let db = Database::new();
        let deadband = 0.5;
        let sequence = [10.0, 10.2, 10.6, 10.7, 11.3];
        let mut reported = Vec::new();
        for v in sequence {
            if db.stage_analog_input(0, v, deadband) {
                reported.push(v);
            }
        }
        assert_eq!(reported, vec![10.0, 10.6, 11.3]);
        // static value always reflects the latest observation regardless of suppression
        assert_eq!(db.analog_input_value(0), Some(11.3));
    }

    #[test]
    fn binary_input_has_no_deadband_concept() {
        let db = Database::new();
        db.stage_binary_input(5, true);
        assert_eq!(db.binary_input_value(5), Some(true));
        db.stage_binary_input(5, false);
        assert_eq!(db.binary_input_value(5), Some(false));
    }
}
