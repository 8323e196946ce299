//! # ot-sim-61850::adapter
//!
//! Bridges tags to IEC 61850 model attributes: `operate()` is the
//! `Oper`/`ctlVal` control path from an MMS client, gated by select-before-
//! operate exactly as DNP3's outstation gates `Operate` on a prior
//! `Select`; the bus-side `handle_update` write-through and
//! deadband-filtered `run_cycle` scan follow the same shape as the other
//! three adapters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use fxhash::{FxHashMap, FxHashSet};
use ot_sim_sdk::registry::{Direction, PointRegistry};
use ot_sim_sdk::writesuppression::DirtySet;
use ot_sim_types::envelope::Envelope;
use ot_sim_types::errors::{CommandStatus, PointUnknown};
use ot_sim_types::point::{now_ms, Point};

use crate::model::LogicalDevice;
use crate::point::Iec61850PointDef;

pub type Publish = Arc<dyn Fn(Envelope) + Send + Sync>;

pub struct Iec61850Adapter {
    id: String,
    model: LogicalDevice,
    registry: PointRegistry<String, Iec61850PointDef>,
    dirty: DirtySet<String>,
    selected: Mutex<FxHashSet<String>>,
    last_reported: Mutex<FxHashMap<String, f64>>,
    publish: Publish,
}

impl Iec61850Adapter {
    pub fn new(id: impl Into<String>, publish: Publish) -> Self {
        Self {
            id: id.into(),
            model: LogicalDevice::new(),
            registry: PointRegistry::new(),
            dirty: DirtySet::new(),
            selected: Mutex::new(FxHashSet::default()),
            last_reported: Mutex::new(FxHashMap::default()),
            publish,
        }
    }

    pub fn add_input(&mut self, path: impl Into<String>, def: Iec61850PointDef) {
        self.registry.add_input(path.into(), def);
    }

    pub fn add_output(&mut self, path: impl Into<String>, def: Iec61850PointDef) {
        self.registry.add_output(path.into(), def);
    }

    /// `Select` on a controllable data object: records the path as selected
    /// for the next `operate()` call.
    pub fn select(&self, path: &str) -> CommandStatus {
        match self.registry.get(&path.to_string()) {
            None => CommandStatus::OutOfRange,
            Some(_) => {
                self.selected.lock().expect("selected lock poisoned").insert(path.to_string());
                CommandStatus::Success
            }
        }
    }

    /// `Oper` with `ctlVal`: the protocol-side control write. Maps to an
    /// Update envelope on the bus, the same way DNP3's
    /// `DirectOperate`/`SelectAndOperate` push a control as an Update.
    pub fn operate(&self, path: &str, value: f64, select_before_operate: bool) -> CommandStatus {
        let Some(def) = self.registry.get(&path.to_string()).cloned() else {
            return CommandStatus::OutOfRange;
        };
        if def.sbo {
            let had_select = self.selected.lock().expect("selected lock poisoned").remove(path);
            if !select_before_operate || !had_select {
                return CommandStatus::NoSelect;
            }
        }
        self.model.set(path, value);
        self.dirty.mark(path.to_string());
        (self.publish)(Envelope::update(self.id.clone(), vec![Point::new(def.tag, value, now_ms())], "", ""));
        CommandStatus::Success
    }

    /// The bus-side Update handler: write-through for Output-direction
    /// attributes, suppressed for the rest of this cycle if `operate()`
    /// already wrote that path.
    pub fn handle_update(&self, updates: &[Point]) -> HashMap<String, String> {
        let mut errors = HashMap::new();
        for point in updates {
            let mut matched = false;
            for (path, _def) in self.registry.outputs_for_tag(&point.tag) {
                matched = true;
                if self.dirty.is_dirty(path) {
                    ::metrics::counter!(
                        ot_sim_types::metrics::MET_WRITE_SUPPRESSED,
                        ot_sim_types::metrics::LBL_MODULE => self.id.clone()
                    )
                    .increment(1);
                    continue;
                }
                self.model.set(path, point.value);
            }
            if !matched {
                tracing::debug!(tag = %point.tag, adapter = %self.id, "update targets unconfigured tag; dropping");
                errors.insert(point.tag.clone(), PointUnknown(point.tag.clone()).to_string());
            }
        }
        errors
    }

    /// One scan cycle: for every Input-direction attribute, report its
    /// static value and, past the configured deadband, an event too.
    pub fn run_cycle(&self) {
        let mut measurements = Vec::new();
        let mut last = self.last_reported.lock().expect("last-reported lock poisoned");

        for (path, dir, def) in self.registry.iter() {
            if dir != Direction::Input {
                continue;
            }
            let value = self.model.get(path).unwrap_or(0.0);
            let should_report = match last.get(path) {
                Some(prev) => (value - prev).abs() >= def.deadband,
                None => true,
            };
            if should_report {
                last.insert(path.clone(), value);
                measurements.push(if def.boolean {
                    Point::from_bool(def.tag.clone(), value != 0.0, now_ms())
                } else {
                    Point::new(def.tag.clone(), value, now_ms())
                });
            }
        }

        self.dirty.drain();

        if !measurements.is_empty() {
            (self.publish)(Envelope::status(self.id.clone(), measurements));
        }
    }
}
