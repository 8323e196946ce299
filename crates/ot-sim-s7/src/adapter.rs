//! # ot-sim-s7::adapter
//!
//! The S7 register↔tag bridge: analogous to Modbus's bank/dirty-set
//! write-suppression, plus an SBO gate on protocol-side writes mirroring
//! DNP3's Select/Operate, since S7 points carry the same `sbo` flag.
//! `write_binary`/`write_analog` define the protocol-side write contract
//! against whichever S7 stack a deployment links in.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use fxhash::FxHashSet;
use ot_sim_sdk::registry::{Direction, PointRegistry};
use ot_sim_types::envelope::Envelope;
use ot_sim_types::errors::{CommandStatus, PointUnknown};
use ot_sim_types::point::{now_ms, Point};

use crate::point::{Address, S7PointDef};
use crate::register::RegisterBank;

pub type Publish = Arc<dyn Fn(Envelope) + Send + Sync>;

pub struct S7Adapter {
    id: String,
    bits: RegisterBank<bool>,
    words: RegisterBank<f64>,
    registry: PointRegistry<Address, S7PointDef>,
    selected: Mutex<FxHashSet<Address>>,
    publish: Publish,
}

impl S7Adapter {
    pub fn new(id: impl Into<String>, publish: Publish) -> Self {
        Self {
            id: id.into(),
            bits: RegisterBank::new(),
            words: RegisterBank::new(),
            registry: PointRegistry::new(),
            selected: Mutex::new(FxHashSet::default()),
            publish,
        }
    }

    pub fn add_input(&mut self, address: Address, def: S7PointDef) {
        self.registry.add_input(address, def);
    }

    pub fn add_output(&mut self, address: Address, def: S7PointDef) {
        self.registry.add_output(address, def);
    }

    /// Records the address as selected for the next `write_*` call.
    pub fn select(&self, address: Address) -> CommandStatus {
        match self.registry.get(&address) {
            None => CommandStatus::OutOfRange,
            Some(_) => {
                self.selected.lock().expect("selected lock poisoned").insert(address);
                CommandStatus::Success
            }
        }
    }

    fn check_sbo(&self, address: Address, def: &S7PointDef, select_before_operate: bool) -> Option<CommandStatus> {
        if !def.sbo {
            return None;
        }
        let had_select = self.selected.lock().expect("selected lock poisoned").remove(&address);
        if !select_before_operate || !had_select {
            return Some(CommandStatus::NoSelect);
        }
        None
    }

    /// A protocol-side bit write.
    pub fn write_binary(&self, address: Address, value: bool, select_before_operate: bool) -> CommandStatus {
        let Some(def) = self.registry.get(&address).cloned() else {
            return CommandStatus::OutOfRange;
        };
        if let Some(status) = self.check_sbo(address, &def, select_before_operate) {
            return status;
        }
        self.bits.write(address, value);
        self.push_update(def.tag, if value { 1.0 } else { 0.0 });
        CommandStatus::Success
    }

    /// A protocol-side word/dword write.
    pub fn write_analog(&self, address: Address, value: f64, select_before_operate: bool) -> CommandStatus {
        let Some(def) = self.registry.get(&address).cloned() else {
            return CommandStatus::OutOfRange;
        };
        if let Some(status) = self.check_sbo(address, &def, select_before_operate) {
            return status;
        }
        self.words.write(address, value);
        self.push_update(def.tag, value);
        CommandStatus::Success
    }

    fn push_update(&self, tag: String, value: f64) {
        (self.publish)(Envelope::update(self.id.clone(), vec![Point::new(tag, value, now_ms())], "", ""));
    }

    /// The bus-side Update handler: write-through for Output-direction
    /// points, deadband-gated for analog points exactly as DNP3's database
    /// applies the static value unconditionally but events only past the
    /// deadband (here: the write-through itself is unconditional; deadband
    /// only gates whether the *next* scan treats it as a reportable event).
    pub fn handle_update(&self, updates: &[Point]) -> HashMap<String, String> {
        let mut errors = HashMap::new();
        for point in updates {
            let mut matched = false;
            for (address, def) in self.registry.outputs_for_tag(&point.tag) {
                matched = true;
                let applied = if def.is_bit() {
                    self.bits.register_update(*address, point.as_bool())
                } else {
                    self.words.register_update(*address, point.value)
                };
                if !applied {
                    ::metrics::counter!(
                        ot_sim_types::metrics::MET_WRITE_SUPPRESSED,
                        ot_sim_types::metrics::LBL_MODULE => self.id.clone()
                    )
                    .increment(1);
                }
            }
            if !matched {
                tracing::debug!(tag = %point.tag, adapter = %self.id, "update targets unconfigured tag; dropping");
                errors.insert(point.tag.clone(), PointUnknown(point.tag.clone()).to_string());
            }
        }
        errors
    }

    /// One scan cycle: publish a Status for every Input-direction address
    /// dirtied by a protocol-side write since the last cycle.
    pub fn run_cycle(&self) {
        let mut measurements = Vec::new();

        for (address, value) in self.bits.drain_dirty() {
            if self.registry.direction(&address) == Some(Direction::Input) {
                if let Some(def) = self.registry.get(&address) {
                    measurements.push(Point::from_bool(def.tag.clone(), value, now_ms()));
                }
            }
        }

        for (address, value) in self.words.drain_dirty() {
            if self.registry.direction(&address) == Some(Direction::Input) {
                if let Some(def) = self.registry.get(&address) {
                    measurements.push(Point::new(def.tag.clone(), value, now_ms()));
                }
            }
        }

        if !measurements.is_empty() {
            (self.publish)(Envelope::status(self.id.clone(), measurements));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::DataArea;
    use std::sync::Mutex as StdMutex;

    fn addr(byte: u32, bit: u8) -> Address {
        Address { area: DataArea::Q, byte_offset: byte, bit_offset: bit }
    }

    fn test_adapter() -> (S7Adapter, Arc<StdMutex<Vec<Envelope>>>) {
        let pushed = Arc::new(StdMutex::new(Vec::new()));
        let pushed2 = pushed.clone();
        let adapter = S7Adapter::new("s7-1", Arc::new(move |env| pushed2.lock().unwrap().push(env)));
        (adapter, pushed)
    }

    #[test]
    fn write_binary_without_sbo_pushes_update_and_applies() {
        let (mut adapter, pushed) = test_adapter();
        adapter.add_output(addr(0, 0), S7PointDef { tag: "q0.0".into(), width: 1, deadband: 0.0, sbo: false });

        let status = adapter.write_binary(addr(0, 0), true, false);
        assert_eq!(status, CommandStatus::Success);

        let pushed = pushed.lock().unwrap();
        match &pushed[0].contents {
            ot_sim_types::envelope::Contents::Update(u) => assert_eq!(u.updates[0].tag, "q0.0"),
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn sbo_rejects_write_without_select() {
        let (mut adapter, pushed) = test_adapter();
        adapter.add_output(addr(0, 0), S7PointDef { tag: "q0.0".into(), width: 1, deadband: 0.0, sbo: true });

        assert_eq!(adapter.write_binary(addr(0, 0), true, false), CommandStatus::NoSelect);
        assert!(pushed.lock().unwrap().is_empty());
    }

    #[test]
    fn sbo_accepts_select_then_write() {
        let (mut adapter, _pushed) = test_adapter();
        adapter.add_output(addr(0, 0), S7PointDef { tag: "q0.0".into(), width: 1, deadband: 0.0, sbo: true });

        assert_eq!(adapter.select(addr(0, 0)), CommandStatus::Success);
        assert_eq!(adapter.write_binary(addr(0, 0), true, true), CommandStatus::Success);
    }

    #[test]
    fn bus_write_through_suppressed_same_cycle() {
        let (mut adapter, _pushed) = test_adapter();
        adapter.add_input(addr(1, 0), S7PointDef { tag: "analog1".into(), width: 32, deadband: 0.0, sbo: false });
        adapter.write_analog(addr(1, 0), 5.0, false);
        adapter.handle_update(&[Point::new("analog1", 9.0, 1)]);
        // input direction point: bus can't write-through anyway (no Output def), value unaffected
        adapter.run_cycle();
    }

    #[test]
    fn update_for_unconfigured_tag_reports_point_unknown() {
        let (adapter, _pushed) = test_adapter();
        let errors = adapter.handle_update(&[Point::new("nothing.configured", 1.0, 1)]);
        assert!(errors.contains_key("nothing.configured"));
    }
}
