//! # ot-sim-modbus::adapter
//!
//! Ties the four `RegisterBank`s to the generic `PointRegistry` and the
//! bus write-suppression rule: a point's `Direction` decides whether it is
//! reported up as Status when a master writes it (`Input`) or written
//! through from a bus Update (`Output`); either way, the owning
//! `RegisterBank`'s dirty set is what keeps a write-through from
//! immediately bouncing back out as a Status in the same cycle.

use std::collections::HashMap;
use std::sync::Arc;

use ot_sim_sdk::registry::{Direction, PointRegistry};
use ot_sim_types::envelope::Envelope;
use ot_sim_types::errors::PointUnknown;
use ot_sim_types::point::{now_ms, Point};

use crate::point::{Bank, BankAddress, ModbusPointDef};
use crate::register::RegisterBank;

pub type Publish = Arc<dyn Fn(Envelope) + Send + Sync>;

/// A master-issued write landing through `reply()`: function codes
/// `WRITE_SINGLE_COIL`/`WRITE_SINGLE_REGISTER` only — Modbus has no
/// multi-bit/multi-register write primitive in this simulator's scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProtocolWrite {
    Coil { address: u16, value: bool },
    HoldingRegister { address: u16, value: u16 },
}

pub struct ModbusAdapter {
    id: String,
    coils: RegisterBank<bool>,
    discretes: RegisterBank<bool>,
    holdings: RegisterBank<u16>,
    inputs: RegisterBank<u16>,
    registry: PointRegistry<BankAddress, ModbusPointDef>,
    publish: Publish,
}

impl ModbusAdapter {
    pub fn new(id: impl Into<String>, publish: Publish) -> Self {
        Self {
            id: id.into(),
            coils: RegisterBank::writable(),
            discretes: RegisterBank::read_only(),
            holdings: RegisterBank::writable(),
            inputs: RegisterBank::read_only(),
            registry: PointRegistry::new(),
            publish,
        }
    }

    pub fn add_input(&mut self, address: u16, def: ModbusPointDef) {
        self.registry.add_input((def.bank, address), def);
    }

    pub fn add_output(&mut self, address: u16, def: ModbusPointDef) {
        self.registry.add_output((def.bank, address), def);
    }

    fn bit_bank(&self, bank: Bank) -> Option<&RegisterBank<bool>> {
        match bank {
            Bank::Coils => Some(&self.coils),
            Bank::DiscreteInputs => Some(&self.discretes),
            _ => None,
        }
    }

    fn word_bank(&self, bank: Bank) -> Option<&RegisterBank<u16>> {
        match bank {
            Bank::HoldingRegisters => Some(&self.holdings),
            Bank::InputRegisters => Some(&self.inputs),
            _ => None,
        }
    }

    /// `reply()`: applies a master's write directly and marks the
    /// address dirty. Called from the (external) Modbus stack's
    /// request-reply path after it has already detected a
    /// `WRITE_SINGLE_COIL`/`WRITE_SINGLE_REGISTER` function code.
    pub fn record_protocol_write(&self, write: ProtocolWrite) {
        match write {
            ProtocolWrite::Coil { address, value } => self.coils.write(address, value),
            ProtocolWrite::HoldingRegister { address, value } => self.holdings.write(address, value),
        }
    }

    /// The bus-side Update handler (§4.9): write-through `register_update`
    /// for every point whose tag matches a configured Output definition,
    /// scaled from the tag's float value into the register's native type.
    /// Suppressed per-address for a cycle already dirtied by a protocol
    /// write (§5 write-suppression), per `RegisterBank::register_update`.
    pub fn handle_update(&self, updates: &[Point]) -> HashMap<String, String> {
        let mut errors = HashMap::new();
        for point in updates {
            let mut matched = false;
            for ((bank, address), def) in self.registry.outputs_for_tag(&point.tag) {
                matched = true;
                let applied = if bank.is_bit() {
                    self.bit_bank(*bank).map(|b| b.register_update(*address, point.as_bool()))
                } else {
                    self.word_bank(*bank).map(|b| {
                        let raw = (point.value / def.scale).round() as u16;
                        b.register_update(*address, raw)
                    })
                };
                if applied == Some(false) {
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

    /// One scan cycle (§4.9): for every Input-direction point whose
    /// `(bank, address)` is dirty, publish a Status envelope, then clear
    /// that bank's dirty set.
    pub fn run_cycle(&self) {
        let mut measurements = Vec::new();

        for (bank, bank_ref) in [(Bank::Coils, Some(&self.coils)), (Bank::DiscreteInputs, Some(&self.discretes))]
            .into_iter()
            .filter_map(|(b, r)| r.map(|r| (b, r)))
        {
            for (address, value) in bank_ref.drain_dirty() {
                if let Some(def) = self.registry.get(&(bank, address)) {
                    if self.registry.direction(&(bank, address)) == Some(Direction::Input) {
                        measurements.push(Point::from_bool(def.tag.clone(), value, now_ms()));
                    }
                }
            }
        }

        for (bank, bank_ref) in
            [(Bank::HoldingRegisters, Some(&self.holdings)), (Bank::InputRegisters, Some(&self.inputs))]
                .into_iter()
                .filter_map(|(b, r)| r.map(|r| (b, r)))
        {
            for (address, raw) in bank_ref.drain_dirty() {
                if let Some(def) = self.registry.get(&(bank, address)) {
                    if self.registry.direction(&(bank, address)) == Some(Direction::Input) {
                        measurements.push(Point::new(def.tag.clone(), raw as f64 * def.scale, now_ms()));
                    }
                }
            }
        }

        if !measurements.is_empty() {
            (self.publish)(Envelope::status(self.id.clone(), measurements));
        }
    }

    pub fn coil(&self, address: u16) -> Option<bool> {
        self.coils.get(address)
    }

    pub fn holding(&self, address: u16) -> Option<u16> {
        self.holdings.get(address)
    }

    pub fn discrete(&self, address: u16) -> Option<bool> {
        self.discretes.get(address)
    }

    pub fn input_register(&self, address: u16) -> Option<u16> {
        self.inputs.get(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn test_adapter() -> (ModbusAdapter, Arc<Mutex<Vec<Envelope>>>) {
        let pushed = Arc::new(Mutex::new(Vec::new()));
        let pushed2 = pushed.clone();
        let adapter = ModbusAdapter::new("modbus-1", Arc::new(move |env| pushed2.lock().unwrap().push(env)));
        (adapter, pushed)
    }

    #[test]
    fn master_write_reported_as_status_next_cycle() {
        let (adapter, pushed) = test_adapter();
        adapter.add_input(5, ModbusPointDef { tag: "coil5".into(), bank: Bank::Coils, scale: 1.0 });

        adapter.record_protocol_write(ProtocolWrite::Coil { address: 5, value: true });
        adapter.run_cycle();

        let pushed = pushed.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        match &pushed[0].contents {
            ot_sim_types::envelope::Contents::Status(s) => {
                assert_eq!(s.measurements[0].tag, "coil5");
                assert_eq!(s.measurements[0].value, 1.0);
            }
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn bus_update_write_through_suppressed_by_same_cycle_protocol_write() {
        let (adapter, _pushed) = test_adapter();
        adapter.add_output(5, ModbusPointDef { tag: "coil5".into(), bank: Bank::Coils, scale: 1.0 });

        adapter.record_protocol_write(ProtocolWrite::Coil { address: 5, value: true });
        adapter.handle_update(&[Point::new("coil5", 0.0, 1)]);

        assert_eq!(adapter.coil(5), Some(true)); // bus write-through suppressed this cycle
    }

    #[test]
    fn bus_update_applies_when_address_not_dirty() {
        let (adapter, _pushed) = test_adapter();
        adapter.add_output(10, ModbusPointDef { tag: "holding10".into(), bank: Bank::HoldingRegisters, scale: 0.1 });

        let errors = adapter.handle_update(&[Point::new("holding10", 4.2, 1)]);
        assert_eq!(adapter.holding(10), Some(42));
        assert!(errors.is_empty());
    }

    #[test]
    fn update_for_unconfigured_tag_reports_point_unknown() {
        let (adapter, _pushed) = test_adapter();
        let errors = adapter.handle_update(&[Point::new("nothing.configured", 1.0, 1)]);
        assert!(errors.contains_key("nothing.configured"));
    }

    #[test]
    fn read_only_bank_never_reports_status_without_bus_write() {
        let (adapter, pushed) = test_adapter();
        adapter.add_output(0, ModbusPointDef { tag: "input0".into(), bank: Bank::InputRegisters, scale: 1.0 });
        adapter.run_cycle();
        assert!(pushed.lock().unwrap().is_empty());
    }

    #[test]
    fn output_direction_point_never_published_even_if_bank_marked_dirty() {
        let (adapter, pushed) = test_adapter();
        adapter.add_output(7, ModbusPointDef { tag: "coil7".into(), bank: Bank::Coils, scale: 1.0 });
        adapter.record_protocol_write(ProtocolWrite::Coil { address: 7, value: true });
        adapter.run_cycle();
        assert!(pushed.lock().unwrap().is_empty());
    }
}
