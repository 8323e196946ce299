//! # ot-sim-s7::register
//!
//! A `RegisterBank` addressed by S7 `Address` (area/byte/bit) rather than a
//! flat `u16` — the S7 analogue of `ot-sim-modbus::register::RegisterBank`,
//! sharing the same dirty-set write-suppression shape but over the richer
//! S7 key.

use std::sync::Mutex;

use fxhash::FxHashMap;
use ot_sim_sdk::writesuppression::DirtySet;

use crate::point::Address;

pub struct RegisterBank<V> {
    values: Mutex<FxHashMap<Address, V>>,
    dirty: DirtySet<Address>,
}

impl<V: Copy> Default for RegisterBank<V> {
    fn default() -> Self {
        Self { values: Mutex::new(FxHashMap::default()), dirty: DirtySet::new() }
    }
}

impl<V: Copy> RegisterBank<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: Address) -> Option<V> {
        self.values.lock().expect("register bank lock poisoned").get(&address).copied()
    }

    pub fn set(&self, address: Address, value: V) {
        self.values.lock().expect("register bank lock poisoned").insert(address, value);
    }

    /// A write originating from the protocol side (an S7 client's write
    /// request): applies the value and marks the address dirty for this
    /// cycle.
    pub fn write(&self, address: Address, value: V) {
        self.set(address, value);
        self.dirty.mark(address);
    }

    pub fn is_dirty(&self, address: Address) -> bool {
        self.dirty.is_dirty(&address)
    }

    /// Bus-side write-through, suppressed if the address is already dirty
    /// from a protocol-side write this cycle.
    pub fn register_update(&self, address: Address, value: V) -> bool {
        if self.is_dirty(address) {
            return false;
        }
        self.set(address, value);
        true
    }

    pub fn drain_dirty(&self) -> Vec<(Address, V)> {
        let addrs = self.dirty.drain();
        let values = self.values.lock().expect("register bank lock poisoned");
        addrs.into_iter().filter_map(|a| values.get(&a).map(|v| (a, *v))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::DataArea;

    fn addr(byte: u32, bit: u8) -> Address {
        Address { area: DataArea::Db(1), byte_offset: byte, bit_offset: bit }
    }

    #[test]
    fn write_marks_dirty() {
        let bank: RegisterBank<bool> = RegisterBank::new();
        bank.write(addr(0, 2), true);
        assert_eq!(bank.get(addr(0, 2)), Some(true));
        assert!(bank.is_dirty(addr(0, 2)));
    }

    #[test]
    fn bus_write_through_suppressed_by_same_cycle_protocol_write() {
        let bank: RegisterBank<f64> = RegisterBank::new();
        bank.write(addr(4, 0), 1.5);
        assert!(!bank.register_update(addr(4, 0), 9.9));
        assert_eq!(bank.get(addr(4, 0)), Some(1.5));
    }
}
