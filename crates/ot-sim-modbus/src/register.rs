//! # ot-sim-modbus::register
//!
//! The four Modbus register banks (§4.9): coils and discrete inputs are
//! single-bit, holding and input registers are 16-bit words. Coils and
//! holding registers are master-writable; discrete and input registers are
//! not. Each writable bank tracks its own dirty-address set so write-through
//! from the bus and write detection from `reply()` don't double-report the
//! same cycle's change (§5 write-suppression).

use std::sync::Mutex;

use fxhash::FxHashMap;
use ot_sim_sdk::writesuppression::DirtySet;

/// A bank of `u16`-addressed values, generic over the bit-width Rust type
/// the bank actually stores (`bool` for coils/discretes, `u16` for the two
/// register banks).
pub struct RegisterBank<V> {
    values: Mutex<FxHashMap<u16, V>>,
    dirty: Option<DirtySet<u16>>,
}

impl<V: Copy> RegisterBank<V> {
    pub fn writable() -> Self {
        Self { values: Mutex::new(FxHashMap::default()), dirty: Some(DirtySet::new()) }
    }

    pub fn read_only() -> Self {
        Self { values: Mutex::new(FxHashMap::default()), dirty: None }
    }

    pub fn get(&self, address: u16) -> Option<V> {
        self.values.lock().expect("register bank lock poisoned").get(&address).copied()
    }

    /// Sets a value without touching the dirty set. Used for inbound field
    /// updates (bus Update → register) and for initial configuration.
    pub fn set(&self, address: u16, value: V) {
        self.values.lock().expect("register bank lock poisoned").insert(address, value);
    }

    /// Sets a value and marks the address dirty; used when a master write
    /// (`WRITE_SINGLE_COIL`/`WRITE_SINGLE_REGISTER`) lands through `reply()`.
    pub fn write(&self, address: u16, value: V) {
        self.set(address, value);
        if let Some(dirty) = &self.dirty {
            dirty.mark(address);
        }
    }

    pub fn is_dirty(&self, address: u16) -> bool {
        self.dirty.as_ref().map(|d| d.is_dirty(&address)).unwrap_or(false)
    }

    /// Write-through from the bus: only applied if the address isn't
    /// already dirty this cycle (§5: a protocol write and a bus-driven
    /// write landing in the same cycle must not stomp each other or
    /// double-report).
    pub fn register_update(&self, address: u16, value: V) -> bool {
        if self.is_dirty(address) {
            return false;
        }
        self.set(address, value);
        true
    }

    /// Drains this cycle's dirty addresses, returning their current values.
    pub fn drain_dirty(&self) -> Vec<(u16, V)> {
        let Some(dirty) = &self.dirty else { return Vec::new() };
        let addrs = dirty.drain();
        let values = self.values.lock().expect("register bank lock poisoned");
        addrs.into_iter().filter_map(|a| values.get(&a).map(|v| (a, *v))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_marks_dirty_and_updates_value() {
        let bank: RegisterBank<bool> = RegisterBank::writable();
        bank.write(3, true);
        assert_eq!(bank.get(3), Some(true));
        assert!(bank.is_dirty(3));
    }

    #[test]
    fn bus_write_through_suppressed_once_dirty_this_cycle() {
        let bank: RegisterBank<u16> = RegisterBank::writable();
        bank.write(5, 100); // protocol-side write this cycle
        assert!(!bank.register_update(5, 200)); // bus write-through suppressed
        assert_eq!(bank.get(5), Some(100));
    }

    #[test]
    fn bus_write_through_applies_when_not_dirty() {
        let bank: RegisterBank<u16> = RegisterBank::writable();
        assert!(bank.register_update(5, 200));
        assert_eq!(bank.get(5), Some(200));
    }

    #[test]
    fn drain_dirty_clears_the_set() {
        let bank: RegisterBank<bool> = RegisterBank::writable();
        bank.write(1, true);
        bank.write(2, false);
        let mut drained = bank.drain_dirty();
        drained.sort_by_key(|(a, _)| *a);
        assert_eq!(drained, vec![(1, true), (2, false)]);
        assert!(bank.drain_dirty().is_empty());
    }

    #[test]
    fn read_only_bank_never_reports_dirty() {
        let bank: RegisterBank<bool> = RegisterBank::read_only();
        bank.set(1, true);
        assert!(!bank.is_dirty(1));
        assert!(bank.drain_dirty().is_empty());
    }
}
