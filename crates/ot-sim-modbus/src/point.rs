//! # ot-sim-modbus::point
//!
//! Per-point Modbus configuration: which of the four register banks the
//! point lives in, its 16-bit address, and an optional scale factor
//! applied between the register's raw integer and the tag's
//! floating-point value (defaults to 1.0).

use ot_sim_sdk::registry::PointDef;
use serde::{Deserialize, Serialize};

/// The four Modbus register banks. Coils and discrete inputs are
/// single-bit; holding and input registers are 16-bit words. Coils and
/// holding registers are master-writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bank {
    Coils,
    DiscreteInputs,
    HoldingRegisters,
    InputRegisters,
}

impl Bank {
    pub fn is_writable(self) -> bool {
        matches!(self, Bank::Coils | Bank::HoldingRegisters)
    }

    pub fn is_bit(self) -> bool {
        matches!(self, Bank::Coils | Bank::DiscreteInputs)
    }
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModbusPointDef {
    pub tag: String,
    pub bank: Bank,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl PointDef for ModbusPointDef {
    fn tag(&self) -> &str {
        &self.tag
    }
}

/// `(bank, address)`: within one adapter, each pair maps to at most one
/// point definition.
pub type BankAddress = (Bank, u16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coils_and_holdings_are_writable() {
        assert!(Bank::Coils.is_writable());
        assert!(Bank::HoldingRegisters.is_writable());
        assert!(!Bank::DiscreteInputs.is_writable());
        assert!(!Bank::InputRegisters.is_writable());
    }
}
