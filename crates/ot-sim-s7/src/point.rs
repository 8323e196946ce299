//! # ot-sim-s7::point
//!
//! Per-point S7 configuration: a data area, byte/bit offset, width, and SBO
//! flag, addressed by `area`/`byte`/`bit` rather than a flat register
//! number, to match how S7comm actually lays out its memory areas.

use ot_sim_sdk::registry::PointDef;
use serde::{Deserialize, Serialize};

/// S7 memory areas: data blocks, flag/merker memory, process inputs,
/// process outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataArea {
    /// A numbered data block (`DB<n>`).
    Db(u16),
    M,
    I,
    Q,
}

/// A single addressable cell: area, byte offset, and — for bit-width
/// points — a bit offset within that byte. Word/dword-width points ignore
/// `bit_offset` (always addressed at the byte boundary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub area: DataArea,
    pub byte_offset: u32,
    #[serde(default)]
    pub bit_offset: u8,
}

fn default_width() -> u8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S7PointDef {
    pub tag: String,
    /// Bit width: 1 for a single bit, 16 for a word, 32 for a dword/float.
    #[serde(default = "default_width")]
    pub width: u8,
    #[serde(default)]
    pub deadband: f64,
    #[serde(default)]
    pub sbo: bool,
}

impl S7PointDef {
    pub fn is_bit(&self) -> bool {
        self.width == 1
    }
}

impl PointDef for S7PointDef {
    fn tag(&self) -> &str {
        &self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_one_is_bit_addressed() {
        let def = S7PointDef { tag: "x".into(), width: 1, deadband: 0.0, sbo: false };
        assert!(def.is_bit());
    }

    #[test]
    fn width_thirty_two_is_not_bit_addressed() {
        let def = S7PointDef { tag: "x".into(), width: 32, deadband: 0.0, sbo: false };
        assert!(!def.is_bit());
    }
}
