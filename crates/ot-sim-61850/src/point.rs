//! # ot-sim-61850::point
//!
//! Maps a tag to a model attribute path. Mirrors `ot-sim-s7::point`'s
//! `PointDef` shape but keyed by the dotted FCDA path instead of a byte
//! address.

use serde::{Deserialize, Serialize};

use ot_sim_sdk::registry::PointDef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iec61850PointDef {
    pub tag: String,
    /// True for boolean-valued attributes (`Beh.stVal`, `TurOp.ctlVal` on a
    /// double-command node); false for analog ones (`W.mag`, `TotWh.actVal`).
    #[serde(default)]
    pub boolean: bool,
    #[serde(default)]
    pub deadband: f64,
    /// Whether this attribute sits under an `Oper` control block and
    /// therefore goes through select-before-operate, as DNP3 does.
    #[serde(default)]
    pub sbo: bool,
}

impl PointDef for Iec61850PointDef {
    fn tag(&self) -> &str {
        &self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_analog_non_sbo() {
        let def = Iec61850PointDef { tag: "gen.power".into(), boolean: false, deadband: 0.0, sbo: false };
        assert!(!def.boolean);
        assert!(!def.sbo);
    }
}
