//! # ot-sim-61850::config
//!
//! Deserializes the 61850 module's configuration: one TCP endpoint plus a
//! list of FCDA-path points, named after the `iedModel_WTG_WTUR1_*` style
//! of accessor a generated IEC 61850 model header would expose, but
//! expressed as plain config instead of generated C accessors.

use serde::Deserialize;

use ot_sim_types::config::BusConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct TcpEndpoint {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    102
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointConfig {
    /// Dotted FCDA path, e.g. `"WTUR1.TurOp.ctlVal"`.
    pub path: String,
    pub tag: String,
    #[serde(default)]
    pub boolean: bool,
    #[serde(default)]
    pub deadband: f64,
    #[serde(default)]
    pub sbo: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    #[serde(default)]
    pub endpoint: Option<TcpEndpoint>,
    #[serde(default)]
    pub input: Vec<PointConfig>,
    #[serde(default)]
    pub output: Vec<PointConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Iec61850ModuleConfig {
    #[serde(default)]
    pub message_bus: BusConfig,
    #[serde(default)]
    pub ied61850: Vec<DeviceConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_with_control_and_measurement_points() {
        let yaml = r#"
ied61850:
  - name: "wtg-1"
    endpoint:
      host: "0.0.0.0"
    input:
      - path: "WTUR1.W.mag"
        tag: "gen.power"
        deadband: 0.5
    output:
      - path: "WTUR1.TurOp.ctlVal"
        tag: "turbine.op"
        boolean: true
        sbo: true
"#;
        let cfg: Iec61850ModuleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.ied61850[0].input[0].path, "WTUR1.W.mag");
        assert!(cfg.ied61850[0].output[0].sbo);
        assert_eq!(cfg.ied61850[0].endpoint.as_ref().unwrap().port, 102);
    }

    #[test]
    fn missing_device_list_defaults_empty() {
        let cfg: Iec61850ModuleConfig = serde_yaml::from_str("message_bus: {}").unwrap();
        assert!(cfg.ied61850.is_empty());
    }
}
