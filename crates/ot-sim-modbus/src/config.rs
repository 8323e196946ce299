//! # ot-sim-modbus::config
//!
//! Deserializes the Modbus module's configuration, mirroring the original
//! `ot-sim-modbus-module`'s element names: a TCP endpoint, the four bank
//! sizes passed to `register_init`, and per-point definitions.

use serde::Deserialize;

use ot_sim_types::config::BusConfig;

fn default_port() -> u16 {
    502
}

fn default_max_connections() -> u8 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct TcpEndpoint {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_connections")]
    pub max_connections: u8,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for TcpEndpoint {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), max_connections: default_max_connections() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointConfig {
    pub bank: crate::point::Bank,
    pub address: u16,
    pub tag: String,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_device_name")]
    pub name: String,
    #[serde(default)]
    pub endpoint: TcpEndpoint,
    #[serde(default)]
    pub input: Vec<PointConfig>,
    #[serde(default)]
    pub output: Vec<PointConfig>,
}

fn default_device_name() -> String {
    "modbus-device".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModbusModuleConfig {
    #[serde(default)]
    pub message_bus: BusConfig,
    #[serde(default)]
    pub modbus: Vec<DeviceConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Bank;

    #[test]
    fn parses_device_with_points() {
        let yaml = r#"
modbus:
  - name: "plc-1"
    endpoint:
      port: 5020
    input:
      - bank: coils
        address: 5
        tag: "breaker.trip"
    output:
      - bank: holding_registers
        address: 10
        tag: "setpoint"
        scale: 0.1
"#;
        let cfg: ModbusModuleConfig = serde_yaml::from_str(yaml).unwrap();
        let device = &cfg.modbus[0];
        assert_eq!(device.endpoint.port, 5020);
        assert_eq!(device.input[0].bank, Bank::Coils);
        assert_eq!(device.output[0].scale, 0.1);
    }

    #[test]
    fn endpoint_defaults_apply_when_omitted() {
        let yaml = r#"
modbus:
  - name: "plc-2"
"#;
        let cfg: ModbusModuleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.modbus[0].endpoint.port, 502);
        assert_eq!(cfg.modbus[0].endpoint.max_connections, 10);
    }
}
