//! # ot-sim-dnp3::config
//!
//! Deserializes the DNP3 module's configuration. The original module reads
//! an XML document with `boost::property_tree`; ambient-stack configuration
//! here is YAML/TOML via `serde` (§6.5), but the element names, defaults,
//! and nesting mirror `ot-sim-dnp3-module/main.cpp` exactly.

use serde::Deserialize;

use ot_sim_types::config::BusConfig;

fn default_cold_start_delay() -> u16 {
    180
}

fn default_warm_restart_delay() -> u16 {
    30
}

fn default_outstation_local_address() -> u16 {
    1024
}

fn default_outstation_remote_address() -> u16 {
    1
}

fn default_master_local_address() -> u16 {
    1
}

fn default_master_remote_address() -> u16 {
    1024
}

fn default_master_timeout() -> i64 {
    5
}

fn default_scan_rate() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    pub device: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: String,
    #[serde(default = "default_parity")]
    pub parity: String,
}

fn default_baud_rate() -> u32 {
    115200
}
fn default_data_bits() -> u8 {
    8
}
fn default_stop_bits() -> String {
    "One".to_string()
}
fn default_parity() -> String {
    "None".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub address: u16,
    pub tag: String,
    #[serde(default)]
    pub sgvar: Option<String>,
    #[serde(default)]
    pub egvar: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub deadband: f64,
    #[serde(default)]
    pub sbo: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutstationConfig {
    #[serde(default = "default_outstation_name")]
    pub name: String,
    #[serde(default = "default_outstation_local_address")]
    pub local_address: u16,
    #[serde(default = "default_outstation_remote_address")]
    pub remote_address: u16,
    #[serde(default = "default_warm_restart_delay")]
    pub warm_restart_delay: u16,
    #[serde(default)]
    pub input: Vec<PointConfig>,
    #[serde(default)]
    pub output: Vec<PointConfig>,
}

fn default_outstation_name() -> String {
    "dnp3-outstation".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClassScanRates {
    #[serde(default)]
    pub all: Option<u64>,
    #[serde(default)]
    pub class0: u64,
    #[serde(default)]
    pub class1: u64,
    #[serde(default)]
    pub class2: u64,
    #[serde(default)]
    pub class3: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MasterConfig {
    #[serde(default = "default_master_name")]
    pub name: String,
    #[serde(default = "default_master_local_address")]
    pub local_address: u16,
    #[serde(default = "default_master_remote_address")]
    pub remote_address: u16,
    #[serde(default = "default_master_timeout")]
    pub timeout: i64,
    #[serde(default = "default_scan_rate")]
    pub scan_rate: u64,
    #[serde(default)]
    pub class_scan_rates: ClassScanRates,
    #[serde(default)]
    pub input: Vec<PointConfig>,
    #[serde(default)]
    pub output: Vec<PointConfig>,
}

fn default_master_name() -> String {
    "dnp3-master".to_string()
}

/// A configured TCP endpoint, `host:port` in the original; kept split here
/// since the wire-level channel is the external collaborator (§1) this
/// crate simulates above, not one it opens itself.
#[derive(Debug, Clone, Deserialize)]
pub struct TcpEndpoint {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_accept_mode")]
    pub accept_mode: String,
}

fn default_accept_mode() -> String {
    "CloseNew".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub mode: DeviceMode,
    #[serde(default)]
    pub pub_endpoint: Option<String>,
    #[serde(default)]
    pub pull_endpoint: Option<String>,
    #[serde(default)]
    pub endpoint: Option<TcpEndpoint>,
    #[serde(default)]
    pub serial: Option<SerialConfig>,
    #[serde(default = "default_cold_start_delay")]
    pub cold_start_delay: u16,
    #[serde(default)]
    pub outstation: Vec<OutstationConfig>,
    #[serde(default)]
    pub master: Vec<MasterConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceMode {
    Server,
    Client,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dnp3ModuleConfig {
    #[serde(default)]
    pub message_bus: BusConfig,
    #[serde(default)]
    pub dnp3: Vec<DeviceConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_device_with_one_outstation() {
        let yaml = r#"
message_bus:
  pub_endpoint: "tcp://127.0.0.1:5678"
  pull_endpoint: "tcp://127.0.0.1:1234"
dnp3:
  - name: "substation-1"
    mode: server
    cold_start_delay: 120
    outstation:
      - name: "outstation-1"
        local_address: 1024
        remote_address: 1
        input:
          - type: binary
            address: 0
            tag: "breaker.closed"
          - type: analog
            address: 0
            tag: "line.voltage"
            deadband: 0.5
        output:
          - type: binary
            address: 0
            tag: "breaker.trip"
            sbo: true
"#;
        let cfg: Dnp3ModuleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.dnp3.len(), 1);
        let device = &cfg.dnp3[0];
        assert_eq!(device.mode, DeviceMode::Server);
        assert_eq!(device.cold_start_delay, 120);
        assert_eq!(device.outstation[0].local_address, 1024);
        assert_eq!(device.outstation[0].input.len(), 2);
        assert!(device.outstation[0].output[0].sbo);
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let yaml = r#"
dnp3:
  - name: "substation-2"
    mode: client
    master:
      - input: []
"#;
        let cfg: Dnp3ModuleConfig = serde_yaml::from_str(yaml).unwrap();
        let master = &cfg.dnp3[0].master[0];
        assert_eq!(master.local_address, 1);
        assert_eq!(master.remote_address, 1024);
        assert_eq!(master.timeout, 5);
        assert_eq!(master.scan_rate, 30);
        assert_eq!(cfg.dnp3[0].cold_start_delay, 180);
    }
}
