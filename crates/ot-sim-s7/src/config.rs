//! # ot-sim-s7::config
//!
//! Deserializes the S7comm module's configuration: rack/slot, local/remote
//! TSAP, and connection type, keeping the same element names (`name`,
//! `mode`, `endpoint`, `rack`, `slot`) an S7comm config file has always
//! used, now parsed with `serde` instead of a property-tree walk.

use serde::Deserialize;

use ot_sim_types::config::BusConfig;

use crate::point::DataArea;

fn default_rack() -> u8 {
    0
}

fn default_slot() -> u8 {
    2
}

/// PG (programming device), OP (operator panel), or Basic (generic/S7)
/// connection — connection-type 1 / 2 / 3+ on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Pg,
    Op,
    Basic,
}

fn default_connection_type() -> ConnectionType {
    ConnectionType::Basic
}

#[derive(Debug, Clone, Deserialize)]
pub struct TcpEndpoint {
    pub host: String,
    #[serde(default = "default_s7_port")]
    pub port: u16,
}

fn default_s7_port() -> u16 {
    102
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointConfig {
    pub area: DataArea,
    pub byte_offset: u32,
    #[serde(default)]
    pub bit_offset: u8,
    #[serde(default = "default_width")]
    pub width: u8,
    pub tag: String,
    #[serde(default)]
    pub deadband: f64,
    #[serde(default)]
    pub sbo: bool,
}

fn default_width() -> u8 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub mode: DeviceMode,
    #[serde(default)]
    pub endpoint: Option<TcpEndpoint>,
    #[serde(default = "default_rack")]
    pub rack: u8,
    #[serde(default = "default_slot")]
    pub slot: u8,
    #[serde(default)]
    pub local_tsap: Option<u16>,
    #[serde(default)]
    pub remote_tsap: Option<u16>,
    #[serde(default = "default_connection_type")]
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub input: Vec<PointConfig>,
    #[serde(default)]
    pub output: Vec<PointConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceMode {
    Server,
    Client,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S7ModuleConfig {
    #[serde(default)]
    pub message_bus: BusConfig,
    #[serde(default)]
    pub s7comm: Vec<DeviceConfig>,
}
