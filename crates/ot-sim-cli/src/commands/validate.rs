//! # ot-sim-cli::commands::validate
//!
//! Implements the `validate` subcommand: parses the configuration file for
//! the chosen protocol without standing up any adapters, bus threads, or
//! network listeners.

use anyhow::Result;

use ot_sim_dnp3::config::Dnp3ModuleConfig;
use ot_sim_modbus::config::ModbusModuleConfig;
use ot_sim_s7::config::S7ModuleConfig;
use ot_sim_61850::config::Iec61850ModuleConfig;
use ot_sim_types::config::load_toml_or_yaml;

use crate::args::ProtocolCommand;

pub fn exec(protocol: ProtocolCommand) -> Result<()> {
    let path = protocol.config();

    let device_count = match &protocol {
        ProtocolCommand::Dnp3 { .. } => load_toml_or_yaml::<Dnp3ModuleConfig>(path)?.dnp3.len(),
        ProtocolCommand::Modbus { .. } => load_toml_or_yaml::<ModbusModuleConfig>(path)?.modbus.len(),
        ProtocolCommand::S7 { .. } => load_toml_or_yaml::<S7ModuleConfig>(path)?.s7comm.len(),
        ProtocolCommand::Ied61850 { .. } => load_toml_or_yaml::<Iec61850ModuleConfig>(path)?.ied61850.len(),
    };

    println!(
        "{} config at {:?} is valid ({} device{} configured)",
        protocol.name(),
        path,
        device_count,
        if device_count == 1 { "" } else { "s" },
    );
    Ok(())
}
