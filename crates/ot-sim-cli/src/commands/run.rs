//! # ot-sim-cli::commands::run
//!
//! Implements the `run` subcommand: dispatches to the wiring function for
//! whichever protocol module the user asked for.

use anyhow::Result;

use crate::args::ProtocolCommand;
use crate::wiring;

pub fn exec(protocol: ProtocolCommand) -> Result<()> {
    match &protocol {
        ProtocolCommand::Dnp3 { config } => wiring::dnp3::run(config),
        ProtocolCommand::Modbus { config } => wiring::modbus::run(config),
        ProtocolCommand::S7 { config } => wiring::s7::run(config),
        ProtocolCommand::Ied61850 { config } => wiring::ied61850::run(config),
    }
}
