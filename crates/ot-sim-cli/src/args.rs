//! # ot-sim-cli::args
//!
//! Defines the command-line argument structure using `clap`. Each protocol
//! module takes no arguments besides the path to its own configuration
//! file; the subcommand tree here only picks which module to run,
//! validate, or list.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "human")]
    pub log: LogFormat,

    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a protocol module from its configuration file.
    Run {
        #[command(subcommand)]
        protocol: ProtocolCommand,
    },
    /// Parse and validate a module's configuration file without running it.
    Validate {
        #[command(subcommand)]
        protocol: ProtocolCommand,
    },
    /// List the protocol modules compiled into this binary.
    ListProtocols,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProtocolCommand {
    Dnp3 {
        #[arg(value_name = "CONFIG_PATH")]
        config: PathBuf,
    },
    Modbus {
        #[arg(value_name = "CONFIG_PATH")]
        config: PathBuf,
    },
    S7 {
        #[arg(value_name = "CONFIG_PATH")]
        config: PathBuf,
    },
    Ied61850 {
        #[arg(value_name = "CONFIG_PATH")]
        config: PathBuf,
    },
}

impl ProtocolCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolCommand::Dnp3 { .. } => "dnp3",
            ProtocolCommand::Modbus { .. } => "modbus",
            ProtocolCommand::S7 { .. } => "s7",
            ProtocolCommand::Ied61850 { .. } => "iec61850",
        }
    }

    pub fn config(&self) -> &PathBuf {
        match self {
            ProtocolCommand::Dnp3 { config }
            | ProtocolCommand::Modbus { config }
            | ProtocolCommand::S7 { config }
            | ProtocolCommand::Ied61850 { config } => config,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}
