//! # ot-sim-cli
//!
//! The main entry point for the ot-sim binary. Parses command-line
//! arguments, installs the global tracing subscriber once for every
//! subcommand, and dispatches to the chosen handler.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use crate::args::{Cli, Command};

mod args;
mod commands;
mod logging;
mod wiring;

fn main() -> Result<()> {
    let args = Cli::parse();
    let _guard = logging::init(args.log, args.log_file.as_deref())?;

    match args.command {
        Command::Run { protocol } => commands::run::exec(protocol),
        Command::Validate { protocol } => commands::validate::exec(protocol),
        Command::ListProtocols => commands::list_protocols::exec(),
    }
}
