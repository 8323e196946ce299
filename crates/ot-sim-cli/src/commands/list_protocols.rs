//! # ot-sim-cli::commands::list_protocols
//!
//! Implements the `list-protocols` subcommand.

use anyhow::Result;

const PROTOCOLS: &[(&str, &str)] = &[
    ("dnp3", "DNP3 outstation/master engines over a simulated channel"),
    ("modbus", "Modbus TCP coil/register banks"),
    ("s7", "Siemens S7comm memory areas"),
    ("iec61850", "IEC 61850 (MMS) logical-device object model"),
];

pub fn exec() -> Result<()> {
    println!("{:<10} | {}", "name", "description");
    println!("{:-<10}-|-{:-<50}", "", "");
    for (name, desc) in PROTOCOLS {
        println!("{name:<10} | {desc}");
    }
    Ok(())
}
