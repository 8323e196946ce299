//! # ot-sim-dnp3::stack
//!
//! The DNP3 stack's protocol callback interfaces, re-expressed as narrow
//! Rust traits rather than an inheritance hierarchy (§9 Design Notes:
//! "DNP3's `ISOEHandler`, `ICommandHandler`, `IOutstationApplication` are
//! modeled as capability sets. Express each as a narrow interface/trait the
//! adapter implements; dispatch is by composition."). The real DNP3 stack
//! (e.g. a library binding opendnp3 or similar) is the out-of-scope
//! external collaborator (§1) that would drive these traits in production;
//! `outstation.rs`/`master.rs` implement them directly so the engines are
//! runnable and testable without one linked in.

use ot_sim_types::errors::CommandStatus;

/// The CROB (ControlRelayOutputBlock) operation a master issued against a
/// binary output (§4.6, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    LatchOn,
    LatchOff,
    PulseOnTrip,
    PulseOnClose,
    Other,
}

/// Whether a command arrived as part of a Select-before-Operate sequence or
/// as a DirectOperate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    SelectBeforeOperate,
    DirectOperate,
}

/// `ICommandHandler`: callbacks the DNP3 stack makes into the outstation
/// when a master issues Select/Operate against a configured index.
pub trait CommandHandler: Send {
    fn select_binary(&mut self, index: u16) -> CommandStatus;
    fn operate_binary(&mut self, index: u16, code: ControlCode, op_type: OpType) -> CommandStatus;
    fn select_analog(&mut self, index: u16) -> CommandStatus;
    fn operate_analog(&mut self, index: u16, value: f64, op_type: OpType) -> CommandStatus;
}

/// `IOutstationApplication`: the outstation's restart-support capability.
/// The original hardcodes `SUPPORTED_DELAY_COARSE`; we mirror that as a
/// fixed restart mode rather than a negotiated one.
#[derive(Debug, Clone, Copy)]
pub enum RestartMode {
    SupportedDelayCoarse(u16),
}

pub trait OutstationApplication: Send {
    fn cold_restart(&mut self) -> RestartMode;
    fn warm_restart(&mut self) -> RestartMode;
}

/// `ISOEHandler`: callbacks the master stack makes as it processes a
/// sequence-of-events response from an outstation.
pub trait SoeHandler: Send {
    fn process_binary_input(&mut self, index: u16, value: bool, ts: u64);
    fn process_analog_input(&mut self, index: u16, value: f64, ts: u64);
    fn process_binary_output_status(&mut self, index: u16, value: bool, ts: u64);
    fn process_analog_output_status(&mut self, index: u16, value: f64, ts: u64);
}
