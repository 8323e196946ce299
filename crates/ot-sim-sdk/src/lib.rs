//! # ot-sim-sdk
//!
//! The shared adapter-building-block layer used by every protocol crate in
//! this workspace: the tag store (§4.3), the generic point registry
//! (§4.5), and the write-suppression primitive (§5) that the DNP3, Modbus,
//! S7, and 61850 adapters each specialize for their own address space.

#![forbid(unsafe_code)]

pub mod registry;
pub mod tagstore;
pub mod writesuppression;

pub use registry::{Direction, PointDef, PointRegistry};
pub use tagstore::{MemTagStore, TagStore};
pub use writesuppression::DirtySet;
