//! S7Comm adapter: byte/bit-addressed memory areas bridged to tags, with
//! SBO gating on protocol-side writes.

pub mod adapter;
pub mod config;
pub mod point;
pub mod register;

pub use adapter::S7Adapter;
pub use point::{Address, DataArea, S7PointDef};
