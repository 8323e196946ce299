//! IEC 61850 (MMS) adapter: a logical-device object model bridged to tags,
//! with select-before-operate on protocol-side control writes.

pub mod adapter;
pub mod config;
pub mod model;
pub mod point;

pub use adapter::Iec61850Adapter;
pub use model::LogicalDevice;
pub use point::Iec61850PointDef;
