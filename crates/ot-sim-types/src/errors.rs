//! # ot-sim-types::errors
//!
//! Common error types shared by every crate in the workspace. Using
//! `thiserror` keeps each variant's `Display` message authoritative and
//! avoids ad hoc `String` errors at crate boundaries.

use thiserror::Error;

/// Fatal at startup: a configuration file failed to parse or failed
/// validation. A failure here is the one class of error that is NOT
/// skip-and-continue — per-point failures are, but a bad bus endpoint or
/// unreadable file is.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("missing required attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },
    #[error("invalid value for '{attr}' on element '{element}': {reason}")]
    InvalidValue { element: String, attr: String, reason: String },
}

/// Errors from the envelope codec and message bus transport (§4.1, §4.2, §7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("malformed envelope: {0}")]
    Malformed(String),
    #[error("unknown envelope kind: {0}")]
    UnknownKind(String),
    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("transport send queue overflow")]
    Overflow,
}

/// An Update envelope referenced a tag with no configured Point Definition
/// on this adapter (§7, `PointUnknown`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("point unknown: tag '{0}' has no configured definition")]
pub struct PointUnknown(pub String);

/// The protocol-native status codes a command handler returns, shared by
/// every protocol adapter (DNP3 calls these `CommandStatus`; the others map
/// their own native codes onto the same small set per §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    NotSupported,
    OutOfRange,
    NoSelect,
}
