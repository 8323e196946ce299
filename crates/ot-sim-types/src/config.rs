//! # ot-sim-types::config
//!
//! Configuration primitives shared by every adapter's config schema. Each
//! protocol crate defines its own top-level `Config` struct, but all of
//! them embed a `BusConfig` for the pub/pull endpoint overrides described
//! in §6.4.

use serde::{Deserialize, Serialize};

fn default_pub_endpoint() -> String {
    "tcp://127.0.0.1:5555".to_string()
}

fn default_pull_endpoint() -> String {
    "tcp://127.0.0.1:5556".to_string()
}

/// Message-bus endpoint overrides. A deployment may run many adapters
/// against the same core process; each adapter's `id` disambiguates its
/// envelopes' `metadata.sender`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    #[serde(default = "default_pub_endpoint")]
    pub pub_endpoint: String,
    #[serde(default = "default_pull_endpoint")]
    pub pull_endpoint: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { pub_endpoint: default_pub_endpoint(), pull_endpoint: default_pull_endpoint() }
    }
}

/// Loads and parses a config file, trying YAML first and falling back to
/// TOML. Either format is accepted per §6.4 ("XML ... or JSON input" in the
/// original; this workspace's ambient config layer uses `serde`-backed
/// YAML/TOML rather than a bespoke XML/property-tree parser, see
/// SPEC_FULL.md §6).
pub fn load_toml_or_yaml<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
) -> Result<T, crate::errors::ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    match serde_yaml::from_str(&raw) {
        Ok(v) => Ok(v),
        Err(yaml_err) => toml::from_str(&raw).map_err(|toml_err| {
            // Prefer whichever format the file extension suggests for the reported error.
            if path.extension().and_then(|e| e.to_str()) == Some("toml") {
                crate::errors::ConfigError::Toml(toml_err)
            } else {
                crate::errors::ConfigError::Yaml(yaml_err)
            }
        }),
    }
}
