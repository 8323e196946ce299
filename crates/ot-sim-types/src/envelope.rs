//! # ot-sim-types::envelope
//!
//! Defines the `Envelope`, the versioned, kinded JSON message exchanged on
//! the message bus, and its `encode`/`decode` codec. An envelope's `kind`
//! and `contents` are siblings of `version`/`metadata` in the wire format
//! (see §6.1), not a `serde` internally-tagged enum, so the codec bridges
//! through an untyped `WireEnvelope` rather than deriving directly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::BusError;
use crate::point::Point;

pub const WIRE_VERSION: &str = "v1";

/// Sender/routing metadata attached to every envelope. `sender` is required
/// by every handler (self-loop suppression depends on it); any other keys a
/// deployment adds ride along in `extra` and are preserved on re-encode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub sender: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Metadata {
    pub fn new(sender: impl Into<String>) -> Self {
        Self { sender: sender.into(), extra: HashMap::new() }
    }
}

/// The kind discriminant of an envelope, carried in the wire format's
/// `"kind"` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    Status,
    Update,
    Confirmation,
    Metric,
}

impl Kind {
    fn as_wire_str(self) -> &'static str {
        match self {
            Kind::Status => "Status",
            Kind::Update => "Update",
            Kind::Confirmation => "Confirmation",
            Kind::Metric => "Metric",
        }
    }

    fn from_wire_str(s: &str) -> Option<Self> {
        match s {
            "Status" => Some(Kind::Status),
            "Update" => Some(Kind::Update),
            "Confirmation" => Some(Kind::Confirmation),
            "Metric" => Some(Kind::Metric),
            _ => None,
        }
    }
}

/// `contents` payloads, one variant per `Kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    Status(StatusContents),
    Update(UpdateContents),
    Confirmation(ConfirmationContents),
    Metric(MetricContents),
}

impl Contents {
    pub fn kind(&self) -> Kind {
        match self {
            Contents::Status(_) => Kind::Status,
            Contents::Update(_) => Kind::Update,
            Contents::Confirmation(_) => Kind::Confirmation,
            Contents::Metric(_) => Kind::Metric,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusContents {
    pub measurements: Vec<Point>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateContents {
    pub updates: Vec<Point>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub recipient: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub confirm: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmationContents {
    pub confirm: String,
    #[serde(default)]
    pub errors: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    Counter,
    Gauge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub kind: MetricKind,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricContents {
    pub metrics: Vec<MetricSample>,
}

/// A fully-typed envelope, as produced by `decode` and consumed by `encode`.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub metadata: Metadata,
    pub contents: Contents,
}

impl Envelope {
    pub fn new(metadata: Metadata, contents: Contents) -> Self {
        Self { metadata, contents }
    }

    pub fn status(sender: impl Into<String>, measurements: Vec<Point>) -> Self {
        Self::new(Metadata::new(sender), Contents::Status(StatusContents { measurements }))
    }

    pub fn update(
        sender: impl Into<String>,
        updates: Vec<Point>,
        recipient: impl Into<String>,
        confirm: impl Into<String>,
    ) -> Self {
        Self::new(
            Metadata::new(sender),
            Contents::Update(UpdateContents {
                updates,
                recipient: recipient.into(),
                confirm: confirm.into(),
            }),
        )
    }

    pub fn confirmation(
        sender: impl Into<String>,
        confirm: impl Into<String>,
        errors: HashMap<String, String>,
    ) -> Self {
        Self::new(
            Metadata::new(sender),
            Contents::Confirmation(ConfirmationContents { confirm: confirm.into(), errors }),
        )
    }

    pub fn metric(sender: impl Into<String>, metrics: Vec<MetricSample>) -> Self {
        Self::new(Metadata::new(sender), Contents::Metric(MetricContents { metrics }))
    }

    pub fn kind(&self) -> Kind {
        self.contents.kind()
    }
}

/// The on-the-wire shape: `kind` and `contents` are flat siblings of
/// `version`/`metadata`, which is why this can't be a single `#[serde(tag)]`
/// enum on `Envelope` itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireEnvelope {
    version: String,
    kind: String,
    metadata: Metadata,
    contents: serde_json::Value,
}

/// Serializes an envelope to its JSON wire form.
pub fn encode(env: &Envelope) -> Vec<u8> {
    let wire = WireEnvelope {
        version: WIRE_VERSION.to_string(),
        kind: env.kind().as_wire_str().to_string(),
        metadata: env.metadata.clone(),
        contents: serde_json::to_value(&env.contents).expect("Contents always serializes"),
    };
    serde_json::to_vec(&wire).expect("WireEnvelope always serializes")
}

/// Parses an envelope from its JSON wire form.
///
/// Decoding is total over any well-formed JSON object: an unrecognized
/// `kind` yields `UnknownKind`, an unsupported `version` yields
/// `UnsupportedVersion`, and anything that isn't a valid `WireEnvelope`
/// shape yields `Malformed`. Callers MUST skip envelopes that fail to
/// decode rather than treat them as fatal.
pub fn decode(bytes: &[u8]) -> Result<Envelope, BusError> {
    let wire: WireEnvelope =
        serde_json::from_slice(bytes).map_err(|e| BusError::Malformed(e.to_string()))?;

    if wire.version != WIRE_VERSION {
        return Err(BusError::UnsupportedVersion(wire.version));
    }

    let kind =
        Kind::from_wire_str(&wire.kind).ok_or_else(|| BusError::UnknownKind(wire.kind.clone()))?;

    let contents = match kind {
        Kind::Status => Contents::Status(
            serde_json::from_value(wire.contents).map_err(|e| BusError::Malformed(e.to_string()))?,
        ),
        Kind::Update => Contents::Update(
            serde_json::from_value(wire.contents).map_err(|e| BusError::Malformed(e.to_string()))?,
        ),
        Kind::Confirmation => Contents::Confirmation(
            serde_json::from_value(wire.contents).map_err(|e| BusError::Malformed(e.to_string()))?,
        ),
        Kind::Metric => Contents::Metric(
            serde_json::from_value(wire.contents).map_err(|e| BusError::Malformed(e.to_string()))?,
        ),
    };

    Ok(Envelope::new(wire.metadata, contents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_status() {
        let env = Envelope::status("io-A", vec![Point::new("line.closed", 1.0, 42)]);
        let bytes = encode(&env);
        let back = decode(&bytes).unwrap();
        match back.contents {
            Contents::Status(s) => assert_eq!(s.measurements, vec![Point::new("line.closed", 1.0, 42)]),
            _ => panic!("wrong kind"),
        }
        assert_eq!(back.metadata.sender, "io-A");
    }

    #[test]
    fn round_trips_update_with_confirm() {
        let env = Envelope::update("scada", vec![Point::new("t1", 0.0, 1)], "", "abc-123");
        let bytes = encode(&env);
        let back = decode(&bytes).unwrap();
        match back.contents {
            Contents::Update(u) => {
                assert_eq!(u.confirm, "abc-123");
                assert_eq!(u.recipient, "");
            }
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn unknown_kind_is_typed_error() {
        let raw = br#"{"version":"v1","kind":"Bogus","metadata":{"sender":"x"},"contents":{}}"#;
        assert!(matches!(decode(raw), Err(BusError::UnknownKind(k)) if k == "Bogus"));
    }

    #[test]
    fn unsupported_version_is_typed_error() {
        let raw = br#"{"version":"v2","kind":"Status","metadata":{"sender":"x"},"contents":{"measurements":[]}}"#;
        assert!(matches!(decode(raw), Err(BusError::UnsupportedVersion(v)) if v == "v2"));
    }

    #[test]
    fn malformed_json_is_typed_error() {
        let raw = b"not json at all";
        assert!(matches!(decode(raw), Err(BusError::Malformed(_))));
    }

    #[test]
    fn unknown_metadata_fields_round_trip() {
        let raw = br#"{"version":"v1","kind":"Status","metadata":{"sender":"x","site":"substation-1"},"contents":{"measurements":[]}}"#;
        let env = decode(raw).unwrap();
        assert_eq!(
            env.metadata.extra.get("site").and_then(|v| v.as_str()),
            Some("substation-1")
        );
        let bytes = encode(&env);
        let back = decode(&bytes).unwrap();
        assert_eq!(back.metadata.extra.get("site").and_then(|v| v.as_str()), Some("substation-1"));
    }
}
