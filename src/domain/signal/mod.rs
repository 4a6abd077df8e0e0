//! Signal domain: detected price anomalies and the recent-signal list.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod state;
pub mod wire;

use crate::shared::{Symbol, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use state::RecentSignals;

/// Direction of a detected anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    Spike,
    Drop,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Spike => "Spike",
            SignalType::Drop => "Drop",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SignalType {
    type Err = SignalValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Spike" => Ok(SignalType::Spike),
            "Drop" => Ok(SignalType::Drop),
            other => Err(SignalValidationError::UnknownType(other.to_string())),
        }
    }
}

/// A price anomaly detected at a specific instant.
///
/// Always logically paired with the price observation at the same timestamp,
/// though the two are stored separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: Symbol,
    pub price: f64,
    pub timestamp: Timestamp,
    pub z_score: f64,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
}

impl Signal {
    pub fn is_spike(&self) -> bool {
        self.signal_type == SignalType::Spike
    }

    pub fn is_drop(&self) -> bool {
        self.signal_type == SignalType::Drop
    }
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum SignalValidationError {
    Multiple(String, Vec<SignalValidationError>),
    UnknownType(String),
    InvalidTimestamp(String),
    NonFinite(&'static str),
}

impl fmt::Display for SignalValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValidationError::Multiple(symbol, errors) => {
                writeln!(f, "Signal validation errors ({symbol}):")?;
                for err in errors {
                    writeln!(f, "  - {}", err)?;
                }
                Ok(())
            }
            SignalValidationError::UnknownType(t) => write!(f, "Unknown signal type: {t}"),
            SignalValidationError::InvalidTimestamp(m) => write!(f, "{m}"),
            SignalValidationError::NonFinite(field) => write!(f, "Non-finite {field}"),
        }
    }
}

impl std::error::Error for SignalValidationError {}

impl From<SignalValidationError> for crate::error::SdkError {
    fn from(e: SignalValidationError) -> Self {
        crate::error::SdkError::Validation(e.to_string())
    }
}
