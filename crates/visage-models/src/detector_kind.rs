//! Detector backend selection.
//!
//! Two backends are exposed, named after the detection models they map to:
//!
//! - `Hog`: sliding-window detector, fast, no per-face confidence signal
//! - `Cnn`: neural detector, slower, yields a real confidence per face

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Face detector backend.
///
/// Selected once at process startup; the choice controls both detection
/// quality and whether returned confidence values carry information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Fast sliding-window detection.
    /// Every detection reports a uniform confidence of 1.0.
    #[default]
    Hog,

    /// Neural-network detection with real per-face confidence scores.
    /// Falls back to `Hog` if the model fails to initialize.
    Cnn,
}

impl DetectorKind {
    /// All available backends.
    pub const ALL: &'static [DetectorKind] = &[DetectorKind::Hog, DetectorKind::Cnn];

    /// Returns the backend name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Hog => "hog",
            DetectorKind::Cnn => "cnn",
        }
    }

    /// Returns a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            DetectorKind::Hog => "Fast detection, uniform confidence",
            DetectorKind::Cnn => "Neural detection with confidence scores",
        }
    }

    /// Returns true if this backend produces a real confidence signal.
    pub fn confidence_capable(&self) -> bool {
        matches!(self, DetectorKind::Cnn)
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DetectorKind {
    type Err = DetectorKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hog" => Ok(DetectorKind::Hog),
            "cnn" => Ok(DetectorKind::Cnn),
            _ => Err(DetectorKindParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown detector backend: {0}")]
pub struct DetectorKindParseError(String);
