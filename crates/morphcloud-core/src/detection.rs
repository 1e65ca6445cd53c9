use thiserror::Error;

use crate::gesture::LandmarkSet;

/// A detector error for a single frame. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("detection fault: {message}")]
pub struct DetectionFault {
    pub message: String,
}

impl DetectionFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of one detection attempt. `NoHand` and `Fault` drive the same
/// decay downstream but stay distinct for logging.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionResult {
    Landmarks(LandmarkSet),
    NoHand,
    Fault(DetectionFault),
}

impl DetectionResult {
    pub fn landmarks(&self) -> Option<&LandmarkSet> {
        match self {
            DetectionResult::Landmarks(set) => Some(set),
            _ => None,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, DetectionResult::Fault(_))
    }
}

impl From<Option<LandmarkSet>> for DetectionResult {
    fn from(found: Option<LandmarkSet>) -> Self {
        found.map_or(DetectionResult::NoHand, DetectionResult::Landmarks)
    }
}
