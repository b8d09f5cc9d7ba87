//! Capture session status and failure taxonomy.

use std::fmt;

use thiserror::Error;

use crate::models::FibRatio;

/// Why a capture attempt produced no levels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Capture failed: {0}")]
    CaptureFailed(String),
    #[error("OCR failed: {0}")]
    RecognitionFailed(String),
    #[error("Could not extract levels")]
    NoLevelsFound,
}

/// Where the session is in the capture -> OCR -> parse sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureStatus {
    Idle,
    Capturing,
    Recognizing,
    /// Number of canonical ratios recognized
    Succeeded(usize),
    Failed(CaptureError),
    /// Host has no capture capability
    Unsupported,
    Cleared,
}

impl CaptureStatus {
    /// Capture or recognition is under way.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, CaptureStatus::Capturing | CaptureStatus::Recognizing)
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureStatus::Idle => f.write_str("Ready to capture"),
            CaptureStatus::Capturing => f.write_str("Capturing..."),
            CaptureStatus::Recognizing => f.write_str("Running OCR..."),
            CaptureStatus::Succeeded(found) => {
                write!(f, "{}/{} levels found", found, FibRatio::ALL.len())
            }
            CaptureStatus::Failed(e) => write!(f, "{}", e),
            CaptureStatus::Unsupported => f.write_str("Capture not supported in this environment"),
            CaptureStatus::Cleared => f.write_str("Cleared"),
        }
    }
}

/// Result of one `capture_and_extract` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Another capture was already in flight; nothing was done
    Busy,
    Unsupported,
    Succeeded(usize),
    Failed(CaptureError),
}
