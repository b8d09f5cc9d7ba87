//! Contracts for the external capture and OCR services.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Screen rectangle `[x, y, width, height]` in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl FromStr for CaptureRegion {
    type Err = anyhow::Error;

    /// Parses `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Invalid region '{}'", s))?;

        match parts.as_slice() {
            [x, y, width, height] => Ok(Self {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            }),
            _ => anyhow::bail!("Region must be x,y,width,height, got '{}'", s),
        }
    }
}

/// Encoded image returned by a capture service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    /// PNG file bytes, base64 encoded
    pub image_base64: String,
    pub width: u32,
    pub height: u32,
}

impl CapturedImage {
    pub fn from_bytes(bytes: &[u8], width: u32, height: u32) -> Self {
        Self {
            image_base64: STANDARD.encode(bytes),
            width,
            height,
        }
    }

    /// Raw image file bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.image_base64)
            .context("Captured image is not valid base64")
    }
}

/// Text produced by an OCR engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedText {
    pub text: String,
}

/// Source of screenshots.
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    /// Whether this host can capture at all.
    fn is_available(&self) -> bool;

    /// Capture the screen, optionally restricted to `region`.
    async fn capture_screen(&self, region: Option<CaptureRegion>) -> Result<CapturedImage>;
}

/// OCR engine. Implementations initialize once and are reused across calls.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &CapturedImage) -> Result<RecognizedText>;
}
