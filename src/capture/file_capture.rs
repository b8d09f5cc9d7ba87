//! Capture adapter that reads an existing screenshot from disk.

use std::io::Cursor;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tracing::debug;

use super::{CaptureRegion, CapturedImage, ScreenCapture};

/// Share of the width, from the left, skipped when no region is set.
/// Fibonacci labels are drawn along the right edge of the chart.
const DEFAULT_CROP_START: f32 = 0.80;

/// Treats a saved screenshot file as the screen.
pub struct FileCapture {
    path: PathBuf,
}

impl FileCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ScreenCapture for FileCapture {
    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    async fn capture_screen(&self, region: Option<CaptureRegion>) -> Result<CapturedImage> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Loaded screenshot");

        // Decoding and re-encoding are CPU bound
        tokio::task::spawn_blocking(move || -> Result<CapturedImage> {
            let screen = image::load_from_memory(&bytes).context("Failed to decode screenshot")?;
            let cropped = crop_to_region(&screen, region);
            let png = encode_png(&cropped)?;

            debug!(
                region = ?region.map(|r| r.to_string()),
                width = cropped.width(),
                height = cropped.height(),
                "Cropped screenshot"
            );

            Ok(CapturedImage::from_bytes(&png, cropped.width(), cropped.height()))
        })
        .await
        .context("Image task failed")?
    }
}

/// Crop to `region`, or to the right-hand strip of the screen when unset.
///
/// Negative offsets clamp to zero and sizes to at least one pixel; a region
/// reaching past the edge is cut at the edge.
fn crop_to_region(screen: &DynamicImage, region: Option<CaptureRegion>) -> DynamicImage {
    match region {
        Some(r) => screen.crop_imm(
            r.x.max(0) as u32,
            r.y.max(0) as u32,
            r.width.max(1) as u32,
            r.height.max(1) as u32,
        ),
        None => {
            let width = screen.width();
            let x = (width as f32 * DEFAULT_CROP_START) as u32;
            screen.crop_imm(x, 0, width - x, screen.height())
        }
    }
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(png.into_inner())
}
