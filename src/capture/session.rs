//! Capture session: one screenshot -> OCR -> label parse at a time.
//!
//! The session is shared by reference (`&self` everywhere) so a UI or CLI
//! task can poll `status()` while a capture is in flight. A second request
//! issued while busy is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::fib::{parse_fib_levels, resolve_levels};
use crate::models::{Direction, FibPriceMap, PriceLevels};

use super::{CaptureError, CaptureOutcome, CaptureRegion, CaptureStatus, ScreenCapture, TextRecognizer};

#[derive(Debug)]
struct SessionState {
    status: CaptureStatus,
    fib_prices: FibPriceMap,
    scan_region: Option<CaptureRegion>,
    last_success_at: Option<DateTime<Utc>>,
}

/// Clears the busy flag when the attempt ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Orchestrates the capture and OCR services for one user.
pub struct CaptureSession {
    capture: Arc<dyn ScreenCapture>,
    ocr: Arc<dyn TextRecognizer>,
    busy: AtomicBool,
    state: RwLock<SessionState>,
}

impl CaptureSession {
    pub fn new(capture: Arc<dyn ScreenCapture>, ocr: Arc<dyn TextRecognizer>) -> Self {
        Self {
            capture,
            ocr,
            busy: AtomicBool::new(false),
            state: RwLock::new(SessionState {
                status: CaptureStatus::Idle,
                fib_prices: FibPriceMap::new(),
                scan_region: None,
                last_success_at: None,
            }),
        }
    }

    /// Whether a capture is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Current status. An in-flight phase left behind by a cancelled
    /// attempt reads as `Idle` once the busy flag is released.
    pub async fn status(&self) -> CaptureStatus {
        let status = self.state.read().await.status.clone();
        if status.is_in_flight() && !self.is_busy() {
            return CaptureStatus::Idle;
        }
        status
    }

    /// Prices from the last successful capture.
    pub async fn fib_prices(&self) -> FibPriceMap {
        self.state.read().await.fib_prices.clone()
    }

    pub async fn last_success_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_success_at
    }

    /// Restrict future captures to `region` (`None` lets the service choose).
    pub async fn set_scan_region(&self, region: Option<CaptureRegion>) {
        self.state.write().await.scan_region = region;
    }

    /// Entry/target/stop for `direction` from the stored prices.
    pub async fn levels_for(&self, direction: Direction) -> PriceLevels {
        resolve_levels(&self.state.read().await.fib_prices, direction)
    }

    /// Forget the stored prices.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.fib_prices.clear();
        state.status = CaptureStatus::Cleared;
        debug!("Cleared fib prices");
    }

    /// Capture the screen, run OCR on it and parse the Fibonacci labels.
    ///
    /// The stored prices are replaced only when at least one canonical ratio
    /// was found. Failures are reported through the status and the returned
    /// outcome; the session stays usable either way.
    pub async fn capture_and_extract(&self) -> CaptureOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Capture already in flight, ignoring request");
            return CaptureOutcome::Busy;
        }
        let _guard = BusyGuard(&self.busy);

        if !self.capture.is_available() {
            warn!("Screen capture is not available on this host");
            self.set_status(CaptureStatus::Unsupported).await;
            return CaptureOutcome::Unsupported;
        }

        let region = {
            let mut state = self.state.write().await;
            state.status = CaptureStatus::Capturing;
            state.scan_region
        };
        info!(region = ?region, "Capturing screen");

        let image = match self.capture.capture_screen(region).await {
            Ok(image) => image,
            Err(e) => return self.fail(CaptureError::CaptureFailed(format!("{:#}", e))).await,
        };
        debug!(width = image.width, height = image.height, "Captured image");

        self.set_status(CaptureStatus::Recognizing).await;

        let recognized = match self.ocr.recognize(&image).await {
            Ok(text) => text,
            Err(e) => return self.fail(CaptureError::RecognitionFailed(format!("{:#}", e))).await,
        };
        debug!(text = %recognized.text, "OCR text");

        let extracted = parse_fib_levels(&recognized.text);
        if extracted.is_empty() {
            return self.fail(CaptureError::NoLevelsFound).await;
        }

        let found = extracted.len();
        {
            let mut state = self.state.write().await;
            state.fib_prices = extracted;
            state.status = CaptureStatus::Succeeded(found);
            state.last_success_at = Some(Utc::now());
        }
        info!(found = found, "Extracted fib levels");

        CaptureOutcome::Succeeded(found)
    }

    async fn set_status(&self, status: CaptureStatus) {
        self.state.write().await.status = status;
    }

    async fn fail(&self, error: CaptureError) -> CaptureOutcome {
        warn!(error = %error, "Capture attempt failed");
        self.set_status(CaptureStatus::Failed(error.clone())).await;
        CaptureOutcome::Failed(error)
    }
}
