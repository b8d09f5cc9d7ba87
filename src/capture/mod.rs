//! Screenshot capture and OCR orchestration feeding the Fibonacci label parser.

mod file_capture;
mod service;
mod session;
mod status;
mod tesseract;

pub use file_capture::FileCapture;
pub use service::{CaptureRegion, CapturedImage, RecognizedText, ScreenCapture, TextRecognizer};
pub use session::CaptureSession;
pub use status::{CaptureError, CaptureOutcome, CaptureStatus};
pub use tesseract::TesseractOcr;
