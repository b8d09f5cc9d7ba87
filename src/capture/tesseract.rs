//! OCR through the `tesseract` command-line engine.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{CapturedImage, RecognizedText, TextRecognizer};

const DEFAULT_LANGUAGE: &str = "eng";

/// Runs `tesseract stdin stdout` per image. The engine is probed once per
/// instance and the probe result reused for every later call.
pub struct TesseractOcr {
    program: PathBuf,
    language: String,
    version: OnceCell<String>,
}

impl TesseractOcr {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            version: OnceCell::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Engine version, probing the executable on first use.
    pub async fn version(&self) -> Result<&str> {
        self.version
            .get_or_try_init(|| async {
                let output = Command::new(&self.program)
                    .arg("--version")
                    .output()
                    .await
                    .with_context(|| format!("Failed to run {}", self.program.display()))?;

                if !output.status.success() {
                    anyhow::bail!("{} --version exited with {}", self.program.display(), output.status);
                }

                // Older releases print the banner on stderr
                let banner = if output.stdout.is_empty() {
                    output.stderr
                } else {
                    output.stdout
                };
                let version = first_line(&banner);
                info!(version = %version, "OCR engine ready");
                Ok(version)
            })
            .await
            .map(String::as_str)
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl TextRecognizer for TesseractOcr {
    async fn recognize(&self, image: &CapturedImage) -> Result<RecognizedText> {
        self.version().await?;
        let bytes = image.decode()?;

        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program.display()))?;

        let mut stdin = child.stdin.take().context("OCR process has no stdin")?;
        let write = async move {
            stdin.write_all(&bytes).await?;
            stdin.shutdown().await
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output.context("Failed to wait for OCR process")?;
        written.context("Failed to send image to OCR process")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("OCR exited with {}: {}", output.status, stderr.trim());
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "OCR finished");

        Ok(RecognizedText { text })
    }
}

fn first_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
