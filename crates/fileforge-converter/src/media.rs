//! Audio/video transcoding through an external `ffmpeg`.

use std::path::Path;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::catalog::MediaFormat;
use crate::error::ConversionError;
use crate::executor::ProcessSupervisor;
use crate::staging::StagedFile;

/// Transcoder wrapper with a cached presence probe.
#[derive(Debug)]
pub struct MediaTranscoder {
    binary: String,
    timeout: Duration,
    probe_timeout: Duration,
    supervisor: ProcessSupervisor,
    available: OnceCell<bool>,
}

impl MediaTranscoder {
    /// Create a transcoder. The binary is not probed until first use.
    pub fn new(
        binary: impl Into<String>,
        timeout: Duration,
        probe_timeout: Duration,
        supervisor: ProcessSupervisor,
    ) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            probe_timeout,
            supervisor,
            available: OnceCell::new(),
        }
    }

    /// Whether `<binary> -version` succeeds. Probed once per process.
    pub async fn is_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| async {
                let available = self
                    .supervisor
                    .probe(&self.binary, ["-version"], self.probe_timeout)
                    .await;
                if available {
                    info!(program = %self.binary, "Media transcoder detected");
                } else {
                    warn!(program = %self.binary, "Media transcoder not available; media tools disabled");
                }
                available
            })
            .await
    }

    /// Transcode `input` into `dest`. The container follows `dest`'s extension.
    pub async fn transcode(
        &self,
        input: &StagedFile,
        format: MediaFormat,
        dest: &Path,
    ) -> Result<(), ConversionError> {
        if !self.is_available().await {
            return Err(ConversionError::DependencyMissing {
                dependency: "FFmpeg".to_string(),
                hint: "Please install FFmpeg to use media conversion tools. Visit https://ffmpeg.org/download.html"
                    .to_string(),
            });
        }

        let dest_str = dest
            .to_str()
            .ok_or_else(|| ConversionError::InvalidUtf8Path {
                path: dest.to_path_buf(),
            })?;
        let args = ["-y", "-i", input.path_str()?, "-q:a", "2", dest_str];

        let output = self.supervisor.run(&self.binary, args, None, self.timeout).await?;
        if !tokio::fs::try_exists(dest).await.unwrap_or(false) {
            return Err(ConversionError::OutputMissing {
                extension: format.extension().to_string(),
            });
        }

        info!(
            input = %input.original_name(),
            format = format.extension(),
            elapsed_ms = output.elapsed.as_millis() as u64,
            "Media conversion completed"
        );
        Ok(())
    }
}
