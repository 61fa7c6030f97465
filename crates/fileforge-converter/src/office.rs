//! Headless office-suite conversions (LibreOffice `soffice`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::{debug, info};

use crate::catalog::OfficeFormat;
use crate::error::ConversionError;
use crate::executor::ProcessSupervisor;
use crate::filesystem::FsUtils;
use crate::staging::StagedFile;

/// Import filter that makes Writer open PDFs as editable documents.
const PDF_IMPORT_FILTER: &str = "--infilter=writer_pdf_import";

/// Characters escaped when a profile path becomes a `file://` URL.
const URL_PATH: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'%').add(b'?');

/// Drives the office suite in batch mode.
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    binary: String,
    work_root: PathBuf,
    timeout: Duration,
    supervisor: ProcessSupervisor,
}

impl OfficeConverter {
    /// Create a converter writing per-run directories under `work_root`.
    pub fn new(
        binary: impl Into<String>,
        work_root: impl Into<PathBuf>,
        timeout: Duration,
        supervisor: ProcessSupervisor,
    ) -> Self {
        Self {
            binary: binary.into(),
            work_root: work_root.into(),
            timeout,
            supervisor,
        }
    }

    /// Command-line arguments for converting `input` into `outdir`, with the
    /// suite's user profile kept in `profile_dir`.
    pub fn build_args(input: &str, format: OfficeFormat, outdir: &str, profile_dir: &str) -> Vec<String> {
        let mut args = vec![
            "--headless".to_string(),
            format!("-env:UserInstallation={}", profile_url(profile_dir)),
        ];
        if FsUtils::extension_lower(input).as_deref() == Some("pdf") {
            args.push(PDF_IMPORT_FILTER.to_string());
        }
        args.extend([
            "--convert-to".to_string(),
            format.convert_to_arg().to_string(),
            "--outdir".to_string(),
            outdir.to_string(),
            input.to_string(),
        ]);
        args
    }

    /// Convert `input` and move the result to `dest`, replacing any file there.
    ///
    /// Each run gets its own directory holding the output and a private user
    /// profile, so concurrent runs never hand off to one another. The
    /// directory is removed on every path.
    pub async fn convert(
        &self,
        input: &StagedFile,
        format: OfficeFormat,
        dest: &Path,
    ) -> Result<(), ConversionError> {
        let run_dir = tempfile::Builder::new()
            .prefix("office_conv_")
            .tempdir_in(&self.work_root)?;
        let outdir = run_dir.path().join("out");
        let profile = run_dir.path().join("profile");
        tokio::fs::create_dir(&outdir).await?;

        let args = Self::build_args(input.path_str()?, format, utf8(&outdir)?, utf8(&profile)?);
        debug!(program = %self.binary, args = ?args, "Invoking office suite");

        let output = self
            .supervisor
            .run(&self.binary, &args, None, self.timeout)
            .await?;
        if !output.stdout.trim().is_empty() {
            debug!(output = %output.stdout.trim(), "Office suite output");
        }

        let produced = locate_output(&outdir, input.path(), format.extension()).await?;
        FsUtils::move_replace(&produced, dest).await?;

        info!(
            input = %input.original_name(),
            format = format.extension(),
            elapsed_ms = output.elapsed.as_millis() as u64,
            "Office conversion completed"
        );
        Ok(())
    }
}

fn utf8(path: &Path) -> Result<&str, ConversionError> {
    path.to_str().ok_or_else(|| ConversionError::InvalidUtf8Path {
        path: path.to_path_buf(),
    })
}

/// `file://` URL for an absolute local path.
fn profile_url(path: &str) -> String {
    let path = path.replace('\\', "/");
    let encoded = utf8_percent_encode(&path, URL_PATH);
    if path.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}

/// `<input stem>.<ext>` in `dir`, or else the first file whose extension
/// matches case-insensitively.
async fn locate_output(dir: &Path, input: &Path, extension: &str) -> Result<PathBuf, ConversionError> {
    if let Some(stem) = input.file_stem().and_then(|s| s.to_str()) {
        let expected = dir.join(format!("{stem}.{extension}"));
        if tokio::fs::try_exists(&expected).await.unwrap_or(false) {
            return Ok(expected);
        }
    }

    let suffix = format!(".{}", extension.to_ascii_lowercase());
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
        if name.ends_with(&suffix) && entry.file_type().await?.is_file() {
            return Ok(entry.path());
        }
    }

    Err(ConversionError::OutputMissing {
        extension: extension.to_string(),
    })
}
