//! Conversion orchestrator: validates a request against its tool, stages the
//! uploads, runs the tool's back end and reports a [`ConversionOutcome`].

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fileforge_core::config::ConverterConfig;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::{ToolDescriptor, ToolOperation};
use crate::error::ConversionError;
use crate::executor::ProcessSupervisor;
use crate::filesystem::FsUtils;
use crate::imaging::{self, EncodedImage};
use crate::markdown;
use crate::media::MediaTranscoder;
use crate::models::{ConversionOutcome, ConversionParams, ConversionRequest, UploadedFile};
use crate::office::OfficeConverter;
use crate::pdf::{ImageInput, PdfEngine};
use crate::staging::{StagedFile, StagingArea};
use crate::tabular;

/// Message and label of a finished conversion.
struct Produced {
    message: String,
    label: String,
}

impl Produced {
    fn new(message: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            label: label.into(),
        }
    }
}

/// Runs one conversion per call. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct ConversionOrchestrator {
    staging: StagingArea,
    supervisor: ProcessSupervisor,
    office: OfficeConverter,
    media: MediaTranscoder,
    pdf: PdfEngine,
    retention: Duration,
}

impl ConversionOrchestrator {
    /// Build the orchestrator and create the temp layout.
    ///
    /// Cancelling `cancel` kills every supervised child process.
    pub fn new(config: &ConverterConfig, cancel: CancellationToken) -> Result<Self, ConversionError> {
        let staging = StagingArea::new(config.effective_temp_root())?;
        let supervisor = ProcessSupervisor::new(cancel);
        let timeout = Duration::from_secs(config.conversion_timeout_seconds);

        let office = OfficeConverter::new(
            config.office_binary.clone(),
            staging.work_dir(),
            timeout,
            supervisor.clone(),
        );
        let media = MediaTranscoder::new(
            config.media_binary.clone(),
            timeout,
            Duration::from_secs(config.probe_timeout_seconds),
            supervisor.clone(),
        );
        let pdf = PdfEngine::new(config.pdfium_library_dir.clone(), config.render_dpi);

        info!(
            temp_root = %staging.root().display(),
            office = %config.office_binary,
            media = %config.media_binary,
            "Conversion orchestrator ready"
        );

        Ok(Self {
            staging,
            supervisor,
            office,
            media,
            pdf,
            retention: Duration::from_secs(config.output_retention_minutes * 60),
        })
    }

    /// The temp area holding staged inputs and finished outputs.
    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Token that cancels running child processes.
    pub fn cancel_token(&self) -> &CancellationToken {
        self.supervisor.cancel_token()
    }

    /// Whether the media transcoder is installed.
    pub async fn media_available(&self) -> bool {
        self.media.is_available().await
    }

    /// Whether the PDFium library can be bound.
    pub async fn pdf_available(&self) -> bool {
        let pdf = self.pdf.clone();
        task::spawn_blocking(move || pdf.is_available())
            .await
            .unwrap_or(false)
    }

    /// Remove outputs older than the configured retention.
    pub async fn sweep_expired_outputs(&self) -> Result<u64, ConversionError> {
        self.staging.sweep_expired(self.retention).await
    }

    /// Run `tool` on `request`.
    ///
    /// Staged inputs are removed on every path; a partially written output
    /// is removed on failure.
    pub async fn convert(
        &self,
        tool: &ToolDescriptor,
        request: ConversionRequest,
    ) -> Result<ConversionOutcome, ConversionError> {
        let started = Instant::now();
        let ConversionRequest { files, params } = request;
        let files = select_inputs(tool, files)?;
        if matches!(tool.operation, ToolOperation::ImageResize | ToolOperation::ImageCompress) {
            params.validate()?;
        }

        let mut staged = Vec::with_capacity(files.len());
        for file in &files {
            staged.push(self.staging.stage(&file.name, &file.data).await?);
        }

        let output_name = output_name_for(tool, &files[0], &params);
        let output_path = self.staging.output_path(&output_name);
        debug!(tool = tool.id, inputs = files.len(), output = %output_name, "Starting conversion");

        let result = self
            .run(tool, &files, &staged, &params, &output_path)
            .await;
        drop(staged);

        let produced = match result {
            Ok(produced) => produced,
            Err(e) => {
                remove_partial(&output_path).await;
                warn!(tool = tool.id, error = %e, "Conversion failed");
                return Err(e);
            }
        };

        let size = tokio::fs::metadata(&output_path).await?.len();
        let elapsed = started.elapsed();
        info!(
            tool = tool.id,
            output = %output_name,
            bytes = size,
            elapsed_ms = elapsed.as_millis() as u64,
            "Conversion succeeded"
        );
        Ok(ConversionOutcome::success(
            produced.message,
            produced.label,
            output_name,
            size,
            elapsed,
        ))
    }

    async fn run(
        &self,
        tool: &ToolDescriptor,
        files: &[UploadedFile],
        staged: &[StagedFile],
        params: &ConversionParams,
        dest: &Path,
    ) -> Result<Produced, ConversionError> {
        let first = &files[0];
        let input = &staged[0];

        match tool.operation {
            ToolOperation::Office(format) => {
                self.office.convert(input, format, dest).await?;
                Ok(office_produced(tool))
            }
            ToolOperation::PdfMerge => {
                let inputs: Vec<PathBuf> = staged.iter().map(|s| s.path().to_path_buf()).collect();
                let (pdf, dest) = (self.pdf.clone(), dest.to_path_buf());
                task::spawn_blocking(move || {
                    let refs: Vec<&Path> = inputs.iter().map(PathBuf::as_path).collect();
                    pdf.merge(&refs, &dest)
                })
                .await??;
                Ok(Produced::new("PDFs merged successfully!", "PDF Merge"))
            }
            ToolOperation::PdfSplit => {
                let (pdf, input, dest) = (self.pdf.clone(), input.path().to_path_buf(), dest.to_path_buf());
                let pages = task::spawn_blocking(move || pdf.split(&input, &dest)).await??;
                Ok(Produced::new(format!("PDF split into {pages} pages!"), "PDF Split"))
            }
            ToolOperation::PdfCompress => {
                let (pdf, input, dest) = (self.pdf.clone(), input.path().to_path_buf(), dest.to_path_buf());
                task::spawn_blocking(move || pdf.compress(&input, &dest)).await??;
                Ok(Produced::new("PDF compressed successfully!", "PDF Compress"))
            }
            ToolOperation::PdfToImages => {
                let (pdf, input, dest) = (self.pdf.clone(), input.path().to_path_buf(), dest.to_path_buf());
                let base = FsUtils::sanitize_stem(&first.name);
                task::spawn_blocking(move || pdf.render_pages(&input, &base, &dest)).await??;
                Ok(Produced::new("PDF converted to images successfully!", "PDF → Images"))
            }
            ToolOperation::ImagesToPdf => {
                let uploads = files.to_vec();
                let (pdf, dest) = (self.pdf.clone(), dest.to_path_buf());
                task::spawn_blocking(move || {
                    let inputs: Vec<ImageInput<'_>> = uploads
                        .iter()
                        .map(|f| ImageInput {
                            name: &f.name,
                            data: &f.data,
                        })
                        .collect();
                    pdf.images_to_pdf(&inputs, &dest)
                })
                .await??;
                Ok(Produced::new("Images converted to PDF!", "Images → PDF"))
            }
            ToolOperation::ImageConvert(target) => {
                let (from, to) = (first.extension_label(), target.extension().to_ascii_uppercase());
                self.encode_image(first, dest, move |data, name| imaging::convert(data, name, target))
                    .await?;
                Ok(Produced::new(format!("{from} converted to {to}!"), format!("{from} → {to}")))
            }
            ToolOperation::ImageResize => {
                let (width, height) = (params.width, params.height);
                self.encode_image(first, dest, move |data, name| {
                    imaging::resize(data, name, width, height)
                })
                .await?;
                Ok(Produced::new(
                    format!("Image resized to {width}x{height}!"),
                    "Image Resize",
                ))
            }
            ToolOperation::ImageCompress => {
                let quality = params.quality;
                self.encode_image(first, dest, move |data, name| {
                    imaging::compress(data, name, quality)
                })
                .await?;
                Ok(Produced::new("Image compressed successfully!", "Image Compress"))
            }
            ToolOperation::ImageGrayscale => {
                self.encode_image(first, dest, imaging::grayscale).await?;
                Ok(Produced::new("Image converted to grayscale!", "Image → Grayscale"))
            }
            ToolOperation::CsvToJson => {
                let json = tabular::csv_to_json(&first.data)?;
                tokio::fs::write(dest, json).await?;
                Ok(Produced::new("CSV converted to JSON!", "CSV → JSON"))
            }
            ToolOperation::JsonToCsv => {
                let csv = tabular::json_to_csv(&first.data)?;
                tokio::fs::write(dest, csv).await?;
                Ok(Produced::new("JSON converted to CSV!", "JSON → CSV"))
            }
            ToolOperation::MarkdownToHtml => {
                let text = String::from_utf8_lossy(&first.data);
                tokio::fs::write(dest, markdown::render_document(&text)).await?;
                Ok(Produced::new("Markdown converted to HTML!", "Markdown → HTML"))
            }
            ToolOperation::Media(format) => {
                self.media.transcode(input, format, dest).await?;
                let (from, to) = (first.extension_label(), format.extension().to_ascii_uppercase());
                Ok(Produced::new(format!("{from} converted to {to}!"), format!("{from} → {to}")))
            }
            ToolOperation::Unavailable { reason } => Err(ConversionError::NotImplemented(reason.to_string())),
        }
    }

    /// Decode/encode `file` off the runtime and write the result to `dest`.
    async fn encode_image<F>(&self, file: &UploadedFile, dest: &Path, op: F) -> Result<(), ConversionError>
    where
        F: FnOnce(&[u8], &str) -> Result<EncodedImage, ConversionError> + Send + 'static,
    {
        let upload = file.clone();
        let encoded = task::spawn_blocking(move || op(&upload.data, &upload.name)).await??;
        tokio::fs::write(dest, encoded.data).await?;
        Ok(())
    }
}

/// Check the upload count and extensions. Single-input tools keep only the
/// first file.
fn select_inputs(
    tool: &ToolDescriptor,
    mut files: Vec<UploadedFile>,
) -> Result<Vec<UploadedFile>, ConversionError> {
    if files.is_empty() {
        return Err(ConversionError::NoInput);
    }
    if !tool.takes_multiple_files() {
        files.truncate(1);
    }
    if let Some(rejected) = files.iter().find(|f| !tool.accepts(&f.name)) {
        return Err(ConversionError::UnsupportedFileType {
            tool: tool.id.to_string(),
            file_name: rejected.name.clone(),
            accepted: tool.accept_attribute(),
        });
    }
    Ok(files)
}

/// Unique output file name for a run of `tool` on `first`.
fn output_name_for(tool: &ToolDescriptor, first: &UploadedFile, params: &ConversionParams) -> String {
    let name = first.name.as_str();
    let image_ext = || imaging::output_format_for(name).1;
    match tool.operation {
        ToolOperation::Office(format) => FsUtils::generate_unique_filename(name, "", format.extension()),
        ToolOperation::PdfMerge => FsUtils::generate_unique_filename("merged", "", "pdf"),
        ToolOperation::PdfSplit => FsUtils::generate_unique_filename(name, "_split", "zip"),
        ToolOperation::PdfCompress => FsUtils::generate_unique_filename(name, "_compressed", "pdf"),
        ToolOperation::PdfToImages => FsUtils::generate_unique_filename(name, "_images", "zip"),
        ToolOperation::ImagesToPdf => FsUtils::generate_unique_filename("images", "", "pdf"),
        ToolOperation::ImageConvert(target) => {
            FsUtils::generate_unique_filename(name, "_converted", target.extension())
        }
        ToolOperation::ImageResize => FsUtils::generate_unique_filename(
            name,
            &format!("_{}x{}", params.width, params.height),
            image_ext(),
        ),
        ToolOperation::ImageCompress => FsUtils::generate_unique_filename(name, "_compressed", image_ext()),
        ToolOperation::ImageGrayscale => FsUtils::generate_unique_filename(name, "_grayscale", image_ext()),
        ToolOperation::CsvToJson => FsUtils::generate_unique_filename(name, "", "json"),
        ToolOperation::JsonToCsv => FsUtils::generate_unique_filename(name, "", "csv"),
        ToolOperation::MarkdownToHtml => FsUtils::generate_unique_filename(name, "", "html"),
        ToolOperation::Media(format) => FsUtils::generate_unique_filename(name, "", format.extension()),
        ToolOperation::Unavailable { .. } => FsUtils::generate_unique_filename(name, "", "bin"),
    }
}

/// "PDF → Word" becomes "PDF converted to Word successfully!".
fn office_produced(tool: &ToolDescriptor) -> Produced {
    let message = match tool.name.split_once(" → ") {
        Some((from, to)) => format!("{from} converted to {to} successfully!"),
        None => format!("{} completed successfully!", tool.name),
    };
    Produced::new(message, tool.name)
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial output"),
    }
}
