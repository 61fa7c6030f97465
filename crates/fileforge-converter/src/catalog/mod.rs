//! Tool catalog: the fixed, ordered registry of conversion tools.
//!
//! Each [`ToolDescriptor`] carries the [`ToolOperation`] it dispatches to, so
//! the request layer and the orchestrator never branch on tool-id strings.

mod tools;

use std::fmt;
use std::str::FromStr;

use image::ImageFormat;
use serde::Serialize;

use crate::filesystem::FsUtils;

/// Top-level grouping of tools, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ToolCategory {
    /// PDF manipulation and office ↔ PDF.
    #[serde(rename = "PDF")]
    Pdf,
    /// Raster image tools.
    Image,
    /// Spreadsheet and tabular data.
    Spreadsheet,
    /// Text and markup documents.
    Document,
    /// Audio and video.
    Media,
}

impl ToolCategory {
    /// Display name, also used as the stats key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Image => "Image",
            Self::Spreadsheet => "Spreadsheet",
            Self::Document => "Document",
            Self::Media => "Media",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "image" => Ok(Self::Image),
            "spreadsheet" => Ok(Self::Spreadsheet),
            "document" => Ok(Self::Document),
            "media" => Ok(Self::Media),
            other => Err(format!("Unknown tool category: {other}")),
        }
    }
}

/// Output format requested from the office suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeFormat {
    /// Word document.
    Docx,
    /// PDF.
    Pdf,
    /// Excel workbook.
    Xlsx,
    /// Comma-separated values.
    Csv,
    /// UTF-8 plain text.
    Txt,
}

impl OfficeFormat {
    /// Extension of the produced file.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }

    /// Argument passed to `--convert-to`.
    pub fn convert_to_arg(&self) -> &'static str {
        match self {
            Self::Txt => "txt:Text (encoded):UTF8",
            other => other.extension(),
        }
    }
}

/// Target of a plain image format conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget {
    /// PNG.
    Png,
    /// JPEG, transparency flattened onto white.
    Jpeg,
    /// Lossless WebP.
    Webp,
}

impl ImageTarget {
    /// Output file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    /// Encoder format.
    pub fn image_format(&self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Webp => ImageFormat::WebP,
        }
    }
}

/// Audio container produced by the media transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    /// MPEG layer III.
    Mp3,
    /// PCM WAV.
    Wav,
}

impl MediaFormat {
    /// Output file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

/// What a tool does when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOperation {
    /// Headless office-suite conversion.
    Office(OfficeFormat),
    /// Concatenate PDFs in upload order.
    PdfMerge,
    /// One single-page PDF per page, zipped.
    PdfSplit,
    /// Reload and re-save without security handler.
    PdfCompress,
    /// Rasterize every page to PNG, zipped.
    PdfToImages,
    /// One PDF page per image.
    ImagesToPdf,
    /// Re-encode an image in another format.
    ImageConvert(ImageTarget),
    /// Exact width × height resize.
    ImageResize,
    /// Re-encode at a quality factor.
    ImageCompress,
    /// 8-bit luma.
    ImageGrayscale,
    /// CSV → JSON array of objects.
    CsvToJson,
    /// JSON array of objects → CSV.
    JsonToCsv,
    /// Limited Markdown → standalone HTML.
    MarkdownToHtml,
    /// Audio extraction or transcoding.
    Media(MediaFormat),
    /// Listed but without a working back end.
    Unavailable {
        /// Message reported to the user.
        reason: &'static str,
    },
}

impl ToolOperation {
    /// Whether the operation consumes every uploaded file rather than the first.
    pub fn takes_multiple_files(&self) -> bool {
        matches!(self, Self::PdfMerge | Self::ImagesToPdf)
    }
}

/// Immutable description of one tool.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique key used in URLs.
    pub id: &'static str,
    /// Display name, e.g. "PDF → Word".
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Category.
    pub category: ToolCategory,
    /// Source format label.
    pub source_format: &'static str,
    /// Target format label.
    pub target_format: &'static str,
    /// Accepted extensions, lower case, without dot.
    pub accepted_extensions: &'static [&'static str],
    /// UI icon.
    pub icon: &'static str,
    /// UI accent color.
    pub color: &'static str,
    /// Shown on the home page.
    pub popular: bool,
    /// Dispatch target.
    #[serde(skip)]
    pub operation: ToolOperation,
}

impl ToolDescriptor {
    /// Case-insensitive extension check against the accepted list.
    pub fn accepts(&self, file_name: &str) -> bool {
        FsUtils::extension_lower(file_name)
            .is_some_and(|ext| self.accepted_extensions.contains(&ext.as_str()))
    }

    /// `accept` attribute value for an HTML file input (`.pdf,.docx`).
    pub fn accept_attribute(&self) -> String {
        self.accepted_extensions
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Whether the upload form should allow several files.
    pub fn takes_multiple_files(&self) -> bool {
        self.operation.takes_multiple_files()
    }
}

/// Read-only registry populated once at startup.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// The built-in tool list.
    pub fn builtin() -> Self {
        Self {
            tools: tools::builtin_tools(),
        }
    }

    /// All tools, in registration order.
    pub fn list_all(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Popular tools, order preserved.
    pub fn list_popular(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().filter(|t| t.popular).collect()
    }

    /// Tools grouped by category; categories appear in first-seen order.
    pub fn group_by_category(&self) -> Vec<(ToolCategory, Vec<&ToolDescriptor>)> {
        let mut groups: Vec<(ToolCategory, Vec<&ToolDescriptor>)> = Vec::new();
        for tool in &self.tools {
            match groups.iter_mut().find(|(c, _)| *c == tool.category) {
                Some((_, list)) => list.push(tool),
                None => groups.push((tool.category, vec![tool])),
            }
        }
        groups
    }

    /// Tools of one category, order preserved.
    pub fn by_category(&self, category: ToolCategory) -> Vec<&ToolDescriptor> {
        self.tools.iter().filter(|t| t.category == category).collect()
    }

    /// Exact id lookup.
    pub fn find_by_id(&self, id: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
