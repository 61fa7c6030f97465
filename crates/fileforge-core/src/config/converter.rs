//! Conversion pipeline configuration: temp layout, external binaries,
//! timeouts and output retention.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration for the conversion orchestrator.
///
/// External binaries are resolved through `PATH` unless given as absolute
/// paths.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Root directory for staged inputs, outputs and office work dirs.
    /// Defaults to `<os temp>/file-converter`.
    pub temp_root: Option<PathBuf>,

    /// Headless office suite executable (LibreOffice `soffice`).
    pub office_binary: String,

    /// Media transcoder executable (`ffmpeg`).
    pub media_binary: String,

    /// Directory containing the PDFium shared library. When unset the
    /// system library search path is used.
    pub pdfium_library_dir: Option<PathBuf>,

    /// Bounded wait for a single office/media conversion process.
    #[validate(range(min = 1, max = 3600))]
    pub conversion_timeout_seconds: u64,

    /// Bounded wait for the transcoder presence probe.
    #[validate(range(min = 1, max = 60))]
    pub probe_timeout_seconds: u64,

    /// Rasterization resolution for PDF → images.
    #[validate(range(min = 36, max = 600))]
    pub render_dpi: u16,

    /// Age after which unclaimed output files are reclaimed.
    #[validate(range(min = 1))]
    pub output_retention_minutes: u64,

    /// Interval between retention sweeps.
    #[validate(range(min = 1))]
    pub sweep_interval_seconds: u64,

    /// Remove an output file once it has been streamed to the client.
    pub delete_after_download: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            office_binary: default_office_binary(),
            media_binary: default_media_binary(),
            pdfium_library_dir: None,
            conversion_timeout_seconds: default_conversion_timeout(),
            probe_timeout_seconds: default_probe_timeout(),
            render_dpi: default_render_dpi(),
            output_retention_minutes: default_output_retention(),
            sweep_interval_seconds: default_sweep_interval(),
            delete_after_download: false,
        }
    }
}

impl ConverterConfig {
    /// Resolve the effective temp root directory.
    pub fn effective_temp_root(&self) -> PathBuf {
        self.temp_root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("file-converter"))
    }
}

fn default_office_binary() -> String {
    "soffice".to_string()
}

fn default_media_binary() -> String {
    "ffmpeg".to_string()
}

fn default_conversion_timeout() -> u64 {
    120
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_render_dpi() -> u16 {
    150
}

fn default_output_retention() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = ConverterConfig::default();
        assert_eq!(config.office_binary, "soffice");
        assert_eq!(config.media_binary, "ffmpeg");
        assert_eq!(config.conversion_timeout_seconds, 120);
        assert_eq!(config.probe_timeout_seconds, 5);
        assert_eq!(config.render_dpi, 150);
        assert!(!config.delete_after_download);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_effective_temp_root_prefers_explicit() {
        let config = ConverterConfig {
            temp_root: Some(PathBuf::from("/srv/fileforge/tmp")),
            ..Default::default()
        };
        assert_eq!(
            config.effective_temp_root(),
            PathBuf::from("/srv/fileforge/tmp")
        );

        let fallback = ConverterConfig::default().effective_temp_root();
        assert!(fallback.ends_with("file-converter"));
    }

    #[test]
    fn test_render_dpi_range_validated() {
        let config = ConverterConfig {
            render_dpi: 5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
