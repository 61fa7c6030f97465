//! Filename and filesystem helpers shared by the conversion back ends.

use std::path::Path;

use uuid::Uuid;

use crate::error::ConversionError;

/// Filesystem utility functions.
pub struct FsUtils;

impl FsUtils {
    /// Longest stem kept from an uploaded file name.
    const MAX_STEM_CHARS: usize = 200;
    /// Length of the `__<uuid simple>` uniqueness suffix.
    const UNIQUE_SUFFIX_LEN: usize = 34;

    /// Final path component of `name`, tolerating both separator styles.
    pub fn base_name(name: &str) -> &str {
        name.rsplit(['/', '\\']).next().unwrap_or(name)
    }

    /// Lower-cased extension of `name`, without the dot.
    pub fn extension_lower(name: &str) -> Option<String> {
        Path::new(Self::base_name(name))
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// Sanitize a filename stem for safe filesystem usage.
    pub fn sanitize_stem(filename: &str) -> String {
        let base = Self::base_name(filename);
        let stem = Path::new(base)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(base);

        let sanitized = Self::sanitize_chars(stem);
        if sanitized.is_empty() {
            "unnamed_file".to_string()
        } else {
            sanitized
        }
    }

    /// Sanitize a whole file name (stem and extension) for staging.
    pub fn sanitize_filename(filename: &str) -> String {
        let stem = Self::sanitize_stem(filename);
        match Self::extension_lower(filename) {
            Some(ext) if !ext.is_empty() => format!("{}.{}", stem, Self::sanitize_chars(&ext)),
            _ => stem,
        }
    }

    fn sanitize_chars(raw: &str) -> String {
        raw.chars()
            .filter_map(|c| {
                if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    Some(c)
                } else if c.is_whitespace() {
                    Some('_')
                } else {
                    None
                }
            })
            .take(Self::MAX_STEM_CHARS)
            .collect::<String>()
            .trim_matches('.')
            .to_string()
    }

    /// Generate an output name: `<stem><suffix>__<uuid v7>.<extension>`.
    ///
    /// The uuid keeps concurrent requests for the same upload name apart;
    /// [`FsUtils::display_name`] strips it again for the download header.
    pub fn generate_unique_filename(original_name: &str, suffix: &str, extension: &str) -> String {
        let stem = Self::sanitize_stem(original_name);
        let uuid = Uuid::now_v7().simple();
        format!(
            "{}{}__{}.{}",
            stem,
            suffix,
            uuid,
            extension.trim_start_matches('.')
        )
    }

    /// Strip the `__<uuid>` uniqueness suffix from a generated output name.
    pub fn display_name(file_name: &str) -> String {
        let path = Path::new(file_name);
        let (Some(stem), ext) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|e| e.to_str()),
        ) else {
            return file_name.to_string();
        };

        let clean = match stem.len().checked_sub(Self::UNIQUE_SUFFIX_LEN) {
            Some(split)
                if stem.is_char_boundary(split)
                    && stem[split..].starts_with("__")
                    && stem[split + 2..].chars().all(|c| c.is_ascii_hexdigit()) =>
            {
                &stem[..split]
            }
            _ => stem,
        };

        match ext {
            Some(ext) => format!("{clean}.{ext}"),
            None => clean.to_string(),
        }
    }

    /// MIME type served for a download, by extension.
    pub fn content_type_for(file_name: &str) -> &'static str {
        match Self::extension_lower(file_name).as_deref() {
            Some("pdf") => "application/pdf",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Some("pptx") => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("csv") => "text/csv",
            Some("json") => "application/json",
            Some("html") => "text/html",
            Some("txt") => "text/plain",
            Some("zip") => "application/zip",
            Some("mp3") => "audio/mpeg",
            Some("wav") => "audio/wav",
            _ => "application/octet-stream",
        }
    }

    /// Human-readable byte count: `B`, then `KB`/`MB` with one decimal.
    pub fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = 1024 * 1024;
        if bytes < KB {
            format!("{bytes} B")
        } else if bytes < MB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        }
    }

    /// Move `from` to `to`, replacing `to`. Falls back to copy + delete
    /// when the rename crosses filesystems.
    pub async fn move_replace(from: &Path, to: &Path) -> Result<(), ConversionError> {
        if tokio::fs::try_exists(to).await.unwrap_or(false) {
            tokio::fs::remove_file(to).await?;
        }
        match tokio::fs::rename(from, to).await {
            Ok(()) => Ok(()),
            Err(e) if e.raw_os_error() == Some(17) || e.raw_os_error() == Some(18) => {
                tokio::fs::copy(from, to).await?;
                tokio::fs::remove_file(from).await?;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
                tokio::fs::copy(from, to).await?;
                tokio::fs::remove_file(from).await?;
                Ok(())
            }
            Err(e) => Err(ConversionError::Io(e)),
        }
    }
}
