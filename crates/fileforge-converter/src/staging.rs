//! Temp-directory layout for staged inputs, finished outputs and office
//! work directories, plus the retention sweep over outputs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ConversionError;
use crate::filesystem::FsUtils;

const STAGING_DIR: &str = "staging";
const OUTPUTS_DIR: &str = "outputs";
const WORK_DIR: &str = "work";

/// Process-wide temp area. Every writer uses a collision-resistant name so
/// no locking is needed.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
    staging: PathBuf,
    outputs: PathBuf,
    work: PathBuf,
}

impl StagingArea {
    /// Create the directory layout under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ConversionError> {
        let root = root.into();
        let area = Self {
            staging: root.join(STAGING_DIR),
            outputs: root.join(OUTPUTS_DIR),
            work: root.join(WORK_DIR),
            root,
        };
        std::fs::create_dir_all(&area.staging)?;
        std::fs::create_dir_all(&area.outputs)?;
        std::fs::create_dir_all(&area.work)?;
        Ok(area)
    }

    /// Root of the temp area.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding finished outputs.
    pub fn outputs_dir(&self) -> &Path {
        &self.outputs
    }

    /// Parent of per-run office work directories.
    pub fn work_dir(&self) -> &Path {
        &self.work
    }

    /// Write an uploaded payload as `<uuid>_<sanitized name>` in the staging dir.
    pub async fn stage(&self, original_name: &str, data: &[u8]) -> Result<StagedFile, ConversionError> {
        let name = format!(
            "{}_{}",
            Uuid::new_v4().simple(),
            FsUtils::sanitize_filename(original_name)
        );
        let path = self.staging.join(name);
        tokio::fs::write(&path, data).await?;
        debug!(path = %path.display(), bytes = data.len(), "Staged input");
        Ok(StagedFile {
            path,
            original_name: original_name.to_string(),
        })
    }

    /// Path in the outputs directory for a generated output name.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.outputs.join(file_name)
    }

    /// Resolve a download name to an existing file inside the outputs dir.
    ///
    /// Returns `None` for absent files and for names that resolve outside
    /// the outputs root (`..`, absolute paths, symlinks pointing away).
    pub async fn resolve_download(&self, file_name: &str) -> Option<PathBuf> {
        if file_name.is_empty()
            || file_name.contains(['/', '\\'])
            || file_name == "."
            || file_name == ".."
        {
            return None;
        }

        let root = tokio::fs::canonicalize(&self.outputs).await.ok()?;
        let candidate = tokio::fs::canonicalize(self.outputs.join(file_name)).await.ok()?;
        if !candidate.starts_with(&root) {
            warn!(requested = %file_name, "Rejected download outside outputs root");
            return None;
        }
        let meta = tokio::fs::metadata(&candidate).await.ok()?;
        meta.is_file().then_some(candidate)
    }

    /// Remove outputs and stale work directories older than `max_age`.
    ///
    /// Returns how many entries were removed.
    pub async fn sweep_expired(&self, max_age: Duration) -> Result<u64, ConversionError> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::zero());

        let mut removed = 0u64;
        removed += sweep_dir(&self.outputs, cutoff).await?;
        removed += sweep_dir(&self.work, cutoff).await?;

        if removed > 0 {
            info!(removed = removed, "Retention sweep removed expired files");
        }
        Ok(removed)
    }
}

async fn sweep_dir(dir: &Path, cutoff: DateTime<Utc>) -> Result<u64, ConversionError> {
    let mut removed = 0u64;
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        let Ok(modified) = meta.modified() else {
            continue;
        };
        let modified: DateTime<Utc> = modified.into();
        if modified >= cutoff {
            continue;
        }

        let path = entry.path();
        let result = if meta.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        match result {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove expired entry"),
        }
    }

    Ok(removed)
}

/// A staged input file, deleted when dropped.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    original_name: String,
}

impl StagedFile {
    /// On-disk location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name as uploaded by the client.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Path as UTF-8, for passing to external converters.
    pub fn path_str(&self) -> Result<&str, ConversionError> {
        self.path
            .to_str()
            .ok_or_else(|| ConversionError::InvalidUtf8Path {
                path: self.path.clone(),
            })
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged input"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove staged input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_staged_file_removed_on_drop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let area = StagingArea::new(dir.path()).expect("area");

        let staged = area.stage("My Report.PDF", b"%PDF-1.7").await.expect("stage");
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert!(path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with("_My_Report.pdf")));
        assert_eq!(staged.original_name(), "My Report.PDF");

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_stage_names_never_collide() {
        let dir = tempfile::tempdir().expect("tempdir");
        let area = StagingArea::new(dir.path()).expect("area");
        let a = area.stage("same.txt", b"a").await.expect("stage");
        let b = area.stage("same.txt", b"b").await.expect("stage");
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_resolve_download_guards_traversal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let area = StagingArea::new(dir.path().join("tmp")).expect("area");
        tokio::fs::write(area.output_path("ok.pdf"), b"x").await.expect("write");
        tokio::fs::write(dir.path().join("secret.txt"), b"s").await.expect("write");

        assert!(area.resolve_download("ok.pdf").await.is_some());
        assert!(area.resolve_download("missing.pdf").await.is_none());
        assert!(area.resolve_download("../../secret.txt").await.is_none());
        assert!(area.resolve_download("..").await.is_none());
        assert!(area.resolve_download("").await.is_none());

        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(dir.path().join("secret.txt"), area.output_path("link.txt"))
                .expect("symlink");
            assert!(area.resolve_download("link.txt").await.is_none());
        }
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_outputs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let area = StagingArea::new(dir.path()).expect("area");
        let old = area.output_path("old.pdf");
        tokio::fs::write(&old, b"old").await.expect("write");

        tokio::time::sleep(Duration::from_millis(1100)).await;
        let fresh = area.output_path("fresh.pdf");
        tokio::fs::write(&fresh, b"fresh").await.expect("write");

        let removed = area.sweep_expired(Duration::from_secs(1)).await.expect("sweep");
        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
    }
}
