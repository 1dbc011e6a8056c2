use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One rendered image file inside the scratch directory, the unit of
/// clipboard transfer.
///
/// Metadata is captured at scan time; existence is re-checked lazily since
/// the file can disappear between a directory refresh and a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    path: PathBuf,
    modified: SystemTime,
    size: u64,
}

impl Asset {
    pub fn new(path: PathBuf, modified: SystemTime, size: u64) -> Self {
        Self {
            path,
            modified,
            size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Size in bytes as recorded at scan time.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the file is still on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Display name for logs and progress reporting.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let asset = Asset::new(
            PathBuf::from("/tmp/scratch/report_p1.png"),
            SystemTime::UNIX_EPOCH,
            42,
        );
        assert_eq!(asset.file_name(), "report_p1.png");
        assert_eq!(asset.size(), 42);
    }

    #[test]
    fn test_exists_is_lazy() {
        let asset = Asset::new(
            PathBuf::from("/nonexistent/definitely-missing.png"),
            SystemTime::UNIX_EPOCH,
            0,
        );
        assert!(!asset.exists());
    }
}
