//! Scratch-directory management for rendered page images.
//!
//! The store owns exactly one per-session temporary directory. The external
//! renderer writes image files into it; this module lists, deletes and
//! reports on them. The in-memory asset list is a cache of a directory scan
//! and must be explicitly refreshed to reflect external changes.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Asset;

/// Extensions recognized as image assets (lowercase).
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tiff", "bmp", "gif"];

/// Manages the per-session scratch directory and the assets inside it.
pub struct AssetStore {
    scratch_dir: Option<PathBuf>,
    tracked: Vec<Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self {
            scratch_dir: None,
            tracked: Vec::new(),
        }
    }

    /// Create the scratch directory, once per session.
    ///
    /// A second call before teardown is a no-op returning the existing
    /// directory; the directory is never silently recreated.
    pub fn create_scratch_dir(&mut self) -> Result<&Path> {
        if self.scratch_dir.is_none() {
            let dir = std::env::temp_dir().join(format!("pagepaste_{}", Uuid::new_v4().simple()));
            fs::create_dir_all(&dir)
                .map_err(|e| AppError::io(format!("failed to create scratch directory: {}", e)))?;
            info!("Scratch directory created: {:?}", dir);
            self.scratch_dir = Some(dir);
        }

        Ok(self.scratch_dir.as_deref().unwrap())
    }

    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch_dir.as_deref()
    }

    /// Rescan the scratch directory and return the refreshed asset list.
    ///
    /// Only direct children with an image extension count. The result is
    /// ordered by last-modified time ascending. A missing or unreadable
    /// directory yields an empty list, not an error.
    pub fn list_assets(&mut self) -> Vec<Asset> {
        self.tracked.clear();

        let Some(dir) = self.scratch_dir.as_deref() else {
            return Vec::new();
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Scratch directory unreadable, treating as empty: {}", e);
                return Vec::new();
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !has_image_extension(&path) {
                continue;
            }
            match entry.metadata() {
                Ok(meta) if meta.is_file() => {
                    let modified = meta.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                    self.tracked.push(Asset::new(path, modified, meta.len()));
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry {:?}: {}", path, e),
            }
        }

        // Stable order for equal timestamps
        self.tracked
            .sort_by(|a, b| a.modified().cmp(&b.modified()).then_with(|| a.path().cmp(b.path())));

        self.tracked.clone()
    }

    /// Currently tracked assets, as of the last scan.
    pub fn tracked(&self) -> &[Asset] {
        &self.tracked
    }

    /// Best-effort deletion of the given paths.
    ///
    /// A path that no longer exists counts as already deleted. Individual
    /// failures are tallied and logged, never raised. Returns the number of
    /// paths no longer on disk afterwards.
    pub fn delete_assets(&mut self, paths: &[PathBuf]) -> usize {
        let mut removed = 0;
        let mut failures = 0;

        for path in paths {
            if !path.exists() {
                removed += 1;
            } else {
                match fs::remove_file(path) {
                    Ok(()) => {
                        info!("Deleted asset {:?}", path);
                        removed += 1;
                    }
                    Err(e) => {
                        warn!("Failed to delete {:?}: {}", path, e);
                        failures += 1;
                    }
                }
            }
        }

        if failures > 0 {
            warn!("{} of {} deletions failed", failures, paths.len());
        }

        self.tracked.retain(|asset| asset.exists());
        removed
    }

    /// Delete every currently tracked asset.
    pub fn clear_all(&mut self) -> usize {
        let paths: Vec<PathBuf> = self.tracked.iter().map(|a| a.path().to_path_buf()).collect();
        self.delete_assets(&paths)
    }

    /// Human-facing summary of the tracked assets: count plus total size in
    /// a size-appropriate unit.
    pub fn describe(&self) -> String {
        let existing: Vec<&Asset> = self.tracked.iter().filter(|a| a.exists()).collect();
        let total: u64 = existing.iter().map(|a| a.size()).sum();
        format!("{} assets, {}", existing.len(), format_size(total))
    }

    /// Output path for the renderer: `<doc>_第<page>页_<timestamp>.png`
    /// inside the scratch directory.
    ///
    /// `page` is 1-based, matching what the user sees.
    pub fn asset_path_for(&self, doc_stem: &str, page: u32) -> Result<PathBuf> {
        let dir = self
            .scratch_dir
            .as_deref()
            .ok_or_else(|| AppError::io("scratch directory not created"))?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        Ok(dir.join(format!("{}_第{}页_{}.png", doc_stem, page, timestamp)))
    }

    /// Session teardown: best-effort delete of all tracked assets, then
    /// removal of the (expected-empty) scratch directory.
    ///
    /// A non-empty or permission-denied directory removal is a warning,
    /// not a fatal error.
    pub fn teardown(&mut self) {
        self.list_assets();
        let removed = self.clear_all();
        if removed > 0 {
            info!("Removed {} assets during teardown", removed);
        }

        if let Some(dir) = self.scratch_dir.take() {
            match fs::remove_dir(&dir) {
                Ok(()) => info!("Scratch directory removed: {:?}", dir),
                Err(e) => warn!("Could not remove scratch directory {:?}: {}", dir, e),
            }
        }
    }
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new()
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Render a byte count in bytes/KB/MB with a 1024 threshold.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::{Duration, SystemTime};

    fn write_file(dir: &Path, name: &str, contents: &[u8], modified: SystemTime) {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_create_scratch_dir_is_idempotent() {
        let mut store = AssetStore::new();
        let first = store.create_scratch_dir().unwrap().to_path_buf();
        let second = store.create_scratch_dir().unwrap().to_path_buf();
        assert_eq!(first, second);
        assert!(first.exists());

        store.teardown();
        assert!(!first.exists());
    }

    #[test]
    fn test_list_assets_without_scratch_dir() {
        let mut store = AssetStore::new();
        assert!(store.list_assets().is_empty());
    }

    #[test]
    fn test_list_assets_after_external_dir_removal() {
        let mut store = AssetStore::new();
        let dir = store.create_scratch_dir().unwrap().to_path_buf();
        fs::remove_dir(&dir).unwrap();
        assert!(store.list_assets().is_empty());
    }

    #[test]
    fn test_list_assets_filters_and_orders_by_mtime() {
        let mut store = AssetStore::new();
        let dir = store.create_scratch_dir().unwrap().to_path_buf();

        let base = SystemTime::now() - Duration::from_secs(600);
        write_file(&dir, "c.png", b"ccc", base + Duration::from_secs(30));
        write_file(&dir, "a.png", b"a", base + Duration::from_secs(10));
        write_file(&dir, "b.JPG", b"bb", base + Duration::from_secs(20));
        write_file(&dir, "notes.txt", b"skip me", base);

        let assets = store.list_assets();
        let names: Vec<String> = assets.iter().map(|a| a.file_name()).collect();
        assert_eq!(names, vec!["a.png", "b.JPG", "c.png"]);

        store.teardown();
    }

    #[test]
    fn test_delete_assets_tolerates_missing_paths() {
        let mut store = AssetStore::new();
        let dir = store.create_scratch_dir().unwrap().to_path_buf();
        write_file(&dir, "page.png", b"data", SystemTime::now());
        store.list_assets();

        let existing = dir.join("page.png");
        let ghost = dir.join("already-gone.png");
        let removed = store.delete_assets(&[existing.clone(), ghost]);
        assert_eq!(removed, 2);
        assert!(!existing.exists());
        assert!(store.tracked().is_empty());

        store.teardown();
    }

    #[test]
    fn test_clear_all_removes_everything_tracked() {
        let mut store = AssetStore::new();
        let dir = store.create_scratch_dir().unwrap().to_path_buf();
        write_file(&dir, "1.png", b"x", SystemTime::now());
        write_file(&dir, "2.png", b"y", SystemTime::now());
        store.list_assets();

        assert_eq!(store.clear_all(), 2);
        assert!(store.list_assets().is_empty());

        store.teardown();
    }

    #[test]
    fn test_describe_counts_existing_assets() {
        let mut store = AssetStore::new();
        let dir = store.create_scratch_dir().unwrap().to_path_buf();
        write_file(&dir, "1.png", &[0u8; 512], SystemTime::now());
        write_file(&dir, "2.png", &[0u8; 512], SystemTime::now());
        store.list_assets();

        assert_eq!(store.describe(), "2 assets, 1.0 KB");

        store.teardown();
    }

    #[test]
    fn test_asset_path_for_names_and_location() {
        let mut store = AssetStore::new();
        let dir = store.create_scratch_dir().unwrap().to_path_buf();

        let path = store.asset_path_for("report", 3).unwrap();
        assert_eq!(path.parent().unwrap(), dir);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("report_第3页_"));
        assert!(name.ends_with(".png"));

        store.teardown();
    }

    #[test]
    fn test_asset_path_for_requires_scratch_dir() {
        let store = AssetStore::new();
        assert!(matches!(
            store.asset_path_for("doc", 1),
            Err(AppError::Io(_))
        ));
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
