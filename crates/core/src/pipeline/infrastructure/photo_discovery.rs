use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::shared::constants::IMAGE_EXTENSIONS;

/// True for files whose extension is a known image type, ignoring case.
pub fn is_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// All photos under `root`, recursively, sorted by path.
///
/// Unreadable entries are logged and skipped.
pub fn discover_photos(root: &Path) -> Vec<PathBuf> {
    let mut photos: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_photo(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    photos.sort();
    photos
}
