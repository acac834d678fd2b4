use crate::guess::MEDIA_EXTENSION;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Media files already organized below `show_dest`, relative and sorted.
pub fn list_organized(show_dest: &Path) -> Result<Vec<PathBuf>> {
    if !show_dest.is_dir() {
        tracing::warn!(path = %show_dest.display(), "destination directory does not exist");
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(show_dest).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", show_dest.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_media = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == MEDIA_EXTENSION);
        if !is_media {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(show_dest)
            .unwrap_or(entry.path())
            .to_path_buf();
        files.push(relative);
    }
    files.sort();
    Ok(files)
}
