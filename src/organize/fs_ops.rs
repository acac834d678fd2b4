//! Filesystem mutations, suppressed as a whole in dry-run mode.
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy)]
pub struct FileOps {
    dry_run: bool,
}

impl FileOps {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn remove_recording(&self, recording_dir: &Path) -> Result<()> {
        if self.dry_run {
            tracing::debug!(path = %recording_dir.display(), "dry run: keep recording");
            return Ok(());
        }
        fs::remove_dir_all(recording_dir)
            .with_context(|| format!("remove recording {}", recording_dir.display()))?;
        tracing::info!(path = %recording_dir.display(), "removed recording");
        Ok(())
    }

    /// Copy `source` to `target`, creating the target directory first.
    ///
    /// The bytes land in a hidden `.partial` sibling that is renamed onto
    /// `target` once complete, so `target` never exists half-written.
    pub fn copy_media(&self, source: &Path, target: &Path) -> Result<()> {
        if self.dry_run {
            tracing::debug!(
                source = %source.display(),
                dest = %target.display(),
                "dry run: skip copy"
            );
            return Ok(());
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create destination {}", parent.display()))?;
        }
        let partial = partial_path(target);
        match copy_via(source, &partial, target) {
            Ok(bytes) => {
                tracing::info!(dest = %target.display(), bytes, "copied recording");
                Ok(())
            }
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&partial) {
                    if cleanup.kind() != io::ErrorKind::NotFound {
                        tracing::warn!(
                            path = %partial.display(),
                            error = %cleanup,
                            "partial copy left behind"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    pub fn touch(&self, path: &Path) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        crate::util::touch(path)
    }
}

fn copy_via(source: &Path, partial: &Path, target: &Path) -> Result<u64> {
    let bytes = fs::copy(source, partial)
        .with_context(|| format!("copy {} to {}", source.display(), partial.display()))?;
    fs::rename(partial, target)
        .with_context(|| format!("rename {} to {}", partial.display(), target.display()))?;
    Ok(bytes)
}

/// `dir/.name.partial` next to `target`.
fn partial_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(target.file_name().unwrap_or_default());
    name.push(".partial");
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_is_a_hidden_sibling() {
        assert_eq!(
            partial_path(Path::new("/srv/tv/Season 1/S1E2.ts")),
            Path::new("/srv/tv/Season 1/.S1E2.ts.partial")
        );
    }

    #[test]
    fn copy_renames_complete_file_onto_target() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let source = dir.path().join("00001.ts");
        fs::write(&source, b"stream").expect("write source");
        let target = dir.path().join("library/Season 1/S1E1.ts");
        // Left over from an interrupted earlier copy.
        fs::create_dir_all(target.parent().expect("parent")).expect("create library");
        fs::write(partial_path(&target), b"str").expect("write stale partial");

        FileOps::new(false)
            .copy_media(&source, &target)
            .expect("copy media");

        assert_eq!(fs::read(&target).expect("read target"), b"stream");
        assert!(!partial_path(&target).exists());
    }

    #[test]
    fn failed_copy_leaves_nothing_at_target() {
        let dir = tempfile::tempdir().expect("create temp dir");
        // A directory cannot be copied as a file.
        let source = dir.path().join("recording.rec");
        fs::create_dir_all(&source).expect("create source dir");
        let target = dir.path().join("library/S1E1.ts");

        let err = FileOps::new(false)
            .copy_media(&source, &target)
            .expect_err("copy must fail");

        assert!(format!("{err:#}").contains("copy"), "{err:#}");
        assert!(!target.exists());
        assert!(!partial_path(&target).exists());
    }

    #[test]
    fn dry_run_copies_nothing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let source = dir.path().join("00001.ts");
        fs::write(&source, b"stream").expect("write source");
        let target = dir.path().join("library/S1E1.ts");

        FileOps::new(true)
            .copy_media(&source, &target)
            .expect("dry-run copy");

        assert!(!dir.path().join("library").exists());
    }
}
