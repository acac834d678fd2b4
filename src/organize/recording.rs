//! Decision chain for a single recording directory.
//!
//! Steps run in a fixed order and each terminal branch returns an `Outcome`.
//! Nothing here touches state shared with other recordings.
use super::report::{DeleteReason, Outcome, SkipReason};
use super::{Organizer, RecordingAction};
use crate::config::ShowConfig;
use crate::guess::{self, GuessedDestination, MEDIA_EXTENSION};
use crate::metadata::{RecordingMetadata, INFO_FILE_NAME};
use crate::util::{format_mib, truncate_chars};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Characters of the description shown when no destination was found.
const DESCRIPTION_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MediaFile {
    pub(crate) path: PathBuf,
    pub(crate) size: u64,
}

/// `*.ts` files directly inside `recording_dir`, sorted by name.
pub(crate) fn list_media(recording_dir: &Path) -> Result<Vec<MediaFile>> {
    let entries = fs::read_dir(recording_dir)
        .with_context(|| format!("read recording {}", recording_dir.display()))?;
    let mut media = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in {}", recording_dir.display()))?;
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == MEDIA_EXTENSION) {
            continue;
        }
        let meta = entry
            .metadata()
            .with_context(|| format!("stat {}", path.display()))?;
        if !meta.is_file() {
            continue;
        }
        media.push(MediaFile {
            path,
            size: meta.len(),
        });
    }
    media.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(media)
}

impl Organizer<'_> {
    pub(crate) fn process_recording(
        &self,
        show: &ShowConfig,
        show_dest: &Path,
        recording_dir: &Path,
        action: &RecordingAction,
    ) -> Result<Outcome> {
        let name = recording_dir
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        if matches!(action, RecordingAction::Delete) {
            self.console.recording(&name);
            self.console.ok("Removing recording on request.");
            self.ops.remove_recording(recording_dir)?;
            return Ok(Outcome::Deleted {
                reason: DeleteReason::Requested,
            });
        }

        let info_path = recording_dir.join(INFO_FILE_NAME);
        if !info_path.is_file() {
            self.console.recording(&format!("[-] Ignoring directory '{name}'"));
            return Ok(Outcome::Skipped {
                reason: SkipReason::NoMetadata,
            });
        }

        self.console.recording(&name);
        let metadata = RecordingMetadata::load(&info_path)?;

        let destination = match action {
            RecordingAction::MoveTo(relative) => Some(GuessedDestination::move_target(relative)?),
            _ => guess::guess(&metadata, show),
        };
        let target = destination
            .as_ref()
            .map(|destination| destination.file_under(show_dest));
        match &target {
            Some(target) => self.console.detail(&format!("=> {}", target.display())),
            None => {
                self.console.detail(metadata.title());
                self.console.detail(truncate_chars(
                    metadata.description(),
                    DESCRIPTION_PREVIEW_CHARS,
                ));
            }
        }

        let media = list_media(recording_dir)?;
        let total_size: u64 = media.iter().map(|file| file.size).sum();
        for file in &media {
            let file_name = file
                .path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            self.console
                .detail(&format!("{file_name}  {:>10} MiB", format_mib(file.size)));
        }
        match media.len() {
            0 => {
                self.console.fail("No .ts file found");
                tracing::warn!(recording = %name, "no media found");
            }
            1 => {}
            count => {
                self.console.fail(&format!("Only need 1 .ts file. Got {count}."));
                tracing::warn!(recording = %name, count, "multiple media files");
            }
        }

        let check = self.validator.error_count(recording_dir);
        if check.invoked.is_some() {
            self.console.ok("Creating check.result...");
        }

        // Empty recordings go away even when validation failed or no target exists.
        if !media.is_empty() && total_size == 0 {
            self.console.ok("Removing empty recording.");
            self.ops.remove_recording(recording_dir)?;
            return Ok(Outcome::Deleted {
                reason: DeleteReason::Empty,
            });
        }

        let Some(errors) = check.errors.known() else {
            self.console.fail("Could not create check.result.");
            if let Some(command) = &check.invoked {
                self.console.fail(&format!("Command: '{command}'"));
            }
            return Ok(Outcome::Skipped {
                reason: SkipReason::ValidationFailed,
            });
        };
        if errors > 0 {
            self.console.fail(&format!("Recording has {errors} errors."));
        }

        if let Some(target) = target.as_ref().filter(|target| target.exists()) {
            let keep = self.options.keep_duplicates
                || matches!(action, RecordingAction::MoveTo(_));
            if keep {
                self.console.fail("Not removing duplicate, overridden.");
                return Ok(Outcome::Skipped {
                    reason: SkipReason::DuplicateKept,
                });
            }
            if !show
                .duplicates
                .deletes_duplicates(self.config.settings.delete_duplicates)
            {
                self.console.fail("File already exists.");
                return Ok(Outcome::Skipped {
                    reason: SkipReason::AlreadyExists,
                });
            }
            tracing::debug!(dest = %target.display(), "duplicate of organized file");
            self.console.ok("Removing duplicate.");
            self.ops.remove_recording(recording_dir)?;
            return Ok(Outcome::Deleted {
                reason: DeleteReason::Duplicate,
            });
        }

        let eligible = media.len() == 1 && errors <= self.options.max_errors && total_size > 0;
        let (Some(target), true) = (target, eligible) else {
            tracing::debug!(
                recording = %name,
                media = media.len(),
                errors,
                "not eligible for move"
            );
            return Ok(Outcome::Skipped {
                reason: SkipReason::NotEligible,
            });
        };

        self.console.ok("Copying file...");
        self.ops.copy_media(&media[0].path, &target)?;
        self.console.ok("Removing recording..");
        self.ops.remove_recording(recording_dir)?;
        Ok(Outcome::Moved {
            destination: target,
        })
    }
}
