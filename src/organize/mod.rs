//! Organizer driver.
//!
//! Walks the configured shows, decides per recording whether to move, delete
//! or leave it, and applies the decision. The configuration and run options
//! are read-only for the whole run; each recording is decided on its own.
mod fs_ops;
mod list;
mod recording;
mod report;

pub use list::list_organized;
pub use report::{Console, DeleteReason, Outcome, RecordingReport, RunSummary, SkipReason};

use crate::check::StreamValidator;
use crate::config::{Config, ShowConfig};
use crate::guess::GuessedDestination;
use anyhow::{anyhow, Context, Result};
use fs_ops::FileOps;
use std::fs;
use std::path::{Path, PathBuf};

/// Sentinel touched in the recording root after each run.
pub const UPDATE_MARKER_FILE_NAME: &str = ".update";

/// What to do with the recording(s) selected for this run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordingAction {
    #[default]
    Organize,
    /// Move to this path (relative to the show destination) instead of guessing.
    MoveTo(String),
    Delete,
}

/// Run-time switches from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    /// Highest stream error count still moved into the library.
    pub max_errors: u32,
    pub keep_duplicates: bool,
    /// Destination-path key of the only show to process.
    pub show: Option<String>,
    /// 1-based index of the only recording to process; needs `show`.
    pub recording: Option<usize>,
    pub action: RecordingAction,
}

pub fn show_source_dir(config: &Config, show: &ShowConfig) -> PathBuf {
    config.settings.recording_root.join(&show.source_path)
}

pub fn show_dest_dir(config: &Config, show: &ShowConfig) -> PathBuf {
    config.settings.default_path.join(&show.dest_path)
}

/// Look up the show named by `--show`.
pub fn find_show<'c>(config: &'c Config, dest_path: &str) -> Result<&'c ShowConfig> {
    config
        .show_by_dest(dest_path)
        .ok_or_else(|| anyhow!("no show configured with dest-path {dest_path:?}"))
}

/// Recording directories of a show, sorted by name.
pub fn list_recordings(show_source: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(show_source)
        .with_context(|| format!("read show directory {}", show_source.display()))?;
    let mut recordings = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in {}", show_source.display()))?;
        if entry.file_type().map(|ty| ty.is_dir()).unwrap_or(false) {
            recordings.push(entry.path());
        }
    }
    recordings.sort();
    Ok(recordings)
}

pub struct Organizer<'a> {
    config: &'a Config,
    options: &'a RunOptions,
    validator: StreamValidator,
    ops: FileOps,
    console: Console,
}

impl<'a> Organizer<'a> {
    pub fn new(config: &'a Config, options: &'a RunOptions, console: Console) -> Self {
        Self {
            config,
            options,
            validator: StreamValidator::new(&config.settings.check_command),
            ops: FileOps::new(options.dry_run),
            console,
        }
    }

    pub fn run(&self) -> Result<RunSummary> {
        if self.options.recording.is_some() && self.options.show.is_none() {
            return Err(anyhow!("a recording index requires a show filter"));
        }
        if let RecordingAction::MoveTo(relative) = &self.options.action {
            GuessedDestination::move_target(relative)?;
        }
        let shows = match self.options.show.as_deref() {
            Some(key) => vec![find_show(self.config, key)?],
            None => self.config.shows.iter().collect(),
        };

        let mut summary = RunSummary {
            dry_run: self.options.dry_run,
            ..RunSummary::default()
        };
        for show in shows {
            self.organize_show(show, &mut summary)?;
        }

        let marker = self
            .config
            .settings
            .recording_root
            .join(UPDATE_MARKER_FILE_NAME);
        self.ops.touch(&marker)?;

        tracing::info!(
            moved = summary.moved(),
            deleted = summary.deleted(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            dry_run = self.options.dry_run,
            "organize run complete"
        );
        Ok(summary)
    }

    fn organize_show(&self, show: &ShowConfig, summary: &mut RunSummary) -> Result<()> {
        let source = show_source_dir(self.config, show);
        if !source.is_dir() {
            self.console.show(&format!("[-] Source path '{}' not found.", source.display()));
            tracing::warn!(show = %show.name, path = %source.display(), "source path missing");
            summary.missing_shows.push(show.name.clone());
            return Ok(());
        }
        let dest = show_dest_dir(self.config, show);
        self.console.show(&dest.display().to_string());

        let recordings = match list_recordings(&source) {
            Ok(recordings) => recordings,
            Err(err) => {
                let error = format!("{err:#}");
                self.console.show(&format!("[-] {error}"));
                tracing::warn!(show = %show.name, %error, "show skipped");
                summary.failed_shows.push(show.name.clone());
                return Ok(());
            }
        };
        let selected: Vec<(usize, &PathBuf)> = match self.options.recording {
            Some(index) => {
                let recording = index
                    .checked_sub(1)
                    .and_then(|idx| recordings.get(idx))
                    .ok_or_else(|| {
                        anyhow!(
                            "recording index {index} out of range for show {:?} ({} recordings)",
                            show.dest_path,
                            recordings.len()
                        )
                    })?;
                vec![(index, recording)]
            }
            None => recordings.iter().enumerate().map(|(i, r)| (i + 1, r)).collect(),
        };

        // The requested action only applies to an explicitly selected recording.
        let organize = RecordingAction::Organize;
        let action = if self.options.recording.is_some() {
            &self.options.action
        } else {
            &organize
        };
        for (index, recording_dir) in selected {
            let outcome = self
                .process_recording(show, &dest, recording_dir, action)
                .unwrap_or_else(|err| {
                    let error = format!("{err:#}");
                    self.console.fail(&error);
                    tracing::warn!(show = %show.name, index, %error, "recording failed");
                    Outcome::Failed { error }
                });
            tracing::debug!(show = %show.name, index, ?outcome, "recording decided");
            summary.recordings.push(RecordingReport {
                show: show.name.clone(),
                index,
                recording: crate::util::display_path(recording_dir, Some(&source)),
                outcome,
            });
        }
        Ok(())
    }
}
