//! CLI argument parsing.
//!
//! Flag combinations are validated by clap so an invalid combination prints
//! usage and exits before any recording is touched.
use crate::config::DEFAULT_CONFIG_PATH;
use crate::organize::{RecordingAction, RunOptions};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vdr-organizer",
    version,
    about = "Organize TV shows recorded by VDR",
    after_help = "Examples:\n  vdr-organizer --dry-run\n  vdr-organizer --show Krimi/Tatort --list\n  vdr-organizer --show Krimi/Tatort --recording 3 --move-to 'Season 1/S1E1.ts'\n  vdr-organizer --show Krimi/Tatort --recording 4 --delete"
)]
pub struct Args {
    /// INI file with the [Options] section and one section per show
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Print decisions without copying, deleting, or creating anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Highest stream error count that still gets moved
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub max_errors: u32,

    /// Do not delete duplicates
    #[arg(long)]
    pub keep_duplicates: bool,

    /// Only process the show with this dest-path
    #[arg(long, value_name = "DEST_PATH")]
    pub show: Option<String>,

    /// Only process the N-th recording (1-based) of the selected show
    #[arg(long, value_name = "N", requires = "show")]
    pub recording: Option<usize>,

    /// Move the selected recording to this path below the show directory
    #[arg(
        long,
        value_name = "REL_PATH",
        requires = "recording",
        conflicts_with_all = ["delete", "list"]
    )]
    pub move_to: Option<String>,

    /// Delete the selected recording
    #[arg(long, requires = "recording", conflicts_with_all = ["move_to", "list"])]
    pub delete: bool,

    /// List files already organized for the selected show
    #[arg(long, requires = "show", conflicts_with_all = ["move_to", "delete"])]
    pub list: bool,

    /// Emit a machine-readable JSON summary instead of the decision log
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn run_options(&self) -> RunOptions {
        let action = match (&self.move_to, self.delete) {
            (Some(target), _) => RecordingAction::MoveTo(target.clone()),
            (None, true) => RecordingAction::Delete,
            (None, false) => RecordingAction::Organize,
        };
        RunOptions {
            dry_run: self.dry_run,
            max_errors: self.max_errors,
            keep_duplicates: self.keep_duplicates,
            show: self.show.clone(),
            recording: self.recording,
            action,
        }
    }
}
