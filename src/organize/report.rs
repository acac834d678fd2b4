//! Per-recording outcomes and the human/JSON run report.
use serde::Serialize;
use std::path::PathBuf;

/// Why a recording was left in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoMetadata,
    ValidationFailed,
    /// Destination exists but duplicate removal was overridden.
    DuplicateKept,
    /// Destination exists and the show keeps duplicates.
    AlreadyExists,
    /// Media count, error count or destination ruled out a move.
    NotEligible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteReason {
    Empty,
    Duplicate,
    Requested,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Outcome {
    Skipped { reason: SkipReason },
    Deleted { reason: DeleteReason },
    Moved { destination: PathBuf },
    /// An I/O error stopped this recording; the run went on with the next one.
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordingReport {
    pub show: String,
    /// 1-based position within the show, as accepted by `--recording`.
    pub index: usize,
    pub recording: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    /// Shows whose source directory does not exist.
    pub missing_shows: Vec<String>,
    /// Shows whose source directory could not be read.
    pub failed_shows: Vec<String>,
    pub recordings: Vec<RecordingReport>,
}

impl RunSummary {
    pub fn moved(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Moved { .. }))
    }

    pub fn deleted(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Deleted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.recordings
            .iter()
            .filter(|report| pred(&report.outcome))
            .count()
    }
}

/// Indented decision lines on stdout; silent when JSON output is requested.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    enabled: bool,
}

impl Console {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn show(&self, text: &str) {
        self.print(0, text);
    }

    pub fn recording(&self, text: &str) {
        self.print(1, text);
    }

    pub fn detail(&self, text: &str) {
        self.print(2, text);
    }

    pub fn ok(&self, text: &str) {
        self.print(2, &format!("[+] {text}"));
    }

    pub fn fail(&self, text: &str) {
        self.print(2, &format!("[-] {text}"));
    }

    fn print(&self, depth: usize, text: &str) {
        if self.enabled {
            println!("{:width$}{text}", "", width = depth * 4);
        }
    }
}
