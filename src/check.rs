//! Cached stream validation.
//!
//! The external checker is slow (it reads the whole transport stream), so its
//! summary line is kept in `check.result` inside the recording. A parseable
//! cache is trusted forever; anything else triggers one fresh invocation.
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

/// Cache file written by the checker inside each recording directory.
pub const CHECK_RESULT_FILE_NAME: &str = "check.result";

/// Stream error count of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCount {
    Known(u32),
    /// No usable checker output.
    Unknown,
}

impl ErrorCount {
    pub fn known(self) -> Option<u32> {
        match self {
            ErrorCount::Known(count) => Some(count),
            ErrorCount::Unknown => None,
        }
    }
}

/// Result of resolving a recording's error count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub errors: ErrorCount,
    /// Shell command line, present when the cache missed and the checker ran.
    pub invoked: Option<String>,
}

fn errors_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Errors: ([0-9]+)").unwrap_or_else(|err| panic!("invalid pattern: {err}"))
    })
}

/// Parse checker output; only a leading `Errors: <n>` counts.
pub fn parse_check_result(text: &str) -> ErrorCount {
    errors_pattern()
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .map_or(ErrorCount::Unknown, ErrorCount::Known)
}

/// Read a cache file; unreadable files count as a miss.
pub fn read_check_result(path: &Path) -> ErrorCount {
    match fs::read(path) {
        Ok(bytes) => parse_check_result(&String::from_utf8_lossy(&bytes)),
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "no cached check result");
            ErrorCount::Unknown
        }
    }
}

/// Runs the external checker on cache misses.
#[derive(Debug, Clone)]
pub struct StreamValidator {
    command: String,
}

impl StreamValidator {
    pub fn new(command: &str) -> Self {
        let program = shell_words::split(command)
            .ok()
            .and_then(|words| words.into_iter().next());
        match program {
            Some(program) if which::which(&program).is_err() => {
                tracing::warn!(%program, "check command not found in PATH");
            }
            Some(_) => {}
            None => tracing::warn!(command, "check command is empty or unparseable"),
        }
        Self {
            command: command.to_string(),
        }
    }

    /// Shell line that validates `recording_dir` into its cache file.
    pub fn command_line(&self, recording_dir: &Path) -> String {
        let result_path = recording_dir.join(CHECK_RESULT_FILE_NAME);
        format!(
            "{} {} > {}",
            self.command,
            shell_words::quote(&recording_dir.to_string_lossy()),
            shell_words::quote(&result_path.to_string_lossy()),
        )
    }

    /// Return the cached error count, invoking the checker once on a miss.
    pub fn error_count(&self, recording_dir: &Path) -> CheckOutcome {
        let result_path = recording_dir.join(CHECK_RESULT_FILE_NAME);
        let cached = read_check_result(&result_path);
        if cached != ErrorCount::Unknown {
            return CheckOutcome {
                errors: cached,
                invoked: None,
            };
        }

        let line = self.command_line(recording_dir);
        tracing::info!(command = %line, "running stream check");
        match Command::new("sh").arg("-c").arg(&line).status() {
            Ok(status) if !status.success() => {
                tracing::warn!(command = %line, %status, "stream check exited unsuccessfully");
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(command = %line, %err, "failed to spawn stream check");
            }
        }

        let errors = read_check_result(&result_path);
        if errors == ErrorCount::Unknown {
            tracing::warn!(command = %line, "stream check produced no error count");
        }
        CheckOutcome {
            errors,
            invoked: Some(line),
        }
    }
}
