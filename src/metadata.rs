//! Parser for the VDR `info` sidecar written next to each recording.
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Name of the sidecar file inside a recording directory.
pub const INFO_FILE_NAME: &str = "info";

/// Field ids copied verbatim from the `info` line prefixes.
pub const TITLE_FIELD: &str = "S";
pub const DESCRIPTION_FIELD: &str = "D";

/// Fields of one `info` file, keyed by their line prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingMetadata {
    fields: HashMap<String, String>,
}

impl RecordingMetadata {
    /// Read `path`; a missing file surfaces as an error with `NotFound` as its source.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read info {}", path.display()))?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Parse `<id> <text>` lines; a repeated id keeps its last value.
    pub fn parse(text: &str) -> Self {
        let mut fields = HashMap::new();
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let (id, value) = line.split_once(' ').unwrap_or((line, ""));
            fields.insert(id.to_string(), value.trim().to_string());
        }
        Self { fields }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(String::as_str)
    }

    /// Title (`S`), empty when the broadcaster sent none.
    pub fn title(&self) -> &str {
        self.get(TITLE_FIELD).unwrap_or_default()
    }

    /// Description (`D`), empty when absent.
    pub fn description(&self) -> &str {
        self.get(DESCRIPTION_FIELD).unwrap_or_default()
    }
}
