//! Organizer configuration.
//!
//! The config is an INI file with one `[Options]` section holding global
//! settings and one section per managed show. It is loaded once at startup
//! and threaded through the run as an immutable value.
use anyhow::{anyhow, Context, Result};
use ini::{Ini, ParseOption};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the reserved global section (matched case-insensitively).
pub const OPTIONS_SECTION: &str = "Options";

/// External checker invoked when a recording has no usable `check.result`.
pub const DEFAULT_CHECK_COMMAND: &str = "vdr-checkts";

/// Default location of the config file inside the VDR video directory.
pub const DEFAULT_CONFIG_PATH: &str = "/media/vdr/vdr-organizer.ini";

/// Per-show duplicate handling, inheriting the global flag unless overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    Inherit,
    ForceKeep,
    ForceDelete,
}

impl DuplicatePolicy {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => DuplicatePolicy::Inherit,
            Some(true) => DuplicatePolicy::ForceDelete,
            Some(false) => DuplicatePolicy::ForceKeep,
        }
    }

    /// Resolve against the global `delete-duplicates` setting.
    pub fn deletes_duplicates(self, global: bool) -> bool {
        match self {
            DuplicatePolicy::Inherit => global,
            DuplicatePolicy::ForceKeep => false,
            DuplicatePolicy::ForceDelete => true,
        }
    }
}

/// Settings for one managed show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowConfig {
    /// Section name, used only for display.
    pub name: String,
    /// Show directory relative to the recording root.
    pub source_path: String,
    /// Library directory relative to `default-path`; also the `--show` key.
    pub dest_path: String,
    pub duplicates: DuplicatePolicy,
    /// `title` (any case) means "name the file after the recording title".
    pub dest_file_name: Option<String>,
}

/// Global settings from the `[Options]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizerSettings {
    pub default_path: PathBuf,
    pub delete_duplicates: bool,
    pub recording_root: PathBuf,
    pub check_command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub settings: OrganizerSettings,
    pub shows: Vec<ShowConfig>,
}

impl Config {
    /// Find a show by its destination-path key.
    pub fn show_by_dest(&self, dest_path: &str) -> Option<&ShowConfig> {
        let wanted = dest_path.trim_end_matches('/');
        self.shows
            .iter()
            .find(|show| show.dest_path.trim_end_matches('/') == wanted)
    }
}

/// Load and validate the config file at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_config(&text, config_dir).with_context(|| format!("parse config {}", path.display()))
}

/// Parse config text; `config_dir` is the fallback recording root.
pub fn parse_config(text: &str, config_dir: &Path) -> Result<Config> {
    let sections = read_sections(text)?;

    let options = sections
        .iter()
        .find(|section| section.is_options())
        .ok_or_else(|| anyhow!("missing [{OPTIONS_SECTION}] section"))?;
    let settings = OrganizerSettings {
        default_path: PathBuf::from(options.require("default-path")?),
        delete_duplicates: options
            .get_bool("delete-duplicates")?
            .ok_or_else(|| options.missing("delete-duplicates"))?,
        recording_root: options
            .get("vdr-recording-path")
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir.to_path_buf()),
        check_command: options
            .get("check-command")
            .filter(|command| !command.is_empty())
            .unwrap_or(DEFAULT_CHECK_COMMAND)
            .to_string(),
    };

    let mut shows = Vec::new();
    for section in sections.iter().filter(|section| !section.is_options()) {
        let source_path = section.require("vdr-path")?.to_string();
        let dest_path = section
            .get("dest-path")
            .map(str::to_string)
            .unwrap_or_else(|| source_path.clone());
        shows.push(ShowConfig {
            name: section.name.clone(),
            source_path,
            dest_path,
            duplicates: DuplicatePolicy::from_flag(section.get_bool("delete-duplicates")?),
            dest_file_name: section.get("dest-file-name").map(str::to_string),
        });
    }

    Ok(Config { settings, shows })
}

#[derive(Debug)]
struct IniSection {
    name: String,
    entries: BTreeMap<String, String>,
}

impl IniSection {
    fn is_options(&self) -> bool {
        self.name.eq_ignore_ascii_case(OPTIONS_SECTION)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| self.missing(key))
    }

    fn missing(&self, key: &str) -> anyhow::Error {
        anyhow!("section [{}] is missing required option {key:?}", self.name)
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value.to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(Some(true)),
            "0" | "no" | "false" | "off" => Ok(Some(false)),
            _ => Err(anyhow!(
                "section [{}] option {key:?} is not a boolean (got {value:?})",
                self.name
            )),
        }
    }
}

fn read_sections(text: &str) -> Result<Vec<IniSection>> {
    // Values are taken verbatim; check commands carry their own shell quoting.
    let option = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(text, option).context("invalid INI syntax")?;

    let mut sections: Vec<IniSection> = Vec::new();
    for (name, properties) in ini.iter() {
        let Some(name) = name else {
            if let Some((key, _)) = properties.iter().next() {
                return Err(anyhow!("option {key:?} outside of any section"));
            }
            continue;
        };
        let name = name.trim();
        // Repeated headers extend the earlier section.
        let position = match sections.iter().position(|section| section.name == name) {
            Some(position) => position,
            None => {
                sections.push(IniSection {
                    name: name.to_string(),
                    entries: BTreeMap::new(),
                });
                sections.len() - 1
            }
        };
        for (key, value) in properties.iter() {
            sections[position]
                .entries
                .insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    Ok(sections)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
