//! Destination guessing from broadcaster descriptions.
//!
//! German broadcasters put season/episode markers at the start of the free
//! text description. Rules are tried top to bottom and the first match wins,
//! so season-qualified patterns must stay ahead of the bare episode pattern.
use crate::config::ShowConfig;
use crate::metadata::RecordingMetadata;
use anyhow::{anyhow, Result};
use regex::{Captures, Regex};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

/// `dest-file-name` value selecting the title-as-filename mode.
pub const TITLE_FILE_NAME: &str = "title";

/// Extension of the media files VDR writes.
pub const MEDIA_EXTENSION: &str = "ts";

/// Target location relative to the show's destination directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessedDestination {
    /// Empty when the file goes directly into the show directory.
    pub relative_dir: String,
    pub file_name: String,
}

impl GuessedDestination {
    /// Split a relative `dir/file` path at its last separator.
    pub fn from_relative_path(path: &str) -> Self {
        match path.rsplit_once('/') {
            Some((dir, file)) => GuessedDestination {
                relative_dir: dir.to_string(),
                file_name: file.to_string(),
            },
            None => GuessedDestination {
                relative_dir: String::new(),
                file_name: path.to_string(),
            },
        }
    }

    /// Validate a `--move-to` path: relative, below the show directory, with a file name.
    pub fn move_target(path: &str) -> Result<Self> {
        let escapes = Path::new(path)
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));
        if escapes {
            return Err(anyhow!(
                "move target {path:?} must be a relative path below the show directory"
            ));
        }
        let destination = Self::from_relative_path(path);
        if destination.file_name.is_empty() {
            return Err(anyhow!("move target {path:?} has no file name"));
        }
        Ok(destination)
    }

    pub fn dir_under(&self, show_dest: &Path) -> PathBuf {
        if self.relative_dir.is_empty() {
            show_dest.to_path_buf()
        } else {
            show_dest.join(&self.relative_dir)
        }
    }

    pub fn file_under(&self, show_dest: &Path) -> PathBuf {
        self.dir_under(show_dest).join(&self.file_name)
    }
}

/// One ordered guessing rule.
pub struct GuessRule {
    pub pattern: Regex,
    pub render: fn(&Captures<'_>) -> String,
}

fn season_episode_path(caps: &Captures<'_>) -> String {
    format!(
        "Season {season}/S{season}E{episode}.{MEDIA_EXTENSION}",
        season = &caps["season"],
        episode = &caps["episode"]
    )
}

fn episode_only_path(caps: &Captures<'_>) -> String {
    format!("Folge {}.{MEDIA_EXTENSION}", &caps["episode"])
}

fn build_rules() -> Vec<GuessRule> {
    let rule = |pattern: &str, render: fn(&Captures<'_>) -> String| GuessRule {
        pattern: Regex::new(pattern).unwrap_or_else(|err| panic!("invalid guess rule: {err}")),
        render,
    };
    vec![
        // "1. Staffel, Folge 3: ..."
        rule(
            r"^.*?(?P<season>[0-9]+)\. Staffel, Folge (?P<episode>[0-9]+):",
            season_episode_path,
        ),
        // "6. Staffel! 8. Folge: ..."
        rule(
            r"^.*?(?P<season>[0-9]+)\. Staffel! (?P<episode>[0-9]+)\. Folge:",
            season_episode_path,
        ),
        rule(r"^Folge (?P<episode>[0-9]+):", episode_only_path),
    ]
}

/// The built-in rule list, compiled once.
pub fn rules() -> &'static [GuessRule] {
    static RULES: OnceLock<Vec<GuessRule>> = OnceLock::new();
    RULES.get_or_init(build_rules)
}

/// Apply `rules` in order to `description`.
pub fn guess_from_rules(rules: &[GuessRule], description: &str) -> Option<GuessedDestination> {
    rules.iter().find_map(|rule| {
        let caps = rule.pattern.captures(description)?;
        Some(GuessedDestination::from_relative_path(&(rule.render)(&caps)))
    })
}

/// Guess where a recording belongs inside its show directory.
pub fn guess(metadata: &RecordingMetadata, show: &ShowConfig) -> Option<GuessedDestination> {
    if show
        .dest_file_name
        .as_deref()
        .is_some_and(|name| name.eq_ignore_ascii_case(TITLE_FILE_NAME))
    {
        return Some(GuessedDestination {
            relative_dir: String::new(),
            file_name: format!("{}.{MEDIA_EXTENSION}", metadata.title()),
        });
    }
    guess_from_rules(rules(), metadata.description())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicatePolicy;

    fn show(dest_file_name: Option<&str>) -> ShowConfig {
        ShowConfig {
            name: "Show".to_string(),
            source_path: "show".to_string(),
            dest_path: "Show".to_string(),
            duplicates: DuplicatePolicy::Inherit,
            dest_file_name: dest_file_name.map(str::to_string),
        }
    }

    fn metadata(title: &str, description: &str) -> RecordingMetadata {
        RecordingMetadata::parse(&format!("S {title}\nD {description}\n"))
    }

    #[test]
    fn season_comma_form_yields_season_folder() {
        let guessed = guess(
            &metadata("Ep", "3. Staffel, Folge 7: Der Fall"),
            &show(None),
        );
        assert_eq!(
            guessed,
            Some(GuessedDestination {
                relative_dir: "Season 3".to_string(),
                file_name: "S3E7.ts".to_string(),
            })
        );
    }

    #[test]
    fn season_exclamation_form_yields_season_folder() {
        let guessed = guess_from_rules(rules(), "6. Staffel! 8. Folge: Finale").expect("match");
        assert_eq!(guessed.relative_dir, "Season 6");
        assert_eq!(guessed.file_name, "S6E8.ts");
    }

    #[test]
    fn season_marker_may_follow_leading_text() {
        let description = "Krimiserie, 12. Staffel, Folge 104: Abschied";
        let guessed = guess_from_rules(rules(), description).expect("match");
        assert_eq!(guessed.relative_dir, "Season 12");
        assert_eq!(guessed.file_name, "S12E104.ts");
    }

    #[test]
    fn bare_episode_form_has_no_directory() {
        let guessed = guess_from_rules(rules(), "Folge 42: Die Antwort").expect("match");
        assert_eq!(guessed.relative_dir, "");
        assert_eq!(guessed.file_name, "Folge 42.ts");
    }

    #[test]
    fn bare_episode_form_is_anchored_at_start() {
        assert_eq!(guess_from_rules(rules(), "Heute: Folge 42: Die Antwort"), None);
        assert_eq!(guess_from_rules(rules(), "Ein ganz normaler Film."), None);
        assert_eq!(guess_from_rules(rules(), ""), None);
    }

    #[test]
    fn season_rules_win_over_bare_episode_rule() {
        let guessed = guess_from_rules(rules(), "2. Staffel, Folge 5: Folge 9: x").expect("match");
        assert_eq!(guessed.file_name, "S2E5.ts");
    }

    #[test]
    fn title_override_short_circuits_rules() {
        for value in ["title", "Title", "TITLE"] {
            let guessed = guess(
                &metadata("Die Maus im Weltall", "1. Staffel, Folge 1: x"),
                &show(Some(value)),
            );
            assert_eq!(
                guessed,
                Some(GuessedDestination {
                    relative_dir: String::new(),
                    file_name: "Die Maus im Weltall.ts".to_string(),
                })
            );
        }
    }

    #[test]
    fn other_file_name_overrides_fall_through_to_rules() {
        let guessed = guess(&metadata("x", "Folge 3: y"), &show(Some("episode")));
        assert_eq!(guessed.map(|g| g.file_name), Some("Folge 3.ts".to_string()));
    }

    #[test]
    fn destination_paths_join_under_show_dir() {
        let root = Path::new("/srv/tv/Show");
        let nested = GuessedDestination::from_relative_path("Season 1/S1E2.ts");
        assert_eq!(nested.file_under(root), root.join("Season 1/S1E2.ts"));
        let flat = GuessedDestination::from_relative_path("Folge 2.ts");
        assert_eq!(flat.dir_under(root), root);
        assert_eq!(flat.file_under(root), root.join("Folge 2.ts"));
    }

    #[test]
    fn move_target_stays_below_show_dir() {
        let nested = GuessedDestination::move_target("Specials/Weihnachten.ts").expect("valid");
        assert_eq!(nested.relative_dir, "Specials");
        assert_eq!(nested.file_name, "Weihnachten.ts");
        assert!(GuessedDestination::move_target("S1E1.ts").is_ok());

        for bad in ["/tmp/x.ts", "../Other/x.ts", "Season 1/../../x.ts", "", "Season 1/"] {
            assert!(GuessedDestination::move_target(bad).is_err(), "{bad:?}");
        }
    }
}
