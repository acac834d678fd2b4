use super::*;

const SAMPLE: &str = "\
# vdr-organizer settings
[Options]
default-path = /srv/tv
delete-duplicates = yes
vdr-recording-path = /media/vdr

[Tatort]
vdr-path = Tatort
dest-path = Krimi/Tatort
delete-duplicates = off

[Die Sendung mit der Maus]
vdr-path: Die_Sendung_mit_der_Maus
dest-file-name = Title

[Heute-Show]
vdr-path = heute-show
";

#[test]
fn parses_options_and_shows_in_order() {
    let config = parse_config(SAMPLE, Path::new("/etc")).expect("parse config");

    assert_eq!(
        config.settings,
        OrganizerSettings {
            default_path: PathBuf::from("/srv/tv"),
            delete_duplicates: true,
            recording_root: PathBuf::from("/media/vdr"),
            check_command: DEFAULT_CHECK_COMMAND.to_string(),
        }
    );
    let names: Vec<_> = config.shows.iter().map(|show| show.name.as_str()).collect();
    assert_eq!(
        names,
        ["Tatort", "Die Sendung mit der Maus", "Heute-Show"]
    );

    let tatort = &config.shows[0];
    assert_eq!(tatort.source_path, "Tatort");
    assert_eq!(tatort.dest_path, "Krimi/Tatort");
    assert_eq!(tatort.duplicates, DuplicatePolicy::ForceKeep);
    assert_eq!(tatort.dest_file_name, None);

    let maus = &config.shows[1];
    assert_eq!(maus.dest_path, "Die_Sendung_mit_der_Maus");
    assert_eq!(maus.duplicates, DuplicatePolicy::Inherit);
    assert_eq!(maus.dest_file_name.as_deref(), Some("Title"));
}

#[test]
fn options_section_name_is_case_insensitive() {
    let text = "[OPTIONS]\ndefault-path=/srv\ndelete-duplicates=0\n[Show]\nvdr-path=show\n";
    let config = parse_config(text, Path::new("/cfg")).expect("parse config");
    assert_eq!(config.shows.len(), 1);
    assert!(!config.settings.delete_duplicates);
    assert_eq!(config.settings.recording_root, PathBuf::from("/cfg"));
}

#[test]
fn missing_vdr_path_is_fatal() {
    let text = "[Options]\ndefault-path=/srv\ndelete-duplicates=true\n[Broken]\ndest-path=x\n";
    let err = parse_config(text, Path::new("/cfg")).expect_err("missing vdr-path");
    let message = err.to_string();
    assert!(message.contains("[Broken]"), "{message}");
    assert!(message.contains("vdr-path"), "{message}");
}

#[test]
fn missing_global_options_are_fatal() {
    let no_section = "[Show]\nvdr-path=show\n";
    assert!(parse_config(no_section, Path::new("/")).is_err());

    let no_flag = "[Options]\ndefault-path=/srv\n";
    let err = parse_config(no_flag, Path::new("/")).expect_err("missing flag");
    assert!(err.to_string().contains("delete-duplicates"));
}

#[test]
fn rejects_non_boolean_flags_and_stray_lines() {
    let bad_bool = "[Options]\ndefault-path=/srv\ndelete-duplicates=maybe\n";
    assert!(parse_config(bad_bool, Path::new("/")).is_err());

    let stray = "default-path=/srv\n[Options]\n";
    let err = parse_config(stray, Path::new("/")).expect_err("stray option");
    assert!(err.to_string().contains("outside of any section"), "{err:#}");

    let no_separator = "[Options]\ndefault-path\n";
    assert!(parse_config(no_separator, Path::new("/")).is_err());
}

#[test]
fn custom_check_command_overrides_default() {
    let text = "[Options]\ndefault-path=/srv\ndelete-duplicates=no\ncheck-command = /usr/local/bin/checkts -q\n";
    let config = parse_config(text, Path::new("/")).expect("parse config");
    assert_eq!(config.settings.check_command, "/usr/local/bin/checkts -q");
}

#[test]
fn duplicate_policy_resolves_against_global_flag() {
    assert!(DuplicatePolicy::Inherit.deletes_duplicates(true));
    assert!(!DuplicatePolicy::Inherit.deletes_duplicates(false));
    assert!(!DuplicatePolicy::ForceKeep.deletes_duplicates(true));
    assert!(DuplicatePolicy::ForceDelete.deletes_duplicates(false));
}

#[test]
fn show_lookup_uses_destination_key() {
    let config = parse_config(SAMPLE, Path::new("/etc")).expect("parse config");
    let show = config.show_by_dest("Krimi/Tatort/").expect("find show");
    assert_eq!(show.name, "Tatort");
    assert!(config.show_by_dest("Tatort").is_none());
}

#[test]
fn load_config_reports_missing_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let err = load_config(&dir.path().join("absent.ini")).expect_err("missing file");
    assert!(err.to_string().contains("read config"));
}

#[test]
fn values_are_kept_verbatim_and_later_keys_win() {
    let text = "[Options]\n\
                default-path = /srv/tv\n\
                delete-duplicates = no\n\
                Check-Command = echo 'Errors: 0' \"quoted\"\n\
                [Show]\n\
                vdr-path = first\n\
                [Show]\n\
                vdr-path = second\n";
    let config = parse_config(text, Path::new("/")).expect("parse config");
    assert_eq!(config.settings.check_command, "echo 'Errors: 0' \"quoted\"");
    assert_eq!(config.shows.len(), 1);
    assert_eq!(config.shows[0].source_path, "second");
}
