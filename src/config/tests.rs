use std::io::Write;

use super::*;

fn settings_from(raw: RawSettings) -> Settings {
    Settings::from_raw(raw).expect("valid settings")
}

#[test]
fn defaults_match_the_design_document_layout() {
    let settings = settings_from(RawSettings::default());

    assert!(settings.paths.base_dir.is_absolute());
    assert!(settings.paths.source_path().ends_with(DEFAULT_SOURCE_FILE));
    assert!(settings.paths.output_path().ends_with(DEFAULT_OUTPUT_FILE));
    assert_eq!(settings.logging.level, LevelFilter::WARN);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.diagrams.languages, vec!["mermaid"]);
    assert_eq!(settings.diagrams.link, DEFAULT_SOURCE_FILE);
    assert_eq!(settings.render, ExtensionSet::default());
    assert!(!settings.document.include_toc);
    assert_eq!(settings.document.subtitles.len(), 3);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.paths.source = Some(PathBuf::from("from-file.md"));
    raw.logging.level = Some("info".to_string());

    let overrides = ConvertOverrides {
        source: Some(PathBuf::from("notes.md")),
        log_level: Some("debug".to_string()),
        include_toc: Some(true),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = settings_from(raw);

    assert!(settings.paths.source_path().ends_with("notes.md"));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(settings.document.include_toc);
    assert_eq!(settings.diagrams.link, "notes.md");
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ConvertOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = settings_from(raw);

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn rejects_output_that_would_overwrite_the_source() {
    let mut raw = RawSettings::default();
    raw.paths.source = Some(PathBuf::from("design.md"));
    raw.paths.output = Some(PathBuf::from("design.md"));

    let err = Settings::from_raw(raw).expect_err("output equal to source");
    assert!(matches!(err, LoadError::Invalid { key: "paths.output", .. }));
}

#[test]
fn rejects_empty_file_names() {
    let mut raw = RawSettings::default();
    raw.paths.source = Some(PathBuf::new());

    let err = Settings::from_raw(raw).expect_err("empty source");
    assert!(matches!(err, LoadError::Invalid { key: "paths.source", .. }));
}

#[test]
fn rejects_unparsable_log_level() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());

    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
fn rejects_empty_diagram_language_list() {
    let mut raw = RawSettings::default();
    raw.diagrams.languages = Some(vec!["  ".to_string()]);

    let err = Settings::from_raw(raw).expect_err("no languages");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "diagrams.languages",
            ..
        }
    ));
}

#[test]
fn diagram_languages_are_normalised() {
    let mut raw = RawSettings::default();
    raw.diagrams.languages = Some(vec!["Mermaid".to_string(), " PlantUML ".to_string()]);
    raw.diagrams.link = Some("https://example.com/design".to_string());

    let settings = settings_from(raw);
    assert_eq!(settings.diagrams.languages, vec!["mermaid", "plantuml"]);
    assert_eq!(settings.diagrams.link, "https://example.com/design");
}

#[test]
fn config_file_sections_are_applied() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config");
    writeln!(
        file,
        r#"
[paths]
source = "architecture.md"
output = "architecture.html"

[document]
cover_title = "Storage Engine"
subtitles = ["Design Review"]

[render]
raw_html = false
"#
    )
    .expect("write config");

    let cli = CliArgs {
        config_file: Some(file.path().to_path_buf()),
        overrides: ConvertOverrides {
            output: Some(PathBuf::from("review.html")),
            ..Default::default()
        },
    };

    let settings = load(&cli).expect("settings");
    assert!(settings.paths.source_path().ends_with("architecture.md"));
    assert!(settings.paths.output_path().ends_with("review.html"));
    assert_eq!(settings.document.cover_title, "Storage Engine");
    assert_eq!(settings.document.subtitles, vec!["Design Review"]);
    assert!(!settings.render.raw_html);
    assert!(settings.render.tables);
}

#[test]
fn parses_cli_flags() {
    let args = CliArgs::parse_from([
        "mdprint",
        "--base-dir",
        "/tmp/docs",
        "--source",
        "design.md",
        "--log-json",
        "true",
        "--toc",
    ]);

    assert_eq!(
        args.overrides.base_dir.as_deref(),
        Some(Path::new("/tmp/docs"))
    );
    assert_eq!(args.overrides.source.as_deref(), Some(Path::new("design.md")));
    assert_eq!(args.overrides.log_json, Some(true));
    assert_eq!(args.overrides.include_toc, Some(true));
}

#[test]
fn no_arguments_means_no_overrides() {
    let args = CliArgs::parse_from(["mdprint"]);

    assert!(args.overrides.source.is_none());
    assert!(args.overrides.include_toc.is_none());
}
