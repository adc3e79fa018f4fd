//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::{diagrams::DEFAULT_DIAGRAM_LANGUAGES, render::ExtensionSet};

pub use cli::{CliArgs, ConvertOverrides};

const LOCAL_CONFIG_BASENAME: &str = "mdprint";
const ENV_PREFIX: &str = "MDPRINT";
const DEFAULT_BASE_DIR: &str = ".";
pub const DEFAULT_SOURCE_FILE: &str = "system_design.md";
pub const DEFAULT_OUTPUT_FILE: &str = "system_design.html";
const DEFAULT_DOCUMENT_TITLE: &str = "System Design - Talkora (Discord Clone)";
const DEFAULT_COVER_TITLE: &str = "Professional System Design";
const DEFAULT_SUBTITLES: &[&str] = &[
    "**Talkora** - Discord Clone",
    "Real-time Chat Application",
    "Architecture Analysis & Scalability Roadmap",
];
const DEFAULT_AUTHOR: &str = "System Architecture Documentation";
const DEFAULT_LANG: &str = "en";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub paths: PathSettings,
    pub logging: LoggingSettings,
    pub diagrams: DiagramSettings,
    pub document: DocumentSettings,
    pub render: ExtensionSet,
}

#[derive(Debug, Clone)]
pub struct PathSettings {
    /// Absolute directory holding both the source and the output.
    pub base_dir: PathBuf,
    pub source: PathBuf,
    pub output: PathBuf,
}

impl PathSettings {
    pub fn source_path(&self) -> PathBuf {
        self.base_dir.join(&self.source)
    }

    pub fn output_path(&self) -> PathBuf {
        self.base_dir.join(&self.output)
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DiagramSettings {
    /// Lower-cased fence languages treated as diagrams.
    pub languages: Vec<String>,
    /// Target of the "interactive version" link in replacement notes.
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct DocumentSettings {
    pub title: String,
    pub cover_title: String,
    pub subtitles: Vec<String>,
    pub author: String,
    pub lang: String,
    pub include_toc: bool,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder =
        Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("diagrams.languages")
            .with_list_parse_key("document.subtitles")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    paths: RawPathSettings,
    logging: RawLoggingSettings,
    diagrams: RawDiagramSettings,
    document: RawDocumentSettings,
    render: RawRenderSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &ConvertOverrides) {
        if let Some(dir) = overrides.base_dir.as_ref() {
            self.paths.base_dir = Some(dir.clone());
        }

        if let Some(source) = overrides.source.as_ref() {
            self.paths.source = Some(source.clone());
        }

        if let Some(output) = overrides.output.as_ref() {
            self.paths.output = Some(output.clone());
        }

        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }

        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }

        if let Some(include) = overrides.include_toc {
            self.document.include_toc = Some(include);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            paths,
            logging,
            diagrams,
            document,
            render,
        } = raw;

        let paths = build_path_settings(paths)?;
        let logging = build_logging_settings(logging)?;
        let diagrams = build_diagram_settings(diagrams, &paths)?;
        let document = build_document_settings(document);
        let render = build_render_settings(render);

        Ok(Self {
            paths,
            logging,
            diagrams,
            document,
            render,
        })
    }
}

fn build_path_settings(paths: RawPathSettings) -> Result<PathSettings, LoadError> {
    let base_dir = paths
        .base_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR));
    if base_dir.as_os_str().is_empty() {
        return Err(LoadError::invalid("paths.base_dir", "path must not be empty"));
    }
    let base_dir = std::path::absolute(&base_dir).map_err(|err| {
        LoadError::invalid(
            "paths.base_dir",
            format!("failed to resolve `{}`: {err}", base_dir.display()),
        )
    })?;

    let source = paths
        .source
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_FILE));
    if source.as_os_str().is_empty() {
        return Err(LoadError::invalid("paths.source", "file name must not be empty"));
    }

    let output = paths
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
    if output.as_os_str().is_empty() {
        return Err(LoadError::invalid("paths.output", "file name must not be empty"));
    }

    if base_dir.join(&source) == base_dir.join(&output) {
        return Err(LoadError::invalid(
            "paths.output",
            "output must not overwrite the source file",
        ));
    }

    Ok(PathSettings {
        base_dir,
        source,
        output,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_diagram_settings(
    diagrams: RawDiagramSettings,
    paths: &PathSettings,
) -> Result<DiagramSettings, LoadError> {
    let languages = match diagrams.languages {
        Some(languages) => languages
            .iter()
            .map(|lang| lang.trim().to_ascii_lowercase())
            .filter(|lang| !lang.is_empty())
            .collect::<Vec<_>>(),
        None => DEFAULT_DIAGRAM_LANGUAGES
            .iter()
            .map(|lang| lang.to_string())
            .collect(),
    };
    if languages.is_empty() {
        return Err(LoadError::invalid(
            "diagrams.languages",
            "at least one diagram language is required",
        ));
    }

    let link = diagrams
        .link
        .map(|link| link.trim().to_string())
        .filter(|link| !link.is_empty())
        .unwrap_or_else(|| default_link(&paths.source));

    Ok(DiagramSettings { languages, link })
}

fn default_link(source: &Path) -> String {
    source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string_lossy().into_owned())
}

fn build_document_settings(document: RawDocumentSettings) -> DocumentSettings {
    DocumentSettings {
        title: document
            .title
            .unwrap_or_else(|| DEFAULT_DOCUMENT_TITLE.to_string()),
        cover_title: document
            .cover_title
            .unwrap_or_else(|| DEFAULT_COVER_TITLE.to_string()),
        subtitles: document.subtitles.unwrap_or_else(|| {
            DEFAULT_SUBTITLES
                .iter()
                .map(|subtitle| subtitle.to_string())
                .collect()
        }),
        author: document.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        lang: document
            .lang
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| DEFAULT_LANG.to_string()),
        include_toc: document.include_toc.unwrap_or(false),
    }
}

fn build_render_settings(render: RawRenderSettings) -> ExtensionSet {
    let defaults = ExtensionSet::default();
    ExtensionSet {
        tables: render.tables.unwrap_or(defaults.tables),
        highlight: render.highlight.unwrap_or(defaults.highlight),
        table_of_contents: render
            .table_of_contents
            .unwrap_or(defaults.table_of_contents),
        attribute_lists: render.attribute_lists.unwrap_or(defaults.attribute_lists),
        raw_html: render.raw_html.unwrap_or(defaults.raw_html),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPathSettings {
    base_dir: Option<PathBuf>,
    source: Option<PathBuf>,
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDiagramSettings {
    languages: Option<Vec<String>>,
    link: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDocumentSettings {
    title: Option<String>,
    cover_title: Option<String>,
    subtitles: Option<Vec<String>>,
    author: Option<String>,
    lang: Option<String>,
    include_toc: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    tables: Option<bool>,
    highlight: Option<bool>,
    table_of_contents: Option<bool>,
    attribute_lists: Option<bool>,
    raw_html: Option<bool>,
}

#[cfg(test)]
mod tests;
