use std::path::PathBuf;

use clap::{Args, Parser, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the mdprint binary.
#[derive(Debug, Parser, Default)]
#[command(
    name = "mdprint",
    version,
    about = "Convert a Markdown design document into print-ready HTML"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "MDPRINT_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConvertOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ConvertOverrides {
    /// Override the directory holding the source and output files.
    #[arg(long = "base-dir", value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub base_dir: Option<PathBuf>,

    /// Override the source Markdown file name, relative to the base directory.
    #[arg(long = "source", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub source: Option<PathBuf>,

    /// Override the output HTML file name, relative to the base directory.
    #[arg(long = "output", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Render the table of contents right after the cover page.
    #[arg(
        long = "toc",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub include_toc: Option<bool>,
}
