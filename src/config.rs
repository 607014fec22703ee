//! Run settings for `analyze`.
//!
//! Values come from command-line flags first, then the optional YAML file
//! passed with `--config`, then built-in defaults.
//!
//! ```yaml
//! max_position: 10
//! delimiter: ";"
//! input_encoding: windows-1252
//! format: csv
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::{
    aggregate::DEFAULT_MAX_POSITION,
    cli::{AnalyzeArgs, OutputFormat, parse_delimiter},
    io_utils,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub max_position: Option<u32>,
    pub delimiter: Option<String>,
    pub input_encoding: Option<String>,
    pub format: Option<OutputFormat>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Not range-checked here; the aggregator rejects values outside 1..=20.
    pub max_position: u32,
    pub delimiter: u8,
    pub output_delimiter: u8,
    pub encoding: &'static Encoding,
    pub format: OutputFormat,
}

pub fn resolve_settings(args: &AnalyzeArgs) -> Result<Settings> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    merge(args, file)
}

fn merge(args: &AnalyzeArgs, file: FileConfig) -> Result<Settings> {
    let file_delimiter = file
        .delimiter
        .as_deref()
        .map(parse_delimiter)
        .transpose()
        .map_err(|err| anyhow!("Invalid delimiter in config: {err}"))?;
    let delimiter =
        io_utils::resolve_input_delimiter(&args.input, args.delimiter.or(file_delimiter));
    let encoding = io_utils::resolve_encoding(
        args.input_encoding
            .as_deref()
            .or(file.input_encoding.as_deref()),
    )?;
    let output = args.output.as_deref();
    let format = args
        .format
        .or(file.format)
        .unwrap_or_else(|| format_for_output(output));
    Ok(Settings {
        max_position: args
            .max_position
            .or(file.max_position)
            .unwrap_or(DEFAULT_MAX_POSITION),
        delimiter,
        output_delimiter: io_utils::resolve_output_delimiter(
            output,
            args.output_delimiter,
            delimiter,
        ),
        encoding,
        format,
    })
}

fn format_for_output(output: Option<&Path>) -> OutputFormat {
    match output {
        Some(path) if !io_utils::is_dash(path) => {
            match path.extension().and_then(|ext| ext.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
                Some(ext) if ext.eq_ignore_ascii_case("txt") => OutputFormat::Table,
                _ => OutputFormat::Csv,
            }
        }
        _ => OutputFormat::Table,
    }
}
