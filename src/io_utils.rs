//! Input loading and output sinks.
//!
//! The whole input file is read and decoded up front: exports are small and
//! the analysis filters the same rows once per position bucket.
//!
//! - **Delimiter resolution**: `.tsv` → tab, anything else → comma, unless
//!   overridden.
//! - **Encoding**: decoding via `encoding_rs`, UTF-8 by default. A byte order
//!   mark overrides the requested encoding.
//! - **stdin/stdout**: the `-` path reads stdin; a missing or `-` output path
//!   writes stdout.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::error::CtrStatsError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Header row plus data rows, exactly as read from the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Input line each row starts on. Empty when the table was built in memory.
    pub lines: Vec<usize>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            lines: Vec::new(),
        }
    }

    pub fn with_lines(mut self, lines: Vec<usize>) -> Self {
        self.lines = lines;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 1-based input line on which data row `index` starts (header is line 1).
    /// Without recorded lines every row is assumed to span one line.
    pub fn line(&self, index: usize) -> usize {
        self.lines.get(index).copied().unwrap_or(index + 2)
    }
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'")),
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| delimiter_for_extension(path).unwrap_or(DEFAULT_CSV_DELIMITER))
}

pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>, fallback: u8) -> u8 {
    provided
        .or_else(|| path.and_then(delimiter_for_extension))
        .unwrap_or(fallback)
}

fn delimiter_for_extension(path: &Path) -> Option<u8> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => Some(DEFAULT_TSV_DELIMITER),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Some(DEFAULT_CSV_DELIMITER),
        _ => None,
    }
}

/// Reads, decodes and parses `path` into a [`RawTable`].
pub fn read_table(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<RawTable, CtrStatsError> {
    let bytes = read_input_bytes(path)?;
    let text = decode_bytes(&bytes, encoding)?;
    parse_table(&text, delimiter)
}

fn read_input_bytes(path: &Path) -> Result<Vec<u8>, CtrStatsError> {
    let mut buffer = Vec::new();
    let outcome = if is_dash(path) {
        io::stdin().lock().read_to_end(&mut buffer)
    } else {
        File::open(path).and_then(|mut file| file.read_to_end(&mut buffer))
    };
    outcome.map_err(|err| CtrStatsError::input_read(format!("{}: {err}", path.display())))?;
    Ok(buffer)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String, CtrStatsError> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(CtrStatsError::input_read(format!(
            "input is not valid {} text",
            used.name()
        )))
    } else {
        Ok(text.into_owned())
    }
}

pub fn parse_table(text: &str, delimiter: u8) -> Result<RawTable, CtrStatsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(CtrStatsError::input_read)?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if headers.iter().all(|header| header.trim().is_empty()) {
        return Err(CtrStatsError::input_read("input has no header row"));
    }

    let mut rows = Vec::new();
    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record.map_err(CtrStatsError::input_read)?;
        let line = record
            .position()
            .map(|position| position.line() as usize)
            .unwrap_or(rows.len() + 2);
        lines.push(line);
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    Ok(RawTable::new(headers, rows).with_lines(lines))
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) if !is_dash(p) => Ok(Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        ))),
        _ => Ok(Box::new(io::stdout().lock())),
    }
}

pub fn open_csv_writer(path: Option<&Path>, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let sink = open_output(path)?;
    Ok(csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(sink))
}
