//! Typed rows built from a raw table through a [`CanonicalSchema`].

use crate::{columns::CanonicalSchema, error::Warning, io_utils::RawTable};

/// One input row. The CTR cell stays raw; it is normalized per bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based line the row starts on in the input (header is line 1).
    pub row: usize,
    pub query: Option<String>,
    pub landing_page: Option<String>,
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: String,
    pub position: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub records: Vec<Record>,
    pub warnings: Vec<Warning>,
}

pub fn build_records(table: &RawTable, schema: &CanonicalSchema) -> RecordSet {
    let mut set = RecordSet::default();
    for (idx, raw) in table.rows.iter().enumerate() {
        let row = table.line(idx);
        match build_record(row, raw, schema) {
            Ok(record) => set.records.push(record),
            Err(reason) => set.warnings.push(Warning::RowSkipped { row, reason }),
        }
    }
    set
}

fn build_record(row: usize, raw: &[String], schema: &CanonicalSchema) -> Result<Record, String> {
    let cell = |index: usize| raw.get(index).map(|s| s.trim()).unwrap_or("");
    let text = |index: usize| Some(cell(index)).filter(|s| !s.is_empty()).map(str::to_string);

    let clicks = parse_count(cell(schema.clicks.index))
        .map_err(|err| format!("Clicks {err}"))?;
    let impressions = parse_count(cell(schema.impressions.index))
        .map_err(|err| format!("Impressions {err}"))?;
    let position = parse_position(cell(schema.position.index))
        .map_err(|err| format!("Position {err}"))?;

    Ok(Record {
        row,
        query: text(schema.query.index),
        landing_page: schema.landing_page.as_ref().and_then(|c| text(c.index)),
        clicks,
        impressions,
        ctr: cell(schema.ctr.index).to_string(),
        position,
    })
}

/// Non-negative integer, tolerating thousands separators and a zero fraction
/// (`"1,204"`, `"15.0"`).
pub fn parse_count(raw: &str) -> Result<u64, String> {
    if raw.is_empty() {
        return Err("value is empty".to_string());
    }
    let digits = raw.replace(',', "");
    if let Ok(value) = digits.parse::<u64>() {
        return Ok(value);
    }
    match digits.parse::<f64>() {
        // `u64::MAX as f64` rounds up to 2^64, which no u64 can hold.
        Ok(value) if value >= u64::MAX as f64 => {
            Err(format!("value '{raw}' exceeds the largest supported count"))
        }
        Ok(value) if value.is_finite() && value >= 0.0 && value.fract() == 0.0 => {
            Ok(value as u64)
        }
        _ => Err(format!("value '{raw}' is not a non-negative integer")),
    }
}

pub fn parse_position(raw: &str) -> Result<f64, String> {
    if raw.is_empty() {
        return Err("value is empty".to_string());
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("value '{raw}' is not a number")),
    }
}
