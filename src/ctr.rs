//! CTR cell parsing and percentage-scale normalization.
//!
//! Search Console writes CTR as `"5.2%"`, while spreadsheets and third-party
//! exports often carry the unit fraction `0.052`. Cells are parsed one by one,
//! but the fraction-to-percent decision is made for a whole position bucket at
//! once (see [`ScalePolicy::BucketMaximum`]).

use crate::error::CtrParseError;

/// Plain values whose bucket maximum stays below this are read as fractions.
pub const FRACTION_DETECTION_LIMIT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedCtr {
    pub value: f64,
    /// The cell carried a trailing `%` and is already on the percentage scale.
    pub percent_suffixed: bool,
}

pub fn parse_ctr_cell(raw: &str) -> Result<ParsedCtr, CtrParseError> {
    let trimmed = raw.trim();
    let (number, percent_suffixed) = match trimmed.strip_suffix('%') {
        Some(rest) => (rest.trim_end(), true),
        None => (trimmed, false),
    };
    let invalid = || CtrParseError {
        value: raw.to_string(),
    };
    let value = number.parse::<f64>().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(ParsedCtr {
        value,
        percent_suffixed,
    })
}

/// Rule for bringing plain-number CTR cells onto the 0–100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScalePolicy {
    /// Multiply every plain cell of a bucket by 100 when the largest plain
    /// value in that bucket is below [`FRACTION_DETECTION_LIMIT`].
    /// `%`-suffixed cells are never scaled. A bucket that mixes fractions with
    /// unsuffixed percentages is scaled as a whole and comes out wrong for
    /// one of the two groups.
    #[default]
    BucketMaximum,
}

impl ScalePolicy {
    /// Parses and normalizes the CTR cells of one bucket, preserving order.
    /// Unparseable cells come back as errors and take no part in scale
    /// detection.
    pub fn normalize_bucket<'a, I>(&self, cells: I) -> Vec<Result<f64, CtrParseError>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let parsed = cells.into_iter().map(parse_ctr_cell).collect::<Vec<_>>();
        let scale_plain = match self {
            ScalePolicy::BucketMaximum => parsed
                .iter()
                .filter_map(|cell| cell.as_ref().ok())
                .filter(|cell| !cell.percent_suffixed)
                .map(|cell| cell.value)
                .reduce(f64::max)
                .is_some_and(|max| max < FRACTION_DETECTION_LIMIT),
        };
        parsed
            .into_iter()
            .map(|cell| {
                cell.map(|cell| {
                    if scale_plain && !cell.percent_suffixed {
                        cell.value * 100.0
                    } else {
                        cell.value
                    }
                })
            })
            .collect()
    }
}

/// Truncates a percentage to an integer, absorbing the representation error
/// of fraction scaling (`0.29 * 100.0 == 28.999999999999996`).
pub fn floor_percent(value: f64) -> i64 {
    (value + 1e-9).floor() as i64
}
