//! Error and warning types shared by the analysis pipeline.
//!
//! [`CtrStatsError`] covers the conditions that abort a run. [`Warning`]
//! covers the local conditions that are recovered in place: a bad CTR cell,
//! a bucket that cannot be computed, or a row whose numeric fields do not
//! parse. Warnings travel next to the partial result instead of through the
//! error path.

use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::columns::CanonicalField;

#[derive(Debug, Error)]
pub enum CtrStatsError {
    #[error("Failed to read input table: {message}")]
    InputRead { message: String },

    #[error("Missing required columns: {}", format_fields(.missing))]
    SchemaResolution { missing: Vec<CanonicalField> },

    #[error("Maximum position must be between {min} and {max} (got {value})")]
    InvalidMaxPosition { value: u32, min: u32, max: u32 },

    #[error(
        "No results were generated for positions 1 to {max_position}; check that the data contains position values in that range"
    )]
    EmptyResult { max_position: u32 },
}

impl CtrStatsError {
    pub(crate) fn input_read(message: impl fmt::Display) -> Self {
        CtrStatsError::InputRead {
            message: message.to_string(),
        }
    }
}

fn format_fields(fields: &[CanonicalField]) -> String {
    fields.iter().map(CanonicalField::name).join(", ")
}

/// A CTR cell that could not be coerced to a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("CTR value '{value}' is not numeric")]
pub struct CtrParseError {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketSkipReason {
    ZeroImpressions,
    NoParseableCtr,
    CountOverflow,
}

impl fmt::Display for BucketSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketSkipReason::ZeroImpressions => f.write_str("impressions sum to zero"),
            BucketSkipReason::NoParseableCtr => f.write_str("no row has a numeric CTR"),
            BucketSkipReason::CountOverflow => {
                f.write_str("clicks or impressions total exceeds the supported range")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// `row` is the 1-based line number in the input file (header is line 1).
    CtrParse { row: usize, value: String },
    BucketComputation {
        position: u32,
        reason: BucketSkipReason,
    },
    RowSkipped { row: usize, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::CtrParse { row, value } => {
                write!(f, "Row {row}: CTR value '{value}' is not numeric; treated as missing")
            }
            Warning::BucketComputation { position, reason } => {
                write!(f, "Could not process position {position}: {reason}")
            }
            Warning::RowSkipped { row, reason } => write!(f, "Row {row} skipped: {reason}"),
        }
    }
}
