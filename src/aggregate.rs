//! Position-bucket aggregation.
//!
//! Records are partitioned into half-open buckets `[p, p + 1)` for every
//! integer `p` in `1..=max_position`, and each non-empty bucket is reduced to
//! a [`PositionBucketResult`]. A bucket that has rows but cannot be computed
//! yields [`BucketOutcome::Skipped`] and a warning; a bucket without rows
//! yields nothing at all.
//!
//! Two CTR figures are deliberately computed independently:
//!
//! - `max_ctr` is the largest CTR after bucket normalization.
//! - `max_ctr_query` labels the row that sorts first by its raw CTR value,
//!   before any fraction scaling.
//!
//! In a bucket that mixes `%` cells with fraction cells these point at
//! different rows.

use std::cmp::Ordering;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    ctr::{ScalePolicy, floor_percent, parse_ctr_cell},
    error::{BucketSkipReason, CtrStatsError, Warning},
    record::Record,
};

pub const MIN_POSITION: u32 = 1;
pub const MAX_POSITION: u32 = 20;
pub const DEFAULT_MAX_POSITION: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionBucketResult {
    pub position: u32,
    pub sum_clicks: u64,
    pub sum_impressions: u64,
    /// Impression-weighted: `round(sum_clicks / sum_impressions * 100)`.
    pub avg_ctr: i64,
    pub min_ctr: i64,
    pub max_ctr: i64,
    pub max_ctr_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketOutcome {
    Computed(PositionBucketResult),
    Skipped {
        position: u32,
        reason: BucketSkipReason,
    },
}

impl BucketOutcome {
    pub fn position(&self) -> u32 {
        match self {
            BucketOutcome::Computed(result) => result.position,
            BucketOutcome::Skipped { position, .. } => *position,
        }
    }

    pub fn as_computed(&self) -> Option<&PositionBucketResult> {
        match self {
            BucketOutcome::Computed(result) => Some(result),
            BucketOutcome::Skipped { .. } => None,
        }
    }
}

/// Outcomes of every non-empty bucket plus the warnings raised on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub max_position: u32,
    pub outcomes: Vec<BucketOutcome>,
    pub warnings: Vec<Warning>,
}

impl Analysis {
    pub fn computed(&self) -> impl Iterator<Item = &PositionBucketResult> {
        self.outcomes.iter().filter_map(BucketOutcome::as_computed)
    }

    /// Computed buckets in ascending position, or [`CtrStatsError::EmptyResult`]
    /// when not a single bucket could be computed.
    pub fn into_results(self) -> Result<Vec<PositionBucketResult>, CtrStatsError> {
        let results = self.computed().cloned().collect::<Vec<_>>();
        if results.is_empty() {
            Err(CtrStatsError::EmptyResult {
                max_position: self.max_position,
            })
        } else {
            Ok(results)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PositionAggregator {
    max_position: u32,
    policy: ScalePolicy,
}

impl PositionAggregator {
    pub fn new(max_position: u32) -> Result<Self, CtrStatsError> {
        if !(MIN_POSITION..=MAX_POSITION).contains(&max_position) {
            return Err(CtrStatsError::InvalidMaxPosition {
                value: max_position,
                min: MIN_POSITION,
                max: MAX_POSITION,
            });
        }
        Ok(Self {
            max_position,
            policy: ScalePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: ScalePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_position(&self) -> u32 {
        self.max_position
    }

    pub fn aggregate(&self, records: &[Record]) -> Analysis {
        let reports = (MIN_POSITION..=self.max_position)
            .filter_map(|position| {
                let rows = records
                    .iter()
                    .filter(|record| in_bucket(position, record.position))
                    .collect::<Vec<_>>();
                (!rows.is_empty()).then(|| self.reduce_bucket(position, &rows))
            })
            .collect::<Vec<_>>();

        let mut outcomes = Vec::with_capacity(reports.len());
        let mut warnings = Vec::new();
        for (outcome, bucket_warnings) in reports {
            warnings.extend(bucket_warnings);
            if let BucketOutcome::Skipped { position, reason } = &outcome {
                warnings.push(Warning::BucketComputation {
                    position: *position,
                    reason: reason.clone(),
                });
            }
            outcomes.push(outcome);
        }
        Analysis {
            max_position: self.max_position,
            outcomes,
            warnings,
        }
    }

    fn reduce_bucket(&self, position: u32, rows: &[&Record]) -> (BucketOutcome, Vec<Warning>) {
        let mut warnings = Vec::new();
        let normalized = self
            .policy
            .normalize_bucket(rows.iter().map(|row| row.ctr.as_str()));
        let ctrs = rows
            .iter()
            .zip(normalized)
            .filter_map(|(row, value)| match value {
                Ok(value) => Some(value),
                Err(err) => {
                    warnings.push(Warning::CtrParse {
                        row: row.row,
                        value: err.value,
                    });
                    None
                }
            })
            .collect::<Vec<_>>();

        let skipped = |reason| BucketOutcome::Skipped { position, reason };
        let (Some(sum_clicks), Some(sum_impressions)) = (
            checked_sum(rows.iter().map(|row| row.clicks)),
            checked_sum(rows.iter().map(|row| row.impressions)),
        ) else {
            return (skipped(BucketSkipReason::CountOverflow), warnings);
        };
        if sum_impressions == 0 {
            return (skipped(BucketSkipReason::ZeroImpressions), warnings);
        }
        let (Some(min), Some(max)) = (
            ctrs.iter().copied().reduce(f64::min),
            ctrs.iter().copied().reduce(f64::max),
        ) else {
            return (skipped(BucketSkipReason::NoParseableCtr), warnings);
        };

        let max_ctr_query = rows
            .iter()
            .map(|row| (parse_ctr_cell(&row.ctr).ok().map(|cell| cell.value), row))
            .sorted_by(|(a, _), (b, _)| descending_raw_ctr(*a, *b))
            .next()
            .and_then(|(_, row)| row.query.clone())
            .unwrap_or_default();

        let result = PositionBucketResult {
            position,
            sum_clicks,
            sum_impressions,
            avg_ctr: weighted_ctr(sum_clicks, sum_impressions),
            min_ctr: floor_percent(min),
            max_ctr: floor_percent(max),
            max_ctr_query,
        };
        (BucketOutcome::Computed(result), warnings)
    }
}

pub fn in_bucket(position: u32, value: f64) -> bool {
    let lower = f64::from(position);
    value >= lower && value < lower + 1.0
}

/// `round(clicks / impressions * 100)`, ties to even.
pub fn weighted_ctr(clicks: u64, impressions: u64) -> i64 {
    (clicks as f64 / impressions as f64 * 100.0).round_ties_even() as i64
}

fn checked_sum(mut values: impl Iterator<Item = u64>) -> Option<u64> {
    values.try_fold(0u64, u64::checked_add)
}

/// Highest raw CTR first; unparseable cells last. The sort is stable, so
/// equal values keep input order.
fn descending_raw_ctr(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(left), Some(right)) => right.total_cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
