//! Presentation of bucket results: integer cells, `%`-suffixed CTR cells and
//! the fixed output column order. Nothing is recomputed here.

use serde::Serialize;

use crate::aggregate::PositionBucketResult;

pub const OUTPUT_HEADERS: [&str; 7] = [
    "Position",
    "Sum Clicks",
    "Sum Impressions",
    "Avg CTR",
    "Min CTR",
    "Max CTR",
    "Max CTR KW",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedRow {
    #[serde(rename = "Position")]
    pub position: u32,
    #[serde(rename = "Sum Clicks")]
    pub sum_clicks: u64,
    #[serde(rename = "Sum Impressions")]
    pub sum_impressions: u64,
    #[serde(rename = "Avg CTR")]
    pub avg_ctr: String,
    #[serde(rename = "Min CTR")]
    pub min_ctr: String,
    #[serde(rename = "Max CTR")]
    pub max_ctr: String,
    #[serde(rename = "Max CTR KW")]
    pub max_ctr_query: String,
}

impl FormattedRow {
    /// Cells in [`OUTPUT_HEADERS`] order.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.position.to_string(),
            self.sum_clicks.to_string(),
            self.sum_impressions.to_string(),
            self.avg_ctr.clone(),
            self.min_ctr.clone(),
            self.max_ctr.clone(),
            self.max_ctr_query.clone(),
        ]
    }
}

impl From<&PositionBucketResult> for FormattedRow {
    fn from(result: &PositionBucketResult) -> Self {
        Self {
            position: result.position,
            sum_clicks: result.sum_clicks,
            sum_impressions: result.sum_impressions,
            avg_ctr: percent_cell(result.avg_ctr),
            min_ctr: percent_cell(result.min_ctr),
            max_ctr: percent_cell(result.max_ctr),
            max_ctr_query: result.max_ctr_query.clone(),
        }
    }
}

pub fn format_results(results: &[PositionBucketResult]) -> Vec<FormattedRow> {
    results.iter().map(FormattedRow::from).collect()
}

pub fn output_headers() -> Vec<String> {
    OUTPUT_HEADERS.iter().map(|h| h.to_string()).collect()
}

pub fn percent_cell(value: i64) -> String {
    format!("{value}%")
}

/// Reads back a cell written by [`percent_cell`].
pub fn parse_percent_cell(cell: &str) -> Option<i64> {
    cell.trim().strip_suffix('%')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> PositionBucketResult {
        PositionBucketResult {
            position: 3,
            sum_clicks: 35,
            sum_impressions: 700,
            avg_ctr: 5,
            min_ctr: 5,
            max_ctr: 5,
            max_ctr_query: "seo reporting".to_string(),
        }
    }

    #[test]
    fn cells_follow_header_order() {
        let row = FormattedRow::from(&result());
        assert_eq!(
            row.cells(),
            vec!["3", "35", "700", "5%", "5%", "5%", "seo reporting"]
        );
        assert_eq!(row.cells().len(), OUTPUT_HEADERS.len());
    }

    #[test]
    fn percent_cells_round_trip() {
        assert_eq!(parse_percent_cell(&percent_cell(37)), Some(37));
        assert_eq!(parse_percent_cell("37"), None);
        assert_eq!(parse_percent_cell("abc%"), None);
    }

    #[test]
    fn json_uses_output_column_names() {
        let json = serde_json::to_value(FormattedRow::from(&result())).expect("json");
        assert_eq!(json["Sum Impressions"], 700);
        assert_eq!(json["Max CTR KW"], "seo reporting");
        assert_eq!(json["Avg CTR"], "5%");
    }
}
