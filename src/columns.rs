//! Column reconciliation against the canonical Search Console schema.
//!
//! Exports from Search Console, and from the crawlers and rank trackers that
//! re-export its data, name the same columns differently (`Top queries`,
//! `Avg. CTR`, `Avg Pos`, ...). [`resolve_columns`] maps an input header row
//! onto the six canonical fields once, so that every later stage works with
//! column indices instead of re-scanning names.

use std::fmt;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{cli::ColumnsArgs, error::CtrStatsError, io_utils, table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CanonicalField {
    Query,
    LandingPage,
    Clicks,
    Impressions,
    Ctr,
    Position,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Query,
        CanonicalField::LandingPage,
        CanonicalField::Clicks,
        CanonicalField::Impressions,
        CanonicalField::Ctr,
        CanonicalField::Position,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::Query => "Query",
            CanonicalField::LandingPage => "Landing Page",
            CanonicalField::Clicks => "Clicks",
            CanonicalField::Impressions => "Impressions",
            CanonicalField::Ctr => "CTR",
            CanonicalField::Position => "Position",
        }
    }

    /// Accepted header spellings, in search order. Matching is case-sensitive.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::Query => &[
                "Query",
                "query",
                "queries",
                "Queries",
                "keywords",
                "keyword",
                "Keyword",
                "Keywords",
                "Top queries",
            ],
            CanonicalField::LandingPage => {
                &["Landing Page", "landing page", "URLs", "Address", "address"]
            }
            CanonicalField::Clicks => &["Clicks", "clicks"],
            CanonicalField::Impressions => &["Impressions", "impressions"],
            CanonicalField::Ctr => &["CTR", "Avg. CTR", "URL CTR"],
            CanonicalField::Position => &[
                "Position",
                "Avg. Position",
                "Avg Position",
                "Avg. Pos",
                "Avg Pos",
                "Positions",
                "positions",
                "Pos",
                "pos",
                "Avg.Position",
            ],
        }
    }

    /// Landing Page is the only field the aggregation can run without.
    pub fn is_mandatory(&self) -> bool {
        !matches!(self, CanonicalField::LandingPage)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub name: String,
    pub index: usize,
}

/// Canonical field to input column mapping with every mandatory field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSchema {
    pub query: ResolvedColumn,
    pub landing_page: Option<ResolvedColumn>,
    pub clicks: ResolvedColumn,
    pub impressions: ResolvedColumn,
    pub ctr: ResolvedColumn,
    pub position: ResolvedColumn,
}

impl CanonicalSchema {
    pub fn column(&self, field: CanonicalField) -> Option<&ResolvedColumn> {
        match field {
            CanonicalField::Query => Some(&self.query),
            CanonicalField::LandingPage => self.landing_page.as_ref(),
            CanonicalField::Clicks => Some(&self.clicks),
            CanonicalField::Impressions => Some(&self.impressions),
            CanonicalField::Ctr => Some(&self.ctr),
            CanonicalField::Position => Some(&self.position),
        }
    }
}

/// Outcome of matching a header row, including fields that did not resolve.
#[derive(Debug, Clone, Default)]
pub struct ColumnResolution {
    matches: Vec<(CanonicalField, ResolvedColumn)>,
}

impl ColumnResolution {
    pub fn get(&self, field: CanonicalField) -> Option<&ResolvedColumn> {
        self.matches
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, column)| column)
    }

    /// Mandatory fields with no alias present, in canonical order.
    pub fn missing_mandatory(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| field.is_mandatory() && self.get(*field).is_none())
            .collect()
    }

    pub fn into_schema(self) -> Result<CanonicalSchema, CtrStatsError> {
        let take = |field: CanonicalField| self.get(field).cloned();
        let (Some(query), Some(clicks), Some(impressions), Some(ctr), Some(position)) = (
            take(CanonicalField::Query),
            take(CanonicalField::Clicks),
            take(CanonicalField::Impressions),
            take(CanonicalField::Ctr),
            take(CanonicalField::Position),
        ) else {
            return Err(CtrStatsError::SchemaResolution {
                missing: self.missing_mandatory(),
            });
        };
        Ok(CanonicalSchema {
            query,
            landing_page: take(CanonicalField::LandingPage),
            clicks,
            impressions,
            ctr,
            position,
        })
    }
}

/// Matches each canonical field against `headers`, first alias wins.
pub fn match_columns(headers: &[String]) -> ColumnResolution {
    let matches = CanonicalField::ALL
        .into_iter()
        .filter_map(|field| {
            field.aliases().iter().find_map(|alias| {
                headers
                    .iter()
                    .position(|header| clean_header(header) == *alias)
                    .map(|index| {
                        (
                            field,
                            ResolvedColumn {
                                name: headers[index].clone(),
                                index,
                            },
                        )
                    })
            })
        })
        .collect();
    ColumnResolution { matches }
}

pub fn resolve_columns(headers: &[String]) -> Result<CanonicalSchema, CtrStatsError> {
    match_columns(headers).into_schema()
}

fn clean_header(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}

/// Human readable hint listing accepted spellings for `fields`.
pub fn describe_aliases(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|field| format!("- {}: {}", field.name(), field.aliases().join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let Some(input) = &args.input else {
        let headers = vec![
            "field".to_string(),
            "required".to_string(),
            "aliases".to_string(),
        ];
        let rows = CanonicalField::ALL
            .iter()
            .map(|field| {
                vec![
                    field.name().to_string(),
                    required_label(*field),
                    field.aliases().join(", "),
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
        return Ok(());
    };

    let delimiter = io_utils::resolve_input_delimiter(input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let raw = io_utils::read_table(input, delimiter, encoding)
        .with_context(|| format!("Reading input table {input:?}"))?;
    let resolution = match_columns(&raw.headers);

    let headers = vec![
        "field".to_string(),
        "required".to_string(),
        "column".to_string(),
    ];
    let rows = CanonicalField::ALL
        .iter()
        .map(|field| {
            let column = resolution
                .get(*field)
                .map(|column| column.name.clone())
                .unwrap_or_else(|| "<missing>".to_string());
            vec![field.name().to_string(), required_label(*field), column]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);

    let missing = resolution.missing_mandatory();
    if !missing.is_empty() {
        info!("Expected column names:\n{}", describe_aliases(&missing));
        return Err(CtrStatsError::SchemaResolution { missing }.into());
    }
    info!(
        "All required columns resolved in {:?} ({} input column(s))",
        input,
        raw.headers.len()
    );
    Ok(())
}

fn required_label(field: CanonicalField) -> String {
    let label = if field.is_mandatory() { "yes" } else { "no" };
    label.to_string()
}
