use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    aggregate::{Analysis, PositionAggregator},
    cli::{AnalyzeArgs, OutputFormat},
    columns::{self, CanonicalField, CanonicalSchema},
    config::{self, Settings},
    error::CtrStatsError,
    format::{self, FormattedRow},
    io_utils::{self, RawTable},
    record, table,
};

/// Resolves columns, builds records and aggregates them by position.
///
/// Only schema and range problems fail here. Row, cell and bucket problems
/// end up in [`Analysis::warnings`]; an analysis without any computed bucket
/// fails later, in [`Analysis::into_results`].
pub fn analyze_table(table: &RawTable, max_position: u32) -> Result<Analysis, CtrStatsError> {
    let schema = columns::resolve_columns(&table.headers)?;
    log_schema(&schema);
    let aggregator = PositionAggregator::new(max_position)?;
    let record_set = record::build_records(table, &schema);
    debug!(
        "Built {} record(s) from {} row(s)",
        record_set.records.len(),
        table.row_count()
    );
    let mut analysis = aggregator.aggregate(&record_set.records);
    let mut warnings = record_set.warnings;
    warnings.append(&mut analysis.warnings);
    analysis.warnings = warnings;
    Ok(analysis)
}

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let settings = config::resolve_settings(args)?;
    info!(
        "Analyzing '{}' up to position {} (delimiter '{}', encoding {})",
        args.input.display(),
        settings.max_position,
        crate::printable_delimiter(settings.delimiter),
        settings.encoding.name()
    );
    let raw = io_utils::read_table(&args.input, settings.delimiter, settings.encoding)
        .with_context(|| format!("Reading input table {:?}", args.input))?;

    let analysis = analyze_table(&raw, settings.max_position).inspect_err(|err| {
        if let CtrStatsError::SchemaResolution { missing } = err {
            info!("Expected column names:\n{}", columns::describe_aliases(missing));
        }
    })?;
    for warning in &analysis.warnings {
        warn!("{warning}");
    }
    let warning_count = analysis.warnings.len();
    let results = analysis.into_results()?;

    let rows = format::format_results(&results);
    write_output(&rows, &settings, args.output.as_deref())?;
    info!(
        "Computed {} position bucket(s) with {} warning(s)",
        rows.len(),
        warning_count
    );
    Ok(())
}

fn log_schema(schema: &CanonicalSchema) {
    let mapped = CanonicalField::ALL
        .iter()
        .filter_map(|field| {
            schema
                .column(*field)
                .map(|column| format!("{} → {}", column.name, field.name()))
        })
        .collect::<Vec<_>>();
    info!("Columns found: {}", mapped.join(", "));
}

fn write_output(rows: &[FormattedRow], settings: &Settings, output: Option<&Path>) -> Result<()> {
    let target = output
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".into());
    match settings.format {
        OutputFormat::Table => {
            let cells = rows.iter().map(FormattedRow::cells).collect::<Vec<_>>();
            let rendered = table::render_table(&format::output_headers(), &cells);
            let mut sink = io_utils::open_output(output)?;
            sink.write_all(rendered.as_bytes())?;
            sink.flush()?;
        }
        OutputFormat::Csv => {
            let mut writer = io_utils::open_csv_writer(output, settings.output_delimiter)?;
            writer.write_record(format::OUTPUT_HEADERS)?;
            for row in rows {
                writer.write_record(row.cells())?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            let mut sink = io_utils::open_output(output)?;
            serde_json::to_writer_pretty(&mut sink, rows)?;
            writeln!(sink)?;
            sink.flush()?;
        }
    }
    debug!("Wrote {} row(s) to {target}", rows.len());
    Ok(())
}
