//! Bundled sample export for trying the analysis without real data.

use anyhow::{Context, Result};
use log::info;

use crate::{cli::SampleArgs, io_utils};

pub const SAMPLE_HEADERS: [&str; 5] = ["Position", "Clicks", "Impressions", "CTR", "Query"];

/// Maximum position the sample is meant to be analyzed with.
pub const SAMPLE_MAX_POSITION: u32 = 5;

pub const SAMPLE_ROWS: [(&str, &str, &str, &str, &str); 9] = [
    ("1.1", "120", "1000", "12%", "seo tips"),
    ("1.5", "95", "900", "10.5%", "python seo"),
    ("1.8", "80", "850", "9.4%", "seo guide"),
    ("2.2", "65", "800", "8.1%", "search console"),
    ("2.7", "50", "750", "6.7%", "gsc api"),
    ("3.1", "35", "700", "5%", "seo reporting"),
    ("3.6", "25", "650", "3.8%", "ctr analysis"),
    ("4.2", "15", "600", "2.5%", "position tracking"),
    ("4.8", "10", "550", "1.8%", "rank checker"),
];

pub fn sample_table() -> io_utils::RawTable {
    io_utils::RawTable::new(
        SAMPLE_HEADERS.iter().map(|h| h.to_string()).collect(),
        SAMPLE_ROWS
            .iter()
            .map(|(position, clicks, impressions, ctr, query)| {
                [position, clicks, impressions, ctr, query]
                    .iter()
                    .map(|cell| cell.to_string())
                    .collect()
            })
            .collect(),
    )
}

pub fn execute(args: &SampleArgs) -> Result<()> {
    let output = args.output.as_deref();
    let delimiter = io_utils::resolve_output_delimiter(output, None, b',');
    let mut writer = io_utils::open_csv_writer(output, delimiter)?;
    let table = sample_table();
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush().context("Writing sample data")?;
    info!(
        "Wrote {} sample row(s); analyze them with --max-position {}",
        table.row_count(),
        SAMPLE_MAX_POSITION
    );
    Ok(())
}
