pub mod aggregate;
pub mod analyze;
pub mod cli;
pub mod columns;
pub mod config;
pub mod ctr;
pub mod error;
pub mod format;
pub mod io_utils;
pub mod record;
pub mod sample;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::aggregate::{Analysis, BucketOutcome, PositionAggregator, PositionBucketResult};
pub use crate::analyze::analyze_table;
pub use crate::error::{CtrStatsError, Warning};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("gsc_ctr_stats", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => analyze::execute(&args),
        Commands::Columns(args) => columns::execute(&args),
        Commands::Sample(args) => sample::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
