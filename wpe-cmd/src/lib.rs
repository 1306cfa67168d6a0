//! Command implementations for the weather probability explorer CLI.
//!
//! Provides subcommands for running historical weather queries, rendering
//! and exporting results, and the supporting catalog, health and geocoding
//! lookups.

use clap::Subcommand;
use std::path::PathBuf;
use wpe_core::ExportFormat;

pub mod catalog;
pub mod config;
pub mod geocode;
pub mod query;
pub mod report;
pub mod search;
pub mod session;

pub use config::Config;

#[derive(Subcommand)]
pub enum Command {
    /// Query historical statistics for a location and day of year
    Query {
        #[command(flatten)]
        query: query::QueryArgs,

        #[command(flatten)]
        report: query::ReportArgs,

        #[command(flatten)]
        output: query::OutputArgs,
    },

    /// Render a result saved earlier with `query --save`
    Summarize {
        /// Saved result JSON
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        report: query::ReportArgs,

        #[command(flatten)]
        output: query::OutputArgs,
    },

    /// Download the server-generated export for a query
    Download {
        #[command(flatten)]
        query: query::QueryArgs,

        /// csv or json
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Directory to write the file into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// List the variables the backend can analyze
    Variables,

    /// Check backend health and Earthdata authentication
    Health,

    /// Search for a place name
    Geocode {
        /// Place to look up, at least three characters
        text: String,

        /// Print the location for the suggestion at this position
        #[arg(long)]
        select: Option<usize>,
    },
}

pub async fn run(config: &Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Query {
            query: args,
            report,
            output,
        } => query::run_query(config, &args, &report, &output).await,
        Command::Summarize {
            input,
            report,
            output,
        } => query::run_summarize(&input, &report, &output),
        Command::Download {
            query: args,
            format,
            out_dir,
        } => query::run_download(config, &args, format, &out_dir).await,
        Command::Variables => catalog::run_variables(config).await,
        Command::Health => catalog::run_health(config).await,
        Command::Geocode { text, select } => geocode::run_geocode(config, &text, select).await,
    }
}
