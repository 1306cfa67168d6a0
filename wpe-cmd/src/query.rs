//! `query`, `summarize` and `download`: fetch or load a result, print the
//! report, and optionally write exports.

use anyhow::{bail, Context};
use clap::Args;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use wpe_core::client::WeatherApi;
use wpe_core::{
    DayOfYear, ExportFormat, HistoricalYears, Location, QueryRequest, QueryResult, ThresholdKey,
    Thresholds, VariableId,
};
use wpe_data::table::{SortDirection, SortField, SortState};

use crate::config::Config;
use crate::report::{RenderOptions, Report};
use crate::session::{Outcome, QuerySession};

/// What to ask the backend. Every flag defaults to the dashboard's initial
/// selection.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Latitude in degrees; requires --lon
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude in degrees; requires --lat
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Display name for a custom location
    #[arg(long)]
    pub name: Option<String>,

    /// Day of year as MM-DD
    #[arg(short, long, default_value = "08-03")]
    pub day: DayOfYear,

    #[arg(long, default_value_t = 2019)]
    pub start_year: i32,

    #[arg(long, default_value_t = 2024)]
    pub end_year: i32,

    /// Variables to analyze (comma separated or repeated)
    #[arg(
        long = "variable",
        value_delimiter = ',',
        default_values_t = [VariableId::Temperature, VariableId::Precipitation]
    )]
    pub variables: Vec<VariableId>,

    /// Override one cutoff, e.g. `temperature.hot=32`
    #[arg(long = "threshold", value_parser = parse_threshold)]
    pub thresholds: Vec<(ThresholdKey, f64)>,

    /// Let the backend apply its own cutoffs
    #[arg(long, conflicts_with = "thresholds")]
    pub no_thresholds: bool,
}

impl QueryArgs {
    pub fn to_request(&self) -> QueryRequest {
        let location = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Location::new(lat, lon, self.name.clone()),
            _ => {
                let mut location = Location::dashboard_default();
                if let Some(name) = &self.name {
                    location.name = Some(name.clone());
                }
                location
            }
        };
        let thresholds = if self.no_thresholds {
            None
        } else {
            let mut thresholds = Thresholds::dashboard_default();
            for (key, value) in &self.thresholds {
                thresholds.set(*key, *value);
            }
            Some(thresholds)
        };
        QueryRequest {
            location,
            day_of_year: self.day,
            historical_years: HistoricalYears {
                start_year: self.start_year,
                end_year: self.end_year,
            },
            variables: self.variables.clone(),
            thresholds,
        }
    }
}

/// Parse `variable.name=value`.
pub fn parse_threshold(raw: &str) -> Result<(ThresholdKey, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.parse::<ThresholdKey>().map_err(|e| e.to_string())?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("threshold value '{value}' is not a number"))?;
    if !value.is_finite() {
        return Err(format!("threshold value '{value}' is not finite"));
    }
    Ok((key, value))
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Statistics table column: variable, mean, median, std, min or max
    #[arg(long, default_value = "variable")]
    pub sort: SortField,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Only the header, summary cards and statistics table
    #[arg(long)]
    pub compact: bool,
}

impl ReportArgs {
    pub fn options(&self) -> RenderOptions {
        let direction = if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        RenderOptions {
            sort: SortState::new(self.sort, direction),
            compact: self.compact,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write the result as pretty JSON to this file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Also export as csv or json under a generated file name
    #[arg(long)]
    pub export: Option<ExportFormat>,

    /// Directory for --export
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

/// Write `--save` and `--export` outputs, returning the paths written.
pub fn write_outputs(result: &QueryResult, output: &OutputArgs) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if let Some(path) = &output.save {
        let json = wpe_export::to_json(result)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path.clone());
    }
    if let Some(format) = output.export {
        let today = chrono::Utc::now().date_naive();
        let file = wpe_export::export(result, format, today)?;
        let path = write_into(&output.out_dir, &file.filename, file.content.as_bytes())?;
        written.push(path);
    }
    Ok(written)
}

fn write_into(dir: &Path, filename: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(filename);
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

fn print_result(result: &QueryResult, report: &ReportArgs, output: &OutputArgs) -> anyhow::Result<()> {
    print!("{}", Report::new(result, report.options()));
    for path in write_outputs(result, output)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

pub async fn run_query(
    config: &Config,
    args: &QueryArgs,
    report: &ReportArgs,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let request = args.to_request();
    let session = QuerySession::new(WeatherApi::new(config.api_url.as_str()));
    match session.submit(&request).await {
        Outcome::Applied => {}
        Outcome::Failed(message) | Outcome::Rejected(message) => bail!(message),
        Outcome::Stale => bail!("Query was superseded by a newer one"),
    }
    let Some(result) = session.result() else {
        bail!("Query finished without a result");
    };
    print_result(&result, report, output)
}

/// Load a result saved earlier with `query --save`.
pub fn load_result(path: &Path) -> anyhow::Result<QueryResult> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let result: QueryResult = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a saved query result", path.display()))?;
    result.validate()?;
    Ok(result)
}

pub fn run_summarize(input: &Path, report: &ReportArgs, output: &OutputArgs) -> anyhow::Result<()> {
    let result = load_result(input)?;
    info!("Loaded result for {}", result.location_label());
    print_result(&result, report, output)
}

/// Fetch the server-side export and save it as `weather-data-<lat>-<lon>.<ext>`.
pub async fn run_download(
    config: &Config,
    args: &QueryArgs,
    format: ExportFormat,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let request = args.to_request();
    request.validate()?;
    let api = WeatherApi::new(config.api_url.as_str());
    let bytes = api.download_data(&request, format).await?;
    let filename = wpe_export::download_filename(&request.location, format);
    let path = write_into(out_dir, &filename, &bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}
