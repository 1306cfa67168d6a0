//! Sectioned CSV dump of a query result.
//!
//! Layout, top to bottom: header lines, the statistics table, one
//! `Year,Value` block per variable, then the threshold probabilities.
//! Sections are separated by blank lines and the output has no trailing
//! newline. Numbers are written at full precision.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::debug;
use wpe_core::QueryResult;

use crate::error::Result;

const STATISTICS_HEADER: [&str; 9] = [
    "Variable", "Mean", "Median", "Std Dev", "Min", "Max", "P25", "P75", "Count",
];

/// Accumulates CSV lines; records go through the csv writer for quoting,
/// blank separators are pushed as-is.
struct Lines {
    lines: Vec<String>,
}

impl Lines {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn record<I, T>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut bytes = Vec::new();
        {
            let mut writer = WriterBuilder::new()
                .flexible(true)
                .quote_style(QuoteStyle::Necessary)
                .terminator(Terminator::Any(b'\n'))
                .from_writer(&mut bytes);
            writer.write_record(fields)?;
            writer.flush().map_err(csv::Error::from)?;
        }
        let mut line = String::from_utf8(bytes)?;
        if line.ends_with('\n') {
            line.pop();
        }
        self.lines.push(line);
        Ok(())
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Render `result` as the sectioned CSV document.
pub fn to_csv(result: &QueryResult) -> Result<String> {
    let info = &result.query_info;
    let mut out = Lines::new();

    out.record([format!("Location: {}", result.location_label())])?;
    out.record([format!("Day of Year: {}", info.day_of_year)])?;
    out.record([format!("Years Analyzed: {}", info.years_analyzed)])?;
    out.record([format!("Data Period: {}", info.data_period)])?;
    out.blank();

    out.record(STATISTICS_HEADER)?;
    for (variable, data) in result.historical_data.iter() {
        let stats = &data.statistics;
        out.record([
            variable.to_string(),
            stats.mean.to_string(),
            stats.median.to_string(),
            stats.std.to_string(),
            stats.min.to_string(),
            stats.max.to_string(),
            stats.percentile_25.to_string(),
            stats.percentile_75.to_string(),
            data.count().to_string(),
        ])?;
    }

    out.blank();
    out.record(["Historical Values"])?;
    for (variable, data) in result.historical_data.iter() {
        out.blank();
        out.record([format!(
            "{} ({})",
            variable,
            result.metadata.unit_for(*variable)
        )])?;
        out.record(["Year", "Value"])?;
        for (year, value) in data.year_values() {
            out.record([year.to_string(), value.to_string()])?;
        }
    }

    out.blank();
    out.record(["Threshold Probabilities"])?;
    out.record(["Variable", "Threshold", "Probability"])?;
    for (variable, data) in result.historical_data.iter() {
        for (threshold, probability) in data.probabilities.iter() {
            out.record([variable.to_string(), threshold.clone(), probability.to_string()])?;
        }
    }

    let document = out.finish();
    debug!("Rendered CSV export ({} bytes)", document.len());
    Ok(document)
}
