//! Local export of weather query results.
//!
//! Two formats are produced from a [`QueryResult`] already in memory: a
//! pretty-printed JSON dump and a sectioned CSV document. The server-side
//! download path in `wpe-core` re-fetches instead and is only named here.

mod csv_export;
mod filename;

pub use csv_export::to_csv;
pub use filename::{download_filename, generate_filename, generate_filename_today, slug};

use log::info;
use wpe_core::{ExportFormat, QueryResult};

/// Error types
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ExportError {
        #[error("Failed to write CSV: {0}")]
        Csv(#[from] csv::Error),

        #[error("Failed to write JSON: {0}")]
        Json(#[from] serde_json::Error),

        #[error("Export produced invalid UTF-8: {0}")]
        Utf8(#[from] std::string::FromUtf8Error),
    }

    pub type Result<T> = std::result::Result<T, ExportError>;
}

pub use error::{ExportError, Result};

/// Pretty-printed JSON (two-space indent) with keys in the order the
/// backend sent them.
pub fn to_json(result: &QueryResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// A rendered export ready to be written or offered for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

/// Render `result` in `format` and name it for `date`.
pub fn export(
    result: &QueryResult,
    format: ExportFormat,
    date: chrono::NaiveDate,
) -> Result<ExportedFile> {
    let content = match format {
        ExportFormat::Csv => to_csv(result)?,
        ExportFormat::Json => to_json(result)?,
    };
    let filename = generate_filename(result, format, date);
    info!("Exported {} ({} bytes)", filename, content.len());
    Ok(ExportedFile {
        filename,
        mime_type: format.mime_type(),
        content,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample;
    use chrono::NaiveDate;

    #[test]
    fn json_round_trips_to_an_equal_result() {
        let result = sample();
        let json = to_json(&result).unwrap();
        let back: QueryResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert!(json.starts_with("{\n  \"query_info\": {"));
    }

    /// The fixture filled out the way the backend always sends it: every
    /// optional key present, plus fields this crate does not model.
    fn backend_payload() -> serde_json::Value {
        let mut raw: serde_json::Value =
            serde_json::from_str(include_str!("../../fixtures/sample_response.json")).unwrap();
        raw["query_info"]["missing_data"] = serde_json::Value::Null;
        raw["query_info"]["cache_hit"] = serde_json::json!(false);
        let stats = &mut raw["historical_data"]["precipitation"]["statistics"];
        for key in ["percentile_10", "percentile_90", "count", "trend"] {
            stats[key] = serde_json::Value::Null;
        }
        raw["historical_data"]["temperature"]["statistics"]["trend"]["p_value"] =
            serde_json::json!(0.0612);
        raw["metadata"]["generated_at"] = serde_json::json!("2025-01-09T10:00:00Z");
        raw
    }

    #[test]
    fn json_export_reproduces_the_received_document() {
        let raw = backend_payload();
        let result: QueryResult = serde_json::from_value(raw.clone()).unwrap();
        let json = to_json(&result).unwrap();
        let exported: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(exported, raw);
        assert!(json.contains("\"missing_data\": null"));
    }

    #[test]
    fn json_keeps_received_key_order() {
        let json = to_json(&sample()).unwrap();
        let temperature = json.find("\"temperature\": {\n      \"values\"").unwrap();
        let precipitation = json.find("\"precipitation\": {\n      \"values\"").unwrap();
        assert!(temperature < precipitation);
    }

    #[test]
    fn export_names_and_types_the_file() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        let file = export(&sample(), ExportFormat::Csv, date).unwrap();
        assert_eq!(file.filename, "weather_data_nyeri__kenya_august_3_2025-01-09.csv");
        assert_eq!(file.mime_type, ExportFormat::Csv.mime_type());
        assert!(file.content.starts_with("\"Location: Nyeri, Kenya\""));

        let file = export(&sample(), ExportFormat::Json, date).unwrap();
        assert!(file.filename.ends_with(".json"));
        assert!(file.content.contains("\"data_period\": \"2019-2024\""));
    }
}
