use chrono::NaiveDate;
use wpe_core::{ExportFormat, Location, QueryResult};

/// Lowercase ASCII letters and digits survive; every other character
/// becomes `_`.
pub fn slug(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// `weather_data_<location>_<day>_<YYYY-MM-DD>.<ext>` for a local export.
///
/// Pure in its arguments; an unnamed location is written as `location`.
pub fn generate_filename(result: &QueryResult, format: ExportFormat, date: NaiveDate) -> String {
    let location = result
        .location_name()
        .map(slug)
        .unwrap_or_else(|| "location".to_string());
    format!(
        "weather_data_{}_{}_{}.{}",
        location,
        slug(&result.query_info.day_of_year),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// [`generate_filename`] stamped with today's UTC date.
pub fn generate_filename_today(result: &QueryResult, format: ExportFormat) -> String {
    generate_filename(result, format, chrono::Utc::now().date_naive())
}

/// `weather-data-<lat>-<lon>.<ext>` for a file fetched from the server.
pub fn download_filename(location: &Location, format: ExportFormat) -> String {
    format!(
        "weather-data-{}-{}.{}",
        location.lat,
        location.lon,
        format.extension()
    )
}
