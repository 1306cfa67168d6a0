//! The response side of the data model, as returned by `POST /weather/query`.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{Result, WeatherError};
use crate::ordered_map::OrderedMap;
use crate::query::{Location, QueryRequest};
use crate::variable::VariableId;

/// Direction of a trend, shared by the backend regression and the
/// client-side short-window heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }

    pub fn arrow(&self) -> char {
        match self {
            TrendDirection::Increasing => '↗',
            TrendDirection::Decreasing => '↘',
            TrendDirection::Stable => '→',
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Linear fit computed by the backend over the whole historical series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    #[serde(default)]
    pub slope: Option<f64>,
    #[serde(default)]
    pub intercept: Option<f64>,
    #[serde(default)]
    pub r_squared: Option<f64>,
    #[serde(default)]
    pub trend_direction: Option<TrendDirection>,
    #[serde(default)]
    pub percent_change: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Summary statistics of one variable's series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub percentile_25: f64,
    pub percentile_75: f64,
    #[serde(default)]
    pub percentile_10: Option<f64>,
    #[serde(default)]
    pub percentile_90: Option<f64>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub trend: Option<TrendAnalysis>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Statistics {
    /// True when `min <= p25 <= median <= p75 <= max`.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.percentile_25
            && self.percentile_25 <= self.median
            && self.median <= self.percentile_75
            && self.percentile_75 <= self.max
    }
}

/// One variable's historical series plus backend-derived numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableData {
    /// One value per analyzed year, parallel to `years`.
    pub values: Vec<f64>,
    pub years: Vec<i32>,
    pub statistics: Statistics,
    /// Threshold probabilities as fractions in `[0, 1]`, keyed like
    /// `above_35.0` / `below_5.0`.
    #[serde(default)]
    pub probabilities: OrderedMap<String, f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VariableData {
    /// `(year, value)` pairs in array order.
    pub fn year_values(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.years.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of observations, preferring the backend's count.
    pub fn count(&self) -> u64 {
        self.statistics.count.unwrap_or(self.values.len() as u64)
    }
}

/// Dataset coordinate the backend resolved the requested location to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub lat: f64,
    pub lon: f64,
    pub dataset: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Echo of the request plus what the backend actually analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    pub requested_location: Location,
    #[serde(default)]
    pub actual_grid_points: OrderedMap<VariableId, GridPoint>,
    /// Human label such as `August 3`.
    pub day_of_year: String,
    pub years_analyzed: u32,
    /// Such as `2019-2024`.
    pub data_period: String,
    /// Years the backend had no data for, per variable.
    #[serde(default)]
    pub missing_data: Option<OrderedMap<VariableId, Vec<i32>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub data_sources: OrderedMap<VariableId, DataSource>,
    #[serde(default)]
    pub units: OrderedMap<VariableId, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    /// Unit label for `variable`, empty when the backend sent none.
    pub fn unit_for(&self, variable: VariableId) -> &str {
        self.units.get(&variable).map(String::as_str).unwrap_or("")
    }
}

/// Shown in place of a location the user picked on the map without a name.
pub const CUSTOM_LOCATION_LABEL: &str = "Custom Location";

/// Full response of `POST /weather/query`.
///
/// Every response struct keeps fields it does not model in `extra`, and
/// optional fields serialize as `null`, so re-encoding a decoded response
/// reproduces what the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query_info: QueryInfo,
    pub historical_data: OrderedMap<VariableId, VariableData>,
    pub metadata: Metadata,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueryResult {
    /// The variable the summary cards are computed from.
    pub fn first_variable(&self) -> Option<(VariableId, &VariableData)> {
        self.historical_data.first().map(|(id, data)| (*id, data))
    }

    pub fn location_name(&self) -> Option<&str> {
        self.query_info.requested_location.name.as_deref()
    }

    /// Location name for display, [`CUSTOM_LOCATION_LABEL`] when unnamed.
    pub fn location_label(&self) -> &str {
        self.location_name().unwrap_or(CUSTOM_LOCATION_LABEL)
    }

    /// Structural checks that do not depend on the originating request.
    ///
    /// Mismatched `values`/`years` lengths are an error; unordered
    /// percentiles are only logged.
    pub fn validate(&self) -> Result<()> {
        for (variable, data) in self.historical_data.iter() {
            if data.values.len() != data.years.len() {
                return Err(WeatherError::MalformedResponse(format!(
                    "{} has {} values but {} years",
                    variable,
                    data.values.len(),
                    data.years.len()
                )));
            }
            if !data.statistics.is_ordered() {
                warn!(
                    "Statistics for {} are not ordered (min {}, p25 {}, median {}, p75 {}, max {})",
                    variable,
                    data.statistics.min,
                    data.statistics.percentile_25,
                    data.statistics.median,
                    data.statistics.percentile_75,
                    data.statistics.max
                );
            }
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus: every returned variable was requested.
    pub fn validate_against(&self, request: &QueryRequest) -> Result<()> {
        self.validate()?;
        if let Some(extra) = self
            .historical_data
            .keys()
            .find(|v| !request.variables.contains(v))
        {
            return Err(WeatherError::MalformedResponse(format!(
                "{extra} was returned but not requested"
            )));
        }
        Ok(())
    }
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub earthdata_authenticated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../../fixtures/sample_response.json");

    fn sample() -> QueryResult {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn decodes_sample_response() {
        let result = sample();
        assert_eq!(result.query_info.day_of_year, "August 3");
        assert_eq!(result.query_info.years_analyzed, 6);
        let (first, data) = result.first_variable().unwrap();
        assert_eq!(first, VariableId::Temperature);
        assert_eq!(data.values.len(), data.years.len());
        assert_eq!(result.metadata.unit_for(VariableId::Precipitation), "mm/day");
        assert_eq!(result.metadata.unit_for(VariableId::Humidity), "percent");
        let trend = data.statistics.trend.clone().unwrap();
        assert_eq!(trend.trend_direction, Some(TrendDirection::Increasing));
        assert!(result.validate().is_ok());
        assert_eq!(result.location_label(), "Nyeri, Kenya");
    }

    #[test]
    fn unnamed_location_has_a_label() {
        let mut result = sample();
        result.query_info.requested_location.name = None;
        assert_eq!(result.location_label(), CUSTOM_LOCATION_LABEL);
    }

    #[test]
    fn count_falls_back_to_values_length() {
        let result = sample();
        let precipitation = result
            .historical_data
            .get(&VariableId::Precipitation)
            .unwrap();
        assert_eq!(precipitation.statistics.count, None);
        assert_eq!(precipitation.count(), precipitation.values.len() as u64);
    }

    #[test]
    fn mismatched_series_is_malformed() {
        let mut result = sample();
        let mut data = result
            .historical_data
            .get(&VariableId::Temperature)
            .cloned()
            .unwrap();
        data.years.pop();
        result.historical_data.insert(VariableId::Temperature, data);
        let err = result.validate().unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }

    #[test]
    fn unrequested_variables_are_rejected() {
        let result = sample();
        let mut request = QueryRequest::dashboard_default();
        assert!(result.validate_against(&request).is_ok());
        request.variables = vec![VariableId::Temperature];
        assert!(result.validate_against(&request).is_err());
    }

    #[test]
    fn unmodelled_fields_and_nulls_survive_reencoding() {
        let mut raw: Value = serde_json::from_str(SAMPLE).unwrap();
        raw["query_info"]["missing_data"] = Value::Null;
        raw["query_info"]["requested_location"]["name"] = Value::Null;
        raw["query_info"]["processing_seconds"] = serde_json::json!(2.5);
        raw["historical_data"]["temperature"]["statistics"]["trend"]["p_value"] =
            serde_json::json!(0.04);

        let result: QueryResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.query_info.missing_data, None);
        assert_eq!(result.location_label(), CUSTOM_LOCATION_LABEL);
        assert_eq!(
            result.query_info.extra.get("processing_seconds"),
            Some(&serde_json::json!(2.5))
        );

        let back = serde_json::to_value(&result).unwrap();
        assert_eq!(back["query_info"]["missing_data"], Value::Null);
        assert!(back["query_info"]["requested_location"]
            .as_object()
            .unwrap()
            .contains_key("name"));
        assert_eq!(back["query_info"]["processing_seconds"], 2.5);
        assert_eq!(
            back["historical_data"]["temperature"]["statistics"]["trend"]["p_value"],
            0.04
        );
    }

    #[test]
    fn statistics_ordering() {
        let mut stats = sample().first_variable().unwrap().1.statistics.clone();
        assert!(stats.is_ordered());
        stats.percentile_25 = stats.max + 1.0;
        assert!(!stats.is_ordered());
    }
}
