//! The request side of the data model: everything a user picks before
//! pressing "analyze".

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WeatherError};
use crate::variable::VariableId;

/// Year used to resolve month lengths. A leap year, so February 29 stays
/// selectable.
const SELECTION_YEAR: i32 = 2024;

/// A geographic point with an optional display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub name: Option<String>,
    /// Fields echoed back by the backend that are not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Location {
    pub fn new(lat: f64, lon: f64, name: Option<String>) -> Self {
        Self {
            lat,
            lon,
            name,
            extra: Map::new(),
        }
    }

    /// Nyeri, Kenya
    pub fn dashboard_default() -> Self {
        Self {
            lat: -0.4197,
            lon: 36.9489,
            name: Some("Nyeri, Kenya".to_string()),
            extra: Map::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(WeatherError::Validation(format!(
                "Latitude must be between -90 and 90 (got {})",
                self.lat
            )));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(WeatherError::Validation(format!(
                "Longitude must be between -180 and 180 (got {})",
                self.lon
            )));
        }
        Ok(())
    }
}

/// A calendar day without a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayOfYear {
    pub month: u32,
    pub day: u32,
}

impl DayOfYear {
    pub fn new(month: u32, day: u32) -> Result<Self> {
        let max_day = Self::days_in_month(month).ok_or_else(|| {
            WeatherError::Validation(format!("Month must be between 1 and 12 (got {month})"))
        })?;
        if day == 0 || day > max_day {
            return Err(WeatherError::Validation(format!(
                "Day {day} is invalid for month {month}"
            )));
        }
        Ok(Self { month, day })
    }

    /// Number of selectable days in `month`, with February fixed at 29.
    pub fn days_in_month(month: u32) -> Option<u32> {
        (28..=31)
            .rev()
            .find(|day| NaiveDate::from_ymd_opt(SELECTION_YEAR, month, *day).is_some())
    }

    /// Move to another month, clipping the day to that month's length.
    pub fn with_month(&self, month: u32) -> Result<Self> {
        let max_day = Self::days_in_month(month).ok_or_else(|| {
            WeatherError::Validation(format!("Month must be between 1 and 12 (got {month})"))
        })?;
        Ok(Self {
            month,
            day: self.day.min(max_day),
        })
    }

    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }

    /// Label in the backend's `day_of_year` format, e.g. `August 3`.
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.day)
    }

    pub fn dashboard_default() -> Self {
        Self { month: 8, day: 3 }
    }
}

impl fmt::Display for DayOfYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Parses `MM-DD` (or `M-D`).
impl FromStr for DayOfYear {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || WeatherError::Validation(format!("Day of year must be MM-DD (got {s})"));
        let (month, day) = s.trim().split_once('-').ok_or_else(invalid)?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        let day = day.parse::<u32>().map_err(|_| invalid())?;
        DayOfYear::new(month, day)
    }
}

/// Inclusive range of years to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalYears {
    pub start_year: i32,
    pub end_year: i32,
}

impl HistoricalYears {
    pub fn new(start_year: i32, end_year: i32) -> Result<Self> {
        let years = Self {
            start_year,
            end_year,
        };
        years.validate()?;
        Ok(years)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_year > self.end_year {
            return Err(WeatherError::Validation(format!(
                "end_year must be >= start_year ({} > {})",
                self.start_year, self.end_year
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        let span = i64::from(self.end_year) - i64::from(self.start_year) + 1;
        usize::try_from(span).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dashboard_default() -> Self {
        Self {
            start_year: 2019,
            end_year: 2024,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cold: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wet: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindSpeedThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windy: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HumidityThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
}

/// Per-variable extremity cutoffs. A missing entry means the backend
/// applies its own default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<TemperatureThresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<PrecipitationThresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<WindSpeedThresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<HumidityThresholds>,
}

/// Addresses one cutoff inside [`Thresholds`], written `variable.name` on
/// the command line (`temperature.hot`, `humidity.low`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThresholdKey {
    TemperatureHot,
    TemperatureCold,
    PrecipitationWet,
    WindSpeedWindy,
    HumidityHigh,
    HumidityLow,
}

impl ThresholdKey {
    pub const ALL: [ThresholdKey; 6] = [
        ThresholdKey::TemperatureHot,
        ThresholdKey::TemperatureCold,
        ThresholdKey::PrecipitationWet,
        ThresholdKey::WindSpeedWindy,
        ThresholdKey::HumidityHigh,
        ThresholdKey::HumidityLow,
    ];

    pub fn variable(&self) -> VariableId {
        match self {
            ThresholdKey::TemperatureHot | ThresholdKey::TemperatureCold => VariableId::Temperature,
            ThresholdKey::PrecipitationWet => VariableId::Precipitation,
            ThresholdKey::WindSpeedWindy => VariableId::WindSpeed,
            ThresholdKey::HumidityHigh | ThresholdKey::HumidityLow => VariableId::Humidity,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThresholdKey::TemperatureHot => "hot",
            ThresholdKey::TemperatureCold => "cold",
            ThresholdKey::PrecipitationWet => "wet",
            ThresholdKey::WindSpeedWindy => "windy",
            ThresholdKey::HumidityHigh => "high",
            ThresholdKey::HumidityLow => "low",
        }
    }
}

impl fmt::Display for ThresholdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.variable(), self.name())
    }
}

impl FromStr for ThresholdKey {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        ThresholdKey::ALL
            .into_iter()
            .find(|key| key.to_string() == wanted)
            .ok_or_else(|| WeatherError::UnknownThreshold(s.to_string()))
    }
}

impl Thresholds {
    /// Cutoffs the dashboard starts with.
    pub fn dashboard_default() -> Self {
        Self {
            temperature: Some(TemperatureThresholds {
                hot: Some(35.0),
                cold: Some(5.0),
            }),
            precipitation: Some(PrecipitationThresholds { wet: Some(50.0) }),
            wind_speed: Some(WindSpeedThresholds { windy: Some(40.0) }),
            humidity: Some(HumidityThresholds {
                high: Some(80.0),
                low: Some(20.0),
            }),
        }
    }

    pub fn get(&self, key: ThresholdKey) -> Option<f64> {
        match key {
            ThresholdKey::TemperatureHot => self.temperature.and_then(|t| t.hot),
            ThresholdKey::TemperatureCold => self.temperature.and_then(|t| t.cold),
            ThresholdKey::PrecipitationWet => self.precipitation.and_then(|t| t.wet),
            ThresholdKey::WindSpeedWindy => self.wind_speed.and_then(|t| t.windy),
            ThresholdKey::HumidityHigh => self.humidity.and_then(|t| t.high),
            ThresholdKey::HumidityLow => self.humidity.and_then(|t| t.low),
        }
    }

    /// Set one cutoff, keeping the other cutoffs of the same variable.
    pub fn set(&mut self, key: ThresholdKey, value: f64) {
        match key {
            ThresholdKey::TemperatureHot => {
                self.temperature.get_or_insert_with(Default::default).hot = Some(value)
            }
            ThresholdKey::TemperatureCold => {
                self.temperature.get_or_insert_with(Default::default).cold = Some(value)
            }
            ThresholdKey::PrecipitationWet => {
                self.precipitation.get_or_insert_with(Default::default).wet = Some(value)
            }
            ThresholdKey::WindSpeedWindy => {
                self.wind_speed.get_or_insert_with(Default::default).windy = Some(value)
            }
            ThresholdKey::HumidityHigh => {
                self.humidity.get_or_insert_with(Default::default).high = Some(value)
            }
            ThresholdKey::HumidityLow => {
                self.humidity.get_or_insert_with(Default::default).low = Some(value)
            }
        }
    }

    /// Present cutoffs as `(key, value)` pairs in a fixed order.
    pub fn entries(&self) -> Vec<(ThresholdKey, f64)> {
        ThresholdKey::ALL
            .into_iter()
            .filter_map(|key| self.get(key).map(|v| (key, v)))
            .collect()
    }
}

/// Full request payload for `POST /weather/query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub location: Location,
    pub day_of_year: DayOfYear,
    pub historical_years: HistoricalYears,
    pub variables: Vec<VariableId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
}

impl QueryRequest {
    pub fn dashboard_default() -> Self {
        Self {
            location: Location::dashboard_default(),
            day_of_year: DayOfYear::dashboard_default(),
            historical_years: HistoricalYears::dashboard_default(),
            variables: vec![VariableId::Temperature, VariableId::Precipitation],
            thresholds: Some(Thresholds::dashboard_default()),
        }
    }

    /// Client-side checks run before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.variables.is_empty() {
            return Err(WeatherError::Validation(
                "Please select at least one weather variable".to_string(),
            ));
        }
        self.location.validate()?;
        DayOfYear::new(self.day_of_year.month, self.day_of_year.day)?;
        self.historical_years.validate()?;
        Ok(())
    }
}
