//! Plain-language summaries: one prediction line per variable and the four
//! summary cards.

use serde::Serialize;
use std::fmt;
use wpe_core::result::{TrendDirection, VariableData};
use wpe_core::{QueryResult, VariableId};

use crate::probability::{best_conditions_probability, extreme_weather_probability, is_high_extreme};
use crate::trend::{historical_trend, HistoricalTrend};

/// Phrase describing what a mean value means for the chosen day.
pub fn prediction_phrase(variable: VariableId, mean: f64) -> String {
    let phrase = match variable {
        VariableId::Precipitation if mean > 10.0 => "will be wet",
        VariableId::Precipitation if mean < 1.0 => "will be dry",
        VariableId::Temperature if mean > 30.0 => "will be very hot",
        VariableId::Temperature if mean < 10.0 => "will be cold",
        VariableId::WindSpeed if mean > 15.0 => "will be windy",
        VariableId::Humidity if mean > 80.0 => "will be humid",
        _ => {
            return format!(
                "will have moderate {}",
                variable.display_name().to_lowercase()
            )
        }
    };
    phrase.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub variable: VariableId,
    /// e.g. `August 3 will be wet`
    pub headline: String,
    pub expected: f64,
    pub unit: String,
    /// Regression direction and absolute percent change, when the backend
    /// sent a direction.
    pub trend: Option<(TrendDirection, f64)>,
}

impl Prediction {
    pub fn new(day_label: &str, variable: VariableId, data: &VariableData, unit: &str) -> Self {
        let mean = data.statistics.mean;
        let trend = data.statistics.trend.as_ref().and_then(|t| {
            t.trend_direction
                .map(|d| (d, t.percent_change.unwrap_or(0.0).abs()))
        });
        Self {
            variable,
            headline: format!("{day_label} {}", prediction_phrase(variable, mean)),
            expected: mean,
            unit: unit.to_string(),
            trend,
        }
    }

    /// `Expected: 25.4 celsius • ↗ 10.5% increasing`
    pub fn detail(&self) -> String {
        let mut detail = format!("Expected: {:.1} {}", self.expected, self.unit);
        if let Some((direction, percent)) = self.trend {
            detail.push_str(&format!(
                " • {} {percent:.1}% {direction}",
                direction.arrow()
            ));
        }
        detail
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.headline, self.detail())
    }
}

/// Predictions for every variable, in response order.
pub fn predictions(result: &QueryResult) -> Vec<Prediction> {
    result
        .historical_data
        .iter()
        .map(|(variable, data)| {
            Prediction::new(
                &result.query_info.day_of_year,
                *variable,
                data,
                result.metadata.unit_for(*variable),
            )
        })
        .collect()
}

/// Headline cards at the top of the results view.
///
/// Best conditions, extreme weather and the historical trend are computed
/// from the first variable in the response only. With no variables at all
/// they fall back to zero and stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    pub location: String,
    pub years_analyzed: u32,
    pub basis: Option<VariableId>,
    pub best_conditions_percent: f64,
    pub extreme_weather_percent: f64,
    pub historical_trend: HistoricalTrend,
}

impl SummaryCards {
    pub fn from_result(result: &QueryResult) -> Self {
        let first = result.first_variable();
        let (best, extreme, trend) = match first {
            Some((_, data)) => (
                best_conditions_probability(data),
                extreme_weather_probability(data),
                historical_trend(&data.values),
            ),
            None => (0.0, 0.0, historical_trend(&[])),
        };
        Self {
            location: result.location_label().to_string(),
            years_analyzed: result.query_info.years_analyzed,
            basis: first.map(|(id, _)| id),
            best_conditions_percent: best,
            extreme_weather_percent: extreme,
            historical_trend: trend,
        }
    }

    pub fn extreme_is_high(&self) -> bool {
        is_high_extreme(self.extreme_weather_percent)
    }

    /// `High` or `Low`.
    pub fn extreme_label(&self) -> &'static str {
        if self.extreme_is_high() {
            "High"
        } else {
            "Low"
        }
    }

    /// `Stable`, or the rounded magnitude such as `181.8%`.
    pub fn trend_label(&self) -> String {
        match self.historical_trend.direction {
            TrendDirection::Stable => "Stable".to_string(),
            _ => format!("{:.1}%", self.historical_trend.magnitude),
        }
    }
}
