//! Trend views of a variable's series.
//!
//! Two unrelated notions live here: a short-window heuristic comparing the
//! earliest and latest few years, and the chart/labels built on the
//! backend's linear regression ([`TrendAnalysis`]).

use serde::Serialize;
use std::fmt;
use wpe_core::result::{TrendAnalysis, TrendDirection, VariableData};

/// Years averaged at each end of the series by [`historical_trend`].
pub const TREND_WINDOW: usize = 3;

/// Percent changes within `±STABLE_PERCENT` count as stable.
pub const STABLE_PERCENT: f64 = 1.0;

/// Vertical padding around the regression chart, as a share of the range.
pub const TREND_CHART_PADDING: f64 = 0.15;

/// Vertical padding around the plain time-series chart.
pub const SERIES_CHART_PADDING: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoricalTrend {
    pub direction: TrendDirection,
    /// Absolute percent change between the two window averages.
    pub magnitude: f64,
}

impl HistoricalTrend {
    fn stable() -> Self {
        Self {
            direction: TrendDirection::Stable,
            magnitude: 0.0,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Compare the mean of the first [`TREND_WINDOW`] values with the mean of
/// the last [`TREND_WINDOW`].
///
/// Shorter series average over what they have, so the two windows overlap;
/// with three values or fewer both windows cover the whole series and the
/// result is stable. Fewer than two values, or an older mean of zero, also
/// read as stable.
pub fn historical_trend(values: &[f64]) -> HistoricalTrend {
    if values.len() < 2 {
        return HistoricalTrend::stable();
    }
    let window = TREND_WINDOW.min(values.len());
    let older = mean(&values[..window]);
    let recent = mean(&values[values.len() - window..]);
    if older == 0.0 {
        return HistoricalTrend::stable();
    }

    let change = (recent - older) / older * 100.0;
    if !change.is_finite() {
        return HistoricalTrend::stable();
    }
    let direction = if change > STABLE_PERCENT {
        TrendDirection::Increasing
    } else if change < -STABLE_PERCENT {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };
    HistoricalTrend {
        direction,
        magnitude: change.abs(),
    }
}

/// One year on the regression chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub actual: f64,
    pub trend: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pair every year with its observed value and `slope * year + intercept`,
/// both rounded to two decimals for display.
///
/// `None` when the backend sent no regression or no slope; a missing
/// intercept is taken as zero.
pub fn projection(data: &VariableData) -> Option<Vec<TrendPoint>> {
    let trend = data.statistics.trend.as_ref()?;
    let slope = trend.slope?;
    let intercept = trend.intercept.unwrap_or(0.0);
    Some(
        data.year_values()
            .map(|(year, actual)| TrendPoint {
                year,
                actual: round2(actual),
                trend: round2(slope * year as f64 + intercept),
            })
            .collect(),
    )
}

/// Chart bounds around `values`, widened by `padding_ratio` of their range
/// (or by 1 when the range is zero) and snapped outward to 0.1.
pub fn y_domain(values: impl IntoIterator<Item = f64>, padding_ratio: f64) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    let mut padding = (max - min) * padding_ratio;
    if padding == 0.0 {
        padding = 1.0;
    }
    Some((
        ((min - padding) * 10.0).floor() / 10.0,
        ((max + padding) * 10.0).ceil() / 10.0,
    ))
}

/// Bounds for the regression chart: actual and fitted values together.
pub fn projection_domain(points: &[TrendPoint]) -> Option<(f64, f64)> {
    y_domain(
        points.iter().flat_map(|p| [p.actual, p.trend]),
        TREND_CHART_PADDING,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RSquaredStrength {
    Strong,
    Moderate,
    Weak,
}

impl RSquaredStrength {
    pub fn classify(r_squared: f64) -> Self {
        if r_squared > 0.7 {
            RSquaredStrength::Strong
        } else if r_squared > 0.4 {
            RSquaredStrength::Moderate
        } else {
            RSquaredStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RSquaredStrength::Strong => "strong",
            RSquaredStrength::Moderate => "moderate",
            RSquaredStrength::Weak => "weak",
        }
    }
}

impl fmt::Display for RSquaredStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// `Increasing by 10.5%`, `Decreasing by 3.0%` or `Stable trend`.
pub fn describe_regression(trend: &TrendAnalysis) -> String {
    let percent = trend.percent_change.unwrap_or(0.0).abs();
    match trend.trend_direction {
        Some(TrendDirection::Increasing) => format!("Increasing by {percent:.1}%"),
        Some(TrendDirection::Decreasing) => format!("Decreasing by {percent:.1}%"),
        _ => "Stable trend".to_string(),
    }
}
