//! Probability heuristics shown on the summary cards.
//!
//! Both functions return a percentage in `0..=100` and return 0 for an empty
//! series instead of dividing by zero.

use wpe_core::result::VariableData;

/// Extreme-weather probabilities above this are flagged as high.
pub const HIGH_EXTREME_PERCENT: f64 = 20.0;

/// Band half-width, in standard deviations, used when percentiles are missing.
pub const EXTREME_STD_MULTIPLIER: f64 = 1.5;

fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Share of values within one standard deviation of the mean
/// (`mean - std <= v <= mean + std`).
///
/// The dashboard computes this for the first variable of a result only; see
/// [`crate::summary::SummaryCards`].
pub fn best_conditions_probability(data: &VariableData) -> f64 {
    let stats = &data.statistics;
    let lower = stats.mean - stats.std;
    let upper = stats.mean + stats.std;
    let within = data
        .values
        .iter()
        .filter(|v| **v >= lower && **v <= upper)
        .count();
    percent_of(within, data.values.len())
}

/// Likelihood of extreme weather for one variable.
///
/// Prefers the largest backend threshold probability (a fraction, scaled to
/// percent). Without threshold probabilities, counts values outside the
/// p10/p90 band, or outside `mean ± 1.5 std` when either percentile is absent.
/// An empty series is 0 whatever the backend sent.
pub fn extreme_weather_probability(data: &VariableData) -> f64 {
    if data.values.is_empty() {
        return 0.0;
    }
    if !data.probabilities.is_empty() {
        let max = data
            .probabilities
            .values()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        return (max * 100.0).clamp(0.0, 100.0);
    }

    let stats = &data.statistics;
    let (lower, upper) = match (stats.percentile_10, stats.percentile_90) {
        (Some(p10), Some(p90)) => (p10, p90),
        _ => (
            stats.mean - EXTREME_STD_MULTIPLIER * stats.std,
            stats.mean + EXTREME_STD_MULTIPLIER * stats.std,
        ),
    };
    let outside = data
        .values
        .iter()
        .filter(|v| **v < lower || **v > upper)
        .count();
    percent_of(outside, data.values.len())
}

pub fn is_high_extreme(percent: f64) -> bool {
    percent > HIGH_EXTREME_PERCENT
}

/// Render a backend probability key: `above_35.0` -> `> 35.0`,
/// `below_5.0` -> `< 5.0`. Unrecognized keys are returned as-is.
pub fn describe_probability_key(key: &str) -> String {
    if let Some(threshold) = key.strip_prefix("above_") {
        format!("> {threshold}")
    } else if let Some(threshold) = key.strip_prefix("below_") {
        format!("< {threshold}")
    } else {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample, series};
    use wpe_core::VariableId;

    #[test]
    fn best_conditions_counts_one_std_window() {
        let data = series(&[10.0, 20.0, 30.0, 40.0, 50.0], 30.0, 15.8);
        // window [14.2, 45.8] holds 20, 30, 40
        assert!((best_conditions_probability(&data) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn empty_series_gives_zero() {
        let data = series(&[], 0.0, 0.0);
        assert_eq!(best_conditions_probability(&data), 0.0);
        assert_eq!(extreme_weather_probability(&data), 0.0);
    }

    #[test]
    fn empty_series_ignores_threshold_probabilities() {
        let mut data = series(&[], 0.0, 0.0);
        data.probabilities.insert("above_35.0".to_string(), 0.5);
        assert_eq!(extreme_weather_probability(&data), 0.0);
    }

    #[test]
    fn extreme_prefers_threshold_probabilities() {
        let result = sample();
        let precipitation = result.historical_data.get(&VariableId::Precipitation).unwrap();
        let percent = extreme_weather_probability(precipitation);
        assert!((percent - 100.0 / 3.0).abs() < 1e-9);
        assert!(is_high_extreme(percent));

        let temperature = result.historical_data.get(&VariableId::Temperature).unwrap();
        assert_eq!(extreme_weather_probability(temperature), 0.0);
    }

    #[test]
    fn extreme_falls_back_to_percentile_band() {
        let mut data = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0], 5.5, 2.87);
        data.statistics.percentile_10 = Some(1.9);
        data.statistics.percentile_90 = Some(9.1);
        // 1.0 and 10.0 sit outside
        assert!((extreme_weather_probability(&data) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn extreme_falls_back_to_std_band() {
        let data = series(&[10.0, 10.0, 10.0, 10.0, 30.0], 14.0, 8.0);
        // band [2, 26]; only 30 is outside
        assert!((extreme_weather_probability(&data) - 20.0).abs() < 1e-9);
        assert!(!is_high_extreme(20.0));
    }

    #[test]
    fn results_stay_in_percent_range() {
        let mut data = series(&[1.0, 2.0, 3.0], 2.0, 0.5);
        data.probabilities.insert("above_1.0".to_string(), 1.7);
        assert_eq!(extreme_weather_probability(&data), 100.0);
        let best = best_conditions_probability(&data);
        assert!((0.0..=100.0).contains(&best));
    }

    #[test]
    fn probability_keys_read_naturally() {
        assert_eq!(describe_probability_key("above_35.0"), "> 35.0");
        assert_eq!(describe_probability_key("below_5.0"), "< 5.0");
        assert_eq!(describe_probability_key("humid"), "humid");
    }
}
