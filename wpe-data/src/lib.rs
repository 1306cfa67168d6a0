//! Derived values for weather query results.
//!
//! Everything here is a pure function of a [`wpe_core::QueryResult`] (or one
//! of its variables): histograms, probability heuristics, trend lines, table
//! ordering and the text shown on summary cards. Missing or empty data never
//! panics; it falls back to zero percentages or a stable trend.

pub mod histogram;
pub mod probability;
pub mod summary;
pub mod table;
pub mod trend;

/// Coefficient-of-variation classification.
pub mod variability {
    use serde::Serialize;
    use std::fmt;
    use wpe_core::result::Statistics;

    pub const HIGH_RATIO: f64 = 0.3;
    pub const MODERATE_RATIO: f64 = 0.15;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Variability {
        High,
        Moderate,
        Consistent,
    }

    impl Variability {
        pub fn as_str(&self) -> &'static str {
            match self {
                Variability::High => "High variability",
                Variability::Moderate => "Moderate variability",
                Variability::Consistent => "Consistent",
            }
        }
    }

    impl fmt::Display for Variability {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.pad(self.as_str())
        }
    }

    /// `std / mean`, or `None` when the mean is zero.
    pub fn coefficient_of_variation(statistics: &Statistics) -> Option<f64> {
        let ratio = statistics.std / statistics.mean;
        if statistics.mean == 0.0 || !ratio.is_finite() {
            None
        } else {
            Some(ratio)
        }
    }

    /// Descriptive only; a zero mean reads as consistent.
    pub fn classify(statistics: &Statistics) -> Variability {
        match coefficient_of_variation(statistics) {
            Some(cv) if cv > HIGH_RATIO => Variability::High,
            Some(cv) if cv > MODERATE_RATIO => Variability::Moderate,
            _ => Variability::Consistent,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::test_support::{sample, stats_with_range};
        use wpe_core::VariableId;

        #[test]
        fn thresholds_split_three_ways() {
            let mut stats = stats_with_range(0.0, 100.0);
            stats.mean = 10.0;
            stats.std = 4.0;
            assert_eq!(classify(&stats), Variability::High);
            stats.std = 2.0;
            assert_eq!(classify(&stats), Variability::Moderate);
            stats.std = 1.5;
            assert_eq!(classify(&stats), Variability::Consistent);
        }

        #[test]
        fn zero_mean_is_consistent() {
            let mut stats = stats_with_range(-1.0, 1.0);
            stats.mean = 0.0;
            stats.std = 1.0;
            assert_eq!(coefficient_of_variation(&stats), None);
            assert_eq!(classify(&stats), Variability::Consistent);
        }

        #[test]
        fn fixture_temperature_is_consistent() {
            let result = sample();
            let temperature = result.historical_data.get(&VariableId::Temperature).unwrap();
            assert_eq!(classify(&temperature.statistics), Variability::Consistent);
            assert_eq!(Variability::Moderate.to_string(), "Moderate variability");
        }
    }
}
