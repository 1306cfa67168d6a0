//! Ten-bin histograms of a variable's historical values.

use serde::Serialize;
use wpe_core::result::{Statistics, VariableData};

/// Number of equal-width bins between the series min and max.
pub const BIN_COUNT: usize = 10;

/// One bar of the probability histogram.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistogramBin {
    /// `start-end` with one decimal, e.g. `23.8-24.1`.
    pub range_label: String,
    pub bin_start: f64,
    pub bin_end: f64,
    /// Share of all values that fell in this bin, `0..=100`.
    pub probability_percent: f64,
    pub count: usize,
}

/// Partition `[min, max]` into [`BIN_COUNT`] equal-width bins and count the
/// values in each.
///
/// Bins are half-open `[start, end)` except the last, which is closed so
/// that `v == max` is counted. Values outside `[min, max]` are not counted.
/// An empty series yields ten empty bins at 0 %.
pub fn build_histogram(values: &[f64], statistics: &Statistics) -> Vec<HistogramBin> {
    let min = statistics.min;
    let max = statistics.max;
    let bin_size = (max - min) / BIN_COUNT as f64;
    let total = values.len();

    (0..BIN_COUNT)
        .map(|i| {
            let bin_start = min + i as f64 * bin_size;
            let last = i == BIN_COUNT - 1;
            // shared exactly with the next bin's start
            let bin_end = if last {
                max
            } else {
                min + (i + 1) as f64 * bin_size
            };
            let count = values
                .iter()
                .filter(|v| {
                    if last {
                        **v >= bin_start && **v <= bin_end
                    } else {
                        **v >= bin_start && **v < bin_end
                    }
                })
                .count();
            let probability_percent = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            HistogramBin {
                range_label: format!("{bin_start:.1}-{bin_end:.1}"),
                bin_start,
                bin_end,
                probability_percent,
                count,
            }
        })
        .collect()
}

/// [`build_histogram`] over a variable's own values and statistics.
pub fn histogram_for(data: &VariableData) -> Vec<HistogramBin> {
    build_histogram(&data.values, &data.statistics)
}

/// Tallest bar, used to scale the chart.
pub fn peak_probability(bins: &[HistogramBin]) -> f64 {
    bins.iter()
        .map(|b| b.probability_percent)
        .fold(0.0, f64::max)
}
