//! Plain-text rendering of a query result.
//!
//! One renderer serves every layout; [`RenderOptions`] picks the table order
//! and whether the per-variable detail sections are included.

use std::fmt;
use wpe_core::result::{TrendDirection, VariableData};
use wpe_core::{QueryResult, VariableId};
use wpe_data::histogram::{histogram_for, peak_probability};
use wpe_data::probability::describe_probability_key;
use wpe_data::summary::{predictions, SummaryCards};
use wpe_data::table::{sorted_variables, SortDirection, SortState};
use wpe_data::trend::{
    describe_regression, historical_trend, projection, projection_domain, y_domain,
    RSquaredStrength, SERIES_CHART_PADDING,
};
use wpe_data::variability;

/// Width of the tallest histogram bar, in characters.
const BAR_WIDTH: f64 = 30.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderOptions {
    pub sort: SortState,
    /// Header, cards and statistics table only.
    pub compact: bool,
}

pub struct Report<'a> {
    result: &'a QueryResult,
    options: RenderOptions,
}

impl<'a> Report<'a> {
    pub fn new(result: &'a QueryResult, options: RenderOptions) -> Self {
        Self { result, options }
    }

    fn header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = &self.result.query_info;
        writeln!(
            f,
            "{} · {} · {} years ({})",
            self.result.location_label(),
            info.day_of_year,
            info.years_analyzed,
            info.data_period
        )?;
        let location = &info.requested_location;
        writeln!(f, "Requested point: {}, {}", location.lat, location.lon)
    }

    fn cards(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cards = SummaryCards::from_result(self.result);
        let basis = cards
            .basis
            .map(|v| format!(" ({v})"))
            .unwrap_or_default();
        writeln!(f, "Summary")?;
        writeln!(
            f,
            "  Best conditions   {:.0}%{}",
            cards.best_conditions_percent, basis
        )?;
        writeln!(
            f,
            "  Extreme weather   {:.0}% ({} probability)",
            cards.extreme_weather_percent,
            cards.extreme_label()
        )?;
        let direction = cards.historical_trend.direction;
        writeln!(
            f,
            "  Historical trend  {} {}",
            direction.arrow(),
            match direction {
                TrendDirection::Stable => cards.trend_label(),
                _ => format!("{} {}", cards.trend_label(), direction),
            }
        )
    }

    fn predictions(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Predictions")?;
        for prediction in predictions(self.result) {
            writeln!(f, "  {prediction}")?;
        }
        Ok(())
    }

    fn table(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sort = self.options.sort;
        writeln!(
            f,
            "Statistics (by {}, {})",
            sort.field,
            match sort.direction {
                SortDirection::Asc => "ascending",
                SortDirection::Desc => "descending",
            }
        )?;
        writeln!(
            f,
            "  {:<14} {:>9} {:>9} {:>9} {:>9} {:>9}  Unit",
            "Variable", "Mean", "Median", "Std", "Min", "Max"
        )?;
        for (variable, data) in sorted_variables(self.result, sort) {
            let stats = &data.statistics;
            writeln!(
                f,
                "  {:<14} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}  {}",
                variable.display_name(),
                stats.mean,
                stats.median,
                stats.std,
                stats.min,
                stats.max,
                self.result.metadata.unit_for(variable)
            )?;
        }
        Ok(())
    }

    fn variable_detail(
        &self,
        f: &mut fmt::Formatter<'_>,
        variable: VariableId,
        data: &VariableData,
    ) -> fmt::Result {
        let unit = self.result.metadata.unit_for(variable);
        writeln!(f, "{} ({})", variable.display_name(), unit)?;

        let stats = &data.statistics;
        match variability::coefficient_of_variation(stats) {
            Some(cv) => writeln!(
                f,
                "  Variability: {} (cv {:.2})",
                variability::classify(stats),
                cv
            )?,
            None => writeln!(f, "  Variability: {}", variability::classify(stats))?,
        }
        writeln!(
            f,
            "  Percentiles: p25 {:.2}, p75 {:.2}{}",
            stats.percentile_25,
            stats.percentile_75,
            match (stats.percentile_10, stats.percentile_90) {
                (Some(p10), Some(p90)) => format!(", p10 {p10:.2}, p90 {p90:.2}"),
                _ => String::new(),
            }
        )?;

        if let Some((low, high)) = y_domain(data.values.iter().copied(), SERIES_CHART_PADDING) {
            writeln!(f, "  Series range: {low:.1} to {high:.1}")?;
        }

        let recent = historical_trend(&data.values);
        writeln!(
            f,
            "  Recent vs early years: {} {:.1}% {}",
            recent.direction.arrow(),
            recent.magnitude,
            recent.direction
        )?;

        if let Some(trend) = &stats.trend {
            let strength = trend
                .r_squared
                .map(|r2| format!(" (R² {:.3}, {})", r2, RSquaredStrength::classify(r2)))
                .unwrap_or_default();
            writeln!(f, "  Regression: {}{}", describe_regression(trend), strength)?;
        }
        if let Some(points) = projection(data) {
            if let Some((low, high)) = projection_domain(&points) {
                writeln!(f, "  Chart range: {low:.1} to {high:.1}")?;
            }
            writeln!(f, "  {:<6} {:>9} {:>9}", "Year", "Actual", "Trend")?;
            for point in points {
                writeln!(
                    f,
                    "  {:<6} {:>9.2} {:>9.2}",
                    point.year, point.actual, point.trend
                )?;
            }
        }

        let bins = histogram_for(data);
        let peak = peak_probability(&bins);
        writeln!(f, "  Distribution")?;
        for bin in &bins {
            let width = if peak > 0.0 {
                (bin.probability_percent / peak * BAR_WIDTH).round() as usize
            } else {
                0
            };
            writeln!(
                f,
                "    {:<13} {:<30} {:>5.1}%",
                bin.range_label,
                "█".repeat(width),
                bin.probability_percent
            )?;
        }

        if !data.probabilities.is_empty() {
            writeln!(f, "  Threshold probabilities")?;
            for (key, probability) in data.probabilities.iter() {
                writeln!(
                    f,
                    "    {:<10} {:>5.1}%",
                    describe_probability_key(key),
                    probability * 100.0
                )?;
            }
        }

        let missing = self
            .result
            .query_info
            .missing_data
            .as_ref()
            .and_then(|m| m.get(&variable))
            .filter(|years| !years.is_empty());
        if let Some(years) = missing {
            let years: Vec<String> = years.iter().map(i32::to_string).collect();
            writeln!(f, "  Missing years: {}", years.join(", "))?;
        }

        if let Some(source) = self.result.metadata.data_sources.get(&variable) {
            writeln!(f, "  Source: {} <{}>", source.name, source.url)?;
        }
        if let Some(point) = self.result.query_info.actual_grid_points.get(&variable) {
            writeln!(
                f,
                "  Grid point: {}, {} ({})",
                point.lat, point.lon, point.dataset
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.header(f)?;
        writeln!(f)?;
        self.cards(f)?;
        writeln!(f)?;
        if !self.options.compact {
            self.predictions(f)?;
            writeln!(f)?;
        }
        self.table(f)?;
        if !self.options.compact {
            for (variable, data) in sorted_variables(self.result, self.options.sort) {
                writeln!(f)?;
                self.variable_detail(f, variable, data)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpe_data::table::{SortDirection, SortField};

    const SAMPLE: &str = include_str!("../../fixtures/sample_response.json");

    fn sample() -> QueryResult {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn compact_report_has_cards_and_table_only() {
        let result = sample();
        let text = Report::new(
            &result,
            RenderOptions {
                compact: true,
                ..RenderOptions::default()
            },
        )
        .to_string();
        assert!(text.starts_with("Nyeri, Kenya · August 3 · 6 years (2019-2024)\n"));
        assert!(text.contains("  Extreme weather   0% (Low probability)\n"));
        assert!(text.contains("Statistics (by variable, ascending)"));
        assert!(!text.contains("Predictions"));
        assert!(!text.contains("Distribution"));
    }

    #[test]
    fn table_follows_sort_state() {
        let result = sample();
        let options = RenderOptions {
            sort: SortState::new(SortField::Mean, SortDirection::Desc),
            compact: true,
        };
        let text = Report::new(&result, options).to_string();
        let precipitation = text.find("  Precipitation ").unwrap();
        let temperature = text.find("  Temperature ").unwrap();
        assert!(precipitation < temperature);
        assert!(text.contains("Statistics (by mean, descending)"));
    }

    #[test]
    fn full_report_includes_detail_sections() {
        let result = sample();
        let text = Report::new(&result, RenderOptions::default()).to_string();
        assert!(text.contains("August 3 will be wet: Expected: 47.1 mm/day"));
        assert!(text.contains("  Regression: Increasing by 10.5% (R² 0.626, moderate)"));
        assert!(text.contains("    > 50.0      33.3%"));
        assert!(text.contains("  Source: GPM IMERG Final v07"));
        // precipitation carries no regression, so only temperature has a chart
        assert_eq!(text.matches("Chart range:").count(), 1);
        assert_eq!(text.matches("  Distribution").count(), 2);
    }

    #[test]
    fn missing_years_are_listed() {
        let mut result = sample();
        let mut missing = wpe_core::OrderedMap::new();
        missing.insert(VariableId::Precipitation, vec![2020, 2022]);
        result.query_info.missing_data = Some(missing);
        let text = Report::new(&result, RenderOptions::default()).to_string();
        assert!(text.contains("  Missing years: 2020, 2022"));
    }
}
