//! Ordering of the statistics table.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use wpe_core::result::{Statistics, VariableData};
use wpe_core::{QueryResult, VariableId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Variable,
    Mean,
    Median,
    Std,
    Min,
    Max,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Variable,
        SortField::Mean,
        SortField::Median,
        SortField::Std,
        SortField::Min,
        SortField::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Variable => "variable",
            SortField::Mean => "mean",
            SortField::Median => "median",
            SortField::Std => "std",
            SortField::Min => "min",
            SortField::Max => "max",
        }
    }

    fn statistic(&self, statistics: &Statistics) -> Option<f64> {
        match self {
            SortField::Variable => None,
            SortField::Mean => Some(statistics.mean),
            SortField::Median => Some(statistics.median),
            SortField::Std => Some(statistics.std),
            SortField::Min => Some(statistics.min),
            SortField::Max => Some(statistics.max),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown sort field '{0}' (expected one of variable, mean, median, std, min, max)")]
pub struct UnknownSortField(pub String);

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| UnknownSortField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Column and direction of the statistics table; starts at variable name,
/// ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Clicking the current column flips direction; another column starts
    /// ascending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Asc;
        }
    }

    pub fn compare(
        &self,
        a: (VariableId, &VariableData),
        b: (VariableId, &VariableData),
    ) -> Ordering {
        let ordering = match (
            self.field.statistic(&a.1.statistics),
            self.field.statistic(&b.1.statistics),
        ) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => a.0.as_str().cmp(b.0.as_str()),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Variables of `result` in table order. The sort is stable, so ties keep
/// the order the backend sent.
pub fn sorted_variables(result: &QueryResult, state: SortState) -> Vec<(VariableId, &VariableData)> {
    let mut rows: Vec<_> = result
        .historical_data
        .iter()
        .map(|(id, data)| (*id, data))
        .collect();
    rows.sort_by(|a, b| state.compare(*a, *b));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample;

    fn order(result: &QueryResult, state: SortState) -> Vec<VariableId> {
        sorted_variables(result, state)
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    #[test]
    fn toggle_flips_then_resets() {
        let mut state = SortState::default();
        assert_eq!(state, SortState::new(SortField::Variable, SortDirection::Asc));
        state.toggle(SortField::Variable);
        assert_eq!(state.direction, SortDirection::Desc);
        state.toggle(SortField::Mean);
        assert_eq!(state, SortState::new(SortField::Mean, SortDirection::Asc));
        state.toggle(SortField::Mean);
        state.toggle(SortField::Mean);
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn sorts_by_name_and_statistic() {
        let result = sample();
        assert_eq!(
            order(&result, SortState::default()),
            vec![VariableId::Precipitation, VariableId::Temperature]
        );
        assert_eq!(
            order(&result, SortState::new(SortField::Std, SortDirection::Asc)),
            vec![VariableId::Temperature, VariableId::Precipitation]
        );
        assert_eq!(
            order(&result, SortState::new(SortField::Max, SortDirection::Desc)),
            vec![VariableId::Precipitation, VariableId::Temperature]
        );
    }

    #[test]
    fn parses_field_names() {
        assert_eq!("Median".parse::<SortField>().unwrap(), SortField::Median);
        assert!("range".parse::<SortField>().is_err());
    }
}
