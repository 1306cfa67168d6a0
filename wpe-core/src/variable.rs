use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WeatherError;

/// The closed set of weather variables the backend can analyze.
///
/// Every map keyed by variable in a query response (`historical_data`,
/// `units`, `data_sources`, `actual_grid_points`) is keyed by this enum, so
/// an unknown key is rejected when the response is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableId {
    Temperature,
    Precipitation,
    WindSpeed,
    Humidity,
}

impl VariableId {
    pub const ALL: [VariableId; 4] = [
        VariableId::Temperature,
        VariableId::Precipitation,
        VariableId::WindSpeed,
        VariableId::Humidity,
    ];

    /// Wire identifier, e.g. `wind_speed`.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableId::Temperature => "temperature",
            VariableId::Precipitation => "precipitation",
            VariableId::WindSpeed => "wind_speed",
            VariableId::Humidity => "humidity",
        }
    }

    /// Title-cased label with the first underscore turned into a space
    /// (`wind_speed` -> `Wind speed`).
    pub fn display_name(&self) -> &'static str {
        match self {
            VariableId::Temperature => "Temperature",
            VariableId::Precipitation => "Precipitation",
            VariableId::WindSpeed => "Wind speed",
            VariableId::Humidity => "Humidity",
        }
    }

    /// Unit the backend reports when the response metadata omits one.
    pub fn default_unit(&self) -> &'static str {
        match self {
            VariableId::Temperature => "celsius",
            VariableId::Precipitation => "mm/day",
            VariableId::WindSpeed => "m/s",
            VariableId::Humidity => "percent",
        }
    }

    /// One-line description used by the variable picker.
    pub fn description(&self) -> &'static str {
        match self {
            VariableId::Temperature => "2-meter air temperature",
            VariableId::Precipitation => "Daily rainfall amount",
            VariableId::WindSpeed => "2-meter wind speed",
            VariableId::Humidity => "Relative humidity",
        }
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for VariableId {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        VariableId::ALL
            .into_iter()
            .find(|v| v.as_str() == lowered)
            .ok_or_else(|| WeatherError::UnknownVariable(s.to_string()))
    }
}

/// A variable as advertised by `GET /weather/variables`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    pub id: VariableId,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub dataset: String,
    pub available_from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariablesResponse {
    pub variables: Vec<VariableDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_identifiers() {
        assert_eq!("wind_speed".parse::<VariableId>().unwrap(), VariableId::WindSpeed);
        assert_eq!(" Humidity ".parse::<VariableId>().unwrap(), VariableId::Humidity);
        assert!("cloud_cover".parse::<VariableId>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&VariableId::WindSpeed).unwrap();
        assert_eq!(json, "\"wind_speed\"");
        let back: VariableId = serde_json::from_str("\"precipitation\"").unwrap();
        assert_eq!(back, VariableId::Precipitation);
    }

    #[test]
    fn display_name_replaces_underscore() {
        assert_eq!(VariableId::WindSpeed.display_name(), "Wind speed");
        assert_eq!(VariableId::Temperature.display_name(), "Temperature");
    }

    #[test]
    fn descriptor_rejects_unknown_ids() {
        let json = r#"{"id":"snowfall","name":"Snow","description":"","unit":"cm","dataset":"x","available_from":"1980"}"#;
        assert!(serde_json::from_str::<VariableDescriptor>(json).is_err());
    }
}
