//! Core types for the weather probability explorer.
//!
//! The request side ([`query`]) describes what the user picked; the response
//! side ([`result`]) is what the backend computed from historical satellite
//! data. With the `api` feature, [`client`] talks to that backend and
//! [`geocode`] resolves place names.

pub mod error;
pub mod format;
pub mod geocode;
pub mod ordered_map;
pub mod query;
pub mod result;
pub mod service;
pub mod variable;

#[cfg(feature = "api")]
pub mod client;

pub use error::{Result, WeatherError};
pub use format::ExportFormat;
pub use ordered_map::OrderedMap;
pub use query::{DayOfYear, HistoricalYears, Location, QueryRequest, ThresholdKey, Thresholds};
pub use result::{QueryResult, Statistics, TrendAnalysis, TrendDirection, VariableData};
pub use variable::VariableId;
