//! Seams between the network clients and the code that drives them.
//!
//! The query session and the location search only need "something that
//! answers a query" and "something that suggests places"; the reqwest
//! clients implement these, and tests substitute in-memory fakes.

use std::future::Future;

use crate::error::Result;
use crate::geocode::GeocodeSuggestion;
use crate::query::QueryRequest;
use crate::result::QueryResult;

pub trait QueryService {
    fn query(&self, request: &QueryRequest) -> impl Future<Output = Result<QueryResult>> + Send;
}

pub trait Geocoder {
    fn suggest(&self, text: &str) -> impl Future<Output = Result<Vec<GeocodeSuggestion>>> + Send;
}
