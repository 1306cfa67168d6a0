use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError};
use crate::query::Location;

#[cfg(feature = "api")]
use crate::client::check_status;
#[cfg(feature = "api")]
use crate::service::Geocoder;
#[cfg(feature = "api")]
use log::info;
#[cfg(feature = "api")]
use reqwest::Client;

/// Public Nominatim instance; rate limited, no API key.
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Maximum suggestions requested per lookup.
pub const SUGGESTION_LIMIT: usize = 5;

/// Queries shorter than this never reach the geocoder.
pub const MIN_QUERY_LEN: usize = 3;

/// One place returned by the geocoder. Nominatim sends coordinates as
/// strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeSuggestion {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

impl GeocodeSuggestion {
    pub fn to_location(&self) -> Result<Location> {
        let parse = |field: &str, raw: &str| {
            raw.trim().parse::<f64>().map_err(|_| {
                WeatherError::MalformedResponse(format!("{field} '{raw}' is not a number"))
            })
        };
        let location = Location::new(
            parse("lat", &self.lat)?,
            parse("lon", &self.lon)?,
            Some(self.display_name.clone()),
        );
        location.validate()?;
        Ok(location)
    }
}

/// Place-name lookup against a Nominatim-compatible endpoint.
#[cfg(feature = "api")]
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

#[cfg(feature = "api")]
impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn search(&self, text: &str) -> Result<Vec<GeocodeSuggestion>> {
        let url = format!("{}/search", self.base_url);
        let limit = SUGGESTION_LIMIT.to_string();
        info!("Geocoding '{}'", text);
        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("q", text), ("limit", limit.as_str())])
            .header(
                reqwest::header::USER_AGENT,
                concat!("wpe/", env!("CARGO_PKG_VERSION")),
            )
            .send()
            .await?;
        let response = check_status(response, "Geocoding")?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(feature = "api")]
impl Geocoder for NominatimGeocoder {
    async fn suggest(&self, text: &str) -> Result<Vec<GeocodeSuggestion>> {
        self.search(text).await
    }
}
