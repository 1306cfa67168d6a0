//! Runtime settings, read from the environment.

use anyhow::Context;
use std::env;
use std::time::Duration;
use wpe_core::client::DEFAULT_API_URL;
use wpe_core::geocode::NOMINATIM_URL;

pub const API_URL_VAR: &str = "WPE_API_URL";
pub const GEOCODER_URL_VAR: &str = "WPE_GEOCODER_URL";
pub const SEARCH_DEBOUNCE_VAR: &str = "WPE_SEARCH_DEBOUNCE_MS";

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub geocoder_url: String,
    pub search_debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            geocoder_url: NOMINATIM_URL.to_string(),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve settings through `lookup`; unset or blank values keep the
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        let search_debounce = match read(SEARCH_DEBOUNCE_VAR) {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{SEARCH_DEBOUNCE_VAR} must be milliseconds, got '{raw}'"))?,
            ),
            None => defaults.search_debounce,
        };
        Ok(Self {
            api_url: read(API_URL_VAR).unwrap_or(defaults.api_url),
            geocoder_url: read(GEOCODER_URL_VAR).unwrap_or(defaults.geocoder_url),
            search_debounce,
        })
    }

    /// Command-line `--api-url` wins over the environment.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, "http://localhost:8000/api/v1");
        assert_eq!(config.search_debounce, Duration::from_millis(500));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            (API_URL_VAR, "https://weather.example.org/api/v1"),
            (GEOCODER_URL_VAR, "  "),
            (SEARCH_DEBOUNCE_VAR, "250"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://weather.example.org/api/v1");
        assert_eq!(config.geocoder_url, NOMINATIM_URL);
        assert_eq!(config.search_debounce, Duration::from_millis(250));
    }

    #[test]
    fn bad_debounce_is_an_error() {
        assert!(Config::from_lookup(lookup(&[(SEARCH_DEBOUNCE_VAR, "soon")])).is_err());
    }

    #[test]
    fn flag_beats_environment() {
        let config = Config::default().with_api_url(Some("http://127.0.0.1:9000".to_string()));
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
        assert_eq!(Config::default().with_api_url(None), Config::default());
    }
}
