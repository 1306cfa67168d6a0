//! `geocode`: look a place up through the debounced location search.

use anyhow::bail;
use wpe_core::geocode::{GeocodeSuggestion, NominatimGeocoder, MIN_QUERY_LEN};

use crate::config::Config;
use crate::search::{LocationSearch, SearchState};

pub fn format_suggestions(suggestions: &[GeocodeSuggestion]) -> String {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{:>2}. {} ({}, {})", i, s.display_name, s.lat, s.lon))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn run_geocode(config: &Config, text: &str, select: Option<usize>) -> anyhow::Result<()> {
    if text.trim().chars().count() < MIN_QUERY_LEN {
        bail!("Enter at least {MIN_QUERY_LEN} characters to search");
    }
    let search = LocationSearch::new(
        NominatimGeocoder::new(config.geocoder_url.as_str()),
        config.search_debounce,
    );
    search.input(text);
    search.settle().await;

    let suggestions = match search.state() {
        SearchState::Suggesting { suggestions, .. } => suggestions,
        _ => Vec::new(),
    };
    if suggestions.is_empty() {
        println!("No places found for '{}'", text.trim());
        return Ok(());
    }
    println!("{}", format_suggestions(&suggestions));

    if let Some(index) = select {
        let location = search.select(index)?;
        println!("{}", serde_json::to_string_pretty(&location)?);
    }
    Ok(())
}
