//! Debounced place-name search.
//!
//! States move `Idle -> Typing -> Suggesting -> Selected`. Every keystroke
//! cancels the pending lookup timer and starts a new one; only text of at
//! least [`MIN_QUERY_LEN`] characters is looked up. Choosing a suggestion
//! (or a map point) moves to `Selected`, which no in-flight lookup may
//! overwrite.

use log::{debug, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use wpe_core::geocode::{GeocodeSuggestion, MIN_QUERY_LEN};
use wpe_core::service::Geocoder;
use wpe_core::{Location, Result, WeatherError};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Typing {
        text: String,
    },
    Suggesting {
        text: String,
        suggestions: Vec<GeocodeSuggestion>,
    },
    Selected {
        location: Location,
    },
}

#[derive(Default)]
struct Inner {
    state: SearchState,
    /// Bumped on every input or selection; a lookup only lands if the
    /// generation it started under is still current.
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Inner {
    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

pub struct LocationSearch<G> {
    geocoder: Arc<G>,
    debounce: Duration,
    inner: Arc<Mutex<Inner>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<G> LocationSearch<G>
where
    G: Geocoder + Send + Sync + 'static,
{
    pub fn new(geocoder: G, debounce: Duration) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            debounce,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn state(&self) -> SearchState {
        lock(&self.inner).state.clone()
    }

    /// Handle a new value of the search box.
    pub fn input(&self, text: &str) {
        let mut inner = lock(&self.inner);
        inner.cancel_pending();
        inner.generation += 1;

        if text.trim().is_empty() {
            inner.state = SearchState::Idle;
            return;
        }
        inner.state = SearchState::Typing {
            text: text.to_string(),
        };
        if text.trim().chars().count() < MIN_QUERY_LEN {
            return;
        }

        let generation = inner.generation;
        let shared = Arc::clone(&self.inner);
        let geocoder = Arc::clone(&self.geocoder);
        let debounce = self.debounce;
        let text = text.to_string();
        inner.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            debug!("Looking up '{}' (generation {})", text, generation);
            let found = geocoder.suggest(text.trim()).await;

            let mut inner = lock(&shared);
            if inner.generation != generation {
                debug!("Dropping suggestions for '{}'", text);
                return;
            }
            inner.pending = None;
            match found {
                Ok(suggestions) => {
                    inner.state = SearchState::Suggesting { text, suggestions };
                }
                Err(err) => {
                    warn!("Location search for '{}' failed: {}", text, err);
                }
            }
        }));
    }

    /// Pick one of the current suggestions.
    pub fn select(&self, index: usize) -> Result<Location> {
        let mut inner = lock(&self.inner);
        let suggestion = match &inner.state {
            SearchState::Suggesting { suggestions, .. } => suggestions.get(index).cloned(),
            _ => None,
        }
        .ok_or_else(|| WeatherError::Validation(format!("No suggestion at position {index}")))?;
        let location = suggestion.to_location()?;
        inner.cancel_pending();
        inner.generation += 1;
        inner.state = SearchState::Selected {
            location: location.clone(),
        };
        Ok(location)
    }

    /// Use a location chosen outside the search box, e.g. a map click.
    pub fn set_location(&self, location: Location) {
        let mut inner = lock(&self.inner);
        inner.cancel_pending();
        inner.generation += 1;
        inner.state = SearchState::Selected { location };
    }

    pub fn clear(&self) {
        self.input("");
    }

    /// Wait for the pending lookup, if any, to finish.
    pub async fn settle(&self) {
        let pending = lock(&self.inner).pending.take();
        if let Some(handle) = pending {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    warn!("Location lookup task failed: {}", err);
                }
            }
        }
    }
}

impl<G> Drop for LocationSearch<G> {
    fn drop(&mut self) {
        lock(&self.inner).cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeGeocoder {
        calls: StdMutex<Vec<String>>,
        delay: Duration,
        fail: bool,
    }

    impl Geocoder for FakeGeocoder {
        async fn suggest(&self, text: &str) -> Result<Vec<GeocodeSuggestion>> {
            self.calls.lock().unwrap().push(text.to_string());
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(WeatherError::Status {
                    operation: "Geocoding",
                    status: 429,
                    status_text: "Too Many Requests".to_string(),
                });
            }
            Ok(vec![GeocodeSuggestion {
                lat: "-1.2833".to_string(),
                lon: "36.8167".to_string(),
                display_name: format!("{text}, Kenya"),
            }])
        }
    }

    fn search(geocoder: FakeGeocoder) -> LocationSearch<FakeGeocoder> {
        LocationSearch::new(geocoder, Duration::from_millis(500))
    }

    fn calls(search: &LocationSearch<FakeGeocoder>) -> Vec<String> {
        search.geocoder.calls.lock().unwrap().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn short_text_is_not_looked_up() {
        let search = search(FakeGeocoder::default());
        search.input("Na");
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(calls(&search).is_empty());
        assert_eq!(search.state(), SearchState::Typing { text: "Na".to_string() });
        search.clear();
        assert_eq!(search.state(), SearchState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn new_keystroke_cancels_pending_lookup() {
        let search = search(FakeGeocoder::default());
        search.input("Nai");
        tokio::time::sleep(Duration::from_millis(200)).await;
        search.input("Nair");
        tokio::time::sleep(Duration::from_millis(200)).await;
        search.input("Nairobi");
        search.settle().await;

        assert_eq!(calls(&search), vec!["Nairobi".to_string()]);
        match search.state() {
            SearchState::Suggesting { text, suggestions } => {
                assert_eq!(text, "Nairobi");
                assert_eq!(suggestions[0].display_name, "Nairobi, Kenya");
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn selection_wins_over_in_flight_lookup() {
        let search = search(FakeGeocoder {
            delay: Duration::from_secs(1),
            ..FakeGeocoder::default()
        });
        search.input("Nairobi");
        search.settle().await;
        let location = search.select(0).unwrap();
        assert_eq!(location.lat, -1.2833);

        search.input("Nyeri");
        // debounce elapsed, lookup in flight
        tokio::time::sleep(Duration::from_millis(700)).await;
        search.set_location(Location::dashboard_default());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(
            search.state(),
            SearchState::Selected {
                location: Location::dashboard_default()
            }
        );
        assert_eq!(calls(&search), vec!["Nairobi".to_string(), "Nyeri".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookup_leaves_text_in_place() {
        let search = search(FakeGeocoder {
            fail: true,
            ..FakeGeocoder::default()
        });
        search.input("Atlantis");
        search.settle().await;
        assert_eq!(
            search.state(),
            SearchState::Typing {
                text: "Atlantis".to_string()
            }
        );
        assert!(search.select(0).is_err());
    }
}
