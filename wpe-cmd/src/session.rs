//! The "current result" and "current error" slots behind the results view.
//!
//! Every submission takes a new request id. When a response arrives, it is
//! applied only if its id is still the latest; anything older is dropped, so
//! a slow early query can never overwrite a newer one. A failed query keeps
//! the previous result and records the error instead.

use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use wpe_core::service::QueryService;
use wpe_core::{QueryRequest, QueryResult};

/// What happened to one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The response replaced the current result.
    Applied,
    /// The request failed; the message is now the current error.
    Failed(String),
    /// Validation failed before any network call.
    Rejected(String),
    /// A newer submission started while this one was in flight.
    Stale,
}

#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub result: Option<QueryResult>,
    pub error: Option<String>,
    pub loading: bool,
}

pub struct QuerySession<S> {
    service: S,
    latest: AtomicU64,
    state: Mutex<Snapshot>,
}

impl<S: QueryService> QuerySession<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            latest: AtomicU64::new(0),
            state: Mutex::new(Snapshot::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    pub fn result(&self) -> Option<QueryResult> {
        self.lock().result.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub async fn submit(&self, request: &QueryRequest) -> Outcome {
        if let Err(err) = request.validate() {
            let message = err.to_string();
            self.lock().error = Some(message.clone());
            return Outcome::Rejected(message);
        }

        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
        }
        debug!("Submitting query #{}", id);

        let response = self.service.query(request).await;

        let mut state = self.lock();
        if self.latest.load(Ordering::SeqCst) != id {
            warn!("Discarding stale response for query #{}", id);
            return Outcome::Stale;
        }
        state.loading = false;
        match response {
            Ok(result) => {
                info!(
                    "Query #{} applied: {} variable(s), {}",
                    id,
                    result.historical_data.len(),
                    result.query_info.data_period
                );
                state.result = Some(result);
                state.error = None;
                Outcome::Applied
            }
            Err(err) => {
                let message = err.to_string();
                warn!("Query #{} failed: {}", id, message);
                state.error = Some(message.clone());
                Outcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use wpe_core::{Result, VariableId, WeatherError};

    const SAMPLE: &str = include_str!("../../fixtures/sample_response.json");

    fn sample() -> QueryResult {
        serde_json::from_str(SAMPLE).unwrap()
    }

    /// Answers call `n` after `delays[n]`, failing when the delay is `None`.
    struct FakeService {
        calls: AtomicUsize,
        delays: Vec<Option<Duration>>,
    }

    impl FakeService {
        fn new(delays: Vec<Option<Duration>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delays,
            }
        }
    }

    impl QueryService for FakeService {
        async fn query(&self, request: &QueryRequest) -> Result<QueryResult> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.delays.get(n).copied().flatten() {
                Some(delay) => {
                    tokio::time::sleep(delay).await;
                    let mut result = sample();
                    result.query_info.years_analyzed = request.historical_years.len() as u32;
                    Ok(result)
                }
                None => Err(WeatherError::Status {
                    operation: "API request",
                    status: 503,
                    status_text: "Service Unavailable".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn empty_variables_never_reach_the_service() {
        let session = QuerySession::new(FakeService::new(vec![]));
        let mut request = QueryRequest::dashboard_default();
        request.variables.clear();
        let outcome = session.submit(&request).await;
        assert_eq!(
            outcome,
            Outcome::Rejected("Please select at least one weather variable".to_string())
        );
        assert_eq!(session.service.calls.load(Ordering::SeqCst), 0);
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn failure_keeps_previous_result() {
        let session = QuerySession::new(FakeService::new(vec![
            Some(Duration::from_millis(1)),
            None,
        ]));
        let request = QueryRequest::dashboard_default();
        assert_eq!(session.submit(&request).await, Outcome::Applied);
        assert!(session.error().is_none());

        let outcome = session.submit(&request).await;
        assert_eq!(
            outcome,
            Outcome::Failed("API request failed: Service Unavailable".to_string())
        );
        let snapshot = session.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("API request failed: Service Unavailable")
        );
        let kept = snapshot.result.unwrap();
        assert_eq!(kept.first_variable().unwrap().0, VariableId::Temperature);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_older_response_is_discarded() {
        let session = QuerySession::new(FakeService::new(vec![
            Some(Duration::from_secs(5)),
            Some(Duration::from_millis(10)),
        ]));
        let older = QueryRequest::dashboard_default();
        let mut newer = QueryRequest::dashboard_default();
        newer.historical_years.start_year = 2021;

        let (first, second) = tokio::join!(session.submit(&older), session.submit(&newer));
        assert_eq!(first, Outcome::Stale);
        assert_eq!(second, Outcome::Applied);
        // 2021-2024 is four years; the stale six-year answer never landed
        assert_eq!(session.result().unwrap().query_info.years_analyzed, 4);
    }
}
