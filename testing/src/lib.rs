//! # gopypi admin testing
//!
//! Testing utilities for the admin console.
//!
//! This crate provides:
//! - Deterministic implementations of the environment traits
//! - A scripted [`Transport`](gopypi_admin_client::Transport) for pipeline tests
//! - Property-based testing strategies
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use gopypi_admin_testing::{RecordingNavigator, StubTransport};
//!
//! #[tokio::test]
//! async fn session_expiry_redirects() {
//!     let transport = StubTransport::new().respond(Method::GET, "/me/", ApiResponse::new(401, ""));
//!     let navigator = RecordingNavigator::new();
//!     let console = test_console(transport, navigator.clone());
//!
//!     let _ = console.get_me().await;
//!
//!     assert_eq!(navigator.routes(), vec![Route::Login]);
//! }
//! ```

use chrono::{DateTime, Utc};
use gopypi_admin_core::environment::{Clock, IdGenerator, Navigator, Route};


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of environment traits and the HTTP transport
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Navigator, Route, Utc};
    use futures::future::{BoxFuture, FutureExt};
    use gopypi_admin_client::{ApiRequest, ApiResponse, Method, Transport, TransportError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use gopypi_admin_testing::mocks::FixedClock;
    /// use gopypi_admin_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable ids: `msg-1`, `msg-2`, ...
    #[derive(Debug, Clone)]
    pub struct SequentialIds {
        prefix: &'static str,
        next: Arc<AtomicU64>,
    }

    impl SequentialIds {
        /// Ids prefixed with `msg`
        #[must_use]
        pub fn new() -> Self {
            Self::with_prefix("msg")
        }

        /// Ids prefixed with `prefix`
        #[must_use]
        pub fn with_prefix(prefix: &'static str) -> Self {
            Self {
                prefix,
                next: Arc::new(AtomicU64::new(1)),
            }
        }
    }

    impl Default for SequentialIds {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            format!("{}-{}", self.prefix, self.next.fetch_add(1, Ordering::SeqCst))
        }
    }

    /// Records every navigation request
    ///
    /// Clones share one log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingNavigator {
        routes: Arc<Mutex<Vec<Route>>>,
    }

    impl RecordingNavigator {
        /// Empty log
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// All routes requested so far, in order
        #[must_use]
        pub fn routes(&self) -> Vec<Route> {
            self.routes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// How many times `route` was requested
        #[must_use]
        pub fn count(&self, route: Route) -> usize {
            self.routes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|r| **r == route)
                .count()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: Route) {
            self.routes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(route);
        }
    }

    #[derive(Debug, Clone)]
    enum Scripted {
        Respond(ApiResponse),
        Fail(String),
    }

    #[derive(Debug, Default)]
    struct StubState {
        routes: HashMap<(Method, String), Scripted>,
        requests: Vec<ApiRequest>,
    }

    /// Scripted transport
    ///
    /// Answers by `(method, path)`; anything unscripted gets `404 Not Found`.
    /// Every dispatched request is recorded, including the headers the
    /// interceptors added. Clones share one script and one log.
    #[derive(Debug, Clone, Default)]
    pub struct StubTransport {
        state: Arc<Mutex<StubState>>,
        latency: Duration,
    }

    impl StubTransport {
        /// Transport with no scripted routes
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer `method path` with `response`
        #[must_use]
        pub fn respond(self, method: Method, path: &str, response: ApiResponse) -> Self {
            self.lock()
                .routes
                .insert((method, path.to_string()), Scripted::Respond(response));
            self
        }

        /// Answer `method path` with a JSON body and status 200
        #[must_use]
        pub fn ok_json(self, method: Method, path: &str, body: &str) -> Self {
            self.respond(method, path, ApiResponse::new(200, body))
        }

        /// Fail `method path` without a response
        #[must_use]
        pub fn fail(self, method: Method, path: &str, error: &str) -> Self {
            self.lock()
                .routes
                .insert((method, path.to_string()), Scripted::Fail(error.to_string()));
            self
        }

        /// Delay every answer by `latency`
        #[must_use]
        pub const fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        /// Requests dispatched so far, in order
        #[must_use]
        pub fn requests(&self) -> Vec<ApiRequest> {
            self.lock().requests.clone()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl Transport for StubTransport {
        fn send<'a>(
            &'a self,
            request: &'a ApiRequest,
        ) -> BoxFuture<'a, Result<ApiResponse, TransportError>> {
            let scripted = {
                let mut state = self.lock();
                state.requests.push(request.clone());
                state
                    .routes
                    .get(&(request.method.clone(), request.path.clone()))
                    .cloned()
            };
            let latency = self.latency;

            async move {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                match scripted {
                    Some(Scripted::Respond(response)) => Ok(response),
                    Some(Scripted::Fail(error)) => Err(TransportError(error)),
                    None => Ok(ApiResponse::new(404, "")),
                }
            }
            .boxed()
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    /// Install a `tracing` subscriber that writes through the test harness
    ///
    /// Honors `RUST_LOG`; safe to call from every test.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities
pub mod properties {
    use proptest::prelude::*;

    /// One step against the pending-request counter
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CounterOp {
        /// A request was dispatched
        Begin,
        /// A request completed (possibly one that was never counted)
        End,
    }

    /// Arbitrary interleavings of begins and ends, unbalanced included
    pub fn counter_ops(max_len: usize) -> impl Strategy<Value = Vec<CounterOp>> {
        prop::collection::vec(
            prop_oneof![Just(CounterOp::Begin), Just(CounterOp::End)],
            0..max_len,
        )
    }

    /// Number of concurrent requests together with a per-request latency in ms
    pub fn request_batch(max_requests: usize) -> impl Strategy<Value = Vec<u64>> {
        prop::collection::vec(0u64..20, 1..max_requests)
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, RecordingNavigator, SequentialIds, StubTransport};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gopypi_admin_client::{ApiRequest, ApiResponse, Method, Transport};

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new();
        assert_eq!(ids.next_id(), "msg-1");
        assert_eq!(ids.clone().next_id(), "msg-2");
    }

    #[test]
    fn test_recording_navigator_shares_log() {
        let navigator = RecordingNavigator::new();
        navigator.clone().navigate(Route::Login);
        navigator.navigate(Route::Dashboard);
        assert_eq!(navigator.routes(), vec![Route::Login, Route::Dashboard]);
        assert_eq!(navigator.count(Route::Login), 1);
    }

    #[tokio::test]
    async fn test_stub_transport_scripts_and_records() {
        let transport = StubTransport::new().respond(
            Method::GET,
            "/info/",
            ApiResponse::new(200, r#"{"result":{}}"#),
        );

        let hit = transport.send(&ApiRequest::get("/info/")).await.unwrap();
        let miss = transport.send(&ApiRequest::get("/nope/")).await.unwrap();

        assert_eq!(hit.status, 200);
        assert_eq!(miss.status, 404);
        assert_eq!(miss.status_text, "Not Found");
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn test_stub_transport_failure() {
        let transport = StubTransport::new().fail(Method::GET, "/info/", "connection refused");
        let error = tokio_test::block_on(transport.send(&ApiRequest::get("/info/"))).unwrap_err();
        assert_eq!(error.0, "connection refused");
    }
}
