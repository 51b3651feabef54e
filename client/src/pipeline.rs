//! Interceptor pipeline wrapped around every outgoing request
//!
//! ```text
//!   before(1) → before(2) → … → Transport
//!                                   │
//!   after(1)  ← after(2)  ← … ←─────┘
//! ```
//!
//! `before` hooks run in registration order. A hook may short-circuit with
//! [`Step::Respond`], in which case the transport is skipped along with every
//! later interceptor. `after` hooks then run in reverse order for every
//! interceptor whose `before` ran, exactly once, whatever the outcome.
//!
//! If the request future is dropped part way (a timeout, `select!`, an
//! aborted task), the interceptors still owed an `after` get
//! [`Interceptor::abandon`] instead, in the same reverse order.

use crate::error::TransportError;
use crate::http::{ApiRequest, ApiResponse, Transport};
use futures::future::{self, BoxFuture, FutureExt};
use std::sync::Arc;

/// What an interceptor's `before` hook decided
#[derive(Debug)]
pub enum Step {
    /// Continue with the next interceptor (or the transport)
    Proceed,
    /// Stop here and use this reply
    Respond(Reply),
}

/// Outcome of a request as it travels back through the `after` hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The server answered (any status)
    Response(ApiResponse),
    /// No answer was received
    Failed(TransportError),
    /// An interceptor consumed the reply; callers must not report it
    Absorbed,
}

impl Reply {
    /// Status code if this is a response
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(response) => Some(response.status),
            Self::Failed(_) | Self::Absorbed => None,
        }
    }
}

/// A hook pair wrapped around every request
///
/// Both hooks default to pass-through.
pub trait Interceptor: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Inspect or amend the outgoing request
    fn before<'a>(&'a self, request: &'a mut ApiRequest) -> BoxFuture<'a, Step> {
        let _ = request;
        future::ready(Step::Proceed).boxed()
    }

    /// Inspect or rewrite the reply
    fn after<'a>(&'a self, request: &'a ApiRequest, reply: Reply) -> BoxFuture<'a, Reply> {
        let _ = request;
        future::ready(reply).boxed()
    }

    /// The request was dropped after `before` completed but before `after` did
    ///
    /// Called from a destructor, so it must not block. Release whatever
    /// `before` acquired.
    fn abandon(&self) {}
}

/// Calls [`Interceptor::abandon`] on drop for interceptors still owed an `after`
struct Unwind<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    owed: usize,
}

impl Drop for Unwind<'_> {
    fn drop(&mut self) {
        for interceptor in self.interceptors[..self.owed].iter().rev() {
            tracing::debug!(interceptor = interceptor.name(), "Request dropped, abandoning");
            interceptor.abandon();
        }
    }
}

/// Ordered interceptors around a transport
pub struct Pipeline {
    transport: Arc<dyn Transport>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Pipeline {
    /// Create a pipeline with no interceptors
    #[must_use]
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_transport(Arc::new(transport))
    }

    /// Create a pipeline over a shared transport
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            interceptors: Vec::new(),
        }
    }

    /// Append an interceptor; registration order is `before` order
    #[must_use]
    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Append a shared interceptor
    #[must_use]
    pub fn with_shared(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Number of registered interceptors
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Whether no interceptors are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run `request` through every interceptor and the transport
    #[tracing::instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, mut request: ApiRequest) -> Reply {
        let mut unwind = Unwind {
            interceptors: &self.interceptors,
            owed: 0,
        };
        let mut short_circuit = None;

        for interceptor in &self.interceptors {
            let step = interceptor.before(&mut request).await;
            // Only a completed `before` is owed an `after`
            unwind.owed += 1;
            if let Step::Respond(reply) = step {
                tracing::debug!(interceptor = interceptor.name(), "Request short-circuited");
                short_circuit = Some(reply);
                break;
            }
        }

        let mut reply = match short_circuit {
            Some(reply) => reply,
            None => match self.transport.send(&request).await {
                Ok(response) => Reply::Response(response),
                Err(error) => {
                    tracing::warn!(%error, url = %request.url(), "Request failed");
                    Reply::Failed(error)
                },
            },
        };

        while unwind.owed > 0 {
            let interceptor = &self.interceptors[unwind.owed - 1];
            reply = interceptor.after(&request, reply).await;
            unwind.owed -= 1;
        }

        let outcome = match &reply {
            Reply::Response(response) if response.is_success() => "success",
            Reply::Response(_) => "rejected",
            Reply::Failed(_) => "failed",
            Reply::Absorbed => "absorbed",
        };
        metrics::counter!("api.requests.total", "outcome" => outcome).increment(1);
        tracing::debug!(outcome, status = ?reply.status(), "Request finished");

        reply
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.interceptors.iter().map(|i| i.name()).collect();
        f.debug_struct("Pipeline")
            .field("interceptors", &names)
            .finish_non_exhaustive()
    }
}
