//! Fixed-window rate limiting.
//!
//! Each interceptor instance keeps its own counters, so one instance shared
//! by several actions enforces a combined budget.

use crate::interceptor::Interceptor;
use ferrule_core::{ActionResult, IncomingRequest};
use http::HeaderName;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How requests are grouped into budgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateKey {
    /// One budget for every request.
    Global,
    /// One budget per value of a header, e.g. an API key. Requests without
    /// the header share one anonymous budget.
    Header(HeaderName),
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Answers requests once a window's budget is spent.
///
/// # Example
///
/// ```
/// use ferrule_core::IncomingRequest;
/// use ferrule_middleware::Interceptor;
/// use ferrule_middleware::stages::RateLimit;
/// use http::Method;
/// use std::time::Duration;
///
/// let limit = RateLimit::new(2, Duration::from_secs(60));
/// let request = IncomingRequest::new(Method::POST, "/login");
///
/// assert!(limit.intercept(&request).is_none());
/// assert!(limit.intercept(&request).is_none());
/// assert!(limit.intercept(&request).is_some());
/// ```
#[derive(Debug)]
pub struct RateLimit {
    limit: u32,
    window: Duration,
    key: RateKey,
    response: ActionResult,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimit {
    /// Allows `limit` requests per `window` across all callers.
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            key: RateKey::Global,
            response: ActionResult::text("too many requests"),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Keeps a separate budget per key.
    #[must_use]
    pub fn keyed_by(mut self, key: RateKey) -> Self {
        self.key = key;
        self
    }

    /// Answers with the given result once the budget is spent.
    #[must_use]
    pub fn respond_with(mut self, response: ActionResult) -> Self {
        self.response = response;
        self
    }

    fn bucket(&self, request: &IncomingRequest) -> String {
        match &self.key {
            RateKey::Global => String::new(),
            RateKey::Header(name) => request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string(),
        }
    }

    fn admit(&self, bucket: String, now: Instant) -> bool {
        let mut windows = self.windows.lock();
        windows.retain(|_, window| now.duration_since(window.started) < self.window);
        let window = windows.entry(bucket).or_insert(Window {
            started: now,
            count: 0,
        });
        if window.count < self.limit {
            window.count += 1;
            true
        } else {
            false
        }
    }
}

impl Interceptor for RateLimit {
    fn name(&self) -> &str {
        "rate-limit"
    }

    fn intercept(&self, request: &IncomingRequest) -> Option<ActionResult> {
        let bucket = self.bucket(request);
        if self.admit(bucket, Instant::now()) {
            None
        } else {
            tracing::warn!(path = request.path(), limit = self.limit, "rate limit exceeded");
            Some(self.response.clone())
        }
    }
}
