use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::{ApiError, USER_ID_HEADER};

const API_KEYS_VAR: &str = "MEDLOC_API_KEYS";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id for the current call, set by [`request_id`] and echoed in
/// every response envelope.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer keys accepted on the protected routes.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<HashSet<String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Reads `MEDLOC_API_KEYS` (comma-separated bearer tokens).
    ///
    /// # Errors
    ///
    /// Fails outside development when no key is configured.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var(API_KEYS_VAR).unwrap_or_default();
        Self::from_keys(&raw, is_development)
    }

    /// Same rules as [`AuthState::from_env`], over an explicit key list. An
    /// empty list turns auth off in development only.
    ///
    /// # Errors
    ///
    /// Fails outside development when `raw` holds no key.
    pub fn from_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let keys: HashSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if keys.is_empty() {
            anyhow::ensure!(
                is_development,
                "{API_KEYS_VAR} is required outside development; provide comma-separated bearer tokens"
            );
            tracing::warn!("{API_KEYS_VAR} not set; bearer auth disabled in development");
        }

        Ok(Self {
            enabled: !keys.is_empty(),
            api_keys: Arc::new(keys),
        })
    }

    fn allows(&self, token: &str) -> bool {
        self.api_keys.contains(token)
    }
}

/// Whose budget a request draws from. Calls without a parseable
/// `x-user-id` share one anonymous budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Requester {
    User(Uuid),
    Anonymous,
}

impl Requester {
    fn of(req: &Request) -> Self {
        req.headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map_or(Self::Anonymous, Self::User)
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: usize,
}

#[derive(Debug)]
struct Windows {
    by_requester: HashMap<Requester, Window>,
    last_sweep: Instant,
}

impl Windows {
    fn new(now: Instant) -> Self {
        Self {
            by_requester: HashMap::new(),
            last_sweep: now,
        }
    }

    /// Counts one request against `requester` and reports whether it fits.
    /// Expired windows are swept at most once per window length, so only
    /// requesters seen recently are tracked.
    fn admit(&mut self, requester: Requester, now: Instant, max: usize, length: Duration) -> bool {
        if now.duration_since(self.last_sweep) >= length {
            self.by_requester
                .retain(|_, w| now.duration_since(w.started_at) < length);
            self.last_sweep = now;
        }

        let window = self.by_requester.entry(requester).or_insert(Window {
            started_at: now,
            count: 0,
        });
        if now.duration_since(window.started_at) >= length {
            *window = Window {
                started_at: now,
                count: 0,
            };
        }

        if window.count >= max {
            return false;
        }
        window.count += 1;
        true
    }
}

/// Fixed-window limiter with one window per requester.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    windows: Arc<Mutex<Windows>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(Mutex::new(Windows::new(Instant::now()))),
        }
    }

    #[must_use]
    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }
}

fn reject(req: &Request, code: &'static str, message: &'static str) -> Response {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    ApiError::new(request_id, code, message).into_response()
}

/// Takes `x-request-id` from the request or mints a UUID, stores it as a
/// [`RequestId`] extension, and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    res
}

pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => reject(&req, "unauthorized", "missing or invalid bearer token"),
    }
}

pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let requester = Requester::of(&req);
    let admitted = rate_limit.windows.lock().await.admit(
        requester,
        Instant::now(),
        rate_limit.max_requests,
        rate_limit.window,
    );

    if !admitted {
        tracing::warn!(
            ?requester,
            max_requests = rate_limit.max_requests,
            "rate limit exceeded"
        );
        return reject(&req, "rate_limited", "rate limit exceeded");
    }

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
