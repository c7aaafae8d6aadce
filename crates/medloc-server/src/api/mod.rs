mod favorites;
mod history;
mod search;

use std::{
    collections::{hash_map::Entry, HashMap},
    ops::Deref,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use medloc_core::AppConfig;
use medloc_search::{PgSearchService, SearchSession};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

/// Header carrying the caller's user id. Identity is issued upstream.
pub(crate) const USER_ID_HEADER: &str = "x-user-id";

const LOCAL_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:3000",
];

/// Sessions of requesters with a search in flight, so a newer search by the
/// same user cancels the older one. An entry lives only while some
/// [`SessionLease`] for that user is held.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, SessionSlot>>>,
}

#[derive(Debug, Default)]
struct SessionSlot {
    session: Arc<SearchSession>,
    leases: usize,
}

impl SessionRegistry {
    pub(crate) fn lease(&self, user_id: Uuid) -> SessionLease {
        let mut sessions = self.lock();
        let slot = sessions.entry(user_id).or_default();
        slot.leases += 1;

        SessionLease {
            registry: self.clone(),
            user_id,
            session: Arc::clone(&slot.session),
        }
    }

    /// Requesters currently holding a lease.
    #[cfg(test)]
    pub(crate) fn active(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionSlot>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A requester's [`SearchSession`], held for the duration of one search.
#[derive(Debug)]
pub(crate) struct SessionLease {
    registry: SessionRegistry,
    user_id: Uuid,
    session: Arc<SearchSession>,
}

impl Deref for SessionLease {
    type Target = SearchSession;

    fn deref(&self) -> &SearchSession {
        &self.session
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        let mut sessions = self.registry.lock();
        if let Entry::Occupied(mut slot) = sessions.entry(self.user_id) {
            let leases = &mut slot.get_mut().leases;
            *leases = leases.saturating_sub(1);
            if *leases == 0 {
                slot.remove();
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub search: Arc<PgSearchService>,
    pub sessions: SessionRegistry,
    pub default_radius_km: f64,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        let search = medloc_search::pg_search_service(pool.clone(), config.search_max_results);
        Self {
            pool,
            search: Arc::new(search),
            sessions: SessionRegistry::default(),
            default_radius_km: config.search_default_radius_km,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

#[derive(Debug, Serialize)]
struct ServiceBanner {
    message: &'static str,
    version: &'static str,
    health: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "missing_location" => StatusCode::UNPROCESSABLE_ENTITY,
            "conflict" | "superseded" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "backend_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(20).clamp(1, 100)
}

pub(super) fn map_db_error(request_id: String, error: &medloc_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// The caller's user id, if the `x-user-id` header is present.
pub(super) fn optional_user(
    headers: &HeaderMap,
    request_id: &str,
) -> Result<Option<Uuid>, ApiError> {
    let Some(raw) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    raw.to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(Some)
        .ok_or_else(|| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("{USER_ID_HEADER} must be a UUID"),
            )
        })
}

/// The caller's user id; routes that own per-user data reject anonymous calls.
pub(super) fn required_user(headers: &HeaderMap, request_id: &str) -> Result<Uuid, ApiError> {
    optional_user(headers, request_id)?.ok_or_else(|| {
        ApiError::new(
            request_id,
            "unauthorized",
            format!("{USER_ID_HEADER} header is required"),
        )
    })
}

fn build_cors(frontend_url: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter::once(frontend_url)
        .chain(LOCAL_ORIGINS)
        .filter_map(|origin| HeaderValue::from_str(origin.trim_end_matches('/')).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static(USER_ID_HEADER),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/search", get(search::search_medicines))
        .route(
            "/api/v1/history",
            get(history::list_history).delete(history::clear_history),
        )
        .route(
            "/api/v1/favorites",
            get(favorites::list_favorites).post(favorites::add_favorite),
        )
        .route(
            "/api/v1/favorites/{store_id}",
            delete(favorites::remove_favorite),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(
    state: AppState,
    auth: AuthState,
    rate_limit: RateLimitState,
    frontend_url: &str,
) -> Router {
    let public_routes = Router::new()
        .route("/", get(banner))
        .route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors(frontend_url))
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn banner(Extension(req_id): Extension<RequestId>) -> Json<ApiResponse<ServiceBanner>> {
    Json(ApiResponse {
        data: ServiceBanner {
            message: "Medicine Locator API",
            version: env!("CARGO_PKG_VERSION"),
            health: "/api/v1/health",
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match medloc_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}
