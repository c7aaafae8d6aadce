use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, required_user, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct HistoryParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryItem {
    pub id: Uuid,
    pub query_text: String,
    pub latitude: f64,
    pub longitude: f64,
    pub result_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct ClearedHistory {
    pub deleted: u64,
}

pub(super) async fn list_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Query(params): Query<HistoryParams>,
) -> Result<Json<ApiResponse<Vec<HistoryItem>>>, ApiError> {
    let user_id = required_user(&headers, &req_id.0)?;
    let rows = medloc_db::list_search_history(&state.pool, user_id, normalize_limit(params.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| HistoryItem {
            id: row.public_id,
            query_text: row.query_text,
            latitude: row.latitude,
            longitude: row.longitude,
            result_count: row.result_count,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn clear_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ClearedHistory>>, ApiError> {
    let user_id = required_user(&headers, &req_id.0)?;
    let deleted = medloc_db::clear_search_history(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(%user_id, deleted, "search history cleared");

    Ok(Json(ApiResponse {
        data: ClearedHistory { deleted },
        meta: ResponseMeta::new(req_id.0),
    }))
}
