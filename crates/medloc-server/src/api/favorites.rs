use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use medloc_db::DbError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, required_user, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AddFavoriteBody {
    pub store_id: Uuid,
}

#[derive(Debug, Serialize)]
pub(super) struct FavoriteStoreItem {
    pub store_id: Uuid,
    pub store_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: String,
    pub is_open: bool,
    pub favorited_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct FavoriteChange {
    pub store_id: Uuid,
    pub favorited: bool,
}

pub(super) async fn list_favorites(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<FavoriteStoreItem>>>, ApiError> {
    let user_id = required_user(&headers, &req_id.0)?;
    let rows = medloc_db::list_favorites(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| FavoriteStoreItem {
            store_id: row.store_id,
            store_name: row.store_name,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            phone: row.phone,
            is_open: row.is_open,
            favorited_at: row.favorited_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn add_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(body): Json<AddFavoriteBody>,
) -> Result<(StatusCode, Json<ApiResponse<FavoriteChange>>), ApiError> {
    let user_id = required_user(&headers, &req_id.0)?;
    let created = match medloc_db::add_favorite(&state.pool, user_id, body.store_id).await {
        Ok(created) => created,
        Err(e) if e.is_foreign_key_violation() => {
            return Err(ApiError::new(
                req_id.0,
                "not_found",
                format!("store {} not found", body.store_id),
            ));
        }
        Err(e) => return Err(map_db_error(req_id.0, &e)),
    };

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(ApiResponse {
            data: FavoriteChange {
                store_id: body.store_id,
                favorited: true,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn remove_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Path(store_id): Path<Uuid>,
) -> Result<Json<ApiResponse<FavoriteChange>>, ApiError> {
    let user_id = required_user(&headers, &req_id.0)?;
    match medloc_db::remove_favorite(&state.pool, user_id, store_id).await {
        Ok(()) => {}
        Err(DbError::NotFound) => {
            return Err(ApiError::new(
                req_id.0,
                "not_found",
                format!("store {store_id} is not a favorite"),
            ));
        }
        Err(e) => return Err(map_db_error(req_id.0, &e)),
    }

    Ok(Json(ApiResponse {
        data: FavoriteChange {
            store_id,
            favorited: false,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
