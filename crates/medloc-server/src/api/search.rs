use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Extension, Json,
};
use medloc_core::{directions_url, tel_link, Coordinate, SearchQuery, SearchResult};
use medloc_search::SearchError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{optional_user, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchParams {
    pub q: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResultItem {
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub generic_name: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub store_id: Uuid,
    pub store_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: String,
    pub is_open: bool,
    pub distance_km: f64,
    pub directions_url: Option<String>,
    pub tel_link: Option<String>,
}

impl SearchResultItem {
    pub(super) fn from_result(result: SearchResult, origin: Option<Coordinate>) -> Self {
        let distance_km = result.display_distance_km();
        let directions = result
            .store
            .coordinate()
            .ok()
            .map(|destination| directions_url(destination, origin));
        let tel = tel_link(&result.store.phone);

        Self {
            medicine_id: result.medicine.id,
            medicine_name: result.medicine.name,
            generic_name: result.medicine.generic_name,
            price: result.medicine.price,
            quantity: result.medicine.quantity,
            image_url: result.medicine.image_url,
            store_id: result.store.id,
            store_name: result.store.store_name,
            address: result.store.address,
            latitude: result.store.latitude,
            longitude: result.store.longitude,
            phone: result.store.phone,
            is_open: result.store.is_open,
            distance_km,
            directions_url: directions,
            tel_link: tel,
        }
    }
}

pub(super) fn map_search_error(request_id: String, error: &SearchError) -> ApiError {
    match error {
        SearchError::BackendUnavailable(_) => {
            tracing::error!(error = %error, "search backend unavailable");
            ApiError::new(
                request_id,
                error.code(),
                "search failed, please try again",
            )
        }
        SearchError::HistoryWriteFailed(_) => {
            tracing::error!(error = %error, "unexpected history failure on search path");
            ApiError::new(request_id, error.code(), "search failed")
        }
        _ => ApiError::new(request_id, error.code(), error.to_string()),
    }
}

fn origin_from_params(params: &SearchParams) -> Result<Option<Coordinate>, SearchError> {
    match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => Ok(Some(Coordinate::new(lat, lng)?)),
        _ => Ok(None),
    }
}

pub(super) async fn search_medicines(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<Vec<SearchResultItem>>>, ApiError> {
    let requester = optional_user(&headers, &req_id.0)?;
    let origin = origin_from_params(&params).map_err(|e| map_search_error(req_id.0.clone(), &e))?;

    let query = SearchQuery {
        text: params.q.clone().unwrap_or_default(),
        origin,
        radius_km: params.radius_km.unwrap_or(state.default_radius_km),
        limit: params.limit,
    };

    let outcome = match requester {
        Some(user_id) => {
            let session = state.sessions.lease(user_id);
            let mut ticket = session.begin();
            state
                .search
                .search_in_session(&mut ticket, query, requester)
                .await
        }
        None => state.search.search(query, None).await,
    };
    let results = outcome.map_err(|e| map_search_error(req_id.0.clone(), &e))?;

    let data = results
        .into_iter()
        .map(|result| SearchResultItem::from_result(result, origin))
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
