use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::state::AppState;
use crate::use_cases::TownError;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use town_protocol::{AreaKind, AreaSnapshot};

#[derive(Debug, serde::Deserialize)]
pub struct CreateAreaRequest {
    area_id: String,
    kind: AreaKind,
}

#[derive(Debug, serde::Serialize)]
struct CreateAreaResponse {
    area_id: String,
    kind: AreaKind,
}

#[derive(Debug, serde::Serialize)]
struct ListAreasResponse {
    areas: Vec<AreaSnapshot>,
}

pub async fn list_areas_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ListAreasResponse {
        areas: state.town.snapshots().await,
    })
}

pub async fn create_area_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateAreaRequest>,
) -> impl IntoResponse {
    let area_id = payload.area_id.trim().to_string();
    if area_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("area_id is required")),
        )
            .into_response();
    }

    match state.town.create_area(area_id.clone(), payload.kind).await {
        Ok(area) => (
            StatusCode::CREATED,
            Json(CreateAreaResponse {
                area_id,
                kind: area.kind,
            }),
        )
            .into_response(),
        Err(err @ TownError::AlreadyExists) => {
            (StatusCode::CONFLICT, Json(ErrorResponse::new(err.to_string()))).into_response()
        }
    }
}
