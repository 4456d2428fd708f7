//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use tracing::warn;

use crate::domain::{LineId, StationId};
use crate::service::ServiceError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", post(create_station).get(list_stations))
        .route("/stations/:id", delete(delete_station))
        .route("/lines", post(create_line).get(list_lines))
        .route(
            "/lines/:id",
            get(show_line).put(update_line).delete(delete_line),
        )
        .route(
            "/lines/:id/sections",
            post(add_section).delete(remove_section),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Register a station.
async fn create_station(
    State(state): State<AppState>,
    Json(req): Json<StationRequest>,
) -> impl IntoResponse {
    let station = state.service.create_station(&req.name).await;
    (
        StatusCode::CREATED,
        Json(StationResponse::from_station(&station)),
    )
}

/// List all stations.
async fn list_stations(State(state): State<AppState>) -> Json<Vec<StationResponse>> {
    let stations = state.service.stations().await;
    Json(stations.iter().map(StationResponse::from_station).collect())
}

/// Delete a station that no line uses.
async fn delete_station(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.service.delete_station(StationId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a line with its first section.
async fn create_line(
    State(state): State<AppState>,
    Json(req): Json<LineCreateRequest>,
) -> Result<Response, AppError> {
    let detail = state
        .service
        .create_line(
            &req.name,
            &req.color,
            StationId(req.up_station_id),
            StationId(req.down_station_id),
            req.distance,
        )
        .await?;

    let location = format!("/lines/{}", detail.line.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(LineResponse::from_detail(&detail)),
    )
        .into_response())
}

/// List all lines with their ordered stations.
async fn list_lines(State(state): State<AppState>) -> Result<Json<Vec<LineResponse>>, AppError> {
    let details = state.service.lines().await?;
    Ok(Json(details.iter().map(LineResponse::from_detail).collect()))
}

/// Show one line with its ordered stations.
async fn show_line(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<LineResponse>, AppError> {
    let detail = state.service.line(LineId(id)).await?;
    Ok(Json(LineResponse::from_detail(&detail)))
}

/// Rename/recolor a line.
async fn update_line(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<LineUpdateRequest>,
) -> Result<StatusCode, AppError> {
    state
        .service
        .update_line(LineId(id), &req.name, &req.color)
        .await?;
    Ok(StatusCode::OK)
}

/// Delete a line and its sections.
async fn delete_line(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.service.delete_line(LineId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a section to a line; responds with the updated line.
async fn add_section(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<SectionRequest>,
) -> Result<Json<LineResponse>, AppError> {
    let line_id = LineId(id);
    state
        .service
        .add_section(
            line_id,
            StationId(req.up_station_id),
            StationId(req.down_station_id),
            req.distance,
        )
        .await?;

    let detail = state.service.line(line_id).await?;
    Ok(Json(LineResponse::from_detail(&detail)))
}

/// Remove the terminal station's section from a line.
async fn remove_section(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<SectionRemoveQuery>,
) -> Result<StatusCode, AppError> {
    state
        .service
        .remove_section(LineId(id), StationId(query.station_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match &e {
            ServiceError::UnknownLine(_) | ServiceError::UnknownStation(_) => AppError::NotFound {
                message: e.to_string(),
            },
            ServiceError::StationInUse(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            // Rejected chain operations and corruption surface as server
            // errors, matching the original acceptance behavior.
            ServiceError::InvalidSection(_)
            | ServiceError::Add(_)
            | ServiceError::Remove(_)
            | ServiceError::Corrupt(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
