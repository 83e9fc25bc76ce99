use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::event::{
        CreateEventRequest, EventStatusResponse, EventSummary, ReplacePlayersRequest,
    },
    error::AppError,
    services::event_service,
    state::SharedState,
};

/// Event and roster management endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/{id}", delete(close_event))
        .route("/events/{id}/players", put(replace_players))
        .route("/events/{id}/status", get(event_status))
}

/// Create an event with its courts and initial roster.
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventSummary),
        (status = 400, description = "Invalid roster or court count")
    )
)]
pub async fn create_event(
    State(state): State<SharedState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventSummary>), AppError> {
    let summary = event_service::create_event(&state, request).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Replace an event roster wholesale, resetting courts, queue and games.
#[utoipa::path(
    put,
    path = "/events/{id}/players",
    tag = "events",
    params(("id" = Uuid, Path, description = "Identifier of the event")),
    request_body = ReplacePlayersRequest,
    responses(
        (status = 200, description = "Roster replaced", body = EventSummary),
        (status = 404, description = "Unknown event")
    )
)]
pub async fn replace_players(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReplacePlayersRequest>,
) -> Result<Json<EventSummary>, AppError> {
    Ok(Json(
        event_service::replace_players(&state, id, request).await?,
    ))
}

/// Retrieve the full state of an event: courts, queue and roster.
#[utoipa::path(
    get,
    path = "/events/{id}/status",
    tag = "events",
    params(("id" = Uuid, Path, description = "Identifier of the event")),
    responses(
        (status = 200, description = "Event status", body = EventStatusResponse),
        (status = 404, description = "Unknown event")
    )
)]
pub async fn event_status(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventStatusResponse>, AppError> {
    Ok(Json(event_service::status(&state, id).await?))
}

/// Close an event and discard its in-memory state.
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "events",
    params(("id" = Uuid, Path, description = "Identifier of the event")),
    responses(
        (status = 204, description = "Event closed"),
        (status = 404, description = "Unknown event")
    )
)]
pub async fn close_event(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    event_service::close_event(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
