use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::post,
};
use uuid::Uuid;

use crate::{
    dto::matchmaking::{RunRequest, RunSummary},
    error::AppError,
    services::match_service,
    state::SharedState,
};

/// Matchmaking endpoints driving the court allocation passes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/events/{id}/seed", post(seed))
        .route("/events/{id}/courts/{court_id}/advance", post(advance))
        .route("/events/{id}/advance-all", post(advance_all))
}

/// Fill every idle court of the event from the eligible roster.
#[utoipa::path(
    post,
    path = "/events/{id}/seed",
    tag = "matchmaking",
    params(
        ("id" = Uuid, Path, description = "Identifier of the event"),
        ("at" = Option<String>, Query, description = "RFC-3339 instant to evaluate availability at; defaults to now")
    ),
    responses(
        (status = 200, description = "Seed pass applied", body = RunSummary),
        (status = 404, description = "Unknown event"),
        (status = 503, description = "Audit storage unavailable")
    )
)]
pub async fn seed(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(request): Query<RunRequest>,
) -> Result<Json<RunSummary>, AppError> {
    Ok(Json(match_service::seed(&state, id, request.at).await?))
}

/// End the active game on one court and refill it from the queue.
#[utoipa::path(
    post,
    path = "/events/{id}/courts/{court_id}/advance",
    tag = "matchmaking",
    params(
        ("id" = Uuid, Path, description = "Identifier of the event"),
        ("court_id" = Uuid, Path, description = "Identifier of the court to turn over"),
        ("at" = Option<String>, Query, description = "RFC-3339 instant to evaluate availability at; defaults to now")
    ),
    responses(
        (status = 200, description = "Advance pass applied", body = RunSummary),
        (status = 404, description = "Unknown event or court"),
        (status = 503, description = "Audit storage unavailable")
    )
)]
pub async fn advance(
    State(state): State<SharedState>,
    Path((id, court_id)): Path<(Uuid, Uuid)>,
    Query(request): Query<RunRequest>,
) -> Result<Json<RunSummary>, AppError> {
    Ok(Json(
        match_service::advance(&state, id, court_id, request.at).await?,
    ))
}

/// Run the end-and-refill pass over every court of the event.
#[utoipa::path(
    post,
    path = "/events/{id}/advance-all",
    tag = "matchmaking",
    params(
        ("id" = Uuid, Path, description = "Identifier of the event"),
        ("at" = Option<String>, Query, description = "RFC-3339 instant to evaluate availability at; defaults to now")
    ),
    responses(
        (status = 200, description = "Advance pass applied to every court", body = RunSummary),
        (status = 404, description = "Unknown event"),
        (status = 503, description = "Audit storage unavailable")
    )
)]
pub async fn advance_all(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(request): Query<RunRequest>,
) -> Result<Json<RunSummary>, AppError> {
    Ok(Json(
        match_service::advance_all(&state, id, request.at).await?,
    ))
}
