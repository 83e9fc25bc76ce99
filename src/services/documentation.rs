use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Shuttle Court Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::events::create_event,
        crate::routes::events::replace_players,
        crate::routes::events::event_status,
        crate::routes::events::close_event,
        crate::routes::matchmaking::seed,
        crate::routes::matchmaking::advance,
        crate::routes::matchmaking::advance_all,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::event::CreateEventRequest,
            crate::dto::event::ReplacePlayersRequest,
            crate::dto::event::PlayerInput,
            crate::dto::event::EventSummary,
            crate::dto::event::EventStatusResponse,
            crate::dto::event::CourtStatus,
            crate::dto::event::GameView,
            crate::dto::event::PlayerView,
            crate::dto::matchmaking::RunRequest,
            crate::dto::matchmaking::RunSummary,
            crate::dto::matchmaking::GameStartView,
            crate::dto::matchmaking::PlayerRefView,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "events", description = "Event and roster management"),
        (name = "matchmaking", description = "Court allocation passes"),
    )
)]
pub struct ApiDoc;
