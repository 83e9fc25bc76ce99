use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod events;
pub mod health;
pub mod matchmaking;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(events::router())
        .merge(matchmaking::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
