use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod game;
pub mod health;
pub mod sse;
pub mod websocket;

/// Build the full HTTP surface: REST commands, display streams, the console
/// socket, health and documentation.
pub fn router(state: SharedState) -> Router<()> {
    Router::<SharedState>::new()
        .merge(game::router())
        .merge(sse::router())
        .merge(websocket::router())
        .merge(health::router())
        .merge(docs::router())
        .with_state(state)
}
