use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{command::CommandRequest, snapshot::GameStateSnapshot},
    error::AppError,
    services::command_service,
    state::SharedState,
};

/// Routes exposing the game state and accepting commands.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/commands", post(post_command))
}

/// Return the current game state snapshot.
#[utoipa::path(
    get,
    path = "/api/state",
    tag = "game",
    responses(
        (status = 200, description = "Current game state", body = GameStateSnapshot),
        (status = 503, description = "Game engine stopped")
    )
)]
pub async fn get_state(
    State(state): State<SharedState>,
) -> Result<Json<GameStateSnapshot>, AppError> {
    let snapshot = command_service::current_snapshot(&state).await?;
    Ok(Json(snapshot))
}

/// Apply one command and return the resulting state.
///
/// Commands that are not valid in the current phase are ignored and the
/// unchanged state is returned.
#[utoipa::path(
    post,
    path = "/api/commands",
    tag = "game",
    request_body = CommandRequest,
    responses(
        (status = 200, description = "Command applied or ignored", body = GameStateSnapshot),
        (status = 400, description = "Malformed or invalid command"),
        (status = 503, description = "Game engine stopped")
    )
)]
pub async fn post_command(
    State(state): State<SharedState>,
    body: String,
) -> Result<Json<GameStateSnapshot>, AppError> {
    let command = command_service::parse_command(&body)?;
    let snapshot = command_service::submit(&state, command).await?;
    Ok(Json(snapshot))
}
