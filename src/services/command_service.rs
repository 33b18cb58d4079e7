use tracing::info;

use crate::{
    dto::{command::CommandRequest, snapshot::GameStateSnapshot},
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        reducer::{Command, ProjectionAction},
    },
};

/// Parse and validate a raw JSON command frame.
pub fn parse_command(raw: &str) -> Result<Command, ServiceError> {
    Ok(CommandRequest::from_json_str(raw)?.into())
}

/// Apply a command and return the snapshot that resulted from it.
pub async fn submit(state: &SharedState, command: Command) -> Result<GameStateSnapshot, ServiceError> {
    let projection_changed = handle_projection(state, &command);
    let game = state.engine().apply(command).await?;

    // The engine state did not change, so the engine publishes nothing.
    if projection_changed {
        sse_events::broadcast_state(state, &game);
    }

    Ok(GameStateSnapshot::from_state(&game, state.projection_open()))
}

/// Queue a command without waiting for its result.
pub async fn dispatch(state: &SharedState, command: Command) -> Result<(), ServiceError> {
    if matches!(command, Command::Projection(_)) {
        return submit(state, command).await.map(|_| ());
    }
    state.engine().dispatch(command).await
}

/// Current snapshot as served by `GET /api/state`.
pub async fn current_snapshot(state: &SharedState) -> Result<GameStateSnapshot, ServiceError> {
    let game = state.engine().snapshot().await?;
    Ok(GameStateSnapshot::from_state(&game, state.projection_open()))
}

/// Update the projection flag and notify the display. Returns whether the flag changed.
fn handle_projection(state: &SharedState, command: &Command) -> bool {
    let Command::Projection(action) = command else {
        return false;
    };

    let open = *action != ProjectionAction::Close;
    let previous = state.set_projection_open(open);
    sse_events::broadcast_projection_action(state, *action);
    info!(command = command.name(), projection_open = open, "projection request");
    previous != open
}
