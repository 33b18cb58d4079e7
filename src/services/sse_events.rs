use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    dto::{
        snapshot::GameStateSnapshot,
        sse::{ProjectionCloseEvent, ProjectionReloadEvent, ReloadReason, ServerEvent},
    },
    state::{SharedState, game::GameState, reducer::ProjectionAction},
};

pub const EVENT_STATE_SYNC: &str = "state.sync";
pub const EVENT_PROJECTION_RELOAD: &str = "projection.reload";
pub const EVENT_PROJECTION_CLOSE: &str = "projection.close";

/// Forward every state published by the engine to both display hubs.
pub fn spawn_publisher(state: SharedState) -> JoinHandle<()> {
    let mut updates = state.engine().subscribe();
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(game) => broadcast_state(&state, &game),
                Err(RecvError::Lagged(skipped)) => {
                    // Older states are stale anyway; push the current one.
                    warn!(skipped, "state publisher lagged behind the engine");
                    if let Ok(game) = state.engine().snapshot().await {
                        broadcast_state(&state, &game);
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
        info!("state publisher stopped");
    })
}

/// Build the `state.sync` event for `game` with the current projection flag.
pub fn state_sync_event(state: &SharedState, game: &GameState) -> Option<ServerEvent> {
    let snapshot = GameStateSnapshot::from_state(game, state.projection_open());
    match ServerEvent::json(Some(EVENT_STATE_SYNC.to_string()), &snapshot) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialise state snapshot");
            None
        }
    }
}

/// Push a full snapshot to the console and projection hubs.
pub fn broadcast_state(state: &SharedState, game: &GameState) {
    if let Some(event) = state_sync_event(state, game) {
        state.console_sse().broadcast(event.clone());
        state.projection_sse().broadcast(event);
    }
}

/// Tell the projection display to reload or close.
pub fn broadcast_projection_action(state: &SharedState, action: ProjectionAction) {
    let event = match ReloadReason::for_action(action) {
        Some(reason) => ServerEvent::json(
            Some(EVENT_PROJECTION_RELOAD.to_string()),
            &ProjectionReloadEvent { reason },
        ),
        None => ServerEvent::json(
            Some(EVENT_PROJECTION_CLOSE.to_string()),
            &ProjectionCloseEvent {
                projection_open: false,
            },
        ),
    };

    match event {
        Ok(event) => state.projection_sse().broadcast(event),
        Err(err) => warn!(error = %err, "failed to serialise projection event"),
    }
}
