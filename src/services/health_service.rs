use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report `degraded` once the engine actor has stopped.
pub fn health_status(state: &SharedState) -> HealthResponse {
    if state.is_degraded() {
        warn!("game engine stopped (degraded mode)");
        HealthResponse::degraded(state.started_at())
    } else {
        HealthResponse::ok(state.started_at())
    }
}
