use serde::Serialize;
use utoipa::ToSchema;

use crate::state::reducer::ProjectionAction;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels and the console socket.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build an event from already-serialised data.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream (`console` or `projection`).
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the engine has stopped accepting commands.
    pub degraded: bool,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
/// Why the projection display should reload.
pub enum ReloadReason {
    Open,
    Refresh,
    Reopen,
}

#[derive(Debug, Serialize, ToSchema)]
/// Sent on the projection stream when the display should (re)load itself.
pub struct ProjectionReloadEvent {
    pub reason: ReloadReason,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Sent on the projection stream when the display should close.
pub struct ProjectionCloseEvent {
    pub projection_open: bool,
}

impl ReloadReason {
    /// Reload reason for a projection action, `None` for `close`.
    pub fn for_action(action: ProjectionAction) -> Option<Self> {
        match action {
            ProjectionAction::Open => Some(ReloadReason::Open),
            ProjectionAction::Refresh => Some(ReloadReason::Refresh),
            ProjectionAction::Reopen => Some(ReloadReason::Reopen),
            ProjectionAction::Close => None,
        }
    }
}
