//! Wire representation of the game phase.

use serde::{Serialize, Serializer};

use crate::state::state_machine::GamePhase;

/// Game phase as exposed to clients (REST/SSE/WebSocket). Serializes to the
/// phase tag, e.g. `tossup:review` or `followup:active-claimed-left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleGamePhase(GamePhase);

impl From<&GamePhase> for VisibleGamePhase {
    fn from(value: &GamePhase) -> Self {
        Self(*value)
    }
}

impl Serialize for VisibleGamePhase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.as_str())
    }
}
