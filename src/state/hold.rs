//! Minimum-duration hold required before an answer can be revealed.

/// How long the reveal gesture must be held, in milliseconds.
pub const REVEAL_HOLD_MS: u64 = 1000;

/// Anchor of an in-progress reveal hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealHold {
    started_at_ms: Option<u64>,
}

impl RevealHold {
    /// Anchor the hold at `at_ms`, replacing any earlier anchor.
    pub fn start(&mut self, at_ms: u64) {
        self.started_at_ms = Some(at_ms);
    }

    /// Drop the anchor. Safe to call when no hold is active.
    pub fn cancel(&mut self) {
        self.started_at_ms = None;
    }

    /// When the current hold started, if one is active.
    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    /// Time held so far. An anchor later than `at_ms` counts as zero.
    pub fn held_for_ms(&self, at_ms: u64) -> Option<u64> {
        self.started_at_ms
            .map(|started| at_ms.saturating_sub(started))
    }

    /// True once a hold exists and has lasted at least [`REVEAL_HOLD_MS`].
    pub fn is_mature(&self, at_ms: u64) -> bool {
        self.held_for_ms(at_ms)
            .is_some_and(|held| held >= REVEAL_HOLD_MS)
    }
}
