//! Pure command reducer: `(state, command, now) -> state`.

use tracing::debug;

use crate::state::game::{GameState, QuestionContent, Setup, Side};

/// Projection window requests. The engine treats them as no-ops; the service
/// layer reacts to them before forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionAction {
    /// Show the projection display.
    Open,
    /// Reload an open display.
    Refresh,
    /// Close and show the display again.
    Reopen,
    /// Hide the display.
    Close,
}

/// Every input the engine accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rename teams and, before the first start, load durations.
    ApplySetup(Setup),
    /// Toggle the console's testing flag.
    SetTestingMode(bool),
    /// Start or stop the round timer.
    ToggleRound,
    /// Back to pregame with scores cleared.
    ResetGame,
    /// Pause or resume the question timer.
    ToggleQuestionPause,
    /// Drop the question in play and return to standby.
    ResetQuestion,
    /// Add one point to a side.
    IncrementScore(Side),
    /// Remove one point from a side, stopping at zero.
    DecrementScore(Side),
    /// Moderator override of claim ownership.
    SetClaim(Option<Side>),
    /// Load question text.
    SetContent(QuestionContent),
    /// Natural advance of the flow.
    Next,
    /// Forced advance, valid from any phase.
    OverrideNext,
    /// A side buzzes in.
    Claim(Side),
    /// Toss-up judged correct for a side.
    TossupCorrect(Side),
    /// Toss-up judged wrong for the claiming side.
    TossupIncorrect(Side),
    /// Toss-up window closed by the moderator.
    TossupTimeout,
    /// Nobody answered the toss-up.
    TossupNoAnswer,
    /// Follow-up window closed by the moderator.
    FollowupTimeout,
    /// Follow-up judged correct for a side.
    FollowupCorrect(Side),
    /// Follow-up judged wrong for a side.
    FollowupIncorrect(Side),
    /// Nobody answered the follow-up.
    FollowupNoAnswer,
    /// Hand a claimed follow-up to the other side.
    SwitchClaim,
    /// Begin the reveal gesture.
    RevealHoldStart,
    /// Abort the reveal gesture.
    RevealHoldCancel,
    /// Finish the reveal gesture; only honoured once the hold has matured.
    RevealHoldComplete,
    /// Leave a revealed answer for the next round.
    AdvanceRound,
    /// Move to an arbitrary zero-based round.
    JumpRound(u32),
    /// Projection window request; handled outside the engine.
    Projection(ProjectionAction),
    /// Synthetic tick from the clock driver. A supplied `now_ms` may move
    /// the tick back in time but never past the engine clock.
    ClockTick {
        /// Caller's notion of now, in engine milliseconds.
        now_ms: Option<u64>,
    },
}

impl Command {
    /// Wire tag of the command, used for logging and the JSON protocol.
    pub fn name(&self) -> &'static str {
        match self {
            Command::ApplySetup(_) => "setup:apply",
            Command::SetTestingMode(_) => "testing-mode:set",
            Command::ToggleRound => "round:toggle",
            Command::ResetGame => "game:reset",
            Command::ToggleQuestionPause => "question:toggle-pause",
            Command::ResetQuestion => "question:reset",
            Command::IncrementScore(_) => "score:increment",
            Command::DecrementScore(_) => "score:decrement",
            Command::SetClaim(_) => "claim:manual-set",
            Command::SetContent(_) => "question:set-content",
            Command::Next => "flow:next",
            Command::OverrideNext => "flow:override-next",
            Command::Claim(Side::Left) => "flow:claim-left",
            Command::Claim(Side::Right) => "flow:claim-right",
            Command::TossupCorrect(_) => "flow:tossup-correct",
            Command::TossupIncorrect(_) => "flow:tossup-incorrect",
            Command::TossupTimeout => "flow:tossup-timeout",
            Command::TossupNoAnswer => "flow:tossup-no-answer",
            Command::FollowupTimeout => "flow:followup-timeout",
            Command::FollowupCorrect(_) => "flow:followup-correct",
            Command::FollowupIncorrect(_) => "flow:followup-incorrect",
            Command::FollowupNoAnswer => "flow:followup-no-answer",
            Command::SwitchClaim => "flow:switch-claim",
            Command::RevealHoldStart => "flow:reveal-hold-start",
            Command::RevealHoldCancel => "flow:reveal-hold-cancel",
            Command::RevealHoldComplete => "flow:reveal-hold-complete",
            Command::AdvanceRound => "flow:advance-round",
            Command::JumpRound(_) => "flow:jump-round",
            Command::Projection(ProjectionAction::Open) => "projection:open",
            Command::Projection(ProjectionAction::Refresh) => "projection:refresh",
            Command::Projection(ProjectionAction::Reopen) => "projection:reopen",
            Command::Projection(ProjectionAction::Close) => "projection:close",
            Command::ClockTick { .. } => "clock:tick",
        }
    }
}

/// Compute the state following `command` at monotonic time `now_ms`.
///
/// The input is never modified. A command that does not apply to the current
/// phase yields a copy of `state` whose only difference is the time anchor.
pub fn reduce(state: &GameState, command: Command, now_ms: u64) -> GameState {
    if let Command::ClockTick { now_ms: supplied } = command {
        let mut next = state.clone();
        accumulate_tick(&mut next, supplied.map_or(now_ms, |at| at.min(now_ms)));
        return next;
    }

    let mut next = state.clone();
    if let Err(ignored) = next.transition(command, now_ms) {
        debug!(
            command = ignored.command,
            phase = %ignored.phase,
            reason = ignored.reason,
            "command ignored"
        );
        next = state.clone();
    }
    next.last_updated_ms = now_ms;
    next
}

/// Turn the time since the anchor into whole seconds. Sub-second remainders
/// stay behind the anchor until they add up to a full second.
fn accumulate_tick(state: &mut GameState, now_ms: u64) {
    let elapsed_seconds = now_ms.saturating_sub(state.last_updated_ms) / 1000;
    if elapsed_seconds == 0 {
        return;
    }
    state.consume_seconds(u32::try_from(elapsed_seconds).unwrap_or(u32::MAX));
    state.last_updated_ms = state.last_updated_ms.saturating_add(elapsed_seconds * 1000);
}
