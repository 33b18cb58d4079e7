//! Phase machine: per-command transitions on a [`GameState`].

use std::fmt;

use thiserror::Error;

use crate::state::{
    game::{
        DisplayMode, GameState, PROMPT_AWAITING_NEXT, PROMPT_AWAITING_START, PostAnswerTarget,
        QuestionKind, Setup, Side,
    },
    reducer::Command,
    timer::{TickOutcome, TimerState},
};

/// Points awarded for a correct toss-up.
pub const TOSSUP_POINTS: u32 = 1;
/// Points awarded for a correct follow-up.
pub const FOLLOWUP_POINTS: u32 = 2;

/// High-level phases the match can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Process just started; nothing configured yet.
    Idle,
    /// Setup applied, round timer not started.
    PregameReady,
    /// Round timer running, waiting for the next toss-up.
    RoundStandby,
    /// A toss-up is in play.
    Tossup(TossupStage),
    /// A follow-up is armed or in play.
    Followup(FollowupStage),
    /// An answer is waiting to be revealed, or has been.
    Answer(AnswerStage),
    /// Between questions with the round timer stopped.
    RoundPaused,
    /// Reserved for the end of a round; no transition reaches it on its own.
    RoundEnded,
}

/// Sub-phase of a toss-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TossupStage {
    /// Open to whichever side has not yet failed it.
    Active,
    /// A side claimed, or time ran out; waiting for adjudication.
    Review,
}

/// Sub-phase of a follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowupStage {
    /// Timer armed but not running.
    Standby,
    /// In play. `None` means open to both sides, otherwise the claimed side.
    Active(Option<Side>),
    /// Waiting for adjudication of an open claim or a timeout.
    Review,
}

/// Sub-phase of the answer display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStage {
    /// Reveal is allowed once the hold gate matures.
    Eligible,
    /// Answer shown; the next advance leaves the question.
    Revealed,
}

impl GamePhase {
    /// Stable tag used on the wire and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::PregameReady => "pregame-ready",
            GamePhase::RoundStandby => "round-running:standby",
            GamePhase::Tossup(TossupStage::Active) => "tossup:active",
            GamePhase::Tossup(TossupStage::Review) => "tossup:review",
            GamePhase::Followup(FollowupStage::Standby) => "followup:standby",
            GamePhase::Followup(FollowupStage::Active(None)) => "followup:active-open",
            GamePhase::Followup(FollowupStage::Active(Some(Side::Left))) => {
                "followup:active-claimed-left"
            }
            GamePhase::Followup(FollowupStage::Active(Some(Side::Right))) => {
                "followup:active-claimed-right"
            }
            GamePhase::Followup(FollowupStage::Review) => "followup:review",
            GamePhase::Answer(AnswerStage::Eligible) => "answer:eligible",
            GamePhase::Answer(AnswerStage::Revealed) => "answer:revealed",
            GamePhase::RoundPaused => "round-paused",
            GamePhase::RoundEnded => "round-ended",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command that does not apply to the current phase. Never surfaced to
/// clients: the reducer logs it and keeps the previous state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{command} ignored while in {phase}: {reason}")]
pub struct IgnoredCommand {
    /// Phase the state was in when the command arrived.
    pub phase: GamePhase,
    /// Wire tag of the command.
    pub command: &'static str,
    /// Short explanation for the log line.
    pub reason: &'static str,
}

impl GameState {
    /// Apply one non-tick command in place. On `Err` the state may be partially
    /// modified and must be discarded by the caller.
    pub(crate) fn transition(&mut self, command: Command, at_ms: u64) -> Result<(), IgnoredCommand> {
        let phase = self.phase;
        let name = command.name();
        let ignore = |reason: &'static str| {
            Err(IgnoredCommand {
                phase,
                command: name,
                reason,
            })
        };

        match command {
            Command::ApplySetup(setup) => self.apply_setup(setup),
            Command::SetTestingMode(enabled) => self.testing_mode = enabled,
            Command::ToggleRound => self.toggle_round(),
            Command::ResetGame => self.reset_game(),
            Command::ToggleQuestionPause => {
                if !self.round_timer.running {
                    return ignore("round timer is not running");
                }
                if phase == GamePhase::RoundEnded {
                    return ignore("round has ended");
                }
                if !self.question_timer.has_time_left() {
                    return ignore("question timer has no time left");
                }
                self.question_timer.running = !self.question_timer.running;
            }
            Command::ResetQuestion => self.reset_question(),
            Command::IncrementScore(side) => {
                let team = &mut self.teams[side];
                team.score = team.score.saturating_add(1);
            }
            Command::DecrementScore(side) => {
                let team = &mut self.teams[side];
                team.score = team.score.saturating_sub(1);
            }
            Command::SetClaim(owner) => self.set_claim(owner),
            Command::SetContent(content) => self.question.set_content(content),
            Command::Next => {
                if !self.started || !self.round_timer.running {
                    return ignore("round timer is not running");
                }
                match phase {
                    GamePhase::RoundStandby | GamePhase::PregameReady => self.start_tossup(),
                    GamePhase::Followup(FollowupStage::Standby) => {
                        self.resume_question_timer();
                        self.phase = GamePhase::Followup(FollowupStage::Active(self.claim_owner));
                    }
                    GamePhase::Answer(AnswerStage::Revealed) => self.leave_revealed_answer(),
                    _ => return ignore("nothing to advance to"),
                }
            }
            Command::OverrideNext => self.override_next(),
            Command::Claim(side) => match phase {
                GamePhase::Tossup(TossupStage::Active) => {
                    self.set_claim(Some(side));
                    self.phase = GamePhase::Tossup(TossupStage::Review);
                }
                GamePhase::Followup(FollowupStage::Active(None)) => {
                    self.set_claim(Some(side));
                    self.phase = GamePhase::Followup(FollowupStage::Review);
                }
                _ => return ignore("no open question to claim"),
            },
            Command::TossupCorrect(side) => {
                if phase != GamePhase::Tossup(TossupStage::Review) {
                    return ignore("toss-up is not under review");
                }
                if self.claim_owner.is_some_and(|owner| owner != side) {
                    return ignore("the other team holds the claim");
                }
                if self.eligibility.tossup_attempted[side] {
                    return ignore("team already missed this toss-up");
                }
                self.set_claim(Some(side));
                self.award(side, TOSSUP_POINTS);
                self.enter_answer_eligible(PostAnswerTarget::FollowupStandby);
            }
            Command::TossupIncorrect(side) => {
                if phase != GamePhase::Tossup(TossupStage::Review) {
                    return ignore("toss-up is not under review");
                }
                if self.claim_owner != Some(side) {
                    return ignore("team does not hold the claim");
                }
                self.eligibility.tossup_attempted[side] = true;
                let other_eligible = !self.eligibility.tossup_attempted[side.other()]
                    && self.question_timer.has_time_left();
                self.set_claim(None);
                if other_eligible {
                    self.phase = GamePhase::Tossup(TossupStage::Active);
                } else {
                    self.enter_answer_eligible(PostAnswerTarget::FollowupStandby);
                }
            }
            Command::TossupTimeout => {
                if !matches!(phase, GamePhase::Tossup(_)) {
                    return ignore("no toss-up in play");
                }
                self.set_claim(None);
                self.question_timer.pause();
                self.phase = GamePhase::Tossup(TossupStage::Review);
            }
            Command::TossupNoAnswer => {
                if phase != GamePhase::Tossup(TossupStage::Review) {
                    return ignore("toss-up is not under review");
                }
                if self.claim_owner.is_some() {
                    return ignore("a claim is pending adjudication");
                }
                self.enter_answer_eligible(PostAnswerTarget::FollowupStandby);
            }
            Command::FollowupTimeout => {
                if !is_followup_in_play(phase) {
                    return ignore("no follow-up in play");
                }
                self.set_claim(None);
                self.question_timer.pause();
                self.phase = GamePhase::Followup(FollowupStage::Review);
            }
            Command::FollowupCorrect(side) => {
                let claim_allows = match phase {
                    GamePhase::Followup(FollowupStage::Active(None)) => true,
                    GamePhase::Followup(FollowupStage::Active(Some(owner))) => owner == side,
                    GamePhase::Followup(FollowupStage::Review) => {
                        self.claim_owner.is_none_or(|owner| owner == side)
                    }
                    _ => return ignore("no follow-up in play"),
                };
                if self.eligibility.followup_attempted[side] {
                    return ignore("team already missed this follow-up");
                }
                if !claim_allows {
                    return ignore("the other team holds the claim");
                }
                self.set_claim(Some(side));
                self.award(side, FOLLOWUP_POINTS);
                self.enter_answer_eligible(PostAnswerTarget::RoundStandby);
            }
            Command::FollowupIncorrect(side) => {
                let claim_allows = match phase {
                    GamePhase::Followup(FollowupStage::Active(None)) => true,
                    GamePhase::Followup(FollowupStage::Active(Some(owner))) => owner == side,
                    GamePhase::Followup(FollowupStage::Review) => self.claim_owner == Some(side),
                    _ => return ignore("no follow-up in play"),
                };
                if !claim_allows {
                    return ignore("team does not hold the claim");
                }
                self.eligibility.followup_attempted[side] = true;
                let other = side.other();
                let other_eligible = !self.eligibility.followup_attempted[other]
                    && self.question_timer.has_time_left();
                if other_eligible {
                    self.hand_followup_to(other);
                } else {
                    self.enter_answer_eligible(PostAnswerTarget::RoundStandby);
                }
            }
            Command::FollowupNoAnswer => {
                if phase != GamePhase::Followup(FollowupStage::Review) {
                    return ignore("follow-up is not under review");
                }
                if self.claim_owner.is_some() {
                    return ignore("a claim is pending adjudication");
                }
                self.enter_answer_eligible(PostAnswerTarget::RoundStandby);
            }
            Command::SwitchClaim => match phase {
                // Moderator override: flips regardless of attempts or time left.
                GamePhase::Followup(FollowupStage::Active(Some(owner))) => {
                    self.set_claim(Some(owner.other()));
                }
                _ => return ignore("no claimed follow-up in play"),
            },
            Command::RevealHoldStart => {
                if !self.reveal_allowed() {
                    return ignore("answer is not eligible for reveal");
                }
                self.reveal_hold.start(at_ms);
            }
            Command::RevealHoldCancel => self.reveal_hold.cancel(),
            Command::RevealHoldComplete => {
                if !self.reveal_allowed() {
                    return ignore("answer is not eligible for reveal");
                }
                if !self.reveal_hold.is_mature(at_ms) {
                    return ignore("reveal hold has not matured");
                }
                self.reveal_answer();
            }
            Command::AdvanceRound => {
                if phase != GamePhase::Answer(AnswerStage::Revealed) {
                    return ignore("answer has not been revealed");
                }
                self.next_round();
                self.reveal_eligible = false;
                self.reveal_hold.cancel();
                self.question.display_mode = DisplayMode::Prompt;
                self.question_timer.pause();
                self.question_timer.seconds_remaining = 0;
                self.phase = self.standby_or_paused();
            }
            Command::JumpRound(index) => self.jump_round(index),
            Command::Projection(_) => {}
            Command::ClockTick { .. } => return ignore("ticks are accumulated by the reducer"),
        }

        Ok(())
    }

    /// Consume whole elapsed seconds on both timers and react to question expiry.
    pub(crate) fn consume_seconds(&mut self, elapsed_seconds: u32) {
        // The round running out is informational only.
        self.round_timer.tick(elapsed_seconds);

        if self.question_timer.tick(elapsed_seconds) != TickOutcome::Expired {
            return;
        }
        self.question_timer.pause();
        match self.phase {
            GamePhase::Tossup(_) => {
                self.set_claim(None);
                self.phase = GamePhase::Tossup(TossupStage::Review);
            }
            phase if is_followup_in_play(phase) => {
                self.set_claim(None);
                self.phase = GamePhase::Followup(FollowupStage::Review);
            }
            _ => {}
        }
    }

    /// Update claim ownership, keeping an active follow-up phase tag in step.
    fn set_claim(&mut self, owner: Option<Side>) {
        self.claim_owner = owner;
        if let GamePhase::Followup(FollowupStage::Active(_)) = self.phase {
            self.phase = GamePhase::Followup(FollowupStage::Active(owner));
        }
    }

    fn award(&mut self, side: Side, points: u32) {
        let team = &mut self.teams[side];
        team.score = team.score.saturating_add(points);
    }

    /// The question timer may only run alongside the round timer.
    fn resume_question_timer(&mut self) {
        self.question_timer.running = self.round_timer.running;
    }

    fn standby_or_paused(&self) -> GamePhase {
        if self.round_timer.running {
            GamePhase::RoundStandby
        } else {
            GamePhase::RoundPaused
        }
    }

    fn reveal_allowed(&self) -> bool {
        self.started && self.reveal_eligible && self.phase == GamePhase::Answer(AnswerStage::Eligible)
    }

    fn next_round(&mut self) {
        self.current_round_index = self.current_round_index.saturating_add(1);
        self.question.index = self.current_round_index.saturating_add(1);
        self.post_answer_target = PostAnswerTarget::None;
        self.set_claim(None);
        self.eligibility.clear();
    }

    fn apply_setup(&mut self, setup: Setup) {
        let config = setup.config_over(self.config);
        for (side, name) in [
            (Side::Left, setup.left_team_name),
            (Side::Right, setup.right_team_name),
        ] {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                self.teams[side].name = trimmed.to_string();
            }
        }
        if self.started {
            return;
        }

        self.config = config;
        self.round_timer = TimerState::stopped(
            config.round_length_seconds,
            config.round_length_seconds,
            config.warning_threshold_seconds,
        );
        self.question_timer = TimerState::stopped(
            config.tossup_length_seconds,
            0,
            config.warning_threshold_seconds,
        );
        self.current_round_index = 0;
        self.question.index = 1;
        self.reveal_eligible = false;
        self.reveal_hold.cancel();
        self.post_answer_target = PostAnswerTarget::None;
        self.set_claim(None);
        self.eligibility.clear();
        self.phase = GamePhase::PregameReady;
    }

    fn toggle_round(&mut self) {
        let running = !self.round_timer.running;
        self.round_timer.running = running;
        if !running {
            self.question_timer.pause();
            return;
        }
        self.started = true;
        if matches!(self.phase, GamePhase::Idle | GamePhase::PregameReady) {
            self.phase = GamePhase::RoundStandby;
        }
    }

    fn reset_game(&mut self) {
        self.teams.left.score = 0;
        self.teams.right.score = 0;
        self.round_timer.arm(self.config.round_length_seconds, false);
        self.question_timer.clear(self.config.tossup_length_seconds);
        self.question.clear(PROMPT_AWAITING_START);
        self.current_round_index = 0;
        self.question.index = 1;
        self.started = false;
        self.reveal_eligible = false;
        self.reveal_hold.cancel();
        self.post_answer_target = PostAnswerTarget::None;
        self.question_kind = QuestionKind::Tossup;
        self.set_claim(None);
        self.eligibility.clear();
        self.phase = GamePhase::PregameReady;
    }

    fn reset_question(&mut self) {
        self.question_timer.clear(self.config.tossup_length_seconds);
        self.question.display_mode = DisplayMode::Prompt;
        self.reveal_eligible = false;
        self.reveal_hold.cancel();
        self.post_answer_target = PostAnswerTarget::None;
        self.set_claim(None);
        self.eligibility.clear();
        self.phase = self.standby_or_paused();
    }

    fn jump_round(&mut self, index: u32) {
        self.current_round_index = index;
        self.question.index = index.saturating_add(1);
        self.question_kind = QuestionKind::Tossup;
        self.question_timer.clear(self.config.tossup_length_seconds);
        self.reveal_eligible = false;
        self.reveal_hold.cancel();
        self.post_answer_target = PostAnswerTarget::None;
        self.set_claim(None);
        self.eligibility.clear();
        self.question.clear(if self.started {
            PROMPT_AWAITING_NEXT
        } else {
            PROMPT_AWAITING_START
        });
        self.phase = if self.round_timer.running {
            GamePhase::RoundStandby
        } else if self.started {
            GamePhase::RoundPaused
        } else {
            GamePhase::PregameReady
        };
    }

    fn start_tossup(&mut self) {
        self.question_kind = QuestionKind::Tossup;
        self.set_claim(None);
        self.eligibility.tossup_attempted = Default::default();
        self.reveal_eligible = false;
        self.question.display_mode = DisplayMode::Prompt;
        self.question_timer
            .arm(self.config.tossup_length_seconds, self.round_timer.running);
        self.phase = GamePhase::Tossup(TossupStage::Active);
    }

    /// Give the follow-up to `side` after the other side missed, keeping the clock.
    fn hand_followup_to(&mut self, side: Side) {
        self.question_kind = QuestionKind::Followup;
        self.reveal_eligible = false;
        self.phase = GamePhase::Followup(FollowupStage::Active(Some(side)));
        self.set_claim(Some(side));
        self.resume_question_timer();
    }

    fn enter_answer_eligible(&mut self, target: PostAnswerTarget) {
        self.question_timer.pause();
        self.reveal_eligible = true;
        self.question.display_mode = DisplayMode::AnswerHidden;
        self.post_answer_target = target;
        self.phase = GamePhase::Answer(AnswerStage::Eligible);
    }

    fn reveal_answer(&mut self) {
        self.question.display_mode = DisplayMode::AnswerRevealed;
        self.reveal_hold.cancel();
        self.phase = GamePhase::Answer(AnswerStage::Revealed);
    }

    /// Natural exit from a revealed answer: arm the follow-up or move to the next round.
    fn leave_revealed_answer(&mut self) {
        self.reveal_eligible = false;
        self.reveal_hold.cancel();
        self.question_timer.pause();
        self.question.clear(PROMPT_AWAITING_NEXT);

        if self.post_answer_target == PostAnswerTarget::FollowupStandby {
            self.question_kind = QuestionKind::Followup;
            self.eligibility.followup_attempted = Default::default();
            self.question_timer
                .arm(self.config.followup_length_seconds, false);
            self.post_answer_target = PostAnswerTarget::None;
            self.phase = GamePhase::Followup(FollowupStage::Standby);
        } else {
            self.next_round();
            self.question_timer.seconds_remaining = 0;
            self.phase = self.standby_or_paused();
        }
    }

    /// Forced advance usable from any phase so the moderator can always recover.
    fn override_next(&mut self) {
        self.started = true;
        if !self.round_timer.running && self.round_timer.has_time_left() {
            self.round_timer.running = true;
        }

        match self.phase {
            GamePhase::Answer(AnswerStage::Revealed) => self.leave_revealed_answer(),
            GamePhase::Answer(AnswerStage::Eligible) => {
                self.reveal_eligible = true;
                self.reveal_answer();
            }
            GamePhase::Followup(FollowupStage::Standby) => {
                if self.question_timer.has_time_left() {
                    self.resume_question_timer();
                } else {
                    self.question_timer
                        .arm(self.config.followup_length_seconds, self.round_timer.running);
                }
                self.phase = GamePhase::Followup(FollowupStage::Active(self.claim_owner));
            }
            GamePhase::Followup(FollowupStage::Active(_) | FollowupStage::Review) => {
                self.enter_answer_eligible(PostAnswerTarget::RoundStandby);
            }
            GamePhase::Tossup(_) => {
                self.enter_answer_eligible(PostAnswerTarget::FollowupStandby);
            }
            GamePhase::Idle
            | GamePhase::PregameReady
            | GamePhase::RoundStandby
            | GamePhase::RoundPaused
            | GamePhase::RoundEnded => self.start_tossup(),
        }
    }
}

fn is_followup_in_play(phase: GamePhase) -> bool {
    matches!(
        phase,
        GamePhase::Followup(FollowupStage::Active(_) | FollowupStage::Review)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::{PregameConfig, QuestionContent};

    fn setup() -> Setup {
        Setup {
            left_team_name: "L".into(),
            right_team_name: "R".into(),
            round_length_seconds: Some(600),
            tossup_length_seconds: Some(45),
            followup_length_seconds: Some(120),
            warning_threshold_seconds: Some(10),
        }
    }

    fn apply(state: &mut GameState, command: Command) {
        state.transition(command, 0).unwrap();
    }

    fn running_tossup() -> GameState {
        let mut state = GameState::new(0);
        apply(&mut state, Command::ApplySetup(setup()));
        apply(&mut state, Command::ToggleRound);
        apply(&mut state, Command::Next);
        state
    }

    /// Toss-up answered by nobody, answer revealed, follow-up armed and started open.
    fn open_followup() -> GameState {
        let mut state = running_tossup();
        apply(&mut state, Command::TossupTimeout);
        apply(&mut state, Command::TossupNoAnswer);
        apply(&mut state, Command::OverrideNext);
        apply(&mut state, Command::Next);
        apply(&mut state, Command::Next);
        state
    }

    #[test]
    fn phase_tags_match_wire_names() {
        assert_eq!(GamePhase::RoundStandby.as_str(), "round-running:standby");
        assert_eq!(
            GamePhase::Followup(FollowupStage::Active(Some(Side::Right))).to_string(),
            "followup:active-claimed-right"
        );
        assert_eq!(
            GamePhase::Followup(FollowupStage::Active(None)).to_string(),
            "followup:active-open"
        );
    }

    #[test]
    fn setup_enters_pregame_ready() {
        let mut state = GameState::new(0);
        apply(&mut state, Command::ApplySetup(setup()));

        assert_eq!(state.phase, GamePhase::PregameReady);
        assert_eq!(state.team(Side::Left).name, "L");
        assert_eq!(state.round_timer.seconds_remaining, 600);
        assert_eq!(state.question_timer.duration_seconds, 45);
    }

    #[test]
    fn setup_after_start_only_renames() {
        let mut state = running_tossup();
        let mut changed = setup();
        changed.left_team_name = "  Lions ".into();
        changed.right_team_name = "   ".into();
        changed.round_length_seconds = Some(5);

        apply(&mut state, Command::ApplySetup(changed));

        assert_eq!(state.team(Side::Left).name, "Lions");
        assert_eq!(state.team(Side::Right).name, "R");
        assert_eq!(state.config.round_length_seconds, 600);
        assert_eq!(state.phase, GamePhase::Tossup(TossupStage::Active));
    }

    #[test]
    fn rename_only_setup_keeps_configured_durations() {
        let config = PregameConfig {
            round_length_seconds: 300,
            tossup_length_seconds: 30,
            followup_length_seconds: 60,
            warning_threshold_seconds: 5,
        };
        let mut state = GameState::with_defaults(config, "A", "B", 0);
        apply(
            &mut state,
            Command::ApplySetup(Setup {
                left_team_name: "Owls".into(),
                ..Setup::default()
            }),
        );

        assert_eq!(state.phase, GamePhase::PregameReady);
        assert_eq!(state.team(Side::Left).name, "Owls");
        assert_eq!(state.team(Side::Right).name, "B");
        assert_eq!(state.config, config);
        assert_eq!(state.round_timer.seconds_remaining, 300);
        assert_eq!(state.question_timer.duration_seconds, 30);
    }

    #[test]
    fn first_round_start_leaves_pregame() {
        let mut state = GameState::new(0);
        apply(&mut state, Command::ToggleRound);
        assert!(state.started);
        assert_eq!(state.phase, GamePhase::RoundStandby);
    }

    #[test]
    fn next_starts_tossup_with_running_timer() {
        let state = running_tossup();
        assert_eq!(state.phase, GamePhase::Tossup(TossupStage::Active));
        assert_eq!(state.question_kind, QuestionKind::Tossup);
        assert!(state.question_timer.running);
        assert_eq!(state.question_timer.seconds_remaining, 45);
    }

    #[test]
    fn next_requires_running_round() {
        let mut state = GameState::new(0);
        apply(&mut state, Command::ApplySetup(setup()));
        let err = state.transition(Command::Next, 0).unwrap_err();
        assert_eq!(err.phase, GamePhase::PregameReady);
        assert_eq!(err.command, "flow:next");
    }

    #[test]
    fn tossup_incorrect_opens_question_to_other_side() {
        let mut state = running_tossup();
        apply(&mut state, Command::Claim(Side::Left));
        apply(&mut state, Command::TossupIncorrect(Side::Left));

        assert_eq!(state.phase, GamePhase::Tossup(TossupStage::Active));
        assert!(state.eligibility.tossup_attempted.left);
        assert!(!state.eligibility.tossup_attempted.right);
        assert_eq!(state.claim_owner, None);
    }

    #[test]
    fn tossup_incorrect_by_both_sides_goes_to_answer() {
        let mut state = running_tossup();
        apply(&mut state, Command::Claim(Side::Left));
        apply(&mut state, Command::TossupIncorrect(Side::Left));
        apply(&mut state, Command::Claim(Side::Right));
        apply(&mut state, Command::TossupIncorrect(Side::Right));

        assert_eq!(state.phase, GamePhase::Answer(AnswerStage::Eligible));
        assert_eq!(state.post_answer_target, PostAnswerTarget::FollowupStandby);
        assert_eq!(state.question.display_mode, DisplayMode::AnswerHidden);
    }

    #[test]
    fn tossup_incorrect_requires_claim_owner() {
        let mut state = running_tossup();
        apply(&mut state, Command::Claim(Side::Left));
        assert!(state.transition(Command::TossupIncorrect(Side::Right), 0).is_err());
    }

    #[test]
    fn missed_team_cannot_be_marked_correct() {
        let mut state = running_tossup();
        apply(&mut state, Command::Claim(Side::Left));
        apply(&mut state, Command::TossupIncorrect(Side::Left));
        apply(&mut state, Command::TossupTimeout);

        assert!(state.transition(Command::TossupCorrect(Side::Left), 0).is_err());
    }

    #[test]
    fn either_team_can_be_correct_after_timeout() {
        let mut state = running_tossup();
        apply(&mut state, Command::TossupTimeout);
        apply(&mut state, Command::TossupCorrect(Side::Right));

        assert_eq!(state.team(Side::Right).score, 1);
        assert_eq!(state.claim_owner, Some(Side::Right));
        assert_eq!(state.post_answer_target, PostAnswerTarget::FollowupStandby);
    }

    #[test]
    fn followup_standby_starts_with_held_claim() {
        let mut state = running_tossup();
        apply(&mut state, Command::Claim(Side::Left));
        apply(&mut state, Command::TossupCorrect(Side::Left));
        apply(&mut state, Command::OverrideNext);
        apply(&mut state, Command::Next);
        assert_eq!(state.phase, GamePhase::Followup(FollowupStage::Standby));
        assert!(!state.question_timer.running);
        assert_eq!(state.question_timer.seconds_remaining, 120);

        apply(&mut state, Command::Next);
        assert_eq!(
            state.phase,
            GamePhase::Followup(FollowupStage::Active(Some(Side::Left)))
        );
        assert!(state.question_timer.running);
    }

    #[test]
    fn followup_incorrect_hands_claim_over() {
        let mut state = open_followup();
        apply(&mut state, Command::FollowupIncorrect(Side::Left));

        assert_eq!(
            state.phase,
            GamePhase::Followup(FollowupStage::Active(Some(Side::Right)))
        );
        assert_eq!(state.claim_owner, Some(Side::Right));
        assert!(state.question_timer.running);
    }

    #[test]
    fn followup_correct_from_review_awards_two() {
        let mut state = open_followup();
        apply(&mut state, Command::Claim(Side::Right));
        assert_eq!(state.phase, GamePhase::Followup(FollowupStage::Review));
        apply(&mut state, Command::FollowupCorrect(Side::Right));

        assert_eq!(state.team(Side::Right).score, 2);
        assert_eq!(state.phase, GamePhase::Answer(AnswerStage::Eligible));
        assert_eq!(state.post_answer_target, PostAnswerTarget::RoundStandby);
        assert!(state.reveal_eligible);
    }

    #[test]
    fn tossup_incorrect_without_time_left_goes_to_answer() {
        let mut state = running_tossup();
        apply(&mut state, Command::Claim(Side::Left));
        state.question_timer.seconds_remaining = 0;
        apply(&mut state, Command::TossupIncorrect(Side::Left));

        assert_eq!(state.phase, GamePhase::Answer(AnswerStage::Eligible));
        assert_eq!(state.post_answer_target, PostAnswerTarget::FollowupStandby);
        assert!(state.eligibility.tossup_attempted.left);
        assert!(!state.eligibility.tossup_attempted.right);
        assert_eq!(state.claim_owner, None);
    }

    #[test]
    fn followup_incorrect_without_time_left_goes_to_answer() {
        let mut state = open_followup();
        state.question_timer.seconds_remaining = 0;
        apply(&mut state, Command::FollowupIncorrect(Side::Left));

        assert_eq!(state.phase, GamePhase::Answer(AnswerStage::Eligible));
        assert_eq!(state.post_answer_target, PostAnswerTarget::RoundStandby);
        assert!(state.eligibility.followup_attempted.left);
        assert!(!state.question_timer.running);
    }

    #[test]
    fn followup_incorrect_after_opponent_missed_goes_to_answer() {
        let mut state = open_followup();
        apply(&mut state, Command::FollowupIncorrect(Side::Left));
        apply(&mut state, Command::FollowupIncorrect(Side::Right));

        assert_eq!(state.phase, GamePhase::Answer(AnswerStage::Eligible));
        assert_eq!(state.post_answer_target, PostAnswerTarget::RoundStandby);
        assert!(state.eligibility.followup_attempted.left);
        assert!(state.eligibility.followup_attempted.right);
        assert_eq!(state.team(Side::Left).score, 0);
        assert_eq!(state.team(Side::Right).score, 0);
    }

    #[test]
    fn followup_correct_from_non_owner_is_ignored() {
        let mut state = open_followup();
        apply(&mut state, Command::SetClaim(Some(Side::Right)));

        let err = state
            .transition(Command::FollowupCorrect(Side::Left), 0)
            .unwrap_err();
        assert_eq!(err.reason, "the other team holds the claim");
        assert_eq!(
            err.phase,
            GamePhase::Followup(FollowupStage::Active(Some(Side::Right)))
        );
    }

    #[test]
    fn followup_timeout_from_claimed_phase_clears_claim() {
        let mut state = open_followup();
        apply(&mut state, Command::FollowupIncorrect(Side::Left));
        assert!(state.question_timer.running);

        apply(&mut state, Command::FollowupTimeout);

        assert_eq!(state.phase, GamePhase::Followup(FollowupStage::Review));
        assert_eq!(state.claim_owner, None);
        assert!(!state.question_timer.running);
    }

    #[test]
    fn followup_no_answer_from_review_goes_to_answer() {
        let mut state = open_followup();
        apply(&mut state, Command::FollowupTimeout);
        apply(&mut state, Command::FollowupNoAnswer);

        assert_eq!(state.phase, GamePhase::Answer(AnswerStage::Eligible));
        assert_eq!(state.post_answer_target, PostAnswerTarget::RoundStandby);
        assert_eq!(state.question.display_mode, DisplayMode::AnswerHidden);
        assert!(state.reveal_eligible);
        assert_eq!(state.team(Side::Left).score, 0);
        assert_eq!(state.team(Side::Right).score, 0);
    }

    #[test]
    fn followup_no_answer_waits_for_pending_claim() {
        let mut state = open_followup();
        apply(&mut state, Command::Claim(Side::Left));
        assert!(state.transition(Command::FollowupNoAnswer, 0).is_err());
    }

    #[test]
    fn switch_claim_flips_unconditionally() {
        let mut state = open_followup();
        apply(&mut state, Command::FollowupIncorrect(Side::Left));
        // Left already missed; the override still hands the claim back.
        apply(&mut state, Command::SwitchClaim);

        assert_eq!(
            state.phase,
            GamePhase::Followup(FollowupStage::Active(Some(Side::Left)))
        );
        assert_eq!(state.claim_owner, Some(Side::Left));
    }

    #[test]
    fn switch_claim_needs_claimed_followup() {
        let mut state = open_followup();
        assert!(state.transition(Command::SwitchClaim, 0).is_err());
    }

    #[test]
    fn manual_claim_keeps_followup_tag_in_step() {
        let mut state = open_followup();
        apply(&mut state, Command::SetClaim(Some(Side::Right)));
        assert_eq!(
            state.phase,
            GamePhase::Followup(FollowupStage::Active(Some(Side::Right)))
        );
        apply(&mut state, Command::SetClaim(None));
        assert_eq!(state.phase, GamePhase::Followup(FollowupStage::Active(None)));
    }

    #[test]
    fn reveal_hold_gates_on_elapsed_time() {
        let mut state = running_tossup();
        apply(&mut state, Command::TossupTimeout);
        apply(&mut state, Command::TossupNoAnswer);

        state.transition(Command::RevealHoldStart, 10_000).unwrap();
        assert_eq!(state.reveal_hold.started_at_ms(), Some(10_000));

        let err = state
            .transition(Command::RevealHoldComplete, 10_999)
            .unwrap_err();
        assert_eq!(err.reason, "reveal hold has not matured");

        state.transition(Command::RevealHoldComplete, 11_000).unwrap();
        assert_eq!(state.phase, GamePhase::Answer(AnswerStage::Revealed));
        assert_eq!(state.question.display_mode, DisplayMode::AnswerRevealed);
        assert_eq!(state.reveal_hold.started_at_ms(), None);
    }

    #[test]
    fn reveal_hold_start_requires_eligible_answer() {
        let mut state = running_tossup();
        assert!(state.transition(Command::RevealHoldStart, 5).is_err());
    }

    #[test]
    fn question_timer_expiry_moves_to_review() {
        let mut state = running_tossup();
        apply(&mut state, Command::Claim(Side::Left));
        state.consume_seconds(45);

        assert_eq!(state.phase, GamePhase::Tossup(TossupStage::Review));
        assert_eq!(state.claim_owner, None);
        assert!(!state.question_timer.running);
        assert_eq!(state.round_timer.seconds_remaining, 555);
    }

    #[test]
    fn followup_expiry_clears_claim() {
        let mut state = open_followup();
        apply(&mut state, Command::FollowupIncorrect(Side::Left));
        state.consume_seconds(500);

        assert_eq!(state.phase, GamePhase::Followup(FollowupStage::Review));
        assert_eq!(state.claim_owner, None);
    }

    #[test]
    fn pausing_round_pauses_question_and_resume_does_not() {
        let mut state = running_tossup();
        apply(&mut state, Command::ToggleRound);
        assert!(!state.question_timer.running);
        assert_eq!(state.phase, GamePhase::Tossup(TossupStage::Active));

        apply(&mut state, Command::ToggleRound);
        assert!(state.round_timer.running);
        assert!(!state.question_timer.running);
    }

    #[test]
    fn handoff_during_paused_round_keeps_question_stopped() {
        let mut state = open_followup();
        apply(&mut state, Command::ToggleRound);
        apply(&mut state, Command::FollowupIncorrect(Side::Left));

        assert_eq!(
            state.phase,
            GamePhase::Followup(FollowupStage::Active(Some(Side::Right)))
        );
        assert!(!state.question_timer.running);
    }

    #[test]
    fn toggle_question_pause_requires_time_left() {
        let mut state = GameState::new(0);
        apply(&mut state, Command::ToggleRound);
        assert!(state.transition(Command::ToggleQuestionPause, 0).is_err());

        apply(&mut state, Command::Next);
        apply(&mut state, Command::ToggleQuestionPause);
        assert!(!state.question_timer.running);
        apply(&mut state, Command::ToggleQuestionPause);
        assert!(state.question_timer.running);
    }

    #[test]
    fn override_next_from_tossup_jumps_to_answer() {
        let mut state = running_tossup();
        apply(&mut state, Command::OverrideNext);
        assert_eq!(state.phase, GamePhase::Answer(AnswerStage::Eligible));
        assert_eq!(state.post_answer_target, PostAnswerTarget::FollowupStandby);

        apply(&mut state, Command::OverrideNext);
        assert_eq!(state.phase, GamePhase::Answer(AnswerStage::Revealed));
    }

    #[test]
    fn override_next_from_idle_forces_start() {
        let mut state = GameState::new(0);
        apply(&mut state, Command::OverrideNext);

        assert!(state.started);
        assert!(state.round_timer.running);
        assert_eq!(state.phase, GamePhase::Tossup(TossupStage::Active));
        assert!(state.question_timer.running);
    }

    #[test]
    fn override_next_from_followup_review_targets_round() {
        let mut state = open_followup();
        apply(&mut state, Command::FollowupTimeout);
        apply(&mut state, Command::OverrideNext);

        assert_eq!(state.phase, GamePhase::Answer(AnswerStage::Eligible));
        assert_eq!(state.post_answer_target, PostAnswerTarget::RoundStandby);
    }

    #[test]
    fn advance_round_only_after_reveal() {
        let mut state = running_tossup();
        assert!(state.transition(Command::AdvanceRound, 0).is_err());

        apply(&mut state, Command::OverrideNext);
        apply(&mut state, Command::OverrideNext);
        apply(&mut state, Command::AdvanceRound);

        assert_eq!(state.current_round_index, 1);
        assert_eq!(state.question.index, 2);
        assert_eq!(state.phase, GamePhase::RoundStandby);
        assert!(!state.reveal_eligible);
    }

    #[test]
    fn jump_round_lands_by_timer_state() {
        let mut state = GameState::new(0);
        apply(&mut state, Command::JumpRound(4));
        assert_eq!(state.phase, GamePhase::PregameReady);
        assert_eq!(state.question.index, 5);
        assert_eq!(state.question.prompt, PROMPT_AWAITING_START);

        apply(&mut state, Command::ToggleRound);
        apply(&mut state, Command::JumpRound(2));
        assert_eq!(state.phase, GamePhase::RoundStandby);
        assert_eq!(state.current_round_index, 2);

        apply(&mut state, Command::ToggleRound);
        apply(&mut state, Command::JumpRound(7));
        assert_eq!(state.phase, GamePhase::RoundPaused);
        assert_eq!(state.question.prompt, PROMPT_AWAITING_NEXT);
    }

    #[test]
    fn question_reset_returns_to_standby() {
        let mut state = running_tossup();
        apply(&mut state, Command::Claim(Side::Right));
        apply(&mut state, Command::ResetQuestion);

        assert_eq!(state.phase, GamePhase::RoundStandby);
        assert_eq!(state.claim_owner, None);
        assert_eq!(state.question_timer.seconds_remaining, 0);
        assert!(!state.question_timer.running);
    }

    #[test]
    fn set_content_resets_display_mode() {
        let mut state = running_tossup();
        apply(&mut state, Command::OverrideNext);
        apply(
            &mut state,
            Command::SetContent(QuestionContent {
                prompt: "What is 2 + 2?".into(),
                answer: "4".into(),
                solution: String::new(),
            }),
        );
        assert_eq!(state.question.prompt, "What is 2 + 2?");
        assert_eq!(state.question.display_mode, DisplayMode::Prompt);
    }

    #[test]
    fn decrement_stops_at_zero() {
        let mut state = GameState::new(0);
        apply(&mut state, Command::DecrementScore(Side::Left));
        assert_eq!(state.team(Side::Left).score, 0);
        apply(&mut state, Command::IncrementScore(Side::Left));
        apply(&mut state, Command::DecrementScore(Side::Left));
        apply(&mut state, Command::DecrementScore(Side::Left));
        assert_eq!(state.team(Side::Left).score, 0);
    }
}
