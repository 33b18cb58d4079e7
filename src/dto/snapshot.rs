//! Full state snapshot pushed to every display surface.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{command::ClaimOwnerDto, phase::VisibleGamePhase},
    state::{
        game::{
            DisplayMode, Eligibility, GameState, PerSide, PostAnswerTarget, PregameConfig,
            QuestionKind, QuestionState, Side,
        },
        timer::TimerState,
    },
};

/// Complete game state as seen by clients. No partial updates are ever sent.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSnapshot {
    /// Phase tag such as `idle`, `tossup:review` or `followup:active-claimed-right`.
    #[schema(value_type = String)]
    pub phase: VisibleGamePhase,
    /// Whether a projection display is currently considered open.
    pub projection_open: bool,
    pub testing_mode: bool,
    pub left_team: TeamSnapshot,
    pub right_team: TeamSnapshot,
    pub config: ConfigSnapshot,
    pub round_timer: TimerSnapshot,
    pub question_timer: TimerSnapshot,
    pub question: QuestionSnapshot,
    pub eligibility: EligibilitySnapshot,
    pub question_kind: QuestionKindDto,
    pub claim_owner: ClaimOwnerDto,
    pub current_round_index: u32,
    pub reveal_eligible: bool,
    pub started: bool,
    pub reveal_hold_started_at_ms: Option<u64>,
    pub post_answer_target: PostAnswerTargetDto,
    /// Tick accumulator anchor, in monotonic milliseconds.
    pub last_updated_ms: u64,
    pub session_started_at_ms: u64,
}

impl GameStateSnapshot {
    pub fn from_state(state: &GameState, projection_open: bool) -> Self {
        Self {
            phase: VisibleGamePhase::from(&state.phase),
            projection_open,
            testing_mode: state.testing_mode,
            left_team: TeamSnapshot::from_state(state, Side::Left),
            right_team: TeamSnapshot::from_state(state, Side::Right),
            config: state.config.into(),
            round_timer: state.round_timer.into(),
            question_timer: state.question_timer.into(),
            question: (&state.question).into(),
            eligibility: state.eligibility.into(),
            question_kind: state.question_kind.into(),
            claim_owner: state.claim_owner.into(),
            current_round_index: state.current_round_index,
            reveal_eligible: state.reveal_eligible,
            started: state.started,
            reveal_hold_started_at_ms: state.reveal_hold.started_at_ms(),
            post_answer_target: state.post_answer_target.into(),
            last_updated_ms: state.last_updated_ms,
            session_started_at_ms: state.session_started_at_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamSnapshot {
    pub name: String,
    pub score: u32,
    pub has_claim: bool,
}

impl TeamSnapshot {
    fn from_state(state: &GameState, side: Side) -> Self {
        let team = state.team(side);
        Self {
            name: team.name.clone(),
            score: team.score,
            has_claim: state.has_claim(side),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    pub round_length_seconds: u32,
    pub tossup_length_seconds: u32,
    pub followup_length_seconds: u32,
    pub warning_threshold_seconds: u32,
}

impl From<PregameConfig> for ConfigSnapshot {
    fn from(value: PregameConfig) -> Self {
        Self {
            round_length_seconds: value.round_length_seconds,
            tossup_length_seconds: value.tossup_length_seconds,
            followup_length_seconds: value.followup_length_seconds,
            warning_threshold_seconds: value.warning_threshold_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub running: bool,
    pub seconds_remaining: u32,
    pub duration_seconds: u32,
    pub warning_at_seconds: u32,
    /// True while some time is left but no more than `warningAtSeconds`.
    pub warning: bool,
}

impl From<TimerState> for TimerSnapshot {
    fn from(value: TimerState) -> Self {
        Self {
            running: value.running,
            seconds_remaining: value.seconds_remaining,
            duration_seconds: value.duration_seconds,
            warning_at_seconds: value.warning_at_seconds,
            warning: value.in_warning(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSnapshot {
    pub index: u32,
    pub prompt: String,
    pub answer: String,
    pub solution: String,
    pub display_mode: DisplayModeDto,
}

impl From<&QuestionState> for QuestionSnapshot {
    fn from(value: &QuestionState) -> Self {
        Self {
            index: value.index,
            prompt: value.prompt.clone(),
            answer: value.answer.clone(),
            solution: value.solution.clone(),
            display_mode: value.display_mode.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayModeDto {
    Prompt,
    AnswerHidden,
    AnswerRevealed,
    SolutionRevealed,
}

impl From<DisplayMode> for DisplayModeDto {
    fn from(value: DisplayMode) -> Self {
        match value {
            DisplayMode::Prompt => DisplayModeDto::Prompt,
            DisplayMode::AnswerHidden => DisplayModeDto::AnswerHidden,
            DisplayMode::AnswerRevealed => DisplayModeDto::AnswerRevealed,
            DisplayMode::SolutionRevealed => DisplayModeDto::SolutionRevealed,
        }
    }
}

/// Per-side flags keyed `left` / `right`.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct SideFlags {
    pub left: bool,
    pub right: bool,
}

impl From<PerSide<bool>> for SideFlags {
    fn from(value: PerSide<bool>) -> Self {
        Self {
            left: value.left,
            right: value.right,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EligibilitySnapshot {
    pub tossup_attempted: SideFlags,
    pub followup_attempted: SideFlags,
}

impl From<Eligibility> for EligibilitySnapshot {
    fn from(value: Eligibility) -> Self {
        Self {
            tossup_attempted: value.tossup_attempted.into(),
            followup_attempted: value.followup_attempted.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKindDto {
    Tossup,
    Followup,
}

impl From<QuestionKind> for QuestionKindDto {
    fn from(value: QuestionKind) -> Self {
        match value {
            QuestionKind::Tossup => QuestionKindDto::Tossup,
            QuestionKind::Followup => QuestionKindDto::Followup,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PostAnswerTargetDto {
    None,
    FollowupStandby,
    RoundStandby,
}

impl From<PostAnswerTarget> for PostAnswerTargetDto {
    fn from(value: PostAnswerTarget) -> Self {
        match value {
            PostAnswerTarget::None => PostAnswerTargetDto::None,
            PostAnswerTarget::FollowupStandby => PostAnswerTargetDto::FollowupStandby,
            PostAnswerTarget::RoundStandby => PostAnswerTargetDto::RoundStandby,
        }
    }
}
