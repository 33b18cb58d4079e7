//! Inbound commands accepted over HTTP and the console socket.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::validate_team_name,
    state::{
        game::{QuestionContent, Setup, Side},
        reducer::{Command, ProjectionAction},
    },
};

/// Longest accepted duration for any timer, in seconds.
pub const MAX_DURATION_SECONDS: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
/// Seating position of a team.
pub enum SideDto {
    Left,
    Right,
}

impl From<SideDto> for Side {
    fn from(value: SideDto) -> Self {
        match value {
            SideDto::Left => Side::Left,
            SideDto::Right => Side::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
/// Team holding the claim, or `none`.
pub enum ClaimOwnerDto {
    Left,
    Right,
    None,
}

impl From<ClaimOwnerDto> for Option<Side> {
    fn from(value: ClaimOwnerDto) -> Self {
        match value {
            ClaimOwnerDto::Left => Some(Side::Left),
            ClaimOwnerDto::Right => Some(Side::Right),
            ClaimOwnerDto::None => None,
        }
    }
}

impl From<Option<Side>> for ClaimOwnerDto {
    fn from(value: Option<Side>) -> Self {
        match value {
            Some(Side::Left) => ClaimOwnerDto::Left,
            Some(Side::Right) => ClaimOwnerDto::Right,
            None => ClaimOwnerDto::None,
        }
    }
}

/// Pre-game setup. Empty names and missing durations keep the current values;
/// negative durations count as zero.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetupPayload {
    #[serde(default)]
    #[validate(custom(function = "validate_team_name"))]
    pub left_team_name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_team_name"))]
    pub right_team_name: String,
    #[serde(default)]
    #[validate(range(max = MAX_DURATION_SECONDS))]
    pub round_length_seconds: Option<i64>,
    #[serde(default)]
    #[validate(range(max = MAX_DURATION_SECONDS))]
    pub tossup_length_seconds: Option<i64>,
    #[serde(default)]
    #[validate(range(max = MAX_DURATION_SECONDS))]
    pub followup_length_seconds: Option<i64>,
    #[serde(default)]
    #[validate(range(max = MAX_DURATION_SECONDS))]
    pub warning_threshold_seconds: Option<i64>,
}

impl From<SetupPayload> for Setup {
    fn from(value: SetupPayload) -> Self {
        Setup {
            left_team_name: value.left_team_name,
            right_team_name: value.right_team_name,
            round_length_seconds: value.round_length_seconds.map(clamp_seconds),
            tossup_length_seconds: value.tossup_length_seconds.map(clamp_seconds),
            followup_length_seconds: value.followup_length_seconds.map(clamp_seconds),
            warning_threshold_seconds: value.warning_threshold_seconds.map(clamp_seconds),
        }
    }
}

/// Question text supplied by the round loader.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ContentPayload {
    pub prompt: String,
    pub answer: String,
    #[serde(default)]
    pub solution: Option<String>,
}

impl From<ContentPayload> for QuestionContent {
    fn from(value: ContentPayload) -> Self {
        QuestionContent {
            prompt: value.prompt,
            answer: value.answer,
            solution: value.solution.unwrap_or_default(),
        }
    }
}

/// Tagged command as sent by the console, e.g. `{"type": "flow:tossup-correct", "side": "left"}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum CommandRequest {
    #[serde(rename = "setup:apply")]
    ApplySetup { payload: SetupPayload },
    #[serde(rename = "testing-mode:set")]
    SetTestingMode { enabled: bool },
    #[serde(rename = "round:toggle")]
    ToggleRound,
    #[serde(rename = "game:reset")]
    ResetGame,
    #[serde(rename = "question:toggle-pause")]
    ToggleQuestionPause,
    #[serde(rename = "question:reset")]
    ResetQuestion,
    #[serde(rename = "score:increment")]
    IncrementScore { side: SideDto },
    #[serde(rename = "score:decrement")]
    DecrementScore { side: SideDto },
    #[serde(rename = "claim:manual-set")]
    SetClaim { side: ClaimOwnerDto },
    #[serde(rename = "question:set-content")]
    SetContent { payload: ContentPayload },
    #[serde(rename = "flow:next")]
    Next,
    #[serde(rename = "flow:override-next")]
    OverrideNext,
    #[serde(rename = "flow:claim-left")]
    ClaimLeft,
    #[serde(rename = "flow:claim-right")]
    ClaimRight,
    #[serde(rename = "flow:tossup-correct")]
    TossupCorrect { side: SideDto },
    #[serde(rename = "flow:tossup-incorrect")]
    TossupIncorrect { side: SideDto },
    #[serde(rename = "flow:tossup-timeout")]
    TossupTimeout,
    #[serde(rename = "flow:tossup-no-answer")]
    TossupNoAnswer,
    #[serde(rename = "flow:followup-timeout")]
    FollowupTimeout,
    #[serde(rename = "flow:followup-correct")]
    FollowupCorrect { side: SideDto },
    #[serde(rename = "flow:followup-incorrect")]
    FollowupIncorrect { side: SideDto },
    #[serde(rename = "flow:followup-no-answer")]
    FollowupNoAnswer,
    #[serde(rename = "flow:switch-claim")]
    SwitchClaim,
    #[serde(rename = "flow:reveal-hold-start")]
    RevealHoldStart,
    #[serde(rename = "flow:reveal-hold-cancel")]
    RevealHoldCancel,
    #[serde(rename = "flow:reveal-hold-complete")]
    RevealHoldComplete,
    #[serde(rename = "flow:advance-round")]
    AdvanceRound,
    #[serde(rename = "flow:jump-round")]
    JumpRound {
        /// Negative values are treated as zero.
        #[serde(rename = "roundIndex")]
        round_index: i64,
    },
    #[serde(rename = "projection:open")]
    ProjectionOpen,
    #[serde(rename = "projection:refresh")]
    ProjectionRefresh,
    #[serde(rename = "projection:reopen")]
    ProjectionReopen,
    #[serde(rename = "projection:close")]
    ProjectionClose,
    #[serde(rename = "clock:tick")]
    ClockTick {
        #[serde(rename = "nowMs", default)]
        now_ms: Option<u64>,
    },
}

impl CommandRequest {
    /// Parse and validate a raw JSON command.
    pub fn from_json_str(raw: &str) -> Result<Self, CommandParseError> {
        let request: Self = serde_json::from_str(raw)?;
        request.validate()?;
        Ok(request)
    }
}

impl Validate for CommandRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            CommandRequest::ApplySetup { payload } => payload.validate(),
            _ => Ok(()),
        }
    }
}

/// Failure to turn a raw frame into a command.
#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("malformed command: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationErrors),
}

impl From<CommandRequest> for Command {
    fn from(value: CommandRequest) -> Self {
        match value {
            CommandRequest::ApplySetup { payload } => Command::ApplySetup(payload.into()),
            CommandRequest::SetTestingMode { enabled } => Command::SetTestingMode(enabled),
            CommandRequest::ToggleRound => Command::ToggleRound,
            CommandRequest::ResetGame => Command::ResetGame,
            CommandRequest::ToggleQuestionPause => Command::ToggleQuestionPause,
            CommandRequest::ResetQuestion => Command::ResetQuestion,
            CommandRequest::IncrementScore { side } => Command::IncrementScore(side.into()),
            CommandRequest::DecrementScore { side } => Command::DecrementScore(side.into()),
            CommandRequest::SetClaim { side } => Command::SetClaim(side.into()),
            CommandRequest::SetContent { payload } => Command::SetContent(payload.into()),
            CommandRequest::Next => Command::Next,
            CommandRequest::OverrideNext => Command::OverrideNext,
            CommandRequest::ClaimLeft => Command::Claim(Side::Left),
            CommandRequest::ClaimRight => Command::Claim(Side::Right),
            CommandRequest::TossupCorrect { side } => Command::TossupCorrect(side.into()),
            CommandRequest::TossupIncorrect { side } => Command::TossupIncorrect(side.into()),
            CommandRequest::TossupTimeout => Command::TossupTimeout,
            CommandRequest::TossupNoAnswer => Command::TossupNoAnswer,
            CommandRequest::FollowupTimeout => Command::FollowupTimeout,
            CommandRequest::FollowupCorrect { side } => Command::FollowupCorrect(side.into()),
            CommandRequest::FollowupIncorrect { side } => Command::FollowupIncorrect(side.into()),
            CommandRequest::FollowupNoAnswer => Command::FollowupNoAnswer,
            CommandRequest::SwitchClaim => Command::SwitchClaim,
            CommandRequest::RevealHoldStart => Command::RevealHoldStart,
            CommandRequest::RevealHoldCancel => Command::RevealHoldCancel,
            CommandRequest::RevealHoldComplete => Command::RevealHoldComplete,
            CommandRequest::AdvanceRound => Command::AdvanceRound,
            CommandRequest::JumpRound { round_index } => {
                Command::JumpRound(u32::try_from(round_index.max(0)).unwrap_or(u32::MAX))
            }
            CommandRequest::ProjectionOpen => Command::Projection(ProjectionAction::Open),
            CommandRequest::ProjectionRefresh => Command::Projection(ProjectionAction::Refresh),
            CommandRequest::ProjectionReopen => Command::Projection(ProjectionAction::Reopen),
            CommandRequest::ProjectionClose => Command::Projection(ProjectionAction::Close),
            CommandRequest::ClockTick { now_ms } => Command::ClockTick { now_ms },
        }
    }
}

fn clamp_seconds(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
