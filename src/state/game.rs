//! Data model for a single two-team quiz match.

use std::ops::{Index, IndexMut};

use crate::state::{hold::RevealHold, state_machine::GamePhase, timer::TimerState};

/// Default round length used before any setup has been applied.
pub const DEFAULT_ROUND_LENGTH_SECONDS: u32 = 15 * 60;
/// Default toss-up answering window.
pub const DEFAULT_TOSSUP_LENGTH_SECONDS: u32 = 45;
/// Default follow-up answering window.
pub const DEFAULT_FOLLOWUP_LENGTH_SECONDS: u32 = 120;
/// Default threshold under which timers are flagged as running out.
pub const DEFAULT_WARNING_THRESHOLD_SECONDS: u32 = 10;

/// Name shown for the left team until setup renames it.
pub const DEFAULT_LEFT_TEAM_NAME: &str = "LEFT TEAM";
/// Name shown for the right team until setup renames it.
pub const DEFAULT_RIGHT_TEAM_NAME: &str = "RIGHT TEAM";

pub(crate) const PROMPT_AWAITING_CONTENT: &str = "Awaiting question content";
pub(crate) const PROMPT_AWAITING_START: &str = "Awaiting game start";
pub(crate) const PROMPT_AWAITING_NEXT: &str = "Awaiting next phase";

/// One of the two competing teams, by seating position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Team seated on the left of the stage.
    Left,
    /// Team seated on the right of the stage.
    Right,
}

impl Side {
    /// The opposing side.
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A value held once per side, indexable by [`Side`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerSide<T> {
    /// Value for [`Side::Left`].
    pub left: T,
    /// Value for [`Side::Right`].
    pub right: T,
}

impl<T> PerSide<T> {
    /// Pair the two values, left first.
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }
}

impl<T> Index<Side> for PerSide<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

impl<T> IndexMut<Side> for PerSide<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Name and running score of a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Display name, trimmed and never empty.
    pub name: String,
    /// Points scored so far; never negative.
    pub score: u32,
}

impl Team {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            score: 0,
        }
    }
}

/// Durations fixed before the first round starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PregameConfig {
    /// Length of the round timer.
    pub round_length_seconds: u32,
    /// Answering window of a toss-up.
    pub tossup_length_seconds: u32,
    /// Answering window of a follow-up.
    pub followup_length_seconds: u32,
    /// Remaining time at or below which a timer is in warning.
    pub warning_threshold_seconds: u32,
}

impl Default for PregameConfig {
    fn default() -> Self {
        Self {
            round_length_seconds: DEFAULT_ROUND_LENGTH_SECONDS,
            tossup_length_seconds: DEFAULT_TOSSUP_LENGTH_SECONDS,
            followup_length_seconds: DEFAULT_FOLLOWUP_LENGTH_SECONDS,
            warning_threshold_seconds: DEFAULT_WARNING_THRESHOLD_SECONDS,
        }
    }
}

/// Payload of `setup:apply`, already clamped to non-negative durations.
///
/// Empty names and missing durations keep the values already in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Setup {
    /// New left team name; blank keeps the current one.
    pub left_team_name: String,
    /// New right team name; blank keeps the current one.
    pub right_team_name: String,
    /// New round length, if supplied.
    pub round_length_seconds: Option<u32>,
    /// New toss-up window, if supplied.
    pub tossup_length_seconds: Option<u32>,
    /// New follow-up window, if supplied.
    pub followup_length_seconds: Option<u32>,
    /// New warning threshold, if supplied.
    pub warning_threshold_seconds: Option<u32>,
}

impl Setup {
    /// Durations of `current` with every supplied value substituted.
    pub fn config_over(&self, current: PregameConfig) -> PregameConfig {
        PregameConfig {
            round_length_seconds: self
                .round_length_seconds
                .unwrap_or(current.round_length_seconds),
            tossup_length_seconds: self
                .tossup_length_seconds
                .unwrap_or(current.tossup_length_seconds),
            followup_length_seconds: self
                .followup_length_seconds
                .unwrap_or(current.followup_length_seconds),
            warning_threshold_seconds: self
                .warning_threshold_seconds
                .unwrap_or(current.warning_threshold_seconds),
        }
    }
}

/// What the displays are allowed to show for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Only the question prompt.
    Prompt,
    /// Prompt with the answer slot shown but empty.
    AnswerHidden,
    /// Prompt and answer.
    AnswerRevealed,
    /// Prompt, answer and worked solution.
    SolutionRevealed,
}

/// Question text pushed by the round loader; opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionContent {
    /// Question text.
    pub prompt: String,
    /// Short answer.
    pub answer: String,
    /// Optional worked solution; empty when absent.
    pub solution: String,
}

/// The question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionState {
    /// One-based question number, always `current_round_index + 1` after a round change.
    pub index: u32,
    /// Question text, or a placeholder while no content is loaded.
    pub prompt: String,
    /// Short answer.
    pub answer: String,
    /// Worked solution.
    pub solution: String,
    /// How much of the question the displays may show.
    pub display_mode: DisplayMode,
}

impl QuestionState {
    pub(crate) fn set_content(&mut self, content: QuestionContent) {
        self.prompt = content.prompt;
        self.answer = content.answer;
        self.solution = content.solution;
        self.display_mode = DisplayMode::Prompt;
    }

    pub(crate) fn clear(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
        self.answer.clear();
        self.solution.clear();
        self.display_mode = DisplayMode::Prompt;
    }
}

/// Per-side "already answered wrong" markers for the current cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Eligibility {
    /// Sides that already answered the toss-up wrong.
    pub tossup_attempted: PerSide<bool>,
    /// Sides that already answered the follow-up wrong.
    pub followup_attempted: PerSide<bool>,
}

impl Eligibility {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Which of the two questions of a round is in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// Open question, either side may claim.
    Tossup,
    /// Bonus question after a toss-up.
    Followup,
}

/// Where the next advance goes once the revealed answer has been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAnswerTarget {
    /// No answer pending; advancing is decided by the phase alone.
    None,
    /// Arm the follow-up next.
    FollowupStandby,
    /// Close the round and move on.
    RoundStandby,
}

/// Complete match state. Every command produces a fresh value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    /// Current position in the match flow.
    pub phase: GamePhase,
    /// Both teams, by side.
    pub teams: PerSide<Team>,
    /// Durations applied by the last setup.
    pub config: PregameConfig,
    /// Countdown of the whole round.
    pub round_timer: TimerState,
    /// Countdown of the question in play.
    pub question_timer: TimerState,
    /// Question currently on screen.
    pub question: QuestionState,
    /// Wrong-answer markers of the current cycle.
    pub eligibility: Eligibility,
    /// Toss-up or follow-up.
    pub question_kind: QuestionKind,
    /// Team currently holding the claim. `has_claim` per team is derived from it.
    pub claim_owner: Option<Side>,
    /// Zero-based index relative to the external round loader.
    pub current_round_index: u32,
    /// Whether the answer may be revealed with a hold.
    pub reveal_eligible: bool,
    /// Set by the first round start, cleared by a reset.
    pub started: bool,
    /// Informational flag for the console.
    pub testing_mode: bool,
    /// Pending reveal confirmation.
    pub reveal_hold: RevealHold,
    /// Where advancing goes after the revealed answer.
    pub post_answer_target: PostAnswerTarget,
    /// Monotonic anchor used by the tick accumulator only.
    pub last_updated_ms: u64,
    /// Monotonic time at which this state was first created.
    pub session_started_at_ms: u64,
}

impl GameState {
    /// Fresh state with the built-in defaults.
    pub fn new(seed_now_ms: u64) -> Self {
        Self::with_defaults(
            PregameConfig::default(),
            DEFAULT_LEFT_TEAM_NAME,
            DEFAULT_RIGHT_TEAM_NAME,
            seed_now_ms,
        )
    }

    /// Fresh state seeded from configured defaults. Both timers are stopped.
    pub fn with_defaults(
        config: PregameConfig,
        left_team_name: &str,
        right_team_name: &str,
        seed_now_ms: u64,
    ) -> Self {
        Self {
            phase: GamePhase::Idle,
            teams: PerSide::new(Team::named(left_team_name), Team::named(right_team_name)),
            config,
            round_timer: TimerState::stopped(
                config.round_length_seconds,
                config.round_length_seconds,
                config.warning_threshold_seconds,
            ),
            question_timer: TimerState::stopped(
                config.tossup_length_seconds,
                0,
                config.warning_threshold_seconds,
            ),
            question: QuestionState {
                index: 1,
                prompt: PROMPT_AWAITING_CONTENT.to_string(),
                answer: String::new(),
                solution: String::new(),
                display_mode: DisplayMode::Prompt,
            },
            eligibility: Eligibility::default(),
            question_kind: QuestionKind::Tossup,
            claim_owner: None,
            current_round_index: 0,
            reveal_eligible: false,
            started: false,
            testing_mode: false,
            reveal_hold: RevealHold::default(),
            post_answer_target: PostAnswerTarget::None,
            last_updated_ms: seed_now_ms,
            session_started_at_ms: seed_now_ms,
        }
    }

    /// Team seated on `side`.
    pub fn team(&self, side: Side) -> &Team {
        &self.teams[side]
    }

    /// Whether `side` currently holds the claim.
    pub fn has_claim(&self, side: Side) -> bool {
        self.claim_owner == Some(side)
    }
}
