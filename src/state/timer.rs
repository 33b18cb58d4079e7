//! Countdown timers advanced only by explicit elapsed-second ticks.

/// Result of advancing a timer by some whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer was not running; nothing changed.
    Stopped,
    /// Time was consumed and some is left.
    Running,
    /// Time was consumed and the timer just reached zero.
    Expired,
}

/// A single countdown (round or question).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    /// Whether ticks consume time.
    pub running: bool,
    /// Whole seconds left on the clock.
    pub seconds_remaining: u32,
    /// Length the timer was last armed with.
    pub duration_seconds: u32,
    /// Threshold of the warning window.
    pub warning_at_seconds: u32,
}

impl TimerState {
    /// A timer that is not running, holding `seconds_remaining`.
    pub fn stopped(duration_seconds: u32, seconds_remaining: u32, warning_at_seconds: u32) -> Self {
        Self {
            running: false,
            seconds_remaining,
            duration_seconds,
            warning_at_seconds,
        }
    }

    /// Load a fresh duration and set the running flag.
    pub fn arm(&mut self, seconds: u32, running: bool) {
        self.duration_seconds = seconds;
        self.seconds_remaining = seconds;
        self.running = running;
    }

    /// Stop and reload `duration_seconds` while leaving zero on the clock.
    pub fn clear(&mut self, duration_seconds: u32) {
        self.running = false;
        self.duration_seconds = duration_seconds;
        self.seconds_remaining = 0;
    }

    /// Stop counting, keeping the remaining time.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Whether any time is left on the clock.
    pub fn has_time_left(&self) -> bool {
        self.seconds_remaining > 0
    }

    /// True while the remaining time sits inside the warning window.
    pub fn in_warning(&self) -> bool {
        self.has_time_left() && self.seconds_remaining <= self.warning_at_seconds
    }

    /// Consume `elapsed_seconds`, clamping at zero. The running flag is left alone.
    pub fn tick(&mut self, elapsed_seconds: u32) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(elapsed_seconds);
        if self.seconds_remaining == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running
        }
    }
}
