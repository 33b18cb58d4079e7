//! Process-wide state: the game engine and the display fan-out.

pub mod clock;
pub mod engine;
pub mod game;
pub mod hold;
pub mod reducer;
mod sse;
pub mod state_machine;
pub mod timer;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::SystemTime,
};

use tokio::task::JoinHandle;

use crate::{config::AppConfig, state::clock::Clock};

pub use self::engine::EngineHandle;
pub use self::sse::SseHub;
use self::sse::SseState;

/// State handed to every axum handler.
pub type SharedState = Arc<AppState>;

/// Central application state: the engine handle plus the display fan-out.
pub struct AppState {
    engine: EngineHandle,
    sse: SseState,
    projection_open: AtomicBool,
    started_at: SystemTime,
}

impl AppState {
    /// Spawn the engine actor seeded from `config` and wrap everything in an [`Arc`].
    ///
    /// The returned handle resolves when the engine task stops.
    pub fn start(config: AppConfig, clock: Arc<dyn Clock>) -> (SharedState, JoinHandle<()>) {
        let initial = config.initial_state(clock.now_ms());
        let (engine, task) = EngineHandle::spawn(
            initial,
            clock,
            config.command_buffer(),
            config.sse_capacity(),
        );

        let state = Arc::new(Self {
            engine,
            sse: SseState::new(config.sse_capacity()),
            projection_open: AtomicBool::new(false),
            started_at: SystemTime::now(),
        });
        (state, task)
    }

    /// Handle to the single-owner game engine.
    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    /// Broadcast hub used for the console SSE stream and console sockets.
    pub fn console_sse(&self) -> &SseHub {
        self.sse.console()
    }

    /// Broadcast hub used for the projection SSE stream.
    pub fn projection_sse(&self) -> &SseHub {
        self.sse.projection()
    }

    /// Whether a projection display reported itself open.
    pub fn projection_open(&self) -> bool {
        self.projection_open.load(Ordering::SeqCst)
    }

    /// Store the projection flag, returning the previous value.
    pub fn set_projection_open(&self, open: bool) -> bool {
        self.projection_open.swap(open, Ordering::SeqCst)
    }

    /// Whether the engine has stopped accepting commands.
    pub fn is_degraded(&self) -> bool {
        self.engine.is_closed()
    }

    /// Wall-clock time the process started serving.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }
}
