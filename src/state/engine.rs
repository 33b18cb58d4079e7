//! Single-owner actor holding the only live [`GameState`].

use std::sync::Arc;

use tokio::{
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
};
use tracing::info;

use crate::{
    error::ServiceError,
    state::{
        clock::Clock,
        game::GameState,
        reducer::{Command, reduce},
    },
};

enum EngineRequest {
    Apply {
        command: Command,
        reply: Option<oneshot::Sender<GameState>>,
    },
    Snapshot {
        reply: oneshot::Sender<GameState>,
    },
}

/// Cloneable handle to the engine actor. Commands are processed strictly in
/// arrival order; the state itself is never shared.
#[derive(Clone)]
pub struct EngineHandle {
    requests: mpsc::Sender<EngineRequest>,
    published: broadcast::Sender<Arc<GameState>>,
}

impl EngineHandle {
    /// Spawn the actor task on the current runtime.
    pub fn spawn(
        initial: GameState,
        clock: Arc<dyn Clock>,
        command_buffer: usize,
        publish_capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (requests, receiver) = mpsc::channel(command_buffer.max(1));
        let (published, _) = broadcast::channel(publish_capacity.max(1));

        let task = tokio::spawn(run_engine(initial, clock, receiver, published.clone()));
        (
            Self {
                requests,
                published,
            },
            task,
        )
    }

    /// Apply a command and wait for the resulting state.
    pub async fn apply(&self, command: Command) -> Result<GameState, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(EngineRequest::Apply {
            command,
            reply: Some(reply),
        })
        .await?;
        response.await.map_err(|_| ServiceError::EngineUnavailable)
    }

    /// Queue a command without waiting for it to be processed.
    pub async fn dispatch(&self, command: Command) -> Result<(), ServiceError> {
        self.send(EngineRequest::Apply {
            command,
            reply: None,
        })
        .await
    }

    /// Current state as seen after every previously queued command.
    pub async fn snapshot(&self) -> Result<GameState, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(EngineRequest::Snapshot { reply }).await?;
        response.await.map_err(|_| ServiceError::EngineUnavailable)
    }

    /// Receive every state that differs from its predecessor.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<GameState>> {
        self.published.subscribe()
    }

    /// Whether the actor task has stopped accepting requests.
    pub fn is_closed(&self) -> bool {
        self.requests.is_closed()
    }

    async fn send(&self, request: EngineRequest) -> Result<(), ServiceError> {
        self.requests
            .send(request)
            .await
            .map_err(|_| ServiceError::EngineUnavailable)
    }
}

async fn run_engine(
    mut state: GameState,
    clock: Arc<dyn Clock>,
    mut requests: mpsc::Receiver<EngineRequest>,
    published: broadcast::Sender<Arc<GameState>>,
) {
    info!(phase = %state.phase, "engine started");

    while let Some(request) = requests.recv().await {
        match request {
            EngineRequest::Apply { command, reply } => {
                let name = command.name();
                let next = reduce(&state, command, clock.now_ms());

                if next.phase != state.phase {
                    info!(command = name, from = %state.phase, to = %next.phase, "phase changed");
                }
                if changed(&state, &next) {
                    // No subscribers is fine; the state is still kept.
                    let _ = published.send(Arc::new(next.clone()));
                }
                state = next;

                if let Some(reply) = reply {
                    let _ = reply.send(state.clone());
                }
            }
            EngineRequest::Snapshot { reply } => {
                let _ = reply.send(state.clone());
            }
        }
    }

    info!("engine request channel closed, engine stopped");
}

/// True when anything besides the tick anchor differs.
fn changed(before: &GameState, after: &GameState) -> bool {
    if before.last_updated_ms == after.last_updated_ms {
        return before != after;
    }
    let mut rebased = after.clone();
    rebased.last_updated_ms = before.last_updated_ms;
    rebased != *before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        clock::ManualClock,
        game::Side,
        state_machine::{GamePhase, TossupStage},
    };
    use tokio::sync::broadcast::error::TryRecvError;

    fn spawn_engine(clock: Arc<ManualClock>) -> (EngineHandle, JoinHandle<()>) {
        let initial = GameState::new(clock.now_ms());
        EngineHandle::spawn(initial, clock, 8, 8)
    }

    #[tokio::test]
    async fn apply_returns_new_state() {
        let clock = Arc::new(ManualClock::new(1_000));
        let (engine, _task) = spawn_engine(clock);

        engine.apply(Command::ToggleRound).await.unwrap();
        let state = engine.apply(Command::Next).await.unwrap();

        assert_eq!(state.phase, GamePhase::Tossup(TossupStage::Active));
        assert_eq!(engine.snapshot().await.unwrap(), state);
    }

    #[tokio::test]
    async fn dispatched_commands_keep_order() {
        let clock = Arc::new(ManualClock::new(0));
        let (engine, _task) = spawn_engine(clock);

        engine.dispatch(Command::IncrementScore(Side::Left)).await.unwrap();
        engine.dispatch(Command::IncrementScore(Side::Left)).await.unwrap();
        engine.dispatch(Command::DecrementScore(Side::Left)).await.unwrap();

        let state = engine.snapshot().await.unwrap();
        assert_eq!(state.team(Side::Left).score, 1);
    }

    #[tokio::test]
    async fn ticks_use_engine_clock() {
        let clock = Arc::new(ManualClock::new(0));
        let (engine, _task) = spawn_engine(clock.clone());

        engine.apply(Command::ToggleRound).await.unwrap();
        clock.advance(2_500);
        let state = engine
            .apply(Command::ClockTick { now_ms: None })
            .await
            .unwrap();

        assert_eq!(
            state.round_timer.seconds_remaining,
            state.round_timer.duration_seconds - 2
        );
        assert_eq!(state.last_updated_ms, 2_000);
    }

    #[tokio::test]
    async fn publishes_only_changes() {
        let clock = Arc::new(ManualClock::new(0));
        let (engine, _task) = spawn_engine(clock.clone());
        let mut updates = engine.subscribe();

        engine.apply(Command::ToggleRound).await.unwrap();
        let published = updates.recv().await.unwrap();
        assert_eq!(published.phase, GamePhase::RoundStandby);

        clock.advance(300);
        engine
            .apply(Command::ClockTick { now_ms: None })
            .await
            .unwrap();
        // Ignored command: only the anchor moves.
        engine.apply(Command::SwitchClaim).await.unwrap();
        assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));

        clock.advance(1_000);
        engine
            .apply(Command::ClockTick { now_ms: None })
            .await
            .unwrap();
        let published = updates.recv().await.unwrap();
        assert_eq!(
            published.round_timer.seconds_remaining,
            published.round_timer.duration_seconds - 1
        );
    }

    #[tokio::test]
    async fn stopped_engine_reports_unavailable() {
        let clock = Arc::new(ManualClock::new(0));
        let (engine, task) = spawn_engine(clock);

        task.abort();
        let _ = task.await;

        assert!(engine.is_closed());
        assert!(matches!(
            engine.snapshot().await,
            Err(ServiceError::EngineUnavailable)
        ));
    }
}
