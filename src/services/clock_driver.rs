use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{info, warn};

use crate::state::{EngineHandle, clock::Clock, reducer::Command};

/// Feed `clock:tick` commands to the engine at a fixed period.
///
/// Missed periods are skipped rather than bursted; the engine accumulates
/// elapsed time itself so nothing is lost.
pub fn spawn_clock_driver(
    engine: EngineHandle,
    clock: Arc<dyn Clock>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_ms = period.as_millis() as u64, "clock driver started");

        loop {
            ticker.tick().await;
            let command = Command::ClockTick {
                now_ms: Some(clock.now_ms()),
            };
            if engine.dispatch(command).await.is_err() {
                warn!("engine stopped; clock driver exiting");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::state::{clock::ManualClock, game::GameState};

    #[tokio::test]
    async fn ticks_reach_the_engine() {
        let clock = Arc::new(ManualClock::new(0));
        let (engine, _task) =
            EngineHandle::spawn(GameState::new(0), clock.clone(), 8, 8);
        let mut updates = engine.subscribe();

        engine.apply(Command::ToggleRound).await.unwrap();
        updates.recv().await.unwrap();

        clock.set(3_000);
        let _driver = spawn_clock_driver(engine.clone(), clock, Duration::from_millis(10));

        let published = timeout(Duration::from_secs(2), updates.recv())
            .await
            .expect("tick published in time")
            .unwrap();
        assert_eq!(
            published.round_timer.seconds_remaining,
            published.round_timer.duration_seconds - 3
        );
    }

    #[tokio::test]
    async fn driver_stops_with_engine() {
        let clock = Arc::new(ManualClock::new(0));
        let (engine, task) = EngineHandle::spawn(GameState::new(0), clock.clone(), 8, 8);
        task.abort();
        let _ = task.await;

        let driver = spawn_clock_driver(engine, clock, Duration::from_millis(10));
        timeout(Duration::from_secs(2), driver)
            .await
            .expect("driver exits")
            .unwrap();
    }
}
