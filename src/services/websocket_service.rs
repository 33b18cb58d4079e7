use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use serde_json::value::RawValue;
use tokio::{
    sync::{broadcast::error::RecvError, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        sse::ServerEvent,
        ws::{CommandRejected, ConsoleFrame},
    },
    services::{command_service, sse_events},
    state::SharedState,
};

const EVENT_COMMAND_REJECTED: &str = "command.rejected";

/// Handle the full lifecycle of a moderator console WebSocket connection.
///
/// The client receives a snapshot on connect and every console event after
/// that; each inbound text frame is parsed as a command.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let connection_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    // Subscribe before reading the snapshot so no update slips in between.
    let mut events = state.console_sse().subscribe();
    match state.engine().snapshot().await {
        Ok(game) => {
            if let Some(event) = sse_events::state_sync_event(&state, &game) {
                send_event(&outbound_tx, &event);
            }
        }
        Err(err) => {
            warn!(%connection_id, error = %err, "console connected while engine is down");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    }

    info!(%connection_id, "console connected");

    let forward_tx = outbound_tx.clone();
    let forwarder = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if !send_event(&forward_tx, &event) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%connection_id, skipped, "console socket lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => handle_text(&state, &outbound_tx, text.as_str()).await,
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(%connection_id, error = %err, "websocket receive error");
                break;
            }
        }
    }

    forwarder.abort();
    info!(%connection_id, "console disconnected");
    finalize(writer_task, outbound_tx).await;
}

async fn handle_text(state: &SharedState, outbound_tx: &mpsc::UnboundedSender<Message>, text: &str) {
    let command = match command_service::parse_command(text) {
        Ok(command) => command,
        Err(err) => {
            warn!(error = %err, "rejected console frame");
            if let Ok(event) = ServerEvent::json(
                Some(EVENT_COMMAND_REJECTED.to_string()),
                &CommandRejected {
                    message: err.to_string(),
                },
            ) {
                send_event(outbound_tx, &event);
            }
            return;
        }
    };

    debug!(command = command.name(), "console command");
    if let Err(err) = command_service::dispatch(state, command).await {
        warn!(error = %err, "failed to dispatch console command");
    }
}

/// Wrap `event` in a console frame and queue it. Returns `false` once the writer is gone.
fn send_event(outbound_tx: &mpsc::UnboundedSender<Message>, event: &ServerEvent) -> bool {
    let Some(frame) = console_frame(event) else {
        return true;
    };
    outbound_tx.send(Message::Text(frame.into())).is_ok()
}

fn console_frame(event: &ServerEvent) -> Option<String> {
    let data = match RawValue::from_string(event.data.clone()) {
        Ok(data) => data,
        Err(err) => {
            warn!(error = %err, "event payload is not JSON");
            return None;
        }
    };
    let frame = ConsoleFrame {
        event: event.event.as_deref().unwrap_or("message"),
        data: &data,
    };
    serde_json::to_string(&frame).ok()
}

async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
