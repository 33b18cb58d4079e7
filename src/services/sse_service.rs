use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

/// Display surface served by an SSE stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    Console,
    Projection,
}

impl StreamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Console => "console",
            StreamKind::Projection => "projection",
        }
    }
}

/// Subscribe to `kind` and build the events a new client receives first:
/// a handshake followed by a full `state.sync` snapshot.
///
/// The subscription is taken before the snapshot is read so no published
/// state can fall between the two.
pub async fn subscribe(
    state: &SharedState,
    kind: StreamKind,
) -> Result<(broadcast::Receiver<ServerEvent>, Vec<ServerEvent>), ServiceError> {
    let receiver = match kind {
        StreamKind::Console => state.console_sse().subscribe(),
        StreamKind::Projection => state.projection_sse().subscribe(),
    };

    let mut initial = Vec::with_capacity(2);
    let handshake = Handshake {
        stream: kind.as_str().to_string(),
        message: format!("{} stream connected", kind.as_str()),
        degraded: state.is_degraded(),
    };
    if let Ok(event) = ServerEvent::json(Some("handshake".to_string()), &handshake) {
        initial.push(event);
    }

    let game = state.engine().snapshot().await?;
    initial.extend(sse_events::state_sync_event(state, &game));

    Ok((receiver, initial))
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Convert a broadcast receiver into an SSE response, replaying `initial`
/// first and then forwarding hub events until the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    initial: Vec<ServerEvent>,
    kind: StreamKind,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let connection_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        for payload in initial {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // Every state.sync is a full snapshot; the next one catches up.
                            warn!(%connection_id, skipped, "SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!(%connection_id, stream = kind.as_str(), "SSE stream disconnected");
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
