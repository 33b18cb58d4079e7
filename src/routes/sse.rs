use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{
    error::AppError,
    services::sse_service::{self, StreamKind},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/console",
    tag = "sse",
    responses((status = 200, description = "Console SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream state snapshots to the moderator console.
pub async fn console_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    open_stream(state, StreamKind::Console).await
}

#[utoipa::path(
    get,
    path = "/sse/projection",
    tag = "sse",
    responses((status = 200, description = "Projection SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream state snapshots and reload/close events to the projection display.
pub async fn projection_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    open_stream(state, StreamKind::Projection).await
}

async fn open_stream(
    state: SharedState,
    kind: StreamKind,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let (receiver, initial) = sse_service::subscribe(&state, kind).await?;
    info!(stream = kind.as_str(), "New SSE connection");
    Ok(sse_service::to_sse_stream(receiver, initial, kind))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/console", get(console_stream))
        .route("/sse/projection", get(projection_stream))
}
