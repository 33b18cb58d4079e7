use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the scoreboard backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::get_state,
        crate::routes::game::post_command,
        crate::routes::sse::console_stream,
        crate::routes::sse::projection_stream,
        crate::routes::websocket::console_ws,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::command::CommandRequest,
            crate::dto::command::SetupPayload,
            crate::dto::command::ContentPayload,
            crate::dto::command::SideDto,
            crate::dto::command::ClaimOwnerDto,
            crate::dto::snapshot::GameStateSnapshot,
            crate::dto::sse::Handshake,
            crate::dto::sse::ProjectionReloadEvent,
            crate::dto::sse::ProjectionCloseEvent,
            crate::dto::ws::CommandRejected,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Game state and commands"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "console", description = "WebSocket channel for the moderator console"),
    )
)]
pub struct ApiDoc;
