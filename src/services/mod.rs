/// Periodic clock ticks fed to the engine.
pub mod clock_driver;
/// Command parsing and submission.
pub mod command_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Console WebSocket connection handling.
pub mod websocket_service;
