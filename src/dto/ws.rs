use serde::Serialize;
use serde_json::value::RawValue;
use utoipa::ToSchema;

#[derive(Debug, Serialize)]
/// Outbound console frame wrapping an already-serialised event payload.
pub struct ConsoleFrame<'a> {
    pub event: &'a str,
    pub data: &'a RawValue,
}

#[derive(Debug, Serialize, ToSchema)]
/// Sent back on the console socket when a frame could not be turned into a command.
pub struct CommandRejected {
    pub message: String,
}
