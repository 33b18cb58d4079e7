use std::time::SystemTime;

use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::format_system_time;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// RFC 3339 timestamp of process start.
    pub started_at: String,
}

impl HealthResponse {
    /// Create a health response indicating the engine is accepting commands.
    pub fn ok(started_at: SystemTime) -> Self {
        Self {
            status: "ok".to_string(),
            started_at: format_system_time(started_at),
        }
    }

    /// Create a health response indicating the engine has stopped.
    pub fn degraded(started_at: SystemTime) -> Self {
        Self {
            status: "degraded".to_string(),
            started_at: format_system_time(started_at),
        }
    }
}
