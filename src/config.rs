//! Application-level configuration loading: engine defaults and runtime tuning.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::game::{
    DEFAULT_LEFT_TEAM_NAME, DEFAULT_RIGHT_TEAM_NAME, GameState, PregameConfig,
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCOREBOARD_BACK_CONFIG_PATH";

const DEFAULT_TICK_INTERVAL_MS: u64 = 250;
/// Shortest accepted tick period; a zero period would spin.
const MIN_TICK_INTERVAL_MS: u64 = 10;
const DEFAULT_SSE_CAPACITY: usize = 64;
const DEFAULT_COMMAND_BUFFER: usize = 64;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    tick_interval: Duration,
    sse_capacity: usize,
    command_buffer: usize,
    defaults: GameDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Values a fresh game starts from before any setup is applied.
pub struct GameDefaults {
    pub left_team_name: String,
    pub right_team_name: String,
    pub pregame: PregameConfig,
}

impl Default for GameDefaults {
    fn default() -> Self {
        Self {
            left_team_name: DEFAULT_LEFT_TEAM_NAME.to_string(),
            right_team_name: DEFAULT_RIGHT_TEAM_NAME.to_string(),
            pregame: PregameConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        tick_interval_ms = app_config.tick_interval.as_millis() as u64,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document. Every key is optional.
    pub fn from_json_str(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Period of the clock driver.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Buffer size of each SSE broadcast hub.
    pub fn sse_capacity(&self) -> usize {
        self.sse_capacity
    }

    /// Bound of the engine request queue.
    pub fn command_buffer(&self) -> usize {
        self.command_buffer
    }

    pub fn defaults(&self) -> &GameDefaults {
        &self.defaults
    }

    /// Fresh engine state built from the configured defaults.
    pub fn initial_state(&self, now_ms: u64) -> GameState {
        GameState::with_defaults(
            self.defaults.pregame,
            &self.defaults.left_team_name,
            &self.defaults.right_team_name,
            now_ms,
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            sse_capacity: DEFAULT_SSE_CAPACITY,
            command_buffer: DEFAULT_COMMAND_BUFFER,
            defaults: GameDefaults::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    tick_interval_ms: Option<u64>,
    sse_capacity: Option<usize>,
    command_buffer: Option<usize>,
    #[serde(default)]
    defaults: RawDefaults,
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the `defaults` section.
struct RawDefaults {
    left_team_name: Option<String>,
    right_team_name: Option<String>,
    round_length_seconds: Option<u32>,
    tossup_length_seconds: Option<u32>,
    followup_length_seconds: Option<u32>,
    warning_threshold_seconds: Option<u32>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let tick_interval_ms = value
            .tick_interval_ms
            .unwrap_or(DEFAULT_TICK_INTERVAL_MS)
            .max(MIN_TICK_INTERVAL_MS);
        Self {
            tick_interval: Duration::from_millis(tick_interval_ms),
            sse_capacity: value.sse_capacity.unwrap_or(DEFAULT_SSE_CAPACITY).max(1),
            command_buffer: value.command_buffer.unwrap_or(DEFAULT_COMMAND_BUFFER).max(1),
            defaults: value.defaults.into(),
        }
    }
}

impl From<RawDefaults> for GameDefaults {
    fn from(value: RawDefaults) -> Self {
        let fallback = PregameConfig::default();
        Self {
            left_team_name: non_blank(value.left_team_name, DEFAULT_LEFT_TEAM_NAME),
            right_team_name: non_blank(value.right_team_name, DEFAULT_RIGHT_TEAM_NAME),
            pregame: PregameConfig {
                round_length_seconds: value
                    .round_length_seconds
                    .unwrap_or(fallback.round_length_seconds),
                tossup_length_seconds: value
                    .tossup_length_seconds
                    .unwrap_or(fallback.tossup_length_seconds),
                followup_length_seconds: value
                    .followup_length_seconds
                    .unwrap_or(fallback.followup_length_seconds),
                warning_threshold_seconds: value
                    .warning_threshold_seconds
                    .unwrap_or(fallback.warning_threshold_seconds),
            },
        }
    }
}

fn non_blank(name: Option<String>, fallback: &str) -> String {
    name.map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
