//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origin for CORS ("*" allows any)
    pub client_origin: String,
    /// Authoritative gameplay constants
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            client_origin: env::var("CLIENT_ORIGIN").unwrap_or_else(|_| "*".to_string()),

            game: GameConfig::from_env()?,
        })
    }
}

/// Gameplay constants, sent to clients at init.
///
/// Clients may use these for prediction and rendering only; the server
/// remains authoritative over every value here.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Arena width in world units
    pub map_width: f32,
    /// Arena height in world units
    pub map_height: f32,
    /// Player movement speed (units per second, advisory for clients)
    pub player_speed: f32,
    /// Player body side length (axis-aligned square)
    pub player_size: f32,
    /// Laser travel speed (units per second)
    pub laser_speed: f32,
    /// Minimum interval between accepted shots (ms)
    pub laser_cooldown_ms: u64,
    /// Score that ends the round immediately
    pub kills_to_win: u32,
    /// Round duration in seconds
    pub round_time_secs: u32,
    /// Delay before a hit player respawns (ms)
    pub respawn_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: 1200.0,
            map_height: 800.0,
            player_speed: 200.0,
            player_size: 32.0,
            laser_speed: 600.0,
            laser_cooldown_ms: 250,
            kills_to_win: 5,
            round_time_secs: 60,
            respawn_ms: 2000,
        }
    }
}

impl GameConfig {
    /// Load gameplay constants, with optional per-deployment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("KILL_LIMIT") {
            config.kills_to_win = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KILL_LIMIT"))?;
        }
        if let Ok(raw) = env::var("ROUND_TIME_SECS") {
            config.round_time_secs = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ROUND_TIME_SECS"))?;
        }

        Ok(config)
    }

    pub fn half_player_size(&self) -> f32 {
        self.player_size / 2.0
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
