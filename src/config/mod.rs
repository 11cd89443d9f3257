//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Background texture index when `BG_TEXTURE_ID` is unset
pub const DEFAULT_BG_TEXTURE_ID: i32 = 3;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of text
    pub log_json: bool,

    /// Directory the browser client is served from
    pub static_dir: PathBuf,
    /// Obstacle map JSON
    pub map_file: PathBuf,
    /// Client asset manifest JSON
    pub asset_manifest: PathBuf,
    /// Texture index the client draws as background
    pub bg_texture_id: i32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PORT wins over SERVER_ADDR for hosted environments
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
        };

        let bg_texture_id = match lookup("BG_TEXTURE_ID") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("BG_TEXTURE_ID"))?,
            None => DEFAULT_BG_TEXTURE_ID,
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_json: lookup("LOG_FORMAT").is_some_and(|format| format.eq_ignore_ascii_case("json")),

            static_dir: lookup("STATIC_DIR")
                .unwrap_or_else(|| "static".to_string())
                .into(),
            map_file: lookup("MAP_FILE")
                .unwrap_or_else(|| "resources/gameMap.json".to_string())
                .into(),
            asset_manifest: lookup("ASSET_MANIFEST")
                .unwrap_or_else(|| "resources/staticFiles.json".to_string())
                .into(),
            bg_texture_id,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
