//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::{GameHandle, Vector2};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub game: GameHandle,
    /// Texture paths sent to every client on connect
    pub textures: Arc<Vec<String>>,
    pub field_size: Vector2,
}

impl AppState {
    pub fn new(config: Config, game: GameHandle, textures: Vec<String>, field_size: Vector2) -> Self {
        Self {
            config: Arc::new(config),
            game,
            textures: Arc::new(textures),
            field_size,
        }
    }
}
