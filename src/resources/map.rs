//! Obstacle map definition

use serde::Deserialize;

use crate::game::Vector2;

/// Fixed obstacle layout, one box per position
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameMap {
    #[serde(default)]
    pub obstacles: Vec<Vector2>,
}
