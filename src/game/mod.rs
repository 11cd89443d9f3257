//! Game simulation modules

pub mod bullet;
pub mod object;
pub mod obstacle;
pub mod player;
pub mod server;
pub mod snapshot;
pub mod vector;
pub mod world;

pub use player::PlayerId;
pub use server::{GameHandle, GameServer};
pub use vector::Vector2;
pub use world::{World, GAME_FIELD_SIZE};
