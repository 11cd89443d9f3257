//! Bullets fired by players

use super::object::{GameObject, ObjectKind};
use super::player::PlayerId;
use super::vector::Vector2;

/// Distance from the tank centre to the muzzle
pub const GUN_OFFSET: f32 = 18.0;
pub const BULLET_SPEED: f32 = 500.0;
pub const BULLET_LIFETIME_MS: u64 = 1000;
pub const BULLET_TEXTURE_SIZE: Vector2 = Vector2::new(10.0, 5.0);
pub const BULLET_TEXTURE_ID: i32 = 4;

/// Bullet-specific state
#[derive(Debug, Clone)]
pub struct Bullet {
    pub heading: f32,
    /// Shooter
    pub player_id: PlayerId,
    /// Unix millis after which the bullet is removed
    pub expires_at: u64,
}

impl Bullet {
    /// Bullet leaving the muzzle of a tank at `origin` aimed along `heading`
    pub fn fire(origin: Vector2, heading: f32, player_id: PlayerId, now: u64) -> GameObject {
        let direction = Vector2::from_angle(heading);
        let position = origin + direction * GUN_OFFSET;

        let mut obj = GameObject::new(
            position,
            ObjectKind::Bullet(Bullet {
                heading,
                player_id,
                expires_at: now + BULLET_LIFETIME_MS,
            }),
        );
        obj.velocity = direction * BULLET_SPEED;
        obj.rotation = heading;
        obj.texture_size = BULLET_TEXTURE_SIZE;
        obj.texture_id = BULLET_TEXTURE_ID;
        obj
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_from_muzzle_along_heading() {
        let obj = Bullet::fire(Vector2::new(100.0, 100.0), 0.0, 3, 5_000);
        let bullet = obj.as_bullet().unwrap();

        assert_eq!(obj.position, Vector2::new(118.0, 100.0));
        assert_eq!(obj.velocity, Vector2::new(BULLET_SPEED, 0.0));
        assert_eq!(bullet.player_id, 3);
        assert_eq!(bullet.expires_at, 6_000);
        assert_eq!(obj.hp, 0);
    }

    #[test]
    fn expires_at_deadline() {
        let obj = Bullet::fire(Vector2::ZERO, 1.0, 0, 0);
        let bullet = obj.as_bullet().unwrap();
        assert!(!bullet.is_expired(BULLET_LIFETIME_MS - 1));
        assert!(bullet.is_expired(BULLET_LIFETIME_MS));
    }
}
