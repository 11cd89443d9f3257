//! Tank players: spawning, controls, shooting cooldown and damage

use std::f32::consts::{FRAC_PI_2, PI};

use super::object::{GameObject, ObjectKind};
use super::vector::Vector2;

/// Stable per-connection player id, never reused
pub type PlayerId = u32;

pub const PLAYER_COLLIDER_SIZE: f32 = 15.0;
pub const PLAYER_HP: i32 = 3;
/// Distance from the field centre at which players spawn
pub const SPAWN_DISTANCE: f32 = 140.0;
/// Radians per second at full turn input
pub const TURN_SENSITIVITY: f32 = 2.0;
/// Units per second at full throttle
pub const MOVE_SENSITIVITY: f32 = 100.0;
pub const SHOOT_COOLDOWN_MS: u64 = 500;

pub const PLAYER_TEXTURE_SIZE: Vector2 = Vector2::new(40.0, 30.0);
pub const PLAYER_TOP_TEXTURE_SIZE: Vector2 = Vector2::new(60.0, 30.0);
pub const PLAYER_TEXTURE_ID: i32 = 0;
pub const PLAYER_OWN_TEXTURE_ID: i32 = 1;
pub const PLAYER_TOP_TEXTURE_ID: i32 = 2;

/// Player-specific state
#[derive(Debug, Clone)]
pub struct Player {
    pub player_id: PlayerId,
    /// Aim angle reported by the client
    pub heading: f32,
    /// x = turn input, y = throttle, both nominally in [-1, 1]
    pub controls: Vector2,
    pub dead: bool,
    /// Unix millis of the last accepted shot
    pub prev_shoot: u64,
    pub alternative_texture_id: i32,
    pub top_texture_id: i32,
    pub top_texture_size: Vector2,
}

impl Player {
    /// Build a fresh player object at its spawn point.
    ///
    /// `spawned_before` is how many players were created before this one.
    pub fn spawn(player_id: PlayerId, spawned_before: u32, field: Vector2, now: u64) -> GameObject {
        let player = Player {
            player_id,
            heading: 0.0,
            controls: Vector2::ZERO,
            dead: false,
            prev_shoot: now,
            alternative_texture_id: PLAYER_OWN_TEXTURE_ID,
            top_texture_id: PLAYER_TOP_TEXTURE_ID,
            top_texture_size: PLAYER_TOP_TEXTURE_SIZE,
        };

        let mut obj = GameObject::new(spawn_position(spawned_before, field), ObjectKind::Player(player));
        obj.size = PLAYER_COLLIDER_SIZE;
        obj.hp = PLAYER_HP;
        obj.texture_size = PLAYER_TEXTURE_SIZE;
        obj.texture_id = PLAYER_TEXTURE_ID;
        obj
    }

    /// Accept a shot if the cooldown has elapsed, recording the time
    pub fn try_shoot(&mut self, now: u64) -> bool {
        if now.saturating_sub(self.prev_shoot) > SHOOT_COOLDOWN_MS {
            self.prev_shoot = now;
            true
        } else {
            false
        }
    }
}

/// Spawn point for the `player_count`-th player.
///
/// Walks half turns around the centre, adding a shrinking offset on odd
/// steps so later players do not stack on the first two.
pub fn spawn_position(player_count: u32, field: Vector2) -> Vector2 {
    let mut acc = 0.0_f32;
    for i in 0..player_count {
        if i % 2 == 1 {
            acc += FRAC_PI_2 / i as f32;
        }
        acc += PI;
    }

    let spawn = Vector2::from_angle(-FRAC_PI_2 + acc);
    spawn * SPAWN_DISTANCE + field / 2.0
}

/// Turn the player's controls into angular speed and velocity along its facing
pub fn apply_controls(obj: &mut GameObject) {
    let controls = match obj.as_player() {
        Some(p) => p.controls,
        None => return,
    };

    obj.angular_speed = controls.x * TURN_SENSITIVITY;
    obj.velocity = Vector2::from_angle(obj.rotation) * (controls.y * MOVE_SENSITIVITY);
}

/// Take one hit. Returns true once the player has run out of hp.
pub fn damage(obj: &mut GameObject) -> bool {
    obj.hp -= 1;
    if obj.hp < 1 {
        if let Some(p) = obj.as_player_mut() {
            p.dead = true;
        }
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELD: Vector2 = Vector2::new(500.0, 500.0);

    fn approx(a: Vector2, b: Vector2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    fn expected(angle: f32) -> Vector2 {
        Vector2::new(250.0, 250.0) + Vector2::from_angle(angle) * SPAWN_DISTANCE
    }

    #[test]
    fn first_player_spawns_north_of_centre() {
        assert!(approx(spawn_position(0, FIELD), Vector2::new(250.0, 110.0)));
    }

    #[test]
    fn second_player_spawns_opposite() {
        assert!(approx(spawn_position(1, FIELD), Vector2::new(250.0, 390.0)));
    }

    #[test]
    fn spawn_recurrence_adds_odd_offsets() {
        // count 2: acc = π + (π/2 + π)
        let acc2 = PI + FRAC_PI_2 + PI;
        assert!(approx(spawn_position(2, FIELD), expected(-FRAC_PI_2 + acc2)));

        // count 3: i = 2 adds π only
        let acc3 = acc2 + PI;
        assert!(approx(spawn_position(3, FIELD), expected(-FRAC_PI_2 + acc3)));

        // count 4: i = 3 adds π/6 then π
        let acc4 = acc3 + FRAC_PI_2 / 3.0 + PI;
        assert!(approx(spawn_position(4, FIELD), expected(-FRAC_PI_2 + acc4)));
    }

    #[test]
    fn spawn_sets_defaults() {
        let obj = Player::spawn(7, 0, FIELD, 1_000);
        let player = obj.as_player().unwrap();
        assert_eq!(player.player_id, 7);
        assert_eq!(obj.hp, PLAYER_HP);
        assert_eq!(obj.size, PLAYER_COLLIDER_SIZE);
        assert!(!player.dead);
        assert_eq!(player.prev_shoot, 1_000);
    }

    #[test]
    fn controls_drive_along_facing() {
        let mut obj = Player::spawn(0, 0, FIELD, 0);
        obj.rotation = FRAC_PI_2;
        obj.as_player_mut().unwrap().controls = Vector2::new(-1.0, 0.5);

        apply_controls(&mut obj);

        assert_eq!(obj.angular_speed, -TURN_SENSITIVITY);
        assert!(approx(obj.velocity, Vector2::new(0.0, 50.0)));
    }

    #[test]
    fn cooldown_blocks_rapid_fire() {
        let mut obj = Player::spawn(0, 0, FIELD, 0);
        let player = obj.as_player_mut().unwrap();

        assert!(!player.try_shoot(SHOOT_COOLDOWN_MS));
        assert!(player.try_shoot(SHOOT_COOLDOWN_MS + 1));
        assert!(!player.try_shoot(SHOOT_COOLDOWN_MS + 200));
        assert!(player.try_shoot(2 * SHOOT_COOLDOWN_MS + 2));
    }

    #[test]
    fn third_hit_kills() {
        let mut obj = Player::spawn(0, 0, FIELD, 0);
        assert!(!damage(&mut obj));
        assert!(!damage(&mut obj));
        assert!(damage(&mut obj));
        assert_eq!(obj.hp, 0);
        assert!(obj.as_player().unwrap().dead);
    }
}
