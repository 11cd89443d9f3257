//! Simulated entities: common state plus a per-kind payload

use serde::Serialize;

use super::bullet::Bullet;
use super::obstacle::Obstacle;
use super::player::Player;
use super::vector::Vector2;

/// Registry identity of a live object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

/// Wire tag for the entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjType {
    Player,
    Bullet,
    Obstacle,
}

/// Kind-specific state
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Player(Player),
    Bullet(Bullet),
    Obstacle(Obstacle),
}

/// A simulated entity owned by the [`World`](super::world::World)
#[derive(Debug, Clone)]
pub struct GameObject {
    /// Assigned by the world on creation
    pub id: ObjectId,
    pub position: Vector2,
    pub velocity: Vector2,
    /// Facing in radians
    pub rotation: f32,
    /// Radians per second
    pub angular_speed: f32,
    /// Collision radius
    pub size: f32,
    pub texture_size: Vector2,
    pub texture_id: i32,
    pub hp: i32,
    pub kind: ObjectKind,
}

impl GameObject {
    /// Object at rest at `position`; the world assigns the id
    pub fn new(position: Vector2, kind: ObjectKind) -> Self {
        Self {
            id: ObjectId(0),
            position,
            velocity: Vector2::ZERO,
            rotation: 0.0,
            angular_speed: 0.0,
            size: 0.0,
            texture_size: Vector2::ZERO,
            texture_id: -1,
            hp: 0,
            kind,
        }
    }

    pub fn obj_type(&self) -> ObjType {
        match self.kind {
            ObjectKind::Player(_) => ObjType::Player,
            ObjectKind::Bullet(_) => ObjType::Bullet,
            ObjectKind::Obstacle(_) => ObjType::Obstacle,
        }
    }

    /// Static objects are never integrated nor tested against anything
    pub fn is_static(&self) -> bool {
        matches!(self.kind, ObjectKind::Obstacle(_))
    }

    /// Advance rotation and position by `delta` seconds.
    /// Returns the movement applied so collisions can revert it.
    pub fn integrate(&mut self, delta: f32) -> Vector2 {
        self.rotation += self.angular_speed * delta;
        let movement = self.velocity * delta;
        self.position = self.position + movement;
        movement
    }

    pub fn as_player(&self) -> Option<&Player> {
        match &self.kind {
            ObjectKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.kind {
            ObjectKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_bullet(&self) -> Option<&Bullet> {
        match &self.kind {
            ObjectKind::Bullet(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_obstacle(&self) -> Option<&Obstacle> {
        match &self.kind {
            ObjectKind::Obstacle(o) => Some(o),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_moves_and_turns() {
        let mut obj = GameObject::new(Vector2::new(10.0, 10.0), ObjectKind::Obstacle(Obstacle::default()));
        obj.velocity = Vector2::new(30.0, -60.0);
        obj.angular_speed = 2.0;

        let movement = obj.integrate(0.5);

        assert_eq!(movement, Vector2::new(15.0, -30.0));
        assert_eq!(obj.position, Vector2::new(25.0, -20.0));
        assert_eq!(obj.rotation, 1.0);
    }
}
