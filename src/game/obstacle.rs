//! Static box obstacles and their polygon collider

use super::object::{GameObject, ObjectKind};
use super::vector::Vector2;

pub const BOX_COLLIDER_SIZE: f32 = 20.0;
pub const BOX_TEXTURE_SIZE: Vector2 = Vector2::new(40.0, 40.0);
pub const BOX_TEXTURE_ID: i32 = 5;
/// Angle sum at or above which a point counts as inside a collider
pub const FULL_TURN_THRESHOLD: f32 = 6.28;

/// Obstacle-specific state
#[derive(Debug, Clone, Default)]
pub struct Obstacle {
    pub heading: f32,
    /// World-space corners
    pub collider: [Vector2; 4],
}

impl Obstacle {
    pub fn create(position: Vector2) -> GameObject {
        let heading = 0.0;
        let half = BOX_TEXTURE_SIZE / 2.0;

        // Corner order: (-,-), (-,+), (+,-), (+,+)
        let mut collider = [Vector2::ZERO; 4];
        for (i, vertex) in collider.iter_mut().enumerate() {
            let sx = if i / 2 == 0 { -1.0 } else { 1.0 };
            let sy = if i % 2 == 0 { -1.0 } else { 1.0 };
            let local = Vector2::new(half.x * sx, half.y * sy);
            *vertex = local.rotate(heading) + position;
        }

        let mut obj = GameObject::new(position, ObjectKind::Obstacle(Obstacle { heading, collider }));
        obj.size = BOX_COLLIDER_SIZE;
        obj.texture_size = BOX_TEXTURE_SIZE;
        obj.texture_id = BOX_TEXTURE_ID;
        obj
    }

    /// Point containment by summing the unsigned angles the point subtends
    /// over each consecutive vertex pair.
    ///
    /// The sum only exceeds a full turn when the point sits inside the box;
    /// this is not a general polygon test.
    pub fn check_collider(&self, point: Vector2) -> bool {
        let mut acc = 0.0;
        for i in 0..4 {
            let to_first = point - self.collider[i];
            let to_next = point - self.collider[(i + 1) % 4];
            acc += Vector2::angle(to_first, to_next);
        }
        acc >= FULL_TURN_THRESHOLD
    }
}
