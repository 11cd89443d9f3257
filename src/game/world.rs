//! Object registry and per-tick simulation

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::resources::GameMap;
use crate::ws::protocol::ClientInput;

use super::bullet::Bullet;
use super::object::{GameObject, ObjectId, ObjectKind};
use super::obstacle::Obstacle;
use super::player::{self, Player, PlayerId};
use super::vector::Vector2;

pub const GAME_FIELD_SIZE: Vector2 = Vector2::new(500.0, 500.0);

/// Owner of every live object.
///
/// Objects are kept in creation order, which is also the order collisions
/// are resolved in: the first matching target wins.
#[derive(Debug)]
pub struct World {
    objects: Vec<GameObject>,
    next_object_id: u64,
    /// Player id -> registry identity. Entries outlive dead players until
    /// they disconnect.
    players: BTreeMap<PlayerId, ObjectId>,
    next_player_id: PlayerId,
    field_size: Vector2,
    /// Unix millis of the last tick
    prev_time: u64,
}

impl World {
    pub fn new(field_size: Vector2, now: u64) -> Self {
        Self {
            objects: Vec::new(),
            next_object_id: 0,
            players: BTreeMap::new(),
            next_player_id: 0,
            field_size,
            prev_time: now,
        }
    }

    pub fn field_size(&self) -> Vector2 {
        self.field_size
    }

    pub fn prev_time(&self) -> u64 {
        self.prev_time
    }

    /// Live objects in creation order
    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    /// Add an object to the live set; it takes part from the next tick on
    pub fn create(&mut self, mut obj: GameObject) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        obj.id = id;
        self.objects.push(obj);
        id
    }

    /// Remove an object by identity. Absent objects are ignored.
    pub fn destroy(&mut self, id: ObjectId) {
        if let Some(index) = self.index_of(id) {
            self.objects.remove(index);
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// One obstacle per map entry
    pub fn map_setup(&mut self, map: &GameMap) {
        for pos in &map.obstacles {
            self.create(Obstacle::create(*pos));
        }
        info!(obstacles = map.obstacles.len(), "Obstacle map loaded");
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    /// Spawn a player for a new connection and return its id
    pub fn add_player(&mut self, now: u64) -> PlayerId {
        let player_id = self.next_player_id;
        self.next_player_id += 1;

        let obj = Player::spawn(player_id, player_id, self.field_size, now);
        let object_id = self.create(obj);
        self.players.insert(player_id, object_id);
        player_id
    }

    /// Drop a disconnected player, dead or alive
    pub fn remove_player(&mut self, player_id: PlayerId) -> bool {
        match self.players.remove(&player_id) {
            Some(object_id) => {
                self.destroy(object_id);
                true
            }
            None => false,
        }
    }

    /// Live player object for `player_id`
    pub fn player(&self, player_id: PlayerId) -> Option<&GameObject> {
        self.players.get(&player_id).and_then(|id| self.get(*id))
    }

    pub fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut GameObject> {
        let id = *self.players.get(&player_id)?;
        self.get_mut(id)
    }

    /// Connected players, including dead ones awaiting disconnect
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Set every live player's speeds from its controls
    pub fn apply_controls(&mut self) {
        for obj in self.objects.iter_mut() {
            player::apply_controls(obj);
        }
    }

    /// Apply a client's control message to its player.
    ///
    /// Unknown or dead players are ignored. Controls and heading are taken
    /// as sent.
    pub fn apply_input(&mut self, player_id: PlayerId, input: &ClientInput, now: u64) {
        let Some(obj) = self.player_mut(player_id) else {
            debug!(player_id, "Input for unknown or dead player dropped");
            return;
        };

        let origin = obj.position;
        let Some(player) = obj.as_player_mut() else {
            return;
        };

        player.controls.set(input.controls.x, input.controls.y);
        player.heading = input.heading;

        if input.lb_down && !player.dead && player.try_shoot(now) {
            let heading = player.heading;
            self.create(Bullet::fire(origin, heading, player_id, now));
        }
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Advance the simulation to `now` (unix millis)
    pub fn tick(&mut self, now: u64) {
        let delta = now.saturating_sub(self.prev_time) as f32 / 1000.0;
        self.prev_time = now;

        self.objects.retain(|o| o.as_bullet().map_or(true, |b| !b.is_expired(now)));

        let ids: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|o| !o.is_static())
            .map(|o| o.id)
            .collect();

        for id in ids {
            // Destroyed earlier this tick
            let Some(index) = self.index_of(id) else {
                continue;
            };

            let movement = self.objects[index].integrate(delta);

            match self.objects[index].kind {
                ObjectKind::Bullet(_) => self.resolve_bullet(index),
                ObjectKind::Player(_) => self.resolve_player(index, movement),
                ObjectKind::Obstacle(_) => {}
            }
        }
    }

    /// First live player within reach takes the hit; otherwise the first
    /// obstacle containing the bullet absorbs it.
    fn resolve_bullet(&mut self, index: usize) {
        let bullet_id = self.objects[index].id;
        let position = self.objects[index].position;

        let target = self.objects.iter().position(|o| {
            o.as_player().map_or(false, |p| !p.dead) && o.position.distance(position) < o.size
        });

        if let Some(target) = target {
            let target_id = self.objects[target].id;
            let killed = player::damage(&mut self.objects[target]);
            self.destroy(bullet_id);

            if killed {
                if let Some(p) = self.get(target_id).and_then(GameObject::as_player) {
                    info!(player_id = p.player_id, "Player destroyed");
                }
                self.destroy(target_id);
            }
            return;
        }

        let blocked = self
            .objects
            .iter()
            .filter_map(GameObject::as_obstacle)
            .any(|o| o.check_collider(position));

        if blocked {
            self.destroy(bullet_id);
        }
    }

    /// Players refuse moves that overlap an obstacle and stay on the field
    fn resolve_player(&mut self, index: usize, movement: Vector2) {
        let position = self.objects[index].position;
        let size = self.objects[index].size;

        let blocked = self
            .objects
            .iter()
            .any(|o| o.is_static() && o.position.distance(position) < size + o.size);

        let field = self.field_size;
        let obj = &mut self.objects[index];
        if blocked {
            obj.position = obj.position - movement;
            obj.velocity = Vector2::ZERO;
        }
        obj.position.clamp(field);
    }
}
