//! Snapshot building for network transmission

use crate::ws::protocol::{ObjectSnapshot, ServerMsg, WorldSnapshot};

use super::world::World;

/// Builds full-state snapshots; no delta encoding
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    /// Every live object, stamped with the simulation clock
    pub fn build(world: &World) -> ServerMsg {
        ServerMsg::UpdatePlayers(WorldSnapshot {
            time: world.prev_time(),
            objects: world.objects().iter().map(ObjectSnapshot::from).collect(),
        })
    }
}

/// Snapshot size stats for debugging
#[derive(Debug, Default)]
pub struct SnapshotStats {
    pub total_snapshots: u64,
    pub avg_objects_per_snapshot: f32,
}

impl SnapshotStats {
    pub fn record(&mut self, object_count: usize) {
        self.total_snapshots += 1;

        // Running average
        let n = self.total_snapshots as f32;
        self.avg_objects_per_snapshot =
            self.avg_objects_per_snapshot * ((n - 1.0) / n) + (object_count as f32 / n);
    }
}
