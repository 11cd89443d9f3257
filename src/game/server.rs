//! Authoritative game loop

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, info};

use crate::resources::GameMap;
use crate::util::time::{unix_millis, SIMULATION_TPS};
use crate::ws::protocol::{ClientInput, ServerMsg};

use super::player::PlayerId;
use super::snapshot::{SnapshotBuilder, SnapshotStats};
use super::world::World;

/// Requests from connection tasks to the game loop
#[derive(Debug)]
pub enum GameCommand {
    /// New connection; replies with the spawned player
    Join { reply: oneshot::Sender<JoinAck> },
    /// Latest controls from a connection
    Input { player_id: PlayerId, input: ClientInput },
    /// Connection closed
    Leave { player_id: PlayerId },
}

/// Reply to a join request
#[derive(Debug)]
pub struct JoinAck {
    pub player_id: PlayerId,
    /// Subscribed after the player was created, so every snapshot on it
    /// already contains that player
    pub updates: broadcast::Receiver<ServerMsg>,
}

/// Game loop errors seen by connection tasks
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Game loop is not running")]
    Stopped,
}

/// Cloneable handle to the running game loop
#[derive(Clone)]
pub struct GameHandle {
    command_tx: mpsc::Sender<GameCommand>,
    player_count: Arc<AtomicUsize>,
}

impl GameHandle {
    /// Spawn a player for a new connection
    pub async fn join(&self) -> Result<JoinAck, GameError> {
        let (reply, ack) = oneshot::channel();
        self.command_tx
            .send(GameCommand::Join { reply })
            .await
            .map_err(|_| GameError::Stopped)?;
        ack.await.map_err(|_| GameError::Stopped)
    }

    pub async fn input(&self, player_id: PlayerId, input: ClientInput) -> Result<(), GameError> {
        self.command_tx
            .send(GameCommand::Input { player_id, input })
            .await
            .map_err(|_| GameError::Stopped)
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), GameError> {
        self.command_tx
            .send(GameCommand::Leave { player_id })
            .await
            .map_err(|_| GameError::Stopped)
    }

    /// Connected players, dead ones included
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }
}

/// Owns the world and drives it at a fixed rate
pub struct GameServer {
    world: World,
    command_rx: mpsc::Receiver<GameCommand>,
    snapshot_tx: broadcast::Sender<ServerMsg>,
    stats: SnapshotStats,
    player_count: Arc<AtomicUsize>,
}

impl GameServer {
    /// Create the loop with the map's obstacles already placed
    pub fn new(world: World, map: &GameMap) -> (Self, GameHandle) {
        let (command_tx, command_rx) = mpsc::channel(256);
        let (snapshot_tx, _) = broadcast::channel(64);
        let player_count = Arc::new(AtomicUsize::new(0));

        let handle = GameHandle {
            command_tx,
            player_count: player_count.clone(),
        };

        let mut world = world;
        world.map_setup(map);

        let server = Self {
            world,
            command_rx,
            snapshot_tx,
            stats: SnapshotStats::default(),
            player_count,
        };

        (server, handle)
    }

    /// Run the tick loop until every handle is dropped
    pub async fn run(mut self) {
        info!(tick_rate = SIMULATION_TPS, "Game loop started");

        let tick_duration = Duration::from_micros(1_000_000 / SIMULATION_TPS as u64);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            if !self.process_commands() {
                info!("All game handles dropped, stopping game loop");
                break;
            }

            self.step(unix_millis());
        }
    }

    /// Drain pending commands. Returns false once no handle is left.
    fn process_commands(&mut self) -> bool {
        loop {
            match self.command_rx.try_recv() {
                Ok(command) => self.handle_command(command),
                Err(mpsc::error::TryRecvError::Empty) => return true,
                Err(mpsc::error::TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn handle_command(&mut self, command: GameCommand) {
        match command {
            GameCommand::Join { reply } => {
                let player_id = self.handle_join();
                let ack = JoinAck {
                    player_id,
                    updates: self.snapshot_tx.subscribe(),
                };
                if reply.send(ack).is_err() {
                    // Connection went away while waiting
                    self.handle_leave(player_id);
                }
            }
            GameCommand::Input { player_id, input } => {
                self.world.apply_input(player_id, &input, unix_millis());
            }
            GameCommand::Leave { player_id } => {
                self.handle_leave(player_id);
            }
        }
    }

    fn handle_join(&mut self) -> PlayerId {
        let player_id = self.world.add_player(unix_millis());
        self.player_count
            .store(self.world.player_count(), Ordering::Relaxed);

        info!(
            player_id,
            player_count = self.world.player_count(),
            "Player connected"
        );
        self.broadcast(ServerMsg::TextMessage {
            text: format!("Player{player_id} connected"),
        });

        player_id
    }

    fn handle_leave(&mut self, player_id: PlayerId) {
        if !self.world.remove_player(player_id) {
            return;
        }
        self.player_count
            .store(self.world.player_count(), Ordering::Relaxed);

        info!(player_id, "Player disconnected");
        self.broadcast(ServerMsg::TextMessage {
            text: format!("Player{player_id} disconnected"),
        });
    }

    /// One simulation step followed by a full-state broadcast
    fn step(&mut self, now: u64) {
        self.world.apply_controls();
        self.world.tick(now);

        let snapshot = SnapshotBuilder::build(&self.world);
        self.stats.record(self.world.objects().len());
        if self.stats.total_snapshots % (SIMULATION_TPS as u64 * 60) == 0 {
            debug!(
                snapshots = self.stats.total_snapshots,
                avg_objects = self.stats.avg_objects_per_snapshot,
                "Snapshot stats"
            );
        }

        self.broadcast(snapshot);
    }

    fn broadcast(&self, msg: ServerMsg) {
        // Err only means nobody is connected
        let _ = self.snapshot_tx.send(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::GAME_FIELD_SIZE;
    use crate::game::Vector2;
    use crate::ws::protocol::{ObjectDetail, WorldSnapshot};

    fn server() -> (GameServer, GameHandle) {
        let map = GameMap {
            obstacles: vec![Vector2::new(60.0, 60.0)],
        };
        GameServer::new(World::new(GAME_FIELD_SIZE, unix_millis()), &map)
    }

    fn next_update(rx: &mut broadcast::Receiver<ServerMsg>) -> WorldSnapshot {
        loop {
            match rx.try_recv().expect("expected a queued message") {
                ServerMsg::UpdatePlayers(snapshot) => return snapshot,
                _ => continue,
            }
        }
    }

    fn has_player(snapshot: &WorldSnapshot, id: PlayerId) -> bool {
        snapshot.objects.iter().any(|o| {
            matches!(o.detail, ObjectDetail::Player { player_id, .. } if player_id == id)
        })
    }

    #[test]
    fn first_update_after_join_contains_own_player() {
        let (mut server, _handle) = server();
        let (reply, mut ack_rx) = oneshot::channel();

        server.handle_command(GameCommand::Join { reply });
        let mut ack = ack_rx.try_recv().unwrap();
        server.step(unix_millis());

        let snapshot = next_update(&mut ack.updates);
        assert!(has_player(&snapshot, ack.player_id));
        // Map obstacle plus the player
        assert_eq!(snapshot.objects.len(), 2);
    }

    #[test]
    fn leave_removes_player_from_updates() {
        let (mut server, handle) = server();
        let (reply, mut ack_rx) = oneshot::channel();
        server.handle_command(GameCommand::Join { reply });
        let mut ack = ack_rx.try_recv().unwrap();
        assert_eq!(handle.player_count(), 1);

        server.handle_command(GameCommand::Leave {
            player_id: ack.player_id,
        });
        server.step(unix_millis());

        assert_eq!(handle.player_count(), 0);
        let snapshot = next_update(&mut ack.updates);
        assert!(!has_player(&snapshot, ack.player_id));
    }

    #[test]
    fn abandoned_join_is_rolled_back() {
        let (mut server, handle) = server();
        let (reply, ack_rx) = oneshot::channel();
        drop(ack_rx);

        server.handle_command(GameCommand::Join { reply });
        assert_eq!(handle.player_count(), 0);
    }

    #[test]
    fn commands_stop_when_handles_drop() {
        let (mut server, handle) = server();
        assert!(server.process_commands());
        drop(handle);
        assert!(!server.process_commands());
    }

    #[tokio::test]
    async fn join_over_channels_then_receive_update() {
        let (server, handle) = server();
        let task = tokio::spawn(server.run());

        let mut ack = handle.join().await.unwrap();
        let snapshot = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if let Ok(ServerMsg::UpdatePlayers(snapshot)) = ack.updates.recv().await {
                    return snapshot;
                }
            }
        })
        .await
        .expect("no update within timeout");

        assert!(has_player(&snapshot, ack.player_id));
        tokio_test::assert_ok!(handle.leave(ack.player_id).await);

        drop(handle);
        drop(ack);
        tokio_test::assert_ok!(task.await);
    }
}
