//! WebSocket protocol message definitions
//! These are the wire types for client-server communication.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::game::object::{GameObject, ObjType, ObjectId, ObjectKind};
use crate::game::{PlayerId, Vector2};

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMsg {
    /// Control state, sent by the browser at a steady rate
    #[serde(rename = "clientInput")]
    ClientInput(ClientInput),
}

/// Player controls as reported by the client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInput {
    /// Ignored; the server uses the connection's own id. Kept untyped so a
    /// malformed value never costs the rest of the message.
    #[serde(rename = "playerId", default)]
    pub player_id: Option<serde_json::Value>,
    /// x = turn input, y = throttle
    pub controls: Vector2,
    /// Aim angle in radians. The browser sends `null` for NaN.
    #[serde(deserialize_with = "nullable_f32")]
    pub heading: f32,
    /// Fire button pressed since the last message
    #[serde(rename = "LBDown", default)]
    pub lb_down: bool,
}

impl ClientInput {
    /// True when the client named a player other than `player_id`
    pub fn claims_other_player(&self, player_id: PlayerId) -> bool {
        self.player_id
            .as_ref()
            .is_some_and(|claimed| claimed.as_u64() != Some(u64::from(player_id)))
    }
}

fn nullable_f32<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or(f32::NAN))
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMsg {
    /// Sent once, right after the connection is accepted
    #[serde(rename = "setClient", rename_all = "camelCase")]
    SetClient {
        player_id: PlayerId,
        game_field_size: Vector2,
        /// Texture paths indexed by texture id
        textures: Vec<String>,
        bg_texture_id: i32,
    },

    /// Full world state (sent every tick)
    #[serde(rename = "UpdatePlayers")]
    UpdatePlayers(WorldSnapshot),

    /// Informational line for the client log
    #[serde(rename = "textMessage")]
    TextMessage { text: String },
}

/// Every live object at `time` (unix millis)
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub time: u64,
    pub objects: Vec<ObjectSnapshot>,
}

/// Public state of one object
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    pub position: Vector2,
    pub velocity: Vector2,
    pub rotation: f32,
    pub angular_speed: f32,
    pub obj_type: ObjType,
    pub size: f32,
    pub texture_size: Vector2,
    pub texture_id: i32,
    pub hp: i32,
    #[serde(flatten)]
    pub detail: ObjectDetail,
}

/// Kind-specific fields, flattened into the object
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ObjectDetail {
    #[serde(rename_all = "camelCase")]
    Player {
        player_id: PlayerId,
        heading: f32,
        controls: Vector2,
        dead: bool,
        alternative_texture_id: i32,
        top_texture_id: i32,
        top_texture_size: Vector2,
    },
    #[serde(rename_all = "camelCase")]
    Bullet { player_id: PlayerId, heading: f32 },
    #[serde(rename_all = "camelCase")]
    Obstacle { heading: f32, collider: [Vector2; 4] },
}

impl From<&GameObject> for ObjectSnapshot {
    fn from(obj: &GameObject) -> Self {
        let detail = match &obj.kind {
            ObjectKind::Player(p) => ObjectDetail::Player {
                player_id: p.player_id,
                heading: p.heading,
                controls: p.controls,
                dead: p.dead,
                alternative_texture_id: p.alternative_texture_id,
                top_texture_id: p.top_texture_id,
                top_texture_size: p.top_texture_size,
            },
            ObjectKind::Bullet(b) => ObjectDetail::Bullet {
                player_id: b.player_id,
                heading: b.heading,
            },
            ObjectKind::Obstacle(o) => ObjectDetail::Obstacle {
                heading: o.heading,
                collider: o.collider,
            },
        };

        Self {
            id: obj.id,
            position: obj.position,
            velocity: obj.velocity,
            rotation: obj.rotation,
            angular_speed: obj.angular_speed,
            obj_type: obj.obj_type(),
            size: obj.size,
            texture_size: obj.texture_size,
            texture_id: obj.texture_id,
            hp: obj.hp,
            detail,
        }
    }
}
