//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::{GameHandle, PlayerId};
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sink, ws_stream) = socket.split();

    let ack = match state.game.join().await {
        Ok(ack) => ack,
        Err(e) => {
            error!(error = %e, "Failed to spawn player");
            return;
        }
    };
    let player_id = ack.player_id;

    info!(player_id, "New WebSocket connection");

    let set_client = ServerMsg::SetClient {
        player_id,
        game_field_size: state.field_size,
        textures: state.textures.as_ref().clone(),
        bg_texture_id: state.config.bg_texture_id,
    };

    if let Err(e) = send_msg(&mut ws_sink, &set_client).await {
        error!(player_id, error = %e, "Failed to send setClient");
        let _ = state.game.leave(player_id).await;
        return;
    }

    run_session(player_id, &state.game, ws_sink, ws_stream, ack.updates).await;

    // Cleanup on disconnect
    if state.game.leave(player_id).await.is_err() {
        debug!(player_id, "Game loop gone before leave");
    }

    info!(player_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    player_id: PlayerId,
    game: &GameHandle,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut ws_stream: SplitStream<WebSocket>,
    mut updates: broadcast::Receiver<ServerMsg>,
) {
    let rate_limiter = ConnectionRateLimiter::new();

    // Spawn writer task: broadcast snapshots -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(msg) => {
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(player_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        player_id,
                        lagged_count = n,
                        "Client lagged, skipping {} updates", n
                    );
                    // Next snapshot carries the full state anyway
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(player_id, "Update channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> game loop
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    debug!(player_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(ClientMsg::ClientInput(input)) => {
                        if input.claims_other_player(player_id) {
                            debug!(player_id, claimed = ?input.player_id, "Ignoring client-supplied player id");
                        }

                        if game.input(player_id, input).await.is_err() {
                            debug!(player_id, "Game loop gone");
                            break;
                        }
                    }
                    Err(e) => {
                        debug!(player_id, error = %e, "Dropping unrecognized client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(player_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(player_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(player_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(player_id, "Client initiated close");
                break;
            }
            Err(e) => {
                warn!(player_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Abort writer task
    writer_handle.abort();
}

/// Socket write errors
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Socket closed: {0}")]
    Socket(#[from] axum::Error),
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), SendError> {
    let json = serde_json::to_string(msg)?;
    sink.send(Message::Text(json)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::{SinkExt, StreamExt};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use tokio_tungstenite::{connect_async, tungstenite};

    use crate::app::AppState;
    use crate::config::Config;
    use crate::game::{GameServer, World, GAME_FIELD_SIZE};
    use crate::http::build_router;
    use crate::resources::GameMap;
    use crate::util::time::unix_millis;

    async fn serve() -> String {
        let config = Config::from_lookup(|_| None).unwrap();
        let (server, handle) = GameServer::new(World::new(GAME_FIELD_SIZE, unix_millis()), &GameMap::default());
        tokio::spawn(server.run());

        let state = AppState::new(config, handle, vec!["/t.png".to_string()], GAME_FIELD_SIZE);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });

        format!("ws://{addr}/ws")
    }

    fn parse(msg: tungstenite::Message) -> Value {
        match msg {
            tungstenite::Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    fn own_player<'a>(update: &'a Value, player_id: &Value) -> Option<&'a Value> {
        update["data"]["objects"]
            .as_array()
            .unwrap()
            .iter()
            .find(|o| o["objType"] == "player" && &o["playerId"] == player_id)
    }

    #[tokio::test]
    async fn session_sets_client_then_streams_own_player() {
        let url = serve().await;
        let (mut socket, _) = connect_async(url.as_str()).await.unwrap();

        let first = parse(socket.next().await.unwrap().unwrap());
        assert_eq!(first["event"], "setClient");
        assert_eq!(first["data"]["textures"], json!(["/t.png"]));
        let player_id = first["data"]["playerId"].clone();

        // A forged id must not redirect the input
        let input = json!({
            "event": "clientInput",
            "data": {"playerId": 99, "heading": 0.5, "controls": {"x": 1, "y": 0}, "LBDown": false}
        });
        socket
            .send(tungstenite::Message::Text(input.to_string()))
            .await
            .unwrap();

        let steered = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let msg = parse(socket.next().await.unwrap().unwrap());
                if msg["event"] != "UpdatePlayers" {
                    continue;
                }
                let player = own_player(&msg, &player_id).expect("own player in every update");
                assert!(own_player(&msg, &json!(99)).is_none());
                if player["controls"] == json!({"x": 1.0, "y": 0.0}) {
                    return player["heading"].clone();
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(steered, json!(0.5));
    }
}
