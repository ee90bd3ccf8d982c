//! WebSocket upgrade handler and per-connection session

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{Outbound, RoomInput};
use crate::util::rate_limit::SessionRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let player_id = Uuid::new_v4();
    info!(player_id = %player_id, "New WebSocket connection");

    // Subscribe before requesting a slot so the targeted init (or the
    // rejection) cannot be missed
    let outbound_rx = state.room.outbound_tx.subscribe();
    let input_tx = state.room.input_tx.clone();

    if input_tx.send(RoomInput::Connect { id: player_id }).await.is_err() {
        error!(player_id = %player_id, "Room input channel closed");
        return;
    }

    run_session(player_id, socket, input_tx.clone(), outbound_rx).await;

    // Graceful leave and dropped connection funnel to the same removal path
    let _ = input_tx.send(RoomInput::Disconnect { id: player_id }).await;

    info!(player_id = %player_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    player_id: Uuid,
    socket: WebSocket,
    input_tx: mpsc::Sender<RoomInput>,
    mut outbound_rx: broadcast::Receiver<Outbound>,
) {
    let (mut ws_sink, mut ws_stream) = socket.split();
    let rate_limiter = SessionRateLimiter::new();

    // Writer task: room broadcast -> WebSocket, filtered by recipient
    let writer_handle = tokio::spawn(async move {
        loop {
            match outbound_rx.recv().await {
                Ok(out) => {
                    if !out.to.matches(player_id) {
                        continue;
                    }

                    let rejected = matches!(out.msg, ServerMsg::GameFull { .. });
                    if let Err(e) = send_msg(&mut ws_sink, &out.msg).await {
                        debug!(player_id = %player_id, error = %e, "WebSocket send failed");
                        break;
                    }
                    if rejected {
                        // Capacity rejection: say goodbye and hang up
                        let _ = ws_sink.close().await;
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        player_id = %player_id,
                        lagged_count = n,
                        "Client lagged, skipping {} messages", n
                    );
                    // Continue - don't disconnect for lag
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(player_id = %player_id, "Outbound channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> room intent queue
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(player_id = %player_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(msg) => {
                        if input_tx
                            .send(RoomInput::Intent { id: player_id, msg })
                            .await
                            .is_err()
                        {
                            debug!(player_id = %player_id, "Input channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(player_id = %player_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(player_id = %player_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                debug!(player_id = %player_id, "Received ping/pong");
            }
            Ok(Message::Close(_)) => {
                info!(player_id = %player_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(player_id = %player_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
