//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::game::arena::Rect;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Move by a delta and update facing angle
    Move { dx: f32, dy: f32, angle: f32 },

    /// Fire a laser along the given angle (radians)
    Shoot { angle: f32 },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMsg {
    /// Sent to a newly accepted player: its identity plus the full world
    Init {
        player_id: Uuid,
        config: GameConfig,
        obstacles: Vec<Rect>,
        players: Vec<PlayerView>,
    },

    /// Sent to a rejected connection when the room is at capacity
    GameFull { message: String },

    /// A player joined the room
    PlayerJoined {
        player_id: Uuid,
        player: PlayerView,
        player_count: usize,
    },

    /// A player left the room
    PlayerLeft { player_id: Uuid, player_count: usize },

    /// A new round has started
    RoundStart {
        players: Vec<PlayerView>,
        scores: HashMap<Uuid, u32>,
        time_remaining: u32,
    },

    /// The round has ended
    RoundEnd {
        reason: EndReason,
        winner: Option<Uuid>,
        winner_name: Option<String>,
        scores: HashMap<Uuid, u32>,
        tie: bool,
    },

    /// Periodic world snapshot (sent every simulation tick while active)
    GameState {
        players: Vec<PlayerView>,
        lasers: Vec<LaserView>,
    },

    /// A laser struck a player
    PlayerHit {
        player_id: Uuid,
        shooter_id: Uuid,
        scores: HashMap<Uuid, u32>,
    },

    /// A hit player came back to life
    PlayerRespawn { player_id: Uuid, x: f32, y: f32 },

    /// A laser was fired
    LaserFired { player_id: Uuid, laser: LaserView },

    /// Round countdown update (once per second)
    TimerUpdate { time_remaining: u32 },

    /// Waiting for a second player
    Waiting { message: String },
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    /// A player reached the kill limit
    KillLimit,
    /// The round countdown reached zero
    Timeout,
    /// The room dropped below two players mid-round
    PlayerLeft,
}

/// Client-visible slice of a player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: Uuid,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub color: String,
    pub alive: bool,
}

/// Client-visible slice of a laser. Ownership and velocity stay
/// server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaserView {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_intents_parse_from_wire_names() {
        let msg: ClientMsg =
            serde_json::from_str(r#"{"type":"move","dx":3.0,"dy":-3.0,"angle":1.5}"#).unwrap();
        assert!(matches!(msg, ClientMsg::Move { dx, .. } if dx == 3.0));

        let msg: ClientMsg = serde_json::from_str(r#"{"type":"shoot","angle":0.0}"#).unwrap();
        assert!(matches!(msg, ClientMsg::Shoot { angle } if angle == 0.0));
    }

    #[test]
    fn unknown_client_message_is_an_error() {
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"teleport","x":0}"#).is_err());
    }

    #[test]
    fn server_events_use_camel_case_tags() {
        let value = serde_json::to_value(ServerMsg::TimerUpdate { time_remaining: 42 }).unwrap();
        assert_eq!(value, json!({"type": "timerUpdate", "timeRemaining": 42}));

        let value = serde_json::to_value(ServerMsg::PlayerLeft {
            player_id: Uuid::nil(),
            player_count: 1,
        })
        .unwrap();
        assert_eq!(value["type"], "playerLeft");
        assert_eq!(value["playerCount"], 1);
    }

    #[test]
    fn round_end_reports_winner_fields() {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(ServerMsg::RoundEnd {
            reason: EndReason::KillLimit,
            winner: Some(id),
            winner_name: Some("Player 1".to_string()),
            scores: HashMap::from([(id, 5)]),
            tie: false,
        })
        .unwrap();
        assert_eq!(value["type"], "roundEnd");
        assert_eq!(value["reason"], "killLimit");
        assert_eq!(value["winnerName"], "Player 1");
        assert_eq!(value["tie"], false);
    }

    #[test]
    fn tie_serializes_null_winner() {
        let value = serde_json::to_value(ServerMsg::RoundEnd {
            reason: EndReason::Timeout,
            winner: None,
            winner_name: None,
            scores: HashMap::new(),
            tie: true,
        })
        .unwrap();
        assert!(value["winner"].is_null());
        assert_eq!(value["reason"], "timeout");
        assert_eq!(value["tie"], true);
    }
}
