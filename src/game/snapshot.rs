//! Snapshot building - trims authoritative state down to the wire view

use std::collections::HashMap;

use uuid::Uuid;

use crate::ws::protocol::{LaserView, PlayerView, ServerMsg};

use super::room::{Laser, PlayerState};

/// Client-visible view of a player
pub fn player_view(player: &PlayerState) -> PlayerView {
    PlayerView {
        id: player.id,
        name: player.name.clone(),
        x: player.x,
        y: player.y,
        angle: player.angle,
        color: player.color.to_string(),
        alive: player.alive,
    }
}

/// Client-visible view of a laser. Owner and velocity are intentionally
/// absent from the wire.
pub fn laser_view(laser: &Laser) -> LaserView {
    LaserView {
        x: laser.x,
        y: laser.y,
        angle: laser.angle,
        color: laser.color.to_string(),
    }
}

/// Build the periodic full-state snapshot
pub fn game_state(players: &HashMap<Uuid, PlayerState>, lasers: &[Laser]) -> ServerMsg {
    ServerMsg::GameState {
        players: players.values().map(player_view).collect(),
        lasers: lasers.iter().map(laser_view).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_omits_internal_laser_fields() {
        let laser = Laser {
            id: 7,
            owner: Uuid::new_v4(),
            x: 10.0,
            y: 20.0,
            vx: 600.0,
            vy: 0.0,
            angle: 0.0,
            color: "#00ffff",
        };

        let msg = game_state(&HashMap::new(), &[laser]);
        let value = serde_json::to_value(&msg).unwrap();
        let wire_laser = &value["lasers"][0];

        assert_eq!(wire_laser["x"], 10.0);
        assert_eq!(wire_laser["color"], "#00ffff");
        assert!(wire_laser.get("owner").is_none());
        assert!(wire_laser.get("vx").is_none());
        assert!(wire_laser.get("id").is_none());
    }

    #[test]
    fn snapshot_omits_player_rate_limit_state() {
        let player = PlayerState {
            id: Uuid::new_v4(),
            name: "Player 1".to_string(),
            slot: 0,
            x: 100.0,
            y: 400.0,
            angle: 0.0,
            color: "#00ffff",
            alive: true,
            last_shot_ms: 123_456,
        };

        let mut players = HashMap::new();
        players.insert(player.id, player);

        let value = serde_json::to_value(game_state(&players, &[])).unwrap();
        let wire_player = &value["players"][0];

        assert_eq!(wire_player["name"], "Player 1");
        assert_eq!(wire_player["alive"], true);
        assert!(wire_player.get("lastShotMs").is_none());
        assert!(wire_player.get("last_shot_ms").is_none());
        assert!(wire_player.get("slot").is_none());
    }
}
