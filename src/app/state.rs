//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::{GameRoom, RoomHandle};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub room: RoomHandle,
}

impl AppState {
    /// Build the state and the room task it hands intents to. The caller
    /// spawns the returned room.
    pub fn new(config: Config) -> (Self, GameRoom) {
        let (room, handle) = GameRoom::new(config.game);

        let state = Self {
            config: Arc::new(config),
            room: handle,
        };

        (state, room)
    }
}
