//! Game simulation modules

pub mod arena;
pub mod room;
pub mod snapshot;

pub use room::{GameRoom, RoomHandle};

use uuid::Uuid;

use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Mutation request routed into the room task. Every state change,
/// including connect and disconnect, flows through this queue.
#[derive(Debug, Clone)]
pub enum RoomInput {
    /// A new WebSocket connection wants a player slot
    Connect { id: Uuid },
    /// A validated client intent
    Intent { id: Uuid, msg: ClientMsg },
    /// The connection closed (graceful or not)
    Disconnect { id: Uuid },
}

/// Delivery target for an outbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every connected session
    All,
    /// A single session, addressed by player id
    Only(Uuid),
}

impl Recipient {
    /// Whether a session with the given id should deliver this message
    pub fn matches(&self, session_id: Uuid) -> bool {
        match self {
            Recipient::All => true,
            Recipient::Only(id) => *id == session_id,
        }
    }
}

/// Outbound message envelope fanned out to session tasks
#[derive(Debug, Clone)]
pub struct Outbound {
    pub to: Recipient,
    pub msg: ServerMsg,
}

impl Outbound {
    pub fn all(msg: ServerMsg) -> Self {
        Self {
            to: Recipient::All,
            msg,
        }
    }

    pub fn only(id: Uuid, msg: ServerMsg) -> Self {
        Self {
            to: Recipient::Only(id),
            msg,
        }
    }
}
