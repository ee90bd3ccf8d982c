//! Room state and authoritative tick loop
//!
//! A single `GameRoom` task owns `RoomState` exclusively. Connects,
//! disconnects, and client intents arrive on an mpsc queue and are drained
//! at the top of each tick; the tick body never awaits input. Respawn and
//! round-restart deadlines are countdown fields decremented inside the
//! tick and keyed by the round generation, so a deadline whose subject
//! left or whose round changed fires as a no-op.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::util::time::{tick_delta, unix_millis, TICK_DURATION_MICROS};
use crate::ws::protocol::{ClientMsg, EndReason, ServerMsg};

use super::arena::{self, Rect};
use super::snapshot;
use super::{Outbound, RoomInput};

/// The room never holds more than two combatants
pub const ROOM_CAPACITY: usize = 2;

/// Pause between the second join and the actual round start, so both
/// clients can render the lobby
const JOIN_GRACE_SECS: f32 = 2.0;

/// Pause between round end and automatic restart
const RESTART_DELAY_SECS: f32 = 5.0;

/// Lasers spawn this far along the firing angle from the player center
const MUZZLE_OFFSET: f32 = 20.0;

/// Color tag per player slot
const PLAYER_COLORS: [&str; 2] = ["#00ffff", "#ff00ff"];

const WAITING_MESSAGE: &str = "Waiting for another player...";
const FULL_MESSAGE: &str = "Game is full. Try again later.";

/// Round phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundPhase {
    /// Fewer than two players, nothing simulated
    Waiting,
    /// Two players present, join grace running
    Starting { grace_left: f32 },
    /// Round timer running, simulation advancing
    Active,
    /// Results broadcast, restart pending
    Ended { restart_left: f32 },
}

/// Player state in the room (authoritative)
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub id: Uuid,
    pub name: String,
    pub slot: usize,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub color: &'static str,
    pub alive: bool,
    /// Last accepted shot timestamp (ms), drives the fire cooldown
    pub last_shot_ms: u64,
}

/// Live laser. Ids are monotonic and never reused.
#[derive(Debug, Clone)]
pub struct Laser {
    pub id: u64,
    pub owner: Uuid,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub angle: f32,
    pub color: &'static str,
}

/// Deferred respawn, checked against the round generation when it fires
#[derive(Debug, Clone)]
struct PendingRespawn {
    player: Uuid,
    delay_left: f32,
    round_gen: u64,
}

/// Authoritative room state (owned by the room task)
pub struct RoomState {
    config: GameConfig,
    pub phase: RoundPhase,
    pub players: HashMap<Uuid, PlayerState>,
    pub lasers: Vec<Laser>,
    pub scores: HashMap<Uuid, u32>,
    pub time_remaining: u32,
    timer_accum: f32,
    next_laser_id: u64,
    round_gen: u64,
    pending_respawns: Vec<PendingRespawn>,
    outbox: Vec<Outbound>,
}

impl RoomState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            phase: RoundPhase::Waiting,
            players: HashMap::new(),
            lasers: Vec::new(),
            scores: HashMap::new(),
            time_remaining: config.round_time_secs,
            timer_accum: 0.0,
            next_laser_id: 0,
            round_gen: 0,
            pending_respawns: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// Drain messages queued since the last flush
    pub fn take_outbox(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    /// First unoccupied slot index
    fn free_slot(&self) -> usize {
        (0..ROOM_CAPACITY)
            .find(|slot| !self.players.values().any(|p| p.slot == *slot))
            .unwrap_or(0)
    }

    /// Admit a new connection, or reject it when the room is full
    pub fn handle_connect(&mut self, id: Uuid) {
        if self.players.len() >= ROOM_CAPACITY {
            warn!(player_id = %id, "Rejecting connection, room is full");
            self.outbox.push(Outbound::only(
                id,
                ServerMsg::GameFull {
                    message: FULL_MESSAGE.to_string(),
                },
            ));
            return;
        }

        let slot = self.free_slot();
        let (x, y) = arena::SPAWN_POINTS[slot];
        let player = PlayerState {
            id,
            name: format!("Player {}", slot + 1),
            slot,
            x,
            y,
            angle: 0.0,
            color: PLAYER_COLORS[slot],
            alive: true,
            last_shot_ms: 0,
        };

        let joined_view = snapshot::player_view(&player);
        self.players.insert(id, player);
        self.scores.insert(id, 0);

        info!(
            player_id = %id,
            slot,
            player_count = self.players.len(),
            "Player joined room"
        );

        self.outbox.push(Outbound::only(
            id,
            ServerMsg::Init {
                player_id: id,
                config: self.config,
                obstacles: arena::OBSTACLES.to_vec(),
                players: self.players.values().map(snapshot::player_view).collect(),
            },
        ));

        self.outbox.push(Outbound::all(ServerMsg::PlayerJoined {
            player_id: id,
            player: joined_view,
            player_count: self.players.len(),
        }));

        if self.players.len() == ROOM_CAPACITY && matches!(self.phase, RoundPhase::Waiting) {
            self.phase = RoundPhase::Starting {
                grace_left: JOIN_GRACE_SECS,
            };
        }
    }

    /// Remove a player; graceful leave and dropped connection both land here
    pub fn handle_disconnect(&mut self, id: Uuid) {
        if self.players.remove(&id).is_none() {
            return;
        }
        self.scores.remove(&id);

        info!(player_id = %id, player_count = self.players.len(), "Player left room");

        self.outbox.push(Outbound::all(ServerMsg::PlayerLeft {
            player_id: id,
            player_count: self.players.len(),
        }));

        if self.players.len() < ROOM_CAPACITY {
            match self.phase {
                RoundPhase::Active => self.end_round(EndReason::PlayerLeft),
                RoundPhase::Starting { .. } => {
                    self.phase = RoundPhase::Waiting;
                    self.outbox.push(Outbound::all(ServerMsg::Waiting {
                        message: WAITING_MESSAGE.to_string(),
                    }));
                }
                _ => {}
            }
        }
    }

    /// Apply a move intent. Position updates are clamped to arena bounds
    /// and rejected wholesale when the body would overlap cover; facing
    /// updates regardless of the movement outcome.
    pub fn handle_move(&mut self, id: Uuid, dx: f32, dy: f32, angle: f32) {
        if !matches!(self.phase, RoundPhase::Active) {
            return;
        }

        let half = self.config.half_player_size();
        let map_w = self.config.map_width;
        let map_h = self.config.map_height;
        let size = self.config.player_size;

        let Some(player) = self.players.get_mut(&id) else {
            return;
        };
        if !player.alive {
            return;
        }

        let nx = (player.x + dx).clamp(half, map_w - half);
        let ny = (player.y + dy).clamp(half, map_h - half);

        let body = Rect::centered_square(nx, ny, size);
        let blocked = arena::OBSTACLES
            .iter()
            .any(|obs| arena::rect_overlap(&body, obs));
        if !blocked {
            player.x = nx;
            player.y = ny;
        }

        player.angle = angle;
    }

    /// Apply a shoot intent. Shots inside the cooldown window are dropped
    /// silently, not queued.
    pub fn handle_shoot(&mut self, id: Uuid, angle: f32, now_ms: u64) {
        if !matches!(self.phase, RoundPhase::Active) {
            return;
        }

        let speed = self.config.laser_speed;
        let cooldown = self.config.laser_cooldown_ms;

        let Some(player) = self.players.get_mut(&id) else {
            return;
        };
        if !player.alive {
            return;
        }
        if now_ms.saturating_sub(player.last_shot_ms) < cooldown {
            return;
        }

        player.last_shot_ms = now_ms;
        let (px, py, color) = (player.x, player.y, player.color);

        let laser = Laser {
            id: self.next_laser_id,
            owner: id,
            x: px + angle.cos() * MUZZLE_OFFSET,
            y: py + angle.sin() * MUZZLE_OFFSET,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            angle,
            color,
        };
        self.next_laser_id += 1;

        self.outbox.push(Outbound::all(ServerMsg::LaserFired {
            player_id: id,
            laser: snapshot::laser_view(&laser),
        }));
        self.lasers.push(laser);
    }

    /// Advance one fixed simulation step
    pub fn run_tick(&mut self) {
        let dt = tick_delta();

        match self.phase {
            RoundPhase::Waiting => {}
            RoundPhase::Starting { grace_left } => {
                let grace_left = grace_left - dt;
                if grace_left > 0.0 {
                    self.phase = RoundPhase::Starting { grace_left };
                } else if self.players.len() == ROOM_CAPACITY {
                    self.start_round();
                } else {
                    self.phase = RoundPhase::Waiting;
                    self.outbox.push(Outbound::all(ServerMsg::Waiting {
                        message: WAITING_MESSAGE.to_string(),
                    }));
                }
            }
            RoundPhase::Active => {
                self.step_lasers(dt);
                if matches!(self.phase, RoundPhase::Active) {
                    self.process_respawns(dt);
                }
                if matches!(self.phase, RoundPhase::Active) {
                    self.tick_countdown(dt);
                }
                // Snapshot still goes out on the tick that ended the round
                self.outbox
                    .push(Outbound::all(snapshot::game_state(&self.players, &self.lasers)));
            }
            RoundPhase::Ended { restart_left } => {
                let restart_left = restart_left - dt;
                if restart_left > 0.0 {
                    self.phase = RoundPhase::Ended { restart_left };
                } else if self.players.len() >= ROOM_CAPACITY {
                    self.start_round();
                } else {
                    self.phase = RoundPhase::Waiting;
                    self.outbox.push(Outbound::all(ServerMsg::Waiting {
                        message: WAITING_MESSAGE.to_string(),
                    }));
                }
            }
        }
    }

    /// Advance lasers, cull the ones that leave the arena or strike cover,
    /// and resolve hits. Simultaneous hits within a tick resolve in laser
    /// index order; this tie-break is deliberate and undefined beyond that.
    fn step_lasers(&mut self, dt: f32) {
        let mut removed: Vec<usize> = Vec::new();

        for idx in 0..self.lasers.len() {
            let (lx, ly, owner) = {
                let laser = &mut self.lasers[idx];
                laser.x += laser.vx * dt;
                laser.y += laser.vy * dt;
                (laser.x, laser.y, laser.owner)
            };

            if lx < 0.0 || lx > self.config.map_width || ly < 0.0 || ly > self.config.map_height {
                removed.push(idx);
                continue;
            }

            if arena::OBSTACLES
                .iter()
                .any(|obs| arena::point_in_rect(lx, ly, obs))
            {
                removed.push(idx);
                continue;
            }

            // Lasers are points; the target body is an expanded square
            // centered on the player. Owners never hit themselves.
            let size = self.config.player_size;
            let target = self
                .players
                .values()
                .find(|p| {
                    p.alive
                        && p.id != owner
                        && arena::point_in_rect(lx, ly, &Rect::centered_square(p.x, p.y, size))
                })
                .map(|p| p.id);

            if let Some(target_id) = target {
                removed.push(idx);
                self.resolve_hit(owner, target_id);
                if !matches!(self.phase, RoundPhase::Active) {
                    // Round ended on this hit; surviving lasers are cleared
                    // at the next round start anyway
                    break;
                }
            }
        }

        for idx in removed.into_iter().rev() {
            if idx < self.lasers.len() {
                self.lasers.remove(idx);
            }
        }
    }

    /// Score a confirmed hit and either end the round or schedule a respawn
    fn resolve_hit(&mut self, shooter_id: Uuid, target_id: Uuid) {
        if let Some(target) = self.players.get_mut(&target_id) {
            target.alive = false;
        }

        let score = {
            let entry = self.scores.entry(shooter_id).or_insert(0);
            *entry += 1;
            *entry
        };

        info!(shooter_id = %shooter_id, target_id = %target_id, score, "Player hit");

        self.outbox.push(Outbound::all(ServerMsg::PlayerHit {
            player_id: target_id,
            shooter_id,
            scores: self.scores.clone(),
        }));

        if score >= self.config.kills_to_win {
            self.end_round(EndReason::KillLimit);
        } else {
            self.pending_respawns.push(PendingRespawn {
                player: target_id,
                delay_left: self.config.respawn_ms as f32 / 1000.0,
                round_gen: self.round_gen,
            });
        }
    }

    /// Fire due respawn deadlines; stale ones (player gone, round changed)
    /// are silent no-ops
    fn process_respawns(&mut self, dt: f32) {
        for pending in &mut self.pending_respawns {
            pending.delay_left -= dt;
        }

        let (due, rest): (Vec<_>, Vec<_>) = self
            .pending_respawns
            .drain(..)
            .partition(|p| p.delay_left <= 0.0);
        self.pending_respawns = rest;

        for pending in due {
            if pending.round_gen != self.round_gen || !matches!(self.phase, RoundPhase::Active) {
                continue;
            }

            let others: Vec<(f32, f32)> = self
                .players
                .values()
                .filter(|p| p.id != pending.player && p.alive)
                .map(|p| (p.x, p.y))
                .collect();
            let (x, y) = arena::farthest_spawn(&others);

            if let Some(player) = self.players.get_mut(&pending.player) {
                player.x = x;
                player.y = y;
                player.alive = true;

                self.outbox.push(Outbound::all(ServerMsg::PlayerRespawn {
                    player_id: pending.player,
                    x,
                    y,
                }));
            }
        }
    }

    /// Advance the once-per-second round countdown
    fn tick_countdown(&mut self, dt: f32) {
        self.timer_accum += dt;
        while self.timer_accum >= 1.0 {
            self.timer_accum -= 1.0;
            self.time_remaining = self.time_remaining.saturating_sub(1);

            if self.time_remaining == 0 {
                self.end_round(EndReason::Timeout);
            }

            self.outbox.push(Outbound::all(ServerMsg::TimerUpdate {
                time_remaining: self.time_remaining,
            }));

            if !matches!(self.phase, RoundPhase::Active) {
                break;
            }
        }
    }

    /// Reset everything and go Active
    fn start_round(&mut self) {
        self.round_gen += 1;
        self.lasers.clear();
        self.pending_respawns.clear();
        self.time_remaining = self.config.round_time_secs;
        self.timer_accum = 0.0;

        for player in self.players.values_mut() {
            let (x, y) = arena::SPAWN_POINTS[player.slot % arena::SPAWN_POINTS.len()];
            player.x = x;
            player.y = y;
            player.alive = true;
            player.last_shot_ms = 0;
        }
        self.scores = self.players.keys().map(|&id| (id, 0)).collect();

        self.phase = RoundPhase::Active;
        info!(round = self.round_gen, "Round started");

        self.outbox.push(Outbound::all(ServerMsg::RoundStart {
            players: self.players.values().map(snapshot::player_view).collect(),
            scores: self.scores.clone(),
            time_remaining: self.time_remaining,
        }));
    }

    /// Determine the winner and go Ended. A strictly highest score wins;
    /// equal top scores (including 0-0) are a tie with no winner.
    fn end_round(&mut self, reason: EndReason) {
        let mut winner: Option<Uuid> = None;
        let mut high_score: i64 = -1;
        let mut tie = false;

        for (&id, &score) in &self.scores {
            if i64::from(score) > high_score {
                high_score = i64::from(score);
                winner = Some(id);
                tie = false;
            } else if i64::from(score) == high_score {
                tie = true;
            }
        }
        let winner = if tie { None } else { winner };
        let winner_name = winner
            .and_then(|id| self.players.get(&id))
            .map(|p| p.name.clone());

        self.phase = RoundPhase::Ended {
            restart_left: RESTART_DELAY_SECS,
        };

        info!(?reason, winner = ?winner, tie, "Round ended");

        self.outbox.push(Outbound::all(ServerMsg::RoundEnd {
            reason,
            winner,
            winner_name,
            scores: self.scores.clone(),
            tie,
        }));
    }
}

/// Handle to the running room
#[derive(Clone)]
pub struct RoomHandle {
    pub input_tx: mpsc::Sender<RoomInput>,
    pub outbound_tx: broadcast::Sender<Outbound>,
    player_count: Arc<AtomicUsize>,
}

impl RoomHandle {
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }
}

/// The authoritative game room task
pub struct GameRoom {
    state: RoomState,
    input_rx: mpsc::Receiver<RoomInput>,
    outbound_tx: broadcast::Sender<Outbound>,
    player_count: Arc<AtomicUsize>,
}

impl GameRoom {
    pub fn new(config: GameConfig) -> (Self, RoomHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (outbound_tx, _) = broadcast::channel(256);
        let player_count = Arc::new(AtomicUsize::new(0));

        let handle = RoomHandle {
            input_tx,
            outbound_tx: outbound_tx.clone(),
            player_count: player_count.clone(),
        };

        let room = Self {
            state: RoomState::new(config),
            input_rx,
            outbound_tx,
            player_count,
        };

        (room, handle)
    }

    /// Run the fixed-rate tick loop. Inputs are drained before each tick;
    /// the tick itself never awaits.
    pub async fn run(mut self) {
        info!("Game room started");

        let mut tick_interval = interval(Duration::from_micros(TICK_DURATION_MICROS));
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            self.process_inputs();
            self.state.run_tick();
            self.flush_outbox();
        }
    }

    /// Apply all pending mutations queued since the last tick
    fn process_inputs(&mut self) {
        while let Ok(input) = self.input_rx.try_recv() {
            match input {
                RoomInput::Connect { id } => self.state.handle_connect(id),
                RoomInput::Intent { id, msg } => match msg {
                    ClientMsg::Move { dx, dy, angle } => self.state.handle_move(id, dx, dy, angle),
                    ClientMsg::Shoot { angle } => self.state.handle_shoot(id, angle, unix_millis()),
                },
                RoomInput::Disconnect { id } => self.state.handle_disconnect(id),
            }
        }

        self.player_count
            .store(self.state.players.len(), Ordering::Relaxed);
    }

    fn flush_outbox(&mut self) {
        for out in self.state.take_outbox() {
            // Send errors only mean no session is subscribed right now
            let _ = self.outbound_tx.send(out);
        }
    }
}
