//! Game state and main loop.

use crate::config::Config;
use crate::world::{JoinError, TickSummary, World, WorldError};
use glam::Vec2;
use protocol::{ClientMessage, JoinGameResponse, ServerMessage};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::client::{Camera, Client};
use super::WorldUpdateBroadcast;

/// How often the loop logs its statistics line, in ticks.
const STATS_EVERY_TICKS: u64 = 250;

/// Result of one tick, ready to be broadcast once the lock is released.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub update: WorldUpdateBroadcast,
    pub summary: TickSummary,
}

/// Main game state.
pub struct GameState {
    pub config: Config,
    pub tick_count: u64,
    pub start_time: std::time::Instant,

    next_client_id: u32,

    // Connected clients
    pub clients: HashMap<u32, Client>,

    pub world: World,

    world_tx: broadcast::Sender<WorldUpdateBroadcast>,

    /// Smoothed tick duration in milliseconds.
    pub update_time_avg: f64,
    /// Food consumed since startup.
    pub food_eaten_total: u64,
}

impl GameState {
    pub fn new(config: &Config, world_tx: broadcast::Sender<WorldUpdateBroadcast>) -> Self {
        Self::with_world(config, World::new(config), world_tx)
    }

    /// Build a game state around an existing world.
    pub fn with_world(
        config: &Config,
        world: World,
        world_tx: broadcast::Sender<WorldUpdateBroadcast>,
    ) -> Self {
        Self {
            config: config.clone(),
            tick_count: 0,
            start_time: std::time::Instant::now(),
            next_client_id: 1,
            clients: HashMap::new(),
            world,
            world_tx,
            update_time_avg: 0.0,
            food_eaten_total: 0,
        }
    }

    /// Seed the world with its initial food.
    pub fn populate(&mut self) {
        let amount = self.config.food.amount;
        self.world.spawn_food(amount);
        info!("World initialized: {} food", self.world.food.len());
    }

    /// Register a new client. It starts as a spectator looking at the world center.
    pub fn add_client(&mut self, addr: SocketAddr) -> u32 {
        let id = self.next_client_id;
        self.next_client_id += 1;
        let camera = Camera::new(
            self.world.border.center(),
            self.config.camera.view_area_width as f32,
        );
        self.clients.insert(id, Client::new(id, addr, camera));
        info!("Client {} connected from {}", id, addr);
        id
    }

    /// Remove a client and the player it controlled.
    pub fn remove_client(&mut self, id: u32) {
        if let Some(client) = self.clients.remove(&id) {
            info!("Client {} ({}) disconnected", id, client.addr);
            if let Some(player_id) = client.player_id {
                self.world.remove_player(player_id);
            }
        }
    }

    /// Subscribe to per-tick world updates.
    pub fn subscribe(&self) -> broadcast::Receiver<WorldUpdateBroadcast> {
        self.world_tx.subscribe()
    }

    /// Handle a text frame from a client. Returns the direct reply, if any.
    pub fn handle_message(
        &mut self,
        client_id: u32,
        text: &str,
    ) -> anyhow::Result<Option<ServerMessage>> {
        let message = ClientMessage::decode(text)?;

        let client = self
            .clients
            .get_mut(&client_id)
            .ok_or_else(|| anyhow::anyhow!("Client not found"))?;

        match message {
            ClientMessage::JoinGameRequest => {
                let joined = if client.player_id.is_some() {
                    Err(JoinError::AlreadyJoined)
                } else {
                    self.world.spawn_player()
                };

                let response = match joined {
                    Ok(player_id) => {
                        client.player_id = Some(player_id);
                        if let Ok(cell) = self.world.player_cell(player_id) {
                            client.camera.update_view(cell.position);
                        }
                        info!("Client {} joined as player {}", client_id, player_id);
                        JoinGameResponse {
                            join_successful: true,
                            player_id: Some(player_id),
                        }
                    }
                    Err(e) => {
                        warn!("Join refused for client {}: {}", client_id, e);
                        JoinGameResponse {
                            join_successful: false,
                            player_id: None,
                        }
                    }
                };
                Ok(Some(ServerMessage::JoinGameResponse(response)))
            }
            ClientMessage::TargetPositionUpdate { position } => {
                match client.player_id {
                    Some(player_id) => {
                        self.world.set_target(player_id, Some(Vec2::from(position)))?;
                    }
                    None => {
                        debug!("Ignoring target from spectating client {}", client_id);
                    }
                }
                Ok(None)
            }
        }
    }

    /// Advance the world one tick and move every camera onto its player's cell.
    pub fn tick(&mut self) -> Result<TickOutcome, WorldError> {
        let summary = self.world.update()?;
        self.tick_count += 1;
        self.food_eaten_total += summary.food_eaten as u64;

        for client in self.clients.values_mut() {
            let Some(player_id) = client.player_id else {
                continue;
            };
            if summary.eliminated.contains(&player_id) {
                info!("Player {} (client {}) was consumed", player_id, client.id);
                client.player_id = None;
                continue;
            }
            let cell = self.world.player_cell(player_id)?;
            client.camera.update_view(cell.position);
        }

        let cameras = self
            .clients
            .values()
            .map(|client| (client.id, client.camera.to_state()))
            .collect();

        Ok(TickOutcome {
            update: WorldUpdateBroadcast {
                cells: Arc::new(self.world.cell_states()),
                food: Arc::new(self.world.food_states()),
                cameras,
            },
            summary,
        })
    }
}

/// Run the game loop until the world reports a broken invariant.
pub async fn run_game_loop(state: Arc<RwLock<GameState>>, tick_interval_ms: u64) -> anyhow::Result<()> {
    let start = Instant::now() + Duration::from_millis(tick_interval_ms);
    let mut ticker = interval_at(start, Duration::from_millis(tick_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    state.write().await.populate();

    loop {
        ticker.tick().await;

        // Hibernate when no users are connected
        {
            let game = state.read().await;
            if game.clients.is_empty() {
                drop(game);
                sleep(Duration::from_millis((tick_interval_ms * 4).max(100))).await;
                continue;
            }
        }

        let (outcome, world_tx) = {
            let mut game = state.write().await;
            let tick_start = std::time::Instant::now();
            let outcome = match game.tick() {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Stopping game loop at tick #{}: {}", game.tick_count, e);
                    return Err(e.into());
                }
            };
            let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;
            game.update_time_avg = game.update_time_avg * 0.5 + tick_ms * 0.5;

            let tick_budget = tick_interval_ms as f64 * 0.9;
            if tick_ms > tick_budget {
                warn!(
                    "Slow tick #{}: {:.3}ms (budget: {:.1}ms) - {} players, {} food",
                    game.tick_count,
                    tick_ms,
                    tick_budget,
                    game.world.player_count(),
                    game.world.food.len()
                );
            }

            if game.tick_count % STATS_EVERY_TICKS == 0 {
                debug!(
                    "Tick #{} (up {}s): {} clients, {} players, {} cells, {} food, {} eaten total, avg {:.3}ms",
                    game.tick_count,
                    game.start_time.elapsed().as_secs(),
                    game.clients.len(),
                    game.world.player_count(),
                    game.world.cells.len(),
                    game.world.food.len(),
                    game.food_eaten_total,
                    game.update_time_avg
                );
            }

            (outcome, game.world_tx.clone())
        }; // Write lock released here

        if !outcome.summary.captures.is_empty() {
            debug!("Captures this tick: {:?}", outcome.summary.captures);
        }

        // No receivers just means nobody is listening this tick
        let _ = world_tx.send(outcome.update);
    }
}
