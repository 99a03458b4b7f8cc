//! Game server implementation.

use crate::config::Config;
use futures_util::{SinkExt, StreamExt};
use protocol::{CameraState, CellState, FoodState, GameUpdate, ProtocolError, ServerMessage};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

pub mod client;
pub mod game;

pub use game::{run_game_loop, GameState, TickOutcome};

/// World state update broadcast (sent every tick).
///
/// The snapshots are shared between all connections; each one picks its own
/// camera out of `cameras`.
#[derive(Debug, Clone)]
pub struct WorldUpdateBroadcast {
    pub cells: Arc<Vec<CellState>>,
    pub food: Arc<Vec<FoodState>>,
    /// Camera of every client, keyed by client id.
    pub cameras: HashMap<u32, CameraState>,
}

impl WorldUpdateBroadcast {
    /// The update as seen by one client, or `None` if it has no camera yet.
    pub fn game_update(&self, client_id: u32) -> Option<GameUpdate> {
        let camera = *self.cameras.get(&client_id)?;
        Some(GameUpdate {
            camera,
            cells: self.cells.as_ref().clone(),
            food_particles: self.food.as_ref().clone(),
        })
    }
}

/// Connection tracking state (shared across connection handlers).
struct ConnectionState {
    total_connections: usize,
}

impl ConnectionState {
    fn new() -> Self {
        Self { total_connections: 0 }
    }

    /// Try to add a connection, returns true if allowed.
    fn try_add_connection(&mut self, max_total: usize) -> bool {
        if self.total_connections >= max_total {
            return false;
        }
        self.total_connections += 1;
        true
    }

    fn remove_connection(&mut self) {
        self.total_connections = self.total_connections.saturating_sub(1);
    }
}

/// Run the game server. Returns when the listener or the game loop fails.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on ws://{}", addr);

    let conn_state = Arc::new(RwLock::new(ConnectionState::new()));

    let (world_tx, _world_rx) = broadcast::channel::<WorldUpdateBroadcast>(5);
    let game_state = Arc::new(RwLock::new(GameState::new(&config, world_tx)));

    let game_loop_state = Arc::clone(&game_state);
    let tick_interval = config.server.tick_interval_ms;
    let mut game_loop = tokio::spawn(async move {
        game::run_game_loop(game_loop_state, tick_interval).await
    });

    let max_connections = config.server.max_connections;

    loop {
        let (stream, addr) = tokio::select! {
            accepted = listener.accept() => accepted?,
            finished = &mut game_loop => {
                return match finished {
                    Ok(result) => result,
                    Err(e) => Err(e.into()),
                };
            }
        };

        {
            let mut state = conn_state.write().await;
            if !state.try_add_connection(max_connections) {
                warn!("Connection rejected (limit reached): {}", addr);
                continue;
            }
        }

        let game_state = Arc::clone(&game_state);
        let conn_state = Arc::clone(&conn_state);

        tokio::spawn(async move {
            let result = handle_connection(stream, addr, game_state).await;

            conn_state.write().await.remove_connection();

            if let Err(e) = result {
                error!("Connection error from {}: {}", addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    game_state: Arc<RwLock<GameState>>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New connection from {}", addr);

    let (mut write, mut read) = ws_stream.split();

    let (client_id, mut world_rx) = {
        let mut state = game_state.write().await;
        (state.add_client(addr), state.subscribe())
    };

    let result: anyhow::Result<()> = async {
        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let reply = {
                                let mut state = game_state.write().await;
                                state.handle_message(client_id, text.as_str())
                            };
                            match reply {
                                Ok(Some(reply)) => {
                                    write.send(Message::Text(reply.encode()?.into())).await?;
                                }
                                Ok(None) => {}
                                Err(e) => warn!("Message error from {}: {}", addr, e),
                            }
                        }
                        Some(Ok(Message::Binary(_))) => {
                            warn!("Message error from {}: {}", addr, ProtocolError::NotText);
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            error!("WebSocket error from {}: {}", addr, e);
                            break;
                        }
                        _ => {}
                    }
                }
                update = world_rx.recv() => {
                    match update {
                        Ok(world) => {
                            if let Some(update) = world.game_update(client_id) {
                                let text = ServerMessage::GameUpdate(update).encode()?;
                                write.send(Message::Text(text.into())).await?;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!("Client {} lagged behind by {} updates", client_id, skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }
        Ok(())
    }
    .await;

    game_state.write().await.remove_client(client_id);
    result
}
