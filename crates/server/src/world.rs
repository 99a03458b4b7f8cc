//! World state management.
//!
//! Owns the cell and food object maps, the players, and the player id pool,
//! and advances them one tick at a time.

use crate::config::Config;
use crate::entity::{Cell, FoodParticle, ObjectId, Player, PlayerId};
use crate::spatial::ObjectMap;
use fixedbitset::FixedBitSet;
use glam::Vec2;
use protocol::{CellState, FoodState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Why a join request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("server is full")]
    ServerFull,
    #[error("client already controls a player")]
    AlreadyJoined,
}

/// Broken invariants between players and cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("player {player} references cell {cell}, which is not in the world")]
    MissingCell { player: PlayerId, cell: ObjectId },
    #[error("player {0} does not exist")]
    UnknownPlayer(PlayerId),
}

/// World border bounds. The world spans `(0, 0)` to `(width, height)`.
#[derive(Debug, Clone, Copy)]
pub struct WorldBorder {
    pub width: f32,
    pub height: f32,
}

impl WorldBorder {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Get a random position within the border.
    #[inline]
    pub fn random_position(&self, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(rng.random_range(0.0..self.width), rng.random_range(0.0..self.height))
    }

    /// Clamp a point onto the border rectangle.
    #[inline]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(Vec2::ZERO, Vec2::new(self.width, self.height))
    }
}

/// Tunables the tick needs, copied out of [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct Rules {
    pub start_mass: f32,
    pub step: f32,
    pub mass_per_food: f32,
    pub food_radius: f32,
}

impl Rules {
    pub fn from_config(config: &Config) -> Self {
        Self {
            start_mass: config.player.start_mass as f32,
            step: config.player.speed as f32,
            mass_per_food: config.player.mass_per_food as f32,
            food_radius: config.food.radius as f32,
        }
    }
}

/// Fixed-size pool of player ids. The lowest free id is handed out first.
#[derive(Debug)]
struct PlayerSlots {
    used: FixedBitSet,
}

impl PlayerSlots {
    fn new(capacity: usize) -> Self {
        Self {
            used: FixedBitSet::with_capacity(capacity),
        }
    }

    fn acquire(&mut self) -> Option<PlayerId> {
        let slot = self.used.zeroes().next()?;
        self.used.insert(slot);
        Some(slot as PlayerId)
    }

    fn release(&mut self, id: PlayerId) {
        let slot = id as usize;
        if slot < self.used.len() {
            self.used.set(slot, false);
        }
    }

    fn free(&self) -> usize {
        self.used.len() - self.used.count_ones(..)
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// Food particles consumed this tick.
    pub food_eaten: usize,
    /// Cells consumed this tick: (eater, eaten).
    pub captures: Vec<(ObjectId, ObjectId)>,
    /// Players whose cell was consumed. Their ids are already back in the pool.
    pub eliminated: Vec<PlayerId>,
}

/// The game world containing all cells, food and players.
#[derive(Debug)]
pub struct World {
    /// Next object ID to assign.
    next_object_id: ObjectId,

    /// Player cells.
    pub cells: ObjectMap<Cell>,
    /// Food particles.
    pub food: ObjectMap<FoodParticle>,

    players: HashMap<PlayerId, Player>,
    player_slots: PlayerSlots,

    /// World border.
    pub border: WorldBorder,
    pub rules: Rules,

    rng: StdRng,
}

impl World {
    /// Create an empty world from configuration, seeded from the OS.
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create an empty world whose random choices are reproducible.
    pub fn with_seed(config: &Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &Config, rng: StdRng) -> Self {
        let border = WorldBorder::new(config.border.width as f32, config.border.height as f32);
        Self {
            next_object_id: 1,
            cells: ObjectMap::new(Vec2::ZERO, border.width, border.height),
            food: ObjectMap::new(Vec2::ZERO, border.width, border.height),
            players: HashMap::with_capacity(config.server.max_players),
            player_slots: PlayerSlots::new(config.server.max_players),
            border,
            rules: Rules::from_config(config),
            rng,
        }
    }

    /// Get the next object ID.
    pub fn next_id(&mut self) -> ObjectId {
        let id = self.next_object_id;
        self.next_object_id = self.next_object_id.wrapping_add(1);
        if self.next_object_id == 0 {
            self.next_object_id = 1; // Skip 0
        }
        id
    }

    /// Scatter `amount` food particles with random positions and hues.
    pub fn spawn_food(&mut self, amount: usize) {
        for _ in 0..amount {
            let position = self.border.random_position(&mut self.rng);
            let hue = self.rng.random::<u8>();
            self.add_food(position, hue);
        }
    }

    /// Place one food particle.
    pub fn add_food(&mut self, position: Vec2, hue: u8) -> ObjectId {
        let id = self.next_id();
        self.food
            .add(&FoodParticle::new(id, position, self.rules.food_radius, hue));
        id
    }

    /// Create a player with a fresh cell at a random position.
    pub fn spawn_player(&mut self) -> Result<PlayerId, JoinError> {
        let position = self.border.random_position(&mut self.rng);
        self.spawn_player_at(position)
    }

    /// Create a player whose cell starts at `position`.
    pub fn spawn_player_at(&mut self, position: Vec2) -> Result<PlayerId, JoinError> {
        let player_id = self.player_slots.acquire().ok_or(JoinError::ServerFull)?;

        let cell_id = self.next_id();
        self.cells.add(&Cell::new(cell_id, position, self.rules.start_mass));
        self.players.insert(player_id, Player::new(player_id, cell_id));

        debug!("Spawned player {} with cell {} at ({:.0}, {:.0})", player_id, cell_id, position.x, position.y);
        Ok(player_id)
    }

    /// Remove a player and its cell, returning its id to the pool.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let player = self.players.remove(&id)?;
        self.cells.remove(player.cell_id);
        self.player_slots.release(id);
        debug!("Removed player {} (cell {})", id, player.cell_id);
        Some(player)
    }

    /// Set where a player's cell should head. The target is clamped to the border.
    pub fn set_target(&mut self, id: PlayerId, target: Option<Vec2>) -> Result<(), WorldError> {
        let border = self.border;
        let player = self.players.get_mut(&id).ok_or(WorldError::UnknownPlayer(id))?;
        player.target = target.map(|t| border.clamp(t));
        Ok(())
    }

    #[inline]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    #[inline]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Player ids still available.
    #[inline]
    pub fn free_player_slots(&self) -> usize {
        self.player_slots.free()
    }

    /// The cell a player controls.
    pub fn player_cell(&self, id: PlayerId) -> Result<Cell, WorldError> {
        let player = self.players.get(&id).ok_or(WorldError::UnknownPlayer(id))?;
        self.cells.get(player.cell_id).ok_or(WorldError::MissingCell {
            player: id,
            cell: player.cell_id,
        })
    }

    /// Advance the world by one tick.
    ///
    /// Players are processed in id order. Each one moves its cell toward its
    /// target, consumes the food and smaller cells it now overlaps, and
    /// stores the cell back. A player whose cell was consumed earlier in the
    /// same tick is removed instead.
    pub fn update(&mut self) -> Result<TickSummary, WorldError> {
        let mut summary = TickSummary::default();

        let mut order: Vec<PlayerId> = self.players.keys().copied().collect();
        order.sort_unstable();

        let mut eaten_cells: HashSet<ObjectId> = HashSet::new();

        for player_id in order {
            let Some(player) = self.players.get(&player_id).cloned() else {
                continue;
            };
            if eaten_cells.contains(&player.cell_id) {
                continue;
            }

            let mut cell = self.cells.get(player.cell_id).ok_or(WorldError::MissingCell {
                player: player_id,
                cell: player.cell_id,
            })?;

            if let Some(target) = player.target {
                cell.move_towards(target, self.rules.step);
            }

            for food in self.food.find_smaller_intersecting(&cell) {
                self.food.remove(food.id);
                cell.mass += self.rules.mass_per_food;
                summary.food_eaten += 1;
            }

            for prey in self.cells.find_smaller_intersecting(&cell) {
                self.cells.remove(prey.id);
                cell.mass += prey.mass;
                eaten_cells.insert(prey.id);
                summary.captures.push((cell.id, prey.id));
            }

            self.cells.add(&cell);
        }

        if !eaten_cells.is_empty() {
            let victims: Vec<PlayerId> = self
                .players
                .values()
                .filter(|p| eaten_cells.contains(&p.cell_id))
                .map(|p| p.id)
                .collect();
            for id in victims {
                self.remove_player(id);
                summary.eliminated.push(id);
            }
            summary.eliminated.sort_unstable();
        }

        Ok(summary)
    }

    /// Snapshot of every cell.
    pub fn cell_states(&self) -> Vec<CellState> {
        self.cells.get_all().iter().map(Cell::to_state).collect()
    }

    /// Snapshot of every food particle.
    pub fn food_states(&self) -> Vec<FoodState> {
        self.food.get_all().iter().map(FoodParticle::to_state).collect()
    }
}
