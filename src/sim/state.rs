//! Game state and core simulation types
//!
//! Everything that changes during an attempt lives here. Level data is kept
//! alongside but never mutated.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::level::{Capabilities, CollectibleKind, EnemySpawn, HazardKind, Level};
use super::score::Score;
use super::timers::{TimerKind, Timers};
use crate::error::{Error, Result};
use crate::tuning::Tuning;

/// Current phase of the attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Portal reached; waiting for the player to continue
    Won,
    /// Spike or health loss; waiting for a retry
    Lost,
}

/// Which way the sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub vel_y: f32,
    /// Horizontal pixels per frame
    pub speed: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub grounded: bool,
    pub facing: Facing,
    pub health: i32,
    pub max_health: i32,
    pub invulnerable: bool,
    pub has_key: bool,
    /// Every pickup taken this attempt, in order
    pub collected: Vec<CollectibleKind>,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.player_start_x, tuning.player_start_y),
            width: tuning.player_width,
            height: tuning.player_height,
            vel_y: 0.0,
            speed: tuning.player_speed,
            gravity: tuning.gravity,
            jump_impulse: tuning.jump_impulse,
            grounded: true,
            facing: Facing::Right,
            health: tuning.max_health,
            max_health: tuning.max_health,
            invulnerable: false,
            has_key: false,
            collected: Vec::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, self.width, self.height)
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height
    }

    /// Subtract health, keeping it within [0, max]
    pub fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).clamp(0, self.max_health);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// A patrolling enemy at runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// +1 right, -1 left
    pub direction: f32,
    pub start_x: f32,
    pub end_x: f32,
}

impl Enemy {
    pub fn from_spawn(spawn: &EnemySpawn) -> Self {
        Self {
            pos: Vec2::new(spawn.rect.x, spawn.rect.y),
            width: spawn.rect.width,
            height: spawn.rect.height,
            speed: spawn.speed,
            direction: if spawn.direction < 0.0 { -1.0 } else { 1.0 },
            start_x: spawn.start_x,
            end_x: spawn.end_x,
        }
    }

    /// Advance one frame, turning around at either bound
    pub fn patrol(&mut self) {
        self.pos.x += self.speed * self.direction;
        if self.pos.x >= self.end_x {
            self.pos.x = self.end_x;
            self.direction = -1.0;
        } else if self.pos.x <= self.start_x {
            self.pos.x = self.start_x;
            self.direction = 1.0;
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, self.width, self.height)
    }
}

/// Runtime flags of one secret area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretState {
    pub unlocked: bool,
    pub collected: Vec<bool>,
}

/// Per-level dynamic state, rebuilt on every (re)start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelState {
    pub enemies: Vec<Enemy>,
    /// Parallel to `Level::collectibles`
    pub collected: Vec<bool>,
    /// Parallel to `Level::secret_areas`
    pub secrets: Vec<SecretState>,
}

impl LevelState {
    pub fn new(level: &Level) -> Self {
        Self {
            enemies: level.enemies.iter().map(Enemy::from_spawn).collect(),
            collected: vec![false; level.collectibles.len()],
            secrets: level
                .secret_areas
                .iter()
                .map(|s| SecretState {
                    unlocked: !s.requires_key,
                    collected: vec![false; s.collectibles.len()],
                })
                .collect(),
        }
    }
}

/// What hurt the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Hazard(HazardKind),
    Enemy,
}

/// Why an attempt ended in a loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossCause {
    Spike,
    Health,
}

/// Events raised by the simulation for audio, persistence and UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Bounced { force: f32 },
    Damaged { source: DamageSource, amount: i32, health: i32 },
    SpikeHit,
    Collected { kind: CollectibleKind, points: u64 },
    SecretUnlocked { index: usize },
    PortalReached,
    InvulnerabilityEnded,
    MelodyCue,
    Won { level_index: usize, score: u64 },
    Lost { level_index: usize, score: u64, cause: LossCause },
}

/// Complete session state: level source, current attempt and timers
#[derive(Debug, Clone)]
pub struct GameState {
    /// Ordered level source (read-only)
    pub(crate) levels: Vec<Level>,
    pub tuning: Tuning,
    /// Index into `levels`; advances on win, wraps at the end
    pub(crate) level_index: usize,
    pub capabilities: Capabilities,
    pub phase: GamePhase,
    pub player: Player,
    pub world: LevelState,
    pub score: Score,
    pub timers: Timers,
    /// Milliseconds since the session started
    pub clock_ms: f64,
    /// Frames stepped in the current attempt
    pub frame: u64,
    /// Jump held on the previous frame (for edge detection)
    pub(crate) jump_held: bool,
    /// Raised since the last drain
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Start a session on the first level
    pub fn new(levels: Vec<Level>, tuning: Tuning) -> Result<Self> {
        let first = levels.first().ok_or(Error::NoLevels)?;
        let player = Player::new(&tuning);
        let world = LevelState::new(first);
        let capabilities = first.capabilities();
        let mut state = Self {
            levels,
            tuning,
            level_index: 0,
            capabilities,
            phase: GamePhase::Playing,
            player,
            world,
            score: Score::default(),
            timers: Timers::new(),
            clock_ms: 0.0,
            frame: 0,
            jump_held: false,
            events: Vec::new(),
        };
        state.start_level();
        Ok(state)
    }

    pub fn level(&self) -> &Level {
        &self.levels[self.level_index]
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Rebuild the player and per-level state for the current level index
    pub(crate) fn start_level(&mut self) {
        let level = &self.levels[self.level_index];
        self.capabilities = level.capabilities();
        self.world = LevelState::new(level);
        self.player = Player::new(&self.tuning);
        self.score.break_combo();
        self.frame = 0;
        self.phase = GamePhase::Playing;

        self.timers.cancel(TimerKind::InvulnerabilityExpiry);
        self.timers.schedule(
            TimerKind::MelodyRepeat,
            self.clock_ms + self.tuning.melody_interval_ms,
        );
        log::info!(
            "Level {} ({}) started",
            self.level_index + 1,
            self.levels[self.level_index].name
        );
    }

    /// Advance the session clock, running any timers that come due
    ///
    /// Independent of frame steps: a host may call this between frames.
    pub fn advance_clock(&mut self, elapsed_ms: f64) {
        self.clock_ms += elapsed_ms.max(0.0);
        while let Some(fired) = self.timers.pop_due(self.clock_ms) {
            match fired.kind {
                TimerKind::InvulnerabilityExpiry => {
                    self.player.invulnerable = false;
                    self.events.push(GameEvent::InvulnerabilityEnded);
                }
                TimerKind::MelodyRepeat => {
                    self.events.push(GameEvent::MelodyCue);
                    if self.phase == GamePhase::Playing {
                        self.timers.schedule(
                            TimerKind::MelodyRepeat,
                            fired.due_ms + self.tuning.melody_interval_ms,
                        );
                    }
                }
            }
        }
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}
