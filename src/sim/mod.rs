//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per frame
//! - Stable iteration order (level list order)
//! - No rendering, audio or storage dependencies
//!
//! Time-based effects go through the session clock and [`Timers`], never
//! through the frame step itself.

pub mod collision;
pub mod flow;
pub mod geom;
pub mod level;
pub mod physics;
pub mod score;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{Resolution, resolve};
pub use geom::Rect;
pub use level::{
    BouncePlatform, Capabilities, Collectible, CollectibleKind, EnemySpawn, Hazard, HazardKind,
    Level, Portal, SecretArea, builtin_levels, levels_from_json,
};
pub use physics::{Motion, integrate};
pub use score::{Award, Score};
pub use state::{
    DamageSource, Enemy, Facing, GameEvent, GamePhase, GameState, LevelState, LossCause, Player,
    SecretState,
};
pub use tick::{TickInput, tick};
pub use timers::{TimerHandle, TimerKind, Timers};
