//! Portal Hop - A side-scrolling portal platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game flow)
//! - `session`: Per-frame driver tying the simulation to score, wallet and leaderboard
//! - `platform`: Input mapping and the browser host binding
//! - `persistence`: Key/value storage backends with JSON helpers
//! - `tuning`: Data-driven physics and gameplay balance

pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod wallet;

pub use error::{Error, Result};
pub use highscores::HighScores;
pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;
pub use wallet::Wallet;

/// Game configuration constants
///
/// These are the defaults behind [`Tuning`]; a tuning file overrides any subset.
pub mod consts {
    /// Nominal display refresh (one simulation step per frame)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// World floor (top edge of the implicit full-width ground plane)
    pub const GROUND_Y: f32 = 380.0;

    /// Player defaults
    pub const PLAYER_START_X: f32 = 50.0;
    pub const PLAYER_START_Y: f32 = 350.0;
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 30.0;
    /// Horizontal pixels per frame while a direction key is held
    pub const PLAYER_SPEED: f32 = 2.0;
    pub const MAX_HEALTH: i32 = 100;

    /// Downward acceleration per frame
    pub const GRAVITY: f32 = 0.4;
    /// Velocity set on jump (negative = up)
    pub const JUMP_IMPULSE: f32 = -15.0;
    /// Fall speed cap
    pub const MAX_FALL_SPEED: f32 = 20.0;

    /// Velocity given by a bounce pad with no explicit force
    pub const BOUNCE_FORCE: f32 = -18.0;

    /// Hazards
    pub const LAVA_DAMAGE: i32 = 20;
    pub const LAVA_KNOCKBACK: f32 = -10.0;
    pub const WATER_DAMAGE: i32 = 10;
    /// Added to the halved fall speed while in water
    pub const WATER_SINK_SPEED: f32 = 2.0;
    pub const ENEMY_DAMAGE: i32 = 25;

    /// Invulnerability window after taking damage
    pub const INVULNERABILITY_MS: f64 = 1000.0;
    /// Background melody repeat interval
    pub const MELODY_INTERVAL_MS: f64 = 8000.0;

    /// Portal and pickup footprints
    pub const PORTAL_SIZE: f32 = 30.0;
    pub const COLLECTIBLE_SIZE: f32 = 20.0;
}
