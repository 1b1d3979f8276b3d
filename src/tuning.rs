//! Data-driven physics and gameplay balance.
//!
//! [`Tuning`] mirrors the compile-time defaults in [`crate::consts`]. A JSON
//! document may override any subset of fields; missing keys keep their
//! default, so `{"gravity": 0.5}` is a valid tuning file.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Runtime-tunable physics and gameplay values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // ── Player ────────────────────────────────────────────────────────────
    pub player_start_x: f32,
    pub player_start_y: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub player_speed: f32,
    pub max_health: i32,

    // ── Vertical motion ───────────────────────────────────────────────────
    pub gravity: f32,
    pub jump_impulse: f32,
    /// Fall speed cap; `None` lets the player accelerate without limit.
    pub max_fall_speed: Option<f32>,
    pub default_bounce_force: f32,

    // ── World ─────────────────────────────────────────────────────────────
    /// Clamp the player's right edge to the level's ground extent.
    pub clamp_right_edge: bool,

    // ── Damage ────────────────────────────────────────────────────────────
    pub lava_damage: i32,
    pub lava_knockback: f32,
    pub water_damage: i32,
    pub water_sink_speed: f32,
    pub enemy_damage: i32,

    // ── Timers ────────────────────────────────────────────────────────────
    pub invulnerability_ms: f64,
    pub melody_interval_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_start_x: PLAYER_START_X,
            player_start_y: PLAYER_START_Y,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_speed: PLAYER_SPEED,
            max_health: MAX_HEALTH,

            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,
            max_fall_speed: Some(MAX_FALL_SPEED),
            default_bounce_force: BOUNCE_FORCE,

            clamp_right_edge: true,

            lava_damage: LAVA_DAMAGE,
            lava_knockback: LAVA_KNOCKBACK,
            water_damage: WATER_DAMAGE,
            water_sink_speed: WATER_SINK_SPEED,
            enemy_damage: ENEMY_DAMAGE,

            invulnerability_ms: INVULNERABILITY_MS,
            melody_interval_ms: MELODY_INTERVAL_MS,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document.
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json).map_err(|e| Error::json("tuning", e))?;
        log::info!(
            "Loaded tuning (gravity {}, jump {}, fall cap {:?})",
            tuning.gravity,
            tuning.jump_impulse,
            tuning.max_fall_speed
        );
        Ok(tuning)
    }

    /// Tuning without the fall-speed cap and right-edge clamp.
    pub fn uncapped() -> Self {
        Self {
            max_fall_speed: None,
            clamp_right_edge: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.5, "max_fall_speed": null }"#).unwrap();
        assert_eq!(tuning.gravity, 0.5);
        assert_eq!(tuning.max_fall_speed, None);
        assert_eq!(tuning.jump_impulse, JUMP_IMPULSE);
        assert_eq!(tuning.max_health, MAX_HEALTH);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let err = Tuning::from_json("{ gravity: }").unwrap_err();
        assert!(matches!(err, Error::Json { what: "tuning", .. }));
    }

    #[test]
    fn test_uncapped_disables_both_guards() {
        let tuning = Tuning::uncapped();
        assert!(tuning.max_fall_speed.is_none());
        assert!(!tuning.clamp_right_edge);
    }
}
