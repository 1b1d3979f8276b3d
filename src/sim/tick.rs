//! Per-frame simulation tick
//!
//! One call per display frame: sample input, patrol enemies, integrate,
//! resolve collisions, then let the flow controller react.

use super::collision::resolve;
use super::physics::integrate;
use super::state::{GameEvent, GameState};
use super::timers::TimerKind;

/// Held actions for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Jump key currently held; the tick derives the press edge itself
    pub jump: bool,
}

/// Advance the game state by one frame
///
/// Does nothing to gameplay state outside `Playing`; only the jump edge
/// tracker keeps following the input so a held key cannot jump on resume.
pub fn tick(state: &mut GameState, input: &TickInput) {
    let jump_pressed = input.jump && !state.jump_held;
    state.jump_held = input.jump;

    if !state.is_playing() {
        return;
    }

    state.frame += 1;

    if state.capabilities.enemies {
        for enemy in &mut state.world.enemies {
            enemy.patrol();
        }
    }

    let motion = integrate(
        &mut state.player,
        input,
        jump_pressed,
        state.tuning.max_fall_speed,
    );
    if motion.jumped {
        state.events.push(GameEvent::Jumped);
    }

    let level = &state.levels[state.level_index];
    let resolution = resolve(
        level,
        state.capabilities,
        &state.tuning,
        &mut state.player,
        &mut state.world,
        motion,
    );

    if resolution.invulnerability_started {
        state.timers.schedule(
            TimerKind::InvulnerabilityExpiry,
            state.clock_ms + state.tuning.invulnerability_ms,
        );
    }

    state.apply_resolution(resolution);
}
