//! Per-frame integration of player motion
//!
//! One call per frame; the timestep is implicitly one unit. Horizontal motion
//! is instantaneous (no horizontal velocity), vertical motion accumulates
//! gravity. The vertical result is only a proposal until collisions resolve it.

use super::state::{Facing, Player};
use super::tick::TickInput;

/// Vertical move proposed for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// y before the step
    pub prev_y: f32,
    /// Proposed y after the step
    pub next_y: f32,
    /// Integrated vertical velocity (sign gives the sweep direction)
    pub vel_y: f32,
    /// A jump started this frame
    pub jumped: bool,
}

/// Advance the player by one frame
///
/// `jump_pressed` must be the jump *edge* (pressed this frame, not held).
/// Jumping requires `grounded`, which only a landing can restore, so there is
/// no double jump.
pub fn integrate(
    player: &mut Player,
    input: &TickInput,
    jump_pressed: bool,
    max_fall_speed: Option<f32>,
) -> Motion {
    if input.move_left {
        player.pos.x -= player.speed;
        player.facing = Facing::Left;
    }
    if input.move_right {
        player.pos.x += player.speed;
        player.facing = Facing::Right;
    }

    let jumped = jump_pressed && player.grounded;
    if jumped {
        player.vel_y = player.jump_impulse;
        player.grounded = false;
    }

    player.vel_y += player.gravity;
    if let Some(cap) = max_fall_speed {
        player.vel_y = player.vel_y.min(cap);
    }

    Motion {
        prev_y: player.pos.y,
        next_y: player.pos.y + player.vel_y,
        vel_y: player.vel_y,
        jumped,
    }
}
