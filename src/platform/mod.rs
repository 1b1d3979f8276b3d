//! Platform abstraction layer
//!
//! Keyboard mapping shared by every host, plus browser-only glue in [`web`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::sim::TickInput;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// What a key does in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    /// Continue after a win or loss
    Continue,
}

impl Action {
    /// Held actions feed the simulation; the rest are one-shot commands
    pub fn is_held(self) -> bool {
        !matches!(self, Action::Continue)
    }
}

/// Map a `KeyboardEvent.key` value to an action
pub fn action_for_key(key: &str) -> Option<Action> {
    match canonical_key(key).as_str() {
        "ArrowLeft" | "a" => Some(Action::MoveLeft),
        "ArrowRight" | "d" => Some(Action::MoveRight),
        "ArrowUp" | "w" | " " => Some(Action::Jump),
        "Enter" => Some(Action::Continue),
        _ => None,
    }
}

/// Wall-clock time in ms since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn wall_clock_ms() -> f64 {
    js_sys::Date::now()
}

/// Wall-clock time in ms since the Unix epoch (0 if the system clock is
/// before it)
#[cfg(not(target_arch = "wasm32"))]
pub fn wall_clock_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Single characters fold to lowercase so Shift between press and release
/// still matches ("a" down, "A" up)
fn canonical_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_lowercase().collect(),
        _ => key.to_string(),
    }
}

/// Pressed-key tracker
///
/// Several keys can map to the same action; the action stays held until
/// every one of them is released. Keys are stored in canonical form.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press; returns the mapped action, if any
    pub fn key_down(&mut self, key: &str) -> Option<Action> {
        let action = action_for_key(key)?;
        if action.is_held() {
            self.held.insert(canonical_key(key));
        }
        Some(action)
    }

    /// Record a key release
    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&canonical_key(key));
    }

    /// Release everything (focus lost)
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.iter().any(|k| action_for_key(k) == Some(action))
    }

    /// Sample the held keys for one simulation step
    pub fn snapshot(&self) -> TickInput {
        TickInput {
            move_left: self.is_held(Action::MoveLeft),
            move_right: self.is_held(Action::MoveRight),
            jump: self.is_held(Action::Jump),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(action_for_key("ArrowLeft"), Some(Action::MoveLeft));
        assert_eq!(action_for_key("d"), Some(Action::MoveRight));
        assert_eq!(action_for_key(" "), Some(Action::Jump));
        assert_eq!(action_for_key("Enter"), Some(Action::Continue));
        assert_eq!(action_for_key("Escape"), None);
    }

    #[test]
    fn test_held_until_all_keys_released() {
        let mut input = InputState::new();
        input.key_down("ArrowUp");
        input.key_down(" ");
        input.key_up("ArrowUp");
        assert!(input.snapshot().jump);
        input.key_up(" ");
        assert!(!input.snapshot().jump);
    }

    #[test]
    fn test_shift_between_press_and_release() {
        let mut input = InputState::new();
        input.key_down("a");
        assert!(input.is_held(Action::MoveLeft));
        input.key_up("A");
        assert!(!input.is_held(Action::MoveLeft));

        input.key_down("D");
        input.key_up("d");
        assert_eq!(input.snapshot(), TickInput::default());
    }

    #[test]
    fn test_wall_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(wall_clock_ms() > 1_577_836_800_000.0);
    }

    #[test]
    fn test_continue_is_not_held() {
        let mut input = InputState::new();
        assert_eq!(input.key_down("Enter"), Some(Action::Continue));
        assert_eq!(input.snapshot(), TickInput::default());
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut input = InputState::new();
        input.key_down("a");
        input.key_down("d");
        let tick = input.snapshot();
        assert!(tick.move_left && tick.move_right);
        input.clear();
        assert_eq!(input.snapshot(), TickInput::default());
    }
}
