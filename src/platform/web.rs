//! Browser glue
//!
//! [`LocalStorage`] backs [`Storage`] with `window.localStorage`; every call
//! re-fetches the handle and a missing or blocked store reads as empty.
//! [`WebGame`] is the wasm-bindgen surface a page script drives once per
//! animation frame.

use wasm_bindgen::prelude::*;

use super::{Action, InputState};
use crate::error::{Error, Result};
use crate::persistence::Storage;
use crate::session::Session;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn handle() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::handle()?.get_item(key).ok()?
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let storage = Self::handle().ok_or_else(|| Error::Storage {
            key: key.to_string(),
            reason: "localStorage unavailable".to_string(),
        })?;
        storage.set_item(key, value).map_err(|e| Error::Storage {
            key: key.to_string(),
            reason: format!("{:?}", e),
        })
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = Self::handle() {
            let _ = storage.remove_item(key);
        }
    }
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// A session plus keyboard state, exported to JavaScript
#[wasm_bindgen]
pub struct WebGame {
    session: Session,
    input: InputState,
}

#[wasm_bindgen]
impl WebGame {
    /// Start on the built-in levels, or on `levels_json` when given
    #[wasm_bindgen(constructor)]
    pub fn new(levels_json: Option<String>) -> std::result::Result<WebGame, JsValue> {
        let storage = Box::new(LocalStorage);
        let session = match levels_json {
            Some(json) => {
                let levels = crate::sim::levels_from_json(&json).map_err(to_js)?;
                Session::new(levels, crate::Tuning::default(), storage)
            }
            None => Session::with_builtin_levels(storage),
        }
        .map_err(to_js)?;
        Ok(Self {
            session,
            input: InputState::new(),
        })
    }

    /// Returns true when the key is bound (the page should prevent default)
    pub fn key_down(&mut self, key: &str) -> bool {
        match self.input.key_down(key) {
            Some(Action::Continue) => {
                self.session.continue_game();
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    /// Window lost focus: release keys, silence cues if configured
    pub fn blur(&mut self) {
        self.input.clear();
        self.session.set_focused(false);
    }

    /// Window regained focus
    pub fn focus(&mut self) {
        self.session.set_focused(true);
    }

    /// Advance `dt_ms` of wall time and step one frame
    pub fn frame(&mut self, dt_ms: f64) {
        let input = self.input.snapshot();
        self.session.update(&input, dt_ms);
    }

    pub fn continue_game(&mut self) -> bool {
        self.session.continue_game()
    }

    pub fn restart(&mut self) {
        self.session.restart_from_first_level();
    }

    pub fn try_spend(&mut self, price: u64) -> bool {
        self.session.try_spend(price)
    }

    pub fn balance(&self) -> u64 {
        self.session.wallet().balance
    }

    /// Render view as JSON
    pub fn snapshot_json(&self) -> std::result::Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(to_js)
    }

    /// Sound cues since the last call, as a JSON array
    pub fn drain_cues_json(&mut self) -> std::result::Result<String, JsValue> {
        serde_json::to_string(&self.session.drain_cues()).map_err(to_js)
    }

    /// Game events since the last call, as a JSON array
    pub fn drain_events_json(&mut self) -> std::result::Result<String, JsValue> {
        serde_json::to_string(&self.session.drain_events()).map_err(to_js)
    }

    /// Leaderboard as JSON
    pub fn highscores_json(&self) -> std::result::Result<String, JsValue> {
        serde_json::to_string(self.session.highscores()).map_err(to_js)
    }
}

impl WebGame {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}
