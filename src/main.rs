//! Portal Hop entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use portal_hop::consts::FRAME_MS;
    use portal_hop::platform::web::WebGame;
    use portal_hop::sim::GamePhase;

    /// Longest frame gap fed to the timers (tab switches, breakpoints)
    const MAX_FRAME_MS: f64 = 100.0;

    struct Game {
        web: WebGame,
        last_time: f64,
        last_phase: GamePhase,
    }

    impl Game {
        fn new(web: WebGame) -> Self {
            let last_phase = web.session().phase();
            Self {
                web,
                last_time: 0.0,
                last_phase,
            }
        }

        /// One display frame: one simulation step
        fn update(&mut self, dt_ms: f64) {
            self.web.frame(dt_ms.min(MAX_FRAME_MS));

            let session = self.web.session_mut();
            // Synthesis lives in the page; log what would play
            for cue in session.drain_cues() {
                log::debug!("cue {:?} at {:.2}", cue.effect, cue.volume);
            }
            session.drain_events();

            let phase = session.phase();
            if phase != self.last_phase {
                log::info!("Phase: {:?} -> {:?}", self.last_phase, phase);
                self.last_phase = phase;
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let snapshot = self.web.session().snapshot();

            let set = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };
            set("#hud-score .hud-value", &snapshot.score.to_string());
            set("#hud-health .hud-value", &snapshot.player.health.to_string());
            set("#hud-level .hud-value", &(snapshot.level_index + 1).to_string());
            set("#hud-coins .hud-value", &snapshot.balance.to_string());

            if let Some(el) = document.get_element_by_id("message") {
                let text = match snapshot.phase {
                    GamePhase::Playing => "",
                    GamePhase::Won => "Level complete! Press Enter to continue",
                    GamePhase::Lost => "Game over. Press Enter to try again",
                };
                el.set_text_content(Some(text));
                let class = if text.is_empty() { "hidden" } else { "" };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Portal Hop starting...");

        let web = match WebGame::new(None) {
            Ok(web) => web,
            Err(e) => {
                log::error!("Failed to start session: {:?}", e);
                return;
            }
        };
        let game = Rc::new(RefCell::new(Game::new(web)));

        setup_keyboard(game.clone());
        setup_focus_loss(game.clone());
        request_animation_frame(game);
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if game.borrow_mut().web.key_down(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().web.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Window blur drops held keys and mutes cues until focus returns
    fn setup_focus_loss(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Blur
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().web.blur();
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().web.focus();
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                FRAME_MS
            };
            g.last_time = time;

            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Portal Hop (native) starting...");
    log::info!("Native mode runs headless - serve the wasm build for the playable version");

    let levels = match std::env::args().nth(1) {
        Some(path) => match load_levels(&path) {
            Ok(levels) => levels,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => portal_hop::sim::builtin_levels(),
    };

    if let Err(e) = autopilot::run(levels) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_levels(path: &str) -> Result<Vec<portal_hop::sim::Level>, String> {
    let json = std::fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path, e))?;
    portal_hop::sim::levels_from_json(&json).map_err(|e| format!("{}: {}", path, e))
}

/// Headless demo run: hold right, hop over anything dangerous
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use portal_hop::persistence::MemoryStorage;
    use portal_hop::sim::{GameEvent, GameState, Level, TickInput};
    use portal_hop::{Result, Session, Tuning};

    /// Give up on an attempt after this many frames (two minutes at 60 Hz)
    const FRAME_CAP: u64 = 60 * 120;
    /// Look-ahead distance for danger
    const LOOKAHEAD: f32 = 40.0;

    pub fn run(levels: Vec<Level>) -> Result<()> {
        let level_count = levels.len();
        let mut session = Session::new(levels, Tuning::default(), Box::new(MemoryStorage::new()))?;
        let (mut wins, mut losses, mut attempts) = (0, 0, 0);
        let mut jump_last_frame = false;

        // One winning pass over every level, with a bounded number of retries
        while wins < level_count && attempts < level_count * 3 {
            let want_jump = danger_ahead(session.state());
            let input = TickInput {
                move_right: true,
                // Release between hops so the press edge re-arms
                jump: want_jump && !jump_last_frame,
                ..Default::default()
            };
            jump_last_frame = input.jump;
            session.update_frame(&input);

            for event in session.drain_events() {
                match event {
                    GameEvent::Won { level_index, score } => {
                        wins += 1;
                        attempts += 1;
                        log::info!("Cleared level {} (score {})", level_index + 1, score);
                    }
                    GameEvent::Lost { level_index, cause, .. } => {
                        losses += 1;
                        attempts += 1;
                        log::info!("Lost level {} ({:?})", level_index + 1, cause);
                    }
                    _ => {}
                }
            }

            if !session.state().is_playing() {
                session.continue_game();
            } else if session.state().frame >= FRAME_CAP {
                log::warn!("Attempt timed out on level {}", session.state().level_index() + 1);
                attempts += 1;
                session.restart_from_first_level();
            }
        }

        log::info!(
            "Autopilot finished: {} wins, {} losses, balance {}, best {:?}",
            wins,
            losses,
            session.wallet().balance,
            session.highscores().top_score()
        );
        Ok(())
    }

    fn danger_ahead(state: &GameState) -> bool {
        let player = &state.player;
        if !player.grounded {
            return false;
        }
        let level = state.level();
        let front = player.pos.x + player.width;
        let ahead = |left: f32| left > front && left - front < LOOKAHEAD;

        level.spikes.iter().any(|s| ahead(s.x))
            || level.hazards.iter().any(|h| ahead(h.rect.x))
            || state.world.enemies.iter().any(|e| ahead(e.pos.x))
    }
}
