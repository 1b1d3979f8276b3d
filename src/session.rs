//! Session driver
//!
//! Owns the simulation plus everything that outlives an attempt: wallet,
//! leaderboard, audio settings and the storage behind them. The host calls
//! [`Session::update`] once per display frame and reads [`Session::snapshot`]
//! to render.

use serde::Serialize;

use crate::audio::{AudioDirector, Cue};
use crate::consts::FRAME_MS;
use crate::error::Result;
use crate::highscores::HighScores;
use crate::persistence::Storage;
use crate::platform::wall_clock_ms;
use crate::settings::Settings;
use crate::sim::{
    GameEvent, GamePhase, GameState, Level, LevelState, Player, TickInput, builtin_levels, tick,
};
use crate::tuning::Tuning;
use crate::wallet::Wallet;

/// Read-only view of the session for renderers
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub level_index: usize,
    pub level: &'a Level,
    pub player: &'a Player,
    pub world: &'a LevelState,
    pub score: u64,
    pub combo: u32,
    pub balance: u64,
    pub provisional: u64,
    pub top_score: Option<u64>,
}

/// One player's session
pub struct Session {
    state: GameState,
    wallet: Wallet,
    highscores: HighScores,
    audio: AudioDirector,
    storage: Box<dyn Storage>,
    /// Events since the host last drained them
    events: Vec<GameEvent>,
    /// Sound cues since the host last drained them
    cues: Vec<Cue>,
    /// Source of leaderboard timestamps
    wall_clock: fn() -> f64,
}

impl Session {
    /// Create a session, loading saved progress from `storage`
    pub fn new(levels: Vec<Level>, tuning: Tuning, storage: Box<dyn Storage>) -> Result<Self> {
        let mut session = Self {
            state: GameState::new(levels, tuning)?,
            wallet: Wallet::load(storage.as_ref()),
            highscores: HighScores::load(storage.as_ref()),
            audio: AudioDirector::new(Settings::load(storage.as_ref())),
            storage,
            events: Vec::new(),
            cues: Vec::new(),
            wall_clock: wall_clock_ms,
        };
        session.dispatch();
        Ok(session)
    }

    /// Session over the built-in levels with default tuning
    pub fn with_builtin_levels(storage: Box<dyn Storage>) -> Result<Self> {
        Self::new(builtin_levels(), Tuning::default(), storage)
    }

    /// Advance the clock by `dt_ms`, then step one frame
    pub fn update(&mut self, input: &TickInput, dt_ms: f64) {
        self.advance_time(dt_ms);
        self.step(input);
    }

    /// Step one frame at the nominal refresh rate
    pub fn update_frame(&mut self, input: &TickInput) {
        self.update(input, FRAME_MS);
    }

    /// Run timers without stepping a frame
    pub fn advance_time(&mut self, dt_ms: f64) {
        self.state.advance_clock(dt_ms);
        self.dispatch();
    }

    /// Step one frame without moving the clock
    pub fn step(&mut self, input: &TickInput) {
        tick(&mut self.state, input);
        self.dispatch();
    }

    /// External continue action (after a win or loss)
    pub fn continue_game(&mut self) -> bool {
        let resumed = self.state.continue_game();
        self.dispatch();
        resumed
    }

    /// External action: restart at the first level
    pub fn restart_from_first_level(&mut self) {
        // An abandoned attempt never pays out
        self.wallet.discard();
        self.state.restart_from_first_level();
        self.dispatch();
    }

    /// Route simulation events to the wallet, leaderboard and audio
    fn dispatch(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Collected { kind, .. } => {
                    self.wallet.earn(kind);
                }
                GameEvent::Won { level_index, score } => {
                    let committed = self.wallet.commit();
                    log::info!("Committed {} currency (balance {})", committed, self.wallet.balance);
                    self.wallet.save(self.storage.as_mut());
                    self.record_score(score, level_index);
                }
                GameEvent::Lost { level_index, score, .. } => {
                    let lost = self.wallet.discard();
                    log::info!("Discarded {} provisional currency", lost);
                    self.record_score(score, level_index);
                }
                _ => {}
            }
            log::debug!("{:?}", event);
            if let Some(cue) = self.audio.cue_for(&event) {
                self.cues.push(cue);
            }
            self.events.push(event);
        }
    }

    fn record_score(&mut self, score: u64, level_index: usize) {
        let level = u32::try_from(level_index + 1).unwrap_or(u32::MAX);
        if let Some(rank) = self.highscores.add_score(score, level, (self.wall_clock)()) {
            log::info!("Leaderboard rank {} with {}", rank, score);
            self.highscores.save(self.storage.as_mut());
        }
    }

    /// Replace the leaderboard clock
    pub fn set_wall_clock(&mut self, clock: fn() -> f64) {
        self.wall_clock = clock;
    }

    /// Spend committed currency (shop hook)
    pub fn try_spend(&mut self, price: u64) -> bool {
        let spent = self.wallet.try_spend(price);
        if spent {
            self.wallet.save(self.storage.as_mut());
        }
        spent
    }

    pub fn set_settings(&mut self, settings: Settings) {
        settings.save(self.storage.as_mut());
        self.audio.set_settings(settings);
    }

    pub fn settings(&self) -> &Settings {
        self.audio.settings()
    }

    /// Host window focus changed
    pub fn set_focused(&mut self, focused: bool) {
        self.audio.set_focused(focused);
        if self.audio.is_silenced() {
            log::info!("Window blurred, audio muted");
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn highscores(&self) -> &HighScores {
        &self.highscores
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Close the session, handing back its storage
    pub fn into_storage(self) -> Box<dyn Storage> {
        self.storage
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.state.phase,
            level_index: self.state.level_index,
            level: self.state.level(),
            player: &self.state.player,
            world: &self.state.world,
            score: self.state.score.points,
            combo: self.state.score.combo,
            balance: self.wallet.balance,
            provisional: self.wallet.provisional,
            top_score: self.highscores.top_score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundEffect;
    use crate::persistence::MemoryStorage;
    use crate::sim::{Collectible, CollectibleKind, Portal, Rect};

    fn coin_then_portal() -> Level {
        let mut level = Level::flat("coins", 1000.0, Portal::new(120.0, 350.0));
        level.collectibles.push(Collectible::new(80.0, 355.0, CollectibleKind::Coin));
        level.collectibles.push(Collectible::new(100.0, 355.0, CollectibleKind::Gem));
        level
    }

    fn coin_then_spike() -> Level {
        let mut level = Level::flat("spiky", 1000.0, Portal::new(900.0, 350.0));
        level.collectibles.push(Collectible::new(80.0, 355.0, CollectibleKind::Coin));
        level.spikes.push(Rect::new(130.0, 360.0, 20.0, 20.0));
        level
    }

    fn run_right(session: &mut Session, frames: usize) {
        let input = TickInput {
            move_right: true,
            ..Default::default()
        };
        for _ in 0..frames {
            session.update_frame(&input);
        }
    }

    #[test]
    fn test_win_commits_currency_and_records_score() {
        let mut session =
            Session::new(vec![coin_then_portal()], Tuning::default(), Box::new(MemoryStorage::new()))
                .unwrap();
        run_right(&mut session, 60);

        assert_eq!(session.phase(), GamePhase::Won);
        assert_eq!(session.wallet().balance, 6);
        assert_eq!(session.wallet().provisional, 0);
        assert_eq!(session.highscores().entries.len(), 1);
        // coin 10, gem 55, level complete at combo 2: 1200
        assert_eq!(session.highscores().top_score(), Some(1265));

        let cues = session.drain_cues();
        assert!(cues.iter().any(|c| c.effect == SoundEffect::Win));
    }

    #[test]
    fn test_loss_discards_currency() {
        let mut session =
            Session::new(vec![coin_then_spike()], Tuning::default(), Box::new(MemoryStorage::new()))
                .unwrap();
        run_right(&mut session, 60);

        assert_eq!(session.phase(), GamePhase::Lost);
        assert_eq!(session.wallet().balance, 0);
        assert_eq!(session.wallet().provisional, 0);
        assert_eq!(session.highscores().top_score(), Some(10));

        assert!(session.continue_game());
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.state().level_index(), 0);
    }

    #[test]
    fn test_outcome_side_effects_fire_once() {
        let mut session =
            Session::new(vec![coin_then_portal()], Tuning::default(), Box::new(MemoryStorage::new()))
                .unwrap();
        run_right(&mut session, 200);
        let wins = session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Won { .. }))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(session.highscores().entries.len(), 1);
        assert_eq!(session.wallet().balance, 6);
    }

    #[test]
    fn test_leaderboard_uses_wall_clock() {
        let mut session =
            Session::new(vec![coin_then_portal()], Tuning::default(), Box::new(MemoryStorage::new()))
                .unwrap();
        session.set_wall_clock(|| 1_700_000_000_000.0);
        run_right(&mut session, 60);
        assert_eq!(session.phase(), GamePhase::Won);
        assert_eq!(session.highscores().entries[0].timestamp, 1_700_000_000_000.0);
    }

    #[test]
    fn test_progress_survives_new_session() {
        let mut storage = MemoryStorage::new();
        let mut wallet = Wallet::new();
        wallet.balance = 30;
        wallet.save(&mut storage);

        let session = Session::new(vec![coin_then_portal()], Tuning::default(), Box::new(storage)).unwrap();
        assert_eq!(session.wallet().balance, 30);
    }

    #[test]
    fn test_try_spend() {
        let mut session =
            Session::new(vec![coin_then_portal()], Tuning::default(), Box::new(MemoryStorage::new()))
                .unwrap();
        run_right(&mut session, 60);
        assert!(!session.try_spend(7));
        assert!(session.try_spend(6));
        assert_eq!(session.wallet().balance, 0);
    }

    #[test]
    fn test_blurred_session_queues_no_cues() {
        let mut session =
            Session::new(vec![coin_then_portal()], Tuning::default(), Box::new(MemoryStorage::new()))
                .unwrap();
        session.set_focused(false);
        run_right(&mut session, 60);
        assert_eq!(session.phase(), GamePhase::Won);
        assert!(session.drain_cues().is_empty());

        session.set_focused(true);
        session.continue_game();
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        session.update_frame(&jump);
        assert!(session.drain_cues().iter().any(|c| c.effect == SoundEffect::Jump));
    }

    #[test]
    fn test_snapshot_serializes() {
        let session = Session::with_builtin_levels(Box::new(MemoryStorage::new())).unwrap();
        let json = serde_json::to_string(&session.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
        assert!(json.contains("Meadow Run"));
    }
}
