//! Game-flow controller
//!
//! Playing → Won on portal contact, Playing → Lost on spike contact or zero
//! health, and back to Playing only through an explicit continue/restart.
//! Outcomes are latched: once the phase leaves Playing the tick stops, so
//! win/loss side effects fire once per attempt. Lost wins a same-frame tie.

use super::collision::Resolution;
use super::score::Award;
use super::state::{GameEvent, GamePhase, GameState, LossCause};
use super::timers::TimerKind;

impl GameState {
    /// React to one frame's collision results
    pub(crate) fn apply_resolution(&mut self, resolution: Resolution) {
        if !self.is_playing() {
            return;
        }

        for event in resolution.events {
            match event {
                GameEvent::Collected { kind, .. } => {
                    let points = self.score.collect(kind);
                    self.events.push(GameEvent::Collected { kind, points });
                }
                GameEvent::Damaged { .. } => {
                    self.score.break_combo();
                    self.events.push(event);
                }
                other => self.events.push(other),
            }
        }

        if resolution.spike_hit {
            self.finish_lost(LossCause::Spike);
        } else if resolution.died {
            self.finish_lost(LossCause::Health);
        } else if resolution.portal_reached {
            self.finish_won();
        }
    }

    fn finish_won(&mut self) {
        let bonus = self.score.award(Award::LevelComplete);
        self.phase = GamePhase::Won;
        self.timers.cancel(TimerKind::MelodyRepeat);
        self.events.push(GameEvent::Won {
            level_index: self.level_index,
            score: self.score.points,
        });
        log::info!(
            "Level {} complete (+{} bonus, score {})",
            self.level_index + 1,
            bonus,
            self.score.points
        );
    }

    fn finish_lost(&mut self, cause: LossCause) {
        self.phase = GamePhase::Lost;
        self.timers.cancel(TimerKind::MelodyRepeat);
        self.events.push(GameEvent::Lost {
            level_index: self.level_index,
            score: self.score.points,
            cause,
        });
        log::info!(
            "Level {} lost ({:?}, score {})",
            self.level_index + 1,
            cause,
            self.score.points
        );
    }

    /// External continue action
    ///
    /// After a win the next level starts (wrapping to the first); after a
    /// loss the same level restarts with the score cleared. Returns false
    /// while still playing.
    pub fn continue_game(&mut self) -> bool {
        match self.phase {
            GamePhase::Playing => false,
            GamePhase::Won => {
                self.level_index = (self.level_index + 1) % self.levels.len();
                self.start_level();
                true
            }
            GamePhase::Lost => {
                self.score.reset();
                self.start_level();
                true
            }
        }
    }

    /// External action: back to the first level with a fresh score
    pub fn restart_from_first_level(&mut self) {
        self.level_index = 0;
        self.score.reset();
        self.start_level();
    }
}
