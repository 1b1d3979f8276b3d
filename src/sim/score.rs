//! Points and combo
//!
//! Every award is scaled by `1 + 0.1 × combo`. Collections raise the combo,
//! damage breaks it.

use serde::{Deserialize, Serialize};

use super::level::CollectibleKind;

/// Something worth points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Award {
    Collect(CollectibleKind),
    LevelComplete,
}

impl Award {
    pub fn base_points(self) -> u64 {
        match self {
            Award::Collect(CollectibleKind::Coin) => 10,
            Award::Collect(CollectibleKind::Gem) => 50,
            Award::Collect(CollectibleKind::Key) => 100,
            Award::LevelComplete => 1000,
        }
    }
}

/// Running score for the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub points: u64,
    pub combo: u32,
}

impl Score {
    /// Add an award at the current combo; returns the points granted
    pub fn award(&mut self, award: Award) -> u64 {
        // base × (10 + combo) / 10 keeps the 10% steps exact
        let granted = award.base_points() * (10 + u64::from(self.combo)) / 10;
        self.points += granted;
        granted
    }

    /// Award a pickup, then extend the combo
    pub fn collect(&mut self, kind: CollectibleKind) -> u64 {
        let granted = self.award(Award::Collect(kind));
        self.combo += 1;
        granted
    }

    pub fn break_combo(&mut self) {
        self.combo = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
