//! Level data
//!
//! Levels are immutable once loaded. Every list is optional in JSON and
//! defaults to empty, so a level with no platforms is simply a flat run.

use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::consts::*;
use crate::error::{Error, Result};

/// Hazard volume types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardKind {
    /// Slows the fall and drags the player down
    Water,
    /// Burns and knocks the player upward
    Lava,
}

/// A damaging volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    #[serde(flatten)]
    pub rect: Rect,
    pub kind: HazardKind,
}

/// A pad that launches the player on landing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BouncePlatform {
    #[serde(flatten)]
    pub rect: Rect,
    /// Launch velocity (negative = up); falls back to the tuning default
    #[serde(default)]
    pub force: Option<f32>,
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectibleKind {
    Coin,
    Gem,
    Key,
}

/// A pickup placed in the level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub x: f32,
    pub y: f32,
    pub kind: CollectibleKind,
}

impl Collectible {
    pub const fn new(x: f32, y: f32, kind: CollectibleKind) -> Self {
        Self { x, y, kind }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, COLLECTIBLE_SIZE, COLLECTIBLE_SIZE)
    }
}

/// A hidden bonus area with its own pickups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretArea {
    #[serde(flatten)]
    pub area: Rect,
    #[serde(default)]
    pub requires_key: bool,
    #[serde(default)]
    pub collectibles: Vec<Collectible>,
}

/// A patrolling enemy as placed in the level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    #[serde(flatten)]
    pub rect: Rect,
    /// Pixels per frame
    pub speed: f32,
    /// Left patrol bound (x of the enemy's left edge)
    pub start_x: f32,
    /// Right patrol bound
    pub end_x: f32,
    /// Initial direction: +1 right, -1 left
    #[serde(default = "default_direction")]
    pub direction: f32,
}

fn default_direction() -> f32 {
    1.0
}

/// Level goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_portal_size")]
    pub width: f32,
    #[serde(default = "default_portal_size")]
    pub height: f32,
}

fn default_portal_size() -> f32 {
    PORTAL_SIZE
}

impl Portal {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            width: PORTAL_SIZE,
            height: PORTAL_SIZE,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

fn default_ground_y() -> f32 {
    GROUND_Y
}

fn default_ground_width() -> f32 {
    2000.0
}

/// One playable area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub name: String,
    /// Top edge of the full-width floor
    #[serde(default = "default_ground_y")]
    pub ground_y: f32,
    /// Horizontal extent of the floor (used for the right-edge clamp)
    #[serde(default = "default_ground_width")]
    pub ground_width: f32,
    #[serde(default)]
    pub platforms: Vec<Rect>,
    #[serde(default)]
    pub bounce_platforms: Vec<BouncePlatform>,
    #[serde(default)]
    pub spikes: Vec<Rect>,
    #[serde(default)]
    pub hazards: Vec<Hazard>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    #[serde(default)]
    pub collectibles: Vec<Collectible>,
    #[serde(default)]
    pub secret_areas: Vec<SecretArea>,
    pub portal: Portal,
}

/// Which collision passes a level needs
///
/// Computed once per level so the resolver skips passes for absent features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub platforms: bool,
    pub bounce_platforms: bool,
    pub spikes: bool,
    pub hazards: bool,
    pub enemies: bool,
    pub collectibles: bool,
    pub secret_areas: bool,
}

impl Level {
    /// A flat level with only a floor and a portal
    pub fn flat(name: &str, ground_width: f32, portal: Portal) -> Self {
        Self {
            name: name.to_string(),
            ground_y: GROUND_Y,
            ground_width,
            platforms: Vec::new(),
            bounce_platforms: Vec::new(),
            spikes: Vec::new(),
            hazards: Vec::new(),
            enemies: Vec::new(),
            collectibles: Vec::new(),
            secret_areas: Vec::new(),
            portal,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            platforms: !self.platforms.is_empty(),
            bounce_platforms: !self.bounce_platforms.is_empty(),
            spikes: !self.spikes.is_empty(),
            hazards: !self.hazards.is_empty(),
            enemies: !self.enemies.is_empty(),
            collectibles: !self.collectibles.is_empty(),
            secret_areas: !self.secret_areas.is_empty(),
        }
    }

    /// Parse a single level
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::json("level", e))
    }
}

/// Parse an ordered level list
pub fn levels_from_json(json: &str) -> Result<Vec<Level>> {
    let levels: Vec<Level> = serde_json::from_str(json).map_err(|e| Error::json("level list", e))?;
    if levels.is_empty() {
        return Err(Error::NoLevels);
    }
    log::info!("Loaded {} levels", levels.len());
    Ok(levels)
}

/// Spike resting on a surface at `surface_y`
fn spike_on(x: f32, surface_y: f32) -> Rect {
    Rect::new(x, surface_y - 20.0, 20.0, 20.0)
}

/// The hand-authored level set
pub fn builtin_levels() -> Vec<Level> {
    use CollectibleKind::*;

    let meadow = Level {
        name: "Meadow Run".to_string(),
        platforms: vec![
            Rect::new(200.0, 280.0, 200.0, 20.0),
            Rect::new(500.0, 200.0, 200.0, 20.0),
            Rect::new(800.0, 300.0, 200.0, 20.0),
            Rect::new(1100.0, 250.0, 200.0, 20.0),
        ],
        spikes: vec![
            spike_on(400.0, GROUND_Y),
            spike_on(800.0, GROUND_Y),
            spike_on(1200.0, GROUND_Y),
        ],
        collectibles: vec![
            Collectible::new(280.0, 250.0, Coin),
            Collectible::new(590.0, 170.0, Gem),
            Collectible::new(1180.0, 220.0, Coin),
        ],
        ..Level::flat("", 2000.0, Portal::new(1600.0, 350.0))
    };

    let tower = Level {
        name: "Tower Climb".to_string(),
        platforms: vec![
            Rect::new(150.0, 320.0, 100.0, 20.0),
            Rect::new(300.0, 280.0, 100.0, 20.0),
            Rect::new(150.0, 240.0, 100.0, 20.0),
            Rect::new(300.0, 200.0, 100.0, 20.0),
            Rect::new(150.0, 160.0, 100.0, 20.0),
            Rect::new(300.0, 120.0, 100.0, 20.0),
            Rect::new(350.0, 80.0, 150.0, 20.0),
        ],
        spikes: vec![
            spike_on(300.0, GROUND_Y),
            spike_on(500.0, 280.0),
            spike_on(200.0, 160.0),
        ],
        collectibles: vec![
            Collectible::new(340.0, 250.0, Coin),
            Collectible::new(340.0, 170.0, Coin),
        ],
        ..Level::flat("", 800.0, Portal::new(400.0, 50.0))
    };

    let skyway = Level {
        name: "Skyway".to_string(),
        platforms: vec![
            Rect::new(200.0, 300.0, 150.0, 20.0),
            Rect::new(400.0, 250.0, 150.0, 20.0),
            Rect::new(600.0, 200.0, 150.0, 20.0),
            Rect::new(800.0, 150.0, 150.0, 20.0),
            Rect::new(1000.0, 150.0, 400.0, 20.0),
            Rect::new(1500.0, 150.0, 400.0, 20.0),
            Rect::new(100.0, 320.0, 80.0, 20.0),
            Rect::new(100.0, 260.0, 80.0, 20.0),
            Rect::new(100.0, 200.0, 80.0, 20.0),
        ],
        spikes: vec![
            spike_on(400.0, GROUND_Y),
            spike_on(800.0, 150.0),
            spike_on(1200.0, 150.0),
            spike_on(1600.0, 150.0),
        ],
        collectibles: vec![
            Collectible::new(1100.0, 120.0, Gem),
            Collectible::new(1700.0, 120.0, Coin),
        ],
        ..Level::flat("", 2000.0, Portal::new(1800.0, 100.0))
    };

    let springs = Level {
        name: "Hot Springs".to_string(),
        platforms: vec![
            Rect::new(300.0, 290.0, 160.0, 20.0),
            Rect::new(1050.0, 220.0, 180.0, 20.0),
            Rect::new(1750.0, 240.0, 200.0, 20.0),
        ],
        bounce_platforms: vec![BouncePlatform {
            rect: Rect::new(850.0, 370.0, 60.0, 10.0),
            force: Some(-20.0),
        }],
        hazards: vec![
            Hazard {
                rect: Rect::new(600.0, 360.0, 120.0, 20.0),
                kind: HazardKind::Lava,
            },
            Hazard {
                rect: Rect::new(1300.0, 340.0, 150.0, 40.0),
                kind: HazardKind::Water,
            },
        ],
        enemies: vec![EnemySpawn {
            rect: Rect::new(1500.0, 350.0, 30.0, 30.0),
            speed: 1.5,
            start_x: 1500.0,
            end_x: 1680.0,
            direction: 1.0,
        }],
        collectibles: vec![
            Collectible::new(360.0, 260.0, Coin),
            Collectible::new(1120.0, 190.0, Key),
            Collectible::new(1800.0, 210.0, Gem),
        ],
        secret_areas: vec![SecretArea {
            area: Rect::new(1980.0, 120.0, 180.0, 120.0),
            requires_key: true,
            collectibles: vec![
                Collectible::new(2000.0, 350.0, Gem),
                Collectible::new(2060.0, 350.0, Gem),
            ],
        }],
        spikes: vec![spike_on(2300.0, GROUND_Y)],
        ..Level::flat("", 2400.0, Portal::new(2200.0, 350.0))
    };

    vec![meadow, tower, skyway, springs]
}
