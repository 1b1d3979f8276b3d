//! Collision resolution for one frame
//!
//! Takes the proposed motion from the integrator and resolves it against the
//! level in a fixed order: platforms, bounce pads, ground, horizontal bounds,
//! spikes, hazards, enemies, pickups and secrets, portal, health. Later passes
//! see the position settled by earlier ones. When one frame's fall crosses
//! several surfaces, the highest one wins, and the ground only applies when
//! nothing above it caught the player.
//!
//! Passes only mutate the player and level state and record what happened;
//! phase changes and timers are left to the caller.

use super::geom::Rect;
use super::level::{Capabilities, Collectible, HazardKind, Level};
use super::physics::Motion;
use super::state::{DamageSource, GameEvent, LevelState, Player};
use crate::tuning::Tuning;

/// Outcome of resolving one frame
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Events in the order they happened
    pub events: Vec<GameEvent>,
    /// A spike was touched (fatal regardless of invulnerability)
    pub spike_hit: bool,
    /// The portal was touched
    pub portal_reached: bool,
    /// Health reached zero
    pub died: bool,
    /// Damage was taken and the invulnerability window must be armed
    pub invulnerability_started: bool,
}

/// Vertical contact with a one-way surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    /// Falling onto the top edge
    Landed,
    /// Rising into the underside
    Blocked,
}

/// Classify a swept vertical contact between the player and a surface
///
/// Uses the pre-step edges and the sign of the integrated velocity, so a fast
/// fall that skips over the top edge in one frame still lands.
fn sweep_contact(
    player: &Player,
    vel_y: f32,
    prev_y: f32,
    next_y: f32,
    surface: &Rect,
) -> Option<Contact> {
    let span = Rect::new(player.pos.x, prev_y, player.width, player.height);
    if !span.overlaps_x(surface) {
        return None;
    }

    if vel_y > 0.0 && prev_y + player.height <= surface.top() && next_y + player.height >= surface.top()
    {
        Some(Contact::Landed)
    } else if vel_y < 0.0 && prev_y >= surface.bottom() && next_y <= surface.bottom() {
        Some(Contact::Blocked)
    } else {
        None
    }
}

/// Resolve the player's proposed motion against the level
pub fn resolve(
    level: &Level,
    caps: Capabilities,
    tuning: &Tuning,
    player: &mut Player,
    world: &mut LevelState,
    motion: Motion,
) -> Resolution {
    let mut out = Resolution::default();
    let prev_y = motion.prev_y;
    let mut next_y = motion.next_y;
    let vel_y = motion.vel_y;
    // A surface above the ground line took the fall
    let mut caught = false;

    player.grounded = false;

    // 1. Standable platforms, in list order. Sweeping from the pre-step edge
    //    against the running proposal keeps the highest surface crossed.
    if caps.platforms {
        for platform in &level.platforms {
            match sweep_contact(player, vel_y, prev_y, next_y, platform) {
                Some(Contact::Landed) => {
                    next_y = platform.top() - player.height;
                    player.vel_y = 0.0;
                    player.grounded = true;
                    caught = true;
                }
                Some(Contact::Blocked) => {
                    next_y = platform.bottom();
                    player.vel_y = 0.0;
                }
                None => {}
            }
        }
    }

    // 2. Bounce pads launch instead of resting
    if caps.bounce_platforms {
        for pad in &level.bounce_platforms {
            match sweep_contact(player, vel_y, prev_y, next_y, &pad.rect) {
                Some(Contact::Landed) => {
                    let force = pad.force.unwrap_or(tuning.default_bounce_force);
                    next_y = pad.rect.top() - player.height;
                    player.vel_y = force;
                    player.grounded = false;
                    caught = true;
                    out.events.push(GameEvent::Bounced { force });
                }
                Some(Contact::Blocked) => {
                    next_y = pad.rect.bottom();
                    player.vel_y = 0.0;
                }
                None => {}
            }
        }
    }

    // 3. Ground plane, unless a surface above it caught the fall (also
    //    recovers a player left below the floor)
    if !caught && next_y + player.height >= level.ground_y {
        next_y = level.ground_y - player.height;
        player.vel_y = 0.0;
        player.grounded = true;
    }

    player.pos.y = next_y;

    // 4. Horizontal bounds
    if player.pos.x < 0.0 {
        player.pos.x = 0.0;
    }
    if tuning.clamp_right_edge {
        let max_x = level.ground_width - player.width;
        if player.pos.x > max_x {
            player.pos.x = max_x.max(0.0);
        }
    }

    let body = player.rect();

    // 5. Spikes ignore invulnerability
    if caps.spikes && level.spikes.iter().any(|spike| body.overlaps(spike)) {
        out.spike_hit = true;
        out.events.push(GameEvent::SpikeHit);
    }

    // 6. Hazards
    if caps.hazards {
        for hazard in &level.hazards {
            if player.invulnerable || !body.overlaps(&hazard.rect) {
                continue;
            }
            let amount = match hazard.kind {
                HazardKind::Lava => {
                    player.vel_y = tuning.lava_knockback;
                    player.grounded = false;
                    tuning.lava_damage
                }
                HazardKind::Water => {
                    player.vel_y = player.vel_y * 0.5 + tuning.water_sink_speed;
                    tuning.water_damage
                }
            };
            hurt(player, &mut out, DamageSource::Hazard(hazard.kind), amount);
        }
    }

    // 7. Patrolling enemies
    if caps.enemies {
        for enemy in &world.enemies {
            if player.invulnerable || !body.overlaps(&enemy.rect()) {
                continue;
            }
            hurt(player, &mut out, DamageSource::Enemy, tuning.enemy_damage);
        }
    }

    // 8. Pickups, then secrets (a key taken this frame unlocks immediately)
    if caps.collectibles {
        collect_overlapping(player, &body, &level.collectibles, &mut world.collected, &mut out);
    }
    if caps.secret_areas {
        for (index, (area, secret)) in level.secret_areas.iter().zip(world.secrets.iter_mut()).enumerate() {
            if !secret.unlocked && player.has_key {
                secret.unlocked = true;
                out.events.push(GameEvent::SecretUnlocked { index });
                log::debug!("Secret area {} unlocked", index);
            }
            if secret.unlocked {
                collect_overlapping(player, &body, &area.collectibles, &mut secret.collected, &mut out);
            }
        }
    }

    // 9. Portal (inclusive test)
    if body.touches(&level.portal.rect()) {
        out.portal_reached = true;
        out.events.push(GameEvent::PortalReached);
    }

    // 10. Health
    if player.is_dead() {
        out.died = true;
    }

    out
}

fn hurt(player: &mut Player, out: &mut Resolution, source: DamageSource, amount: i32) {
    player.take_damage(amount);
    player.invulnerable = true;
    out.invulnerability_started = true;
    out.events.push(GameEvent::Damaged {
        source,
        amount,
        health: player.health,
    });
    log::debug!("Damaged by {:?} for {} (health {})", source, amount, player.health);
}

/// Mark overlapping, not-yet-collected items as taken
///
/// Points are filled in later by the flow controller.
fn collect_overlapping(
    player: &mut Player,
    body: &Rect,
    items: &[Collectible],
    collected: &mut [bool],
    out: &mut Resolution,
) {
    for (item, taken) in items.iter().zip(collected.iter_mut()) {
        if *taken || !body.overlaps(&item.rect()) {
            continue;
        }
        *taken = true;
        player.collected.push(item.kind);
        if item.kind == super::level::CollectibleKind::Key {
            player.has_key = true;
        }
        out.events.push(GameEvent::Collected {
            kind: item.kind,
            points: 0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{
        BouncePlatform, CollectibleKind, EnemySpawn, Hazard, Portal, SecretArea, builtin_levels,
    };
    use glam::Vec2;

    fn flat() -> Level {
        Level::flat("test", 2000.0, Portal::new(1800.0, 350.0))
    }

    fn airborne(x: f32, y: f32, vel_y: f32) -> Player {
        let mut p = Player::new(&Tuning::default());
        p.pos = Vec2::new(x, y);
        p.vel_y = vel_y;
        p.grounded = false;
        p
    }

    fn run(level: &Level, player: &mut Player, world: &mut LevelState) -> Resolution {
        let motion = Motion {
            prev_y: player.pos.y,
            next_y: player.pos.y + player.vel_y,
            vel_y: player.vel_y,
            jumped: false,
        };
        resolve(level, level.capabilities(), &Tuning::default(), player, world, motion)
    }

    #[test]
    fn test_ground_clamp() {
        let level = flat();
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 345.0, 10.0);
        run(&level, &mut p, &mut world);
        assert_eq!(p.pos.y, 350.0);
        assert_eq!(p.vel_y, 0.0);
        assert!(p.grounded);
    }

    #[test]
    fn test_below_ground_snaps_up() {
        let level = flat();
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 500.0, 0.4);
        run(&level, &mut p, &mut world);
        assert_eq!(p.pos.y, 350.0);
        assert!(p.grounded);
    }

    #[test]
    fn test_fast_fall_lands_on_platform_top() {
        let mut level = flat();
        level.platforms.push(Rect::new(80.0, 200.0, 100.0, 20.0));
        let mut world = LevelState::new(&level);
        // Bottom at 190, proposed bottom at 208: crosses the top edge at 200
        let mut p = airborne(100.0, 160.0, 18.0);
        run(&level, &mut p, &mut world);
        assert_eq!(p.pos.y, 170.0);
        assert_eq!(p.vel_y, 0.0);
        assert!(p.grounded);
    }

    #[test]
    fn test_rising_into_underside_blocks_without_grounding() {
        let mut level = flat();
        level.platforms.push(Rect::new(80.0, 200.0, 100.0, 20.0));
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 225.0, -10.0);
        run(&level, &mut p, &mut world);
        assert_eq!(p.pos.y, 220.0);
        assert_eq!(p.vel_y, 0.0);
        assert!(!p.grounded);
    }

    #[test]
    fn test_no_horizontal_overlap_falls_past() {
        let mut level = flat();
        level.platforms.push(Rect::new(300.0, 200.0, 100.0, 20.0));
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 160.0, 18.0);
        run(&level, &mut p, &mut world);
        assert_eq!(p.pos.y, 178.0);
        assert!(!p.grounded);
    }

    #[test]
    fn test_bounce_pad_launches() {
        let mut level = flat();
        level.bounce_platforms.push(BouncePlatform {
            rect: Rect::new(80.0, 300.0, 60.0, 10.0),
            force: Some(-20.0),
        });
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 265.0, 8.0);
        let res = run(&level, &mut p, &mut world);
        assert_eq!(p.pos.y, 270.0);
        assert_eq!(p.vel_y, -20.0);
        assert!(!p.grounded);
        assert!(res.events.contains(&GameEvent::Bounced { force: -20.0 }));
    }

    #[test]
    fn test_bounce_pad_default_force() {
        let mut level = flat();
        level.bounce_platforms.push(BouncePlatform {
            rect: Rect::new(80.0, 300.0, 60.0, 10.0),
            force: None,
        });
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 265.0, 8.0);
        run(&level, &mut p, &mut world);
        assert_eq!(p.vel_y, Tuning::default().default_bounce_force);
    }

    #[test]
    fn test_platform_just_above_ground_catches_fall() {
        let mut level = flat();
        level.platforms.push(Rect::new(80.0, 372.0, 100.0, 8.0));
        let mut world = LevelState::new(&level);
        // Proposed bottom (382) crosses both the platform top and the ground
        let mut p = airborne(100.0, 338.0, 14.0);
        run(&level, &mut p, &mut world);
        assert_eq!(p.pos.y, 342.0);
        assert_eq!(p.vel_y, 0.0);
        assert!(p.grounded);
    }

    #[test]
    fn test_hot_springs_pad_launches_fall_that_crosses_ground() {
        let level = builtin_levels()
            .into_iter()
            .find(|l| l.name == "Hot Springs")
            .unwrap();
        let mut world = LevelState::new(&level);
        let mut p = airborne(860.0, 335.0, 15.0);
        let res = run(&level, &mut p, &mut world);
        assert_eq!(p.pos.y, 340.0);
        assert_eq!(p.vel_y, -20.0);
        assert!(!p.grounded);
        assert!(res.events.contains(&GameEvent::Bounced { force: -20.0 }));
    }

    #[test]
    fn test_highest_crossed_platform_wins_regardless_of_order() {
        let mut level = flat();
        level.platforms.push(Rect::new(80.0, 200.0, 100.0, 20.0));
        level.platforms.push(Rect::new(80.0, 190.0, 100.0, 20.0));
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 155.0, 19.0);
        run(&level, &mut p, &mut world);
        assert_eq!(p.pos.y, 160.0);
        assert!(p.grounded);
    }

    #[test]
    fn test_left_and_right_clamp() {
        let level = flat();
        let mut world = LevelState::new(&level);
        let mut p = airborne(-5.0, 350.0, 0.4);
        run(&level, &mut p, &mut world);
        assert_eq!(p.pos.x, 0.0);

        p.pos.x = 1990.0;
        run(&level, &mut p, &mut world);
        assert_eq!(p.pos.x, 1970.0);
    }

    #[test]
    fn test_spike_ignores_invulnerability() {
        let mut level = flat();
        level.spikes.push(Rect::new(100.0, 360.0, 20.0, 20.0));
        let mut world = LevelState::new(&level);
        let mut p = airborne(95.0, 350.0, 0.4);
        p.invulnerable = true;
        let res = run(&level, &mut p, &mut world);
        assert!(res.spike_hit);
    }

    #[test]
    fn test_lava_damage_and_knockback() {
        let mut level = flat();
        level.hazards.push(Hazard {
            rect: Rect::new(90.0, 360.0, 100.0, 20.0),
            kind: HazardKind::Lava,
        });
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 350.0, 0.4);
        let res = run(&level, &mut p, &mut world);
        assert_eq!(p.health, 80);
        assert_eq!(p.vel_y, -10.0);
        assert!(p.invulnerable);
        assert!(res.invulnerability_started);

        // Still inside while invulnerable: no further damage
        let res = run(&level, &mut p, &mut world);
        assert_eq!(p.health, 80);
        assert!(!res.invulnerability_started);
    }

    #[test]
    fn test_water_slows_and_sinks() {
        let mut level = flat();
        level.hazards.push(Hazard {
            rect: Rect::new(0.0, 100.0, 300.0, 200.0),
            kind: HazardKind::Water,
        });
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 150.0, 6.0);
        run(&level, &mut p, &mut world);
        assert_eq!(p.pos.y, 156.0);
        assert_eq!(p.vel_y, 5.0);
        assert_eq!(p.health, 90);
    }

    #[test]
    fn test_enemy_contact_damages_once() {
        let mut level = flat();
        level.enemies.push(EnemySpawn {
            rect: Rect::new(110.0, 350.0, 30.0, 30.0),
            speed: 1.0,
            start_x: 100.0,
            end_x: 200.0,
            direction: 1.0,
        });
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 350.0, 0.4);
        run(&level, &mut p, &mut world);
        assert_eq!(p.health, 75);
        run(&level, &mut p, &mut world);
        assert_eq!(p.health, 75);
    }

    #[test]
    fn test_collect_is_idempotent_and_key_unlocks_secret() {
        let mut level = flat();
        level.collectibles.push(Collectible::new(105.0, 355.0, CollectibleKind::Key));
        level.secret_areas.push(SecretArea {
            area: Rect::new(1000.0, 100.0, 100.0, 100.0),
            requires_key: true,
            collectibles: vec![Collectible::new(110.0, 355.0, CollectibleKind::Gem)],
        });
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 350.0, 0.4);

        let res = run(&level, &mut p, &mut world);
        assert!(p.has_key);
        assert!(world.collected[0]);
        assert!(world.secrets[0].unlocked);
        assert!(world.secrets[0].collected[0]);
        assert_eq!(p.collected, vec![CollectibleKind::Key, CollectibleKind::Gem]);
        assert!(res.events.contains(&GameEvent::SecretUnlocked { index: 0 }));

        let res = run(&level, &mut p, &mut world);
        assert!(res.events.iter().all(|e| !matches!(e, GameEvent::Collected { .. })));
        assert_eq!(p.collected.len(), 2);
    }

    #[test]
    fn test_locked_secret_items_are_not_collidable() {
        let mut level = flat();
        level.secret_areas.push(SecretArea {
            area: Rect::new(1000.0, 100.0, 100.0, 100.0),
            requires_key: true,
            collectibles: vec![Collectible::new(110.0, 355.0, CollectibleKind::Gem)],
        });
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 350.0, 0.4);
        run(&level, &mut p, &mut world);
        assert!(!world.secrets[0].collected[0]);
        assert!(p.collected.is_empty());
    }

    #[test]
    fn test_portal_touch_is_inclusive() {
        let level = flat();
        let mut world = LevelState::new(&level);
        // Right edge exactly on the portal's left edge
        let mut p = airborne(1770.0, 350.0, 0.4);
        let res = run(&level, &mut p, &mut world);
        assert!(res.portal_reached);
    }

    #[test]
    fn test_missing_lists_resolve_cleanly() {
        let level = Level::from_json(r#"{ "portal": { "x": 900, "y": 0 } }"#).unwrap();
        let mut world = LevelState::new(&level);
        let mut p = airborne(100.0, 100.0, 5.0);
        let res = run(&level, &mut p, &mut world);
        assert_eq!(p.pos.y, 105.0);
        assert!(res.events.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn airborne_player_is_never_grounded(
                x in 0.0f32..1500.0,
                y in 0.0f32..300.0,
                vel_y in -15.0f32..15.0,
            ) {
                let mut level = flat();
                level.platforms.push(Rect::new(600.0, 200.0, 200.0, 20.0));
                let mut world = LevelState::new(&level);
                let mut p = airborne(x, y, vel_y);
                run(&level, &mut p, &mut world);

                let platform = level.platforms[0];
                let in_platform_span = p.rect().overlaps_x(&platform)
                    && p.bottom() >= platform.top() - 0.001
                    && p.pos.y <= platform.bottom();
                if p.bottom() < level.ground_y && !in_platform_span {
                    prop_assert!(!p.grounded);
                }
            }

            #[test]
            fn landing_is_exact(
                x in 520.0f32..780.0,
                gap in 0.0f32..10.0,
                vel_y in 10.5f32..20.0,
            ) {
                let mut level = flat();
                level.platforms.push(Rect::new(500.0, 200.0, 300.0, 20.0));
                let mut world = LevelState::new(&level);
                // Bottom edge starts `gap` above the top and ends below it
                let mut p = airborne(x, 200.0 - 30.0 - gap, vel_y);
                run(&level, &mut p, &mut world);
                prop_assert_eq!(p.pos.y, 170.0);
                prop_assert_eq!(p.vel_y, 0.0);
                prop_assert!(p.grounded);
            }

            #[test]
            fn surface_near_ground_catches_any_fall_speed(
                depth in 1.0f32..20.0,
                vel_y in 0.5f32..=20.0,
                lead in 0.05f32..0.95,
            ) {
                let mut level = flat();
                let top = level.ground_y - depth;
                level.platforms.push(Rect::new(500.0, top, 300.0, depth));
                let mut world = LevelState::new(&level);
                // Bottom edge starts at or above the top and the step crosses it
                let gap = lead * vel_y;
                let mut p = airborne(600.0, top - 30.0 - gap, vel_y);
                run(&level, &mut p, &mut world);
                prop_assert_eq!(p.pos.y, top - 30.0);
                prop_assert_eq!(p.vel_y, 0.0);
                prop_assert!(p.grounded);
            }

            #[test]
            fn bounce_near_ground_sets_force(
                depth in 1.0f32..20.0,
                vel_y in 0.5f32..=20.0,
                lead in 0.05f32..0.95,
                force in -25.0f32..-5.0,
            ) {
                let mut level = flat();
                let top = level.ground_y - depth;
                level.bounce_platforms.push(BouncePlatform {
                    rect: Rect::new(500.0, top, 300.0, depth),
                    force: Some(force),
                });
                let mut world = LevelState::new(&level);
                let gap = lead * vel_y;
                let mut p = airborne(600.0, top - 30.0 - gap, vel_y);
                let res = run(&level, &mut p, &mut world);
                prop_assert_eq!(p.vel_y, force);
                prop_assert_eq!(p.pos.y, top - 30.0);
                prop_assert!(!p.grounded);
                let bounced = GameEvent::Bounced { force };
                prop_assert!(res.events.contains(&bounced));
            }

            #[test]
            fn health_stays_in_range(hits in 1usize..20) {
                let mut level = flat();
                level.hazards.push(Hazard {
                    rect: Rect::new(0.0, 300.0, 2000.0, 80.0),
                    kind: HazardKind::Lava,
                });
                let mut world = LevelState::new(&level);
                let mut p = airborne(100.0, 350.0, 0.4);
                for _ in 0..hits {
                    p.invulnerable = false;
                    p.pos.y = 350.0;
                    p.vel_y = 0.4;
                    run(&level, &mut p, &mut world);
                    prop_assert!((0..=100).contains(&p.health));
                }
            }
        }
    }
}
