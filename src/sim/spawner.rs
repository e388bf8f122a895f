//! Entity spawning
//!
//! Entities launch from just below the field in an upward cone. What spawns
//! and how fast depends on the difficulty mode and the current level.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::state::{
    BOMB_COLOR, Entity, EntityKind, FRUIT_COLORS, GameState, Glyph, PowerUpKind,
};
use crate::consts::*;

/// Poll the spawn clock; spawns once the interval has passed (3x faster in frenzy)
pub fn maybe_spawn(state: &mut GameState, now_ms: f64) -> bool {
    let divisor = if state.run.timers.frenzy_active() {
        FRENZY_SPAWN_DIVISOR
    } else {
        1.0
    };
    let interval = (state.run.spawn_interval_ms / divisor) as f64;
    let due = state
        .last_spawn_at
        .is_none_or(|last| now_ms - last > interval);
    if due {
        spawn_entity(state);
        state.last_spawn_at = Some(now_ms);
    }
    due
}

/// Pick a kind for the next launch
pub fn roll_kind<R: Rng + ?Sized>(rng: &mut R, bomb_chance: f32) -> EntityKind {
    if rng.random::<f32>() < bomb_chance {
        EntityKind::Bomb
    } else if rng.random::<f32>() < POWERUP_CHANCE {
        let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
        EntityKind::PowerUp(kind)
    } else {
        EntityKind::Fruit
    }
}

/// Launch velocity. Speed scales with level (+3%/level, max +50%), the mode and
/// the field height; vertical velocity is always strongly upward.
pub fn launch_velocity<R: Rng + ?Sized>(
    rng: &mut R,
    kind: EntityKind,
    level: u32,
    speed_scale: f32,
    field_height: f32,
) -> Vec2 {
    use std::f32::consts::PI;

    let angle = -PI / 2.0 + rng.random::<f32>() * PI / 2.5 - PI / 5.0;
    let level_boost = 1.0 + (level.saturating_sub(1) as f32 * 0.03).min(0.5);
    let base = match kind {
        EntityKind::Bomb => 12.0,
        _ => 16.0 + rng.random::<f32>() * 6.0,
    };
    let speed = base * (field_height / REFERENCE_HEIGHT) * speed_scale * level_boost;
    let side = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
    let vx = angle.cos() * speed * side * 0.7;
    let vy = -(angle.sin() * speed).abs() - 10.0;
    Vec2::new(vx, vy)
}

/// Create one fruit, bomb or power-up below the field
pub fn spawn_entity(state: &mut GameState) {
    let level = state.run.level;
    let settings = state.run.settings;
    let field = state.field;
    let rng = &mut state.rng;

    let kind = roll_kind(rng, settings.bomb_chance_at(level));
    let radius = match kind {
        EntityKind::Bomb => BOMB_RADIUS,
        EntityKind::PowerUp(_) => POWERUP_RADIUS,
        _ => FRUIT_MIN_RADIUS + rng.random::<f32>() * FRUIT_RADIUS_SPREAD,
    };
    let span = (field.x - 2.0 * SPAWN_MARGIN_X).max(0.0);
    let pos = Vec2::new(
        SPAWN_MARGIN_X + rng.random::<f32>() * span,
        field.y + SPAWN_BELOW,
    );
    let vel = launch_velocity(rng, kind, level, settings.speed_scale, field.y);
    let spin = (rng.random::<f32>() * 2.0 - 1.0) * 0.15;

    let (color, glyph) = match kind {
        EntityKind::Bomb => (BOMB_COLOR, Glyph::Bomb),
        EntityKind::PowerUp(p) => (p.color(), p.glyph()),
        _ => (
            *FRUIT_COLORS.choose(rng).unwrap_or(&FRUIT_COLORS[0]),
            *Glyph::FRUITS.choose(rng).unwrap_or(&Glyph::Apple),
        ),
    };

    let id = state.next_entity_id();
    log::debug!("Spawn {:?} #{} at x={:.0}", kind, id, pos.x);
    state.entities.push(Entity {
        id,
        pos,
        vel,
        radius,
        angle: 0.0,
        spin,
        kind,
        sliced: false,
        color,
        glyph,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DifficultyMode, GameConfig};
    use crate::sim::quiz::QuestionPool;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn game(mode: DifficultyMode, seed: u64) -> GameState {
        let mut state = GameState::new(
            GameConfig::with_mode(mode, seed),
            Box::new(QuestionPool::new()),
        );
        state.reset();
        state
    }

    #[test]
    fn test_first_poll_spawns_then_waits_for_interval() {
        let mut state = game(DifficultyMode::Easy, 1);
        assert!(maybe_spawn(&mut state, 0.0));
        assert!(!maybe_spawn(&mut state, 900.0));
        assert!(!maybe_spawn(&mut state, 920.0));
        assert!(maybe_spawn(&mut state, 920.5));
        assert_eq!(state.entities.len(), 2);
    }

    #[test]
    fn test_frenzy_triples_spawn_rate() {
        let mut state = game(DifficultyMode::Easy, 1);
        state.run.timers.frenzy_ms = 3000.0;
        assert!(maybe_spawn(&mut state, 0.0));
        assert!(maybe_spawn(&mut state, 310.0));
    }

    #[test]
    fn test_spawned_entities_are_valid() {
        let mut state = game(DifficultyMode::Hard, 99);
        for _ in 0..500 {
            spawn_entity(&mut state);
        }
        for e in &state.entities {
            assert!(e.radius > 0.0);
            assert!(e.vel.y < -10.0, "launch must be upward: {:?}", e.vel);
            assert!(e.pos.x >= SPAWN_MARGIN_X && e.pos.x <= state.field.x - SPAWN_MARGIN_X);
            assert_eq!(e.pos.y, state.field.y + SPAWN_BELOW);
            assert!(!e.sliced);
            match e.kind {
                EntityKind::Bomb => assert_eq!(e.radius, BOMB_RADIUS),
                EntityKind::PowerUp(_) => assert_eq!(e.radius, POWERUP_RADIUS),
                EntityKind::Fruit => assert!((24.0..=36.0).contains(&e.radius)),
                EntityKind::Half => panic!("spawner never creates halves"),
            }
        }
    }

    #[test]
    fn test_resize_moves_spawn_band() {
        let mut state = game(DifficultyMode::Easy, 3);
        state.resize(400.0, 1000.0);
        for _ in 0..200 {
            spawn_entity(&mut state);
        }
        for e in &state.entities {
            assert!(e.pos.x >= SPAWN_MARGIN_X && e.pos.x <= 400.0 - SPAWN_MARGIN_X);
            assert_eq!(e.pos.y, 1000.0 + SPAWN_BELOW);
        }

        // Degenerate sizes are ignored
        state.resize(0.0, 500.0);
        assert_eq!(state.field, Vec2::new(400.0, 1000.0));
    }

    #[test]
    fn test_kind_distribution_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let n = 20_000;
        let mut bombs = 0;
        let mut power_ups = 0;
        for _ in 0..n {
            match roll_kind(&mut rng, 0.11) {
                EntityKind::Bomb => bombs += 1,
                EntityKind::PowerUp(_) => power_ups += 1,
                _ => {}
            }
        }
        let bomb_rate = bombs as f32 / n as f32;
        let power_rate = power_ups as f32 / n as f32;
        assert!((0.09..0.13).contains(&bomb_rate), "bomb rate {}", bomb_rate);
        // 5% of the non-bomb draws
        assert!((0.035..0.055).contains(&power_rate), "power-up rate {}", power_rate);
    }

    #[test]
    fn test_speed_grows_with_level_and_caps() {
        let speed_at = |level| {
            let mut rng = Pcg32::seed_from_u64(5);
            launch_velocity(&mut rng, EntityKind::Bomb, level, 1.0, 800.0)
        };
        let l1 = speed_at(1);
        let l11 = speed_at(11);
        let l40 = speed_at(40);
        let l90 = speed_at(90);
        // Same seed: only the level boost differs
        assert!((l11.x / l1.x - 1.3).abs() < 1e-3);
        assert!((l40.x / l1.x - 1.5).abs() < 1e-3);
        assert_eq!(l40, l90);
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = game(DifficultyMode::Medium, 77);
        let mut b = game(DifficultyMode::Medium, 77);
        for _ in 0..50 {
            spawn_entity(&mut a);
            spawn_entity(&mut b);
        }
        let kinds = |s: &GameState| s.entities.iter().map(|e| (e.kind, e.pos)).collect::<Vec<_>>();
        assert_eq!(kinds(&a), kinds(&b));
    }
}
