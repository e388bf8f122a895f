//! Fruit Quiz - A fruit-slicing arcade game with quiz interrupts
//!
//! Core modules:
//! - `sim`: Simulation (spawning, physics, slicing, scoring, state machine)
//! - `config`: Difficulty modes and game configuration
//! - `host`: Collaborator traits (audio, UI) and render snapshots
//! - `audio`: Web Audio tone player (wasm only)
//! - `web`: JavaScript-facing game handle (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod config;
pub mod host;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, DifficultyMode, GameConfig, ModeSettings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Downward acceleration applied to entities (per integration unit)
    pub const GRAVITY: f32 = 0.45;
    /// Milliseconds to integration units (20ms = 1 unit)
    pub const INTEGRATION_FACTOR: f32 = 0.05;

    /// Lives
    pub const MAX_LIVES: u8 = 7;
    /// Streak slices required per bonus life
    pub const STREAK_REWARD_STEP: u32 = 12;

    /// Levels
    pub const POINTS_PER_LEVEL: u64 = 20;
    pub const SPAWN_MS_PER_LEVEL: f32 = 18.0;

    /// Slice forgiveness (hit radius multiplier)
    pub const SLICE_FORGIVENESS: f32 = 1.25;
    /// Combo threshold for 2-point fruit
    pub const COMBO_BONUS_AT: u32 = 3;

    /// Spawning
    pub const MAX_BOMB_CHANCE: f32 = 0.28;
    pub const BOMB_CHANCE_PER_LEVEL: f32 = 0.005;
    pub const POWERUP_CHANCE: f32 = 0.05;
    pub const FRENZY_SPAWN_DIVISOR: f32 = 3.0;
    pub const FRENZY_EXTRA_SPAWN_CHANCE: f32 = 0.15;
    pub const SPAWN_MARGIN_X: f32 = 50.0;
    pub const SPAWN_BELOW: f32 = 45.0;
    /// Entities further than this below the field are removed
    pub const DESPAWN_BELOW: f32 = 60.0;
    /// Launch speeds are tuned for an 800px tall field
    pub const REFERENCE_HEIGHT: f32 = 800.0;

    /// Entity radii
    pub const BOMB_RADIUS: f32 = 28.0;
    pub const POWERUP_RADIUS: f32 = 35.0;
    pub const FRUIT_MIN_RADIUS: f32 = 24.0;
    pub const FRUIT_RADIUS_SPREAD: f32 = 12.0;

    /// Power-up durations (ms of tick time)
    pub const FREEZE_MS: f32 = 5000.0;
    pub const FRENZY_MS: f32 = 3000.0;
    pub const DOUBLE_MS: f32 = 8000.0;
    pub const FREEZE_TIME_SCALE: f32 = 0.4;

    /// Fruit halves
    pub const HALF_SPREAD_VX: f32 = 3.0;
    pub const HALF_KICK_VY: f32 = 2.0;
    pub const HALF_SPIN: f32 = 0.2;

    /// Effects
    pub const FRUIT_PARTICLES: usize = 25;
    pub const POWERUP_PARTICLES: usize = 40;
    pub const MAX_PARTICLES: usize = 512;
    pub const POINTS_POPUP_MS: f32 = 1000.0;
    pub const TEXT_POPUP_MS: f32 = 1500.0;

    /// Bomb defused reward
    pub const BOMB_DEFUSE_POINTS: u64 = 5;

    /// Swipe trail
    pub const MAX_TRAIL_POINTS: usize = 24;
    pub const TRAIL_FADE_MS: f64 = 350.0;

    /// Events kept for a host that polls instead of draining every frame
    pub const MAX_PENDING_EVENTS: usize = 256;
}

/// Segment-circle intersection on the parametrised segment `p1 + t * (p2 - p1)`.
///
/// Returns true if either root of the quadratic lies in `[0, 1]`. Zero-length
/// segments never hit.
#[inline]
pub fn segment_hits_circle(p1: Vec2, p2: Vec2, center: Vec2, radius: f32) -> bool {
    let d = p2 - p1;
    let f = p1 - center;
    let a = d.dot(d);
    if a == 0.0 {
        return false;
    }
    let b = 2.0 * f.dot(d);
    let c = f.dot(f) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return false;
    }
    let root = discriminant.sqrt();
    let t1 = (-b - root) / (2.0 * a);
    let t2 = (-b + root) / (2.0 * a);
    (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2)
}
