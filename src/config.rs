//! Difficulty modes and game configuration
//!
//! Modes are a fixed table selected before a run starts. The rest of the
//! configuration (field size, seed, quiz reveal timings) can be loaded from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named difficulty mode. Also selects the question pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyMode {
    #[default]
    Easy,
    Medium,
    Hard,
    /// United Nations trivia
    Un,
}

impl DifficultyMode {
    pub const ALL: [DifficultyMode; 4] = [
        DifficultyMode::Easy,
        DifficultyMode::Medium,
        DifficultyMode::Hard,
        DifficultyMode::Un,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyMode::Easy => "easy",
            DifficultyMode::Medium => "medium",
            DifficultyMode::Hard => "hard",
            DifficultyMode::Un => "un",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(DifficultyMode::Easy),
            "medium" | "med" => Some(DifficultyMode::Medium),
            "hard" => Some(DifficultyMode::Hard),
            "un" => Some(DifficultyMode::Un),
            _ => None,
        }
    }

    /// Spawn and launch tuning for this mode
    pub fn settings(&self) -> ModeSettings {
        match self {
            DifficultyMode::Easy => ModeSettings {
                base_spawn_ms: 920.0,
                min_spawn_ms: 460.0,
                bomb_chance: 0.11,
                speed_scale: 0.95,
            },
            DifficultyMode::Medium => ModeSettings {
                base_spawn_ms: 840.0,
                min_spawn_ms: 420.0,
                bomb_chance: 0.14,
                speed_scale: 1.0,
            },
            DifficultyMode::Hard => ModeSettings {
                base_spawn_ms: 760.0,
                min_spawn_ms: 360.0,
                bomb_chance: 0.17,
                speed_scale: 1.08,
            },
            DifficultyMode::Un => ModeSettings {
                base_spawn_ms: 820.0,
                min_spawn_ms: 380.0,
                bomb_chance: 0.16,
                speed_scale: 1.04,
            },
        }
    }
}

/// Immutable per-mode tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeSettings {
    /// Spawn interval at level 1 (ms)
    pub base_spawn_ms: f32,
    /// Spawn interval floor (ms)
    pub min_spawn_ms: f32,
    /// Bomb probability at level 1
    pub bomb_chance: f32,
    /// Launch speed multiplier
    pub speed_scale: f32,
}

impl ModeSettings {
    /// Spawn interval for a level: shrinks 18ms per level down to the floor
    pub fn spawn_interval_ms(&self, level: u32) -> f32 {
        let shrink = level.saturating_sub(1) as f32 * crate::consts::SPAWN_MS_PER_LEVEL;
        (self.base_spawn_ms - shrink).max(self.min_spawn_ms)
    }

    /// Bomb probability for a level, capped
    pub fn bomb_chance_at(&self, level: u32) -> f32 {
        let boost = level.saturating_sub(1) as f32 * crate::consts::BOMB_CHANCE_PER_LEVEL;
        (self.bomb_chance + boost).min(crate::consts::MAX_BOMB_CHANCE)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("play-field must have positive size, got {width}x{height}")]
    InvalidField { width: f32, height: f32 },
}

/// Game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Difficulty mode (locked for the duration of a run)
    pub mode: DifficultyMode,
    /// RNG seed for spawning and quiz selection
    pub seed: u64,
    /// Play-field width in logical pixels
    pub field_width: f32,
    /// Play-field height in logical pixels
    pub field_height: f32,
    /// How long a correct answer stays on screen before play resumes (ms)
    pub correct_reveal_ms: f64,
    /// How long the correct answer is revealed after a wrong pick (ms)
    pub wrong_reveal_ms: f64,
    /// Upper bound on a single frame's elapsed time (ms)
    pub max_frame_ms: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: DifficultyMode::Easy,
            seed: 0x5eed_f00d,
            field_width: 800.0,
            field_height: 600.0,
            correct_reveal_ms: 1000.0,
            wrong_reveal_ms: 2000.0,
            max_frame_ms: 250.0,
        }
    }
}

impl GameConfig {
    /// Config for a mode and seed, everything else default
    pub fn with_mode(mode: DifficultyMode, seed: u64) -> Self {
        Self {
            mode,
            seed,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON config; missing fields use defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.field_width > 0.0 && self.field_height > 0.0) {
            return Err(ConfigError::InvalidField {
                width: self.field_width,
                height: self.field_height,
            });
        }
        Ok(())
    }
}
