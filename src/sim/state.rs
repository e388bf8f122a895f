//! Game state and core simulation types
//!
//! Everything a run mutates lives in [`GameState`]; [`RunState`] holds the
//! score/lives/combo bookkeeping that `reset` reinitialises.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::input::PointerTracker;
use super::quiz::{InterruptKind, PendingInterrupt, QuestionBank};
use crate::config::{DifficultyMode, GameConfig, ModeSettings};
use crate::consts::*;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Pre-start (menu)
    Idle,
    /// Active gameplay
    Running,
    /// Paused by the player
    Paused,
    /// Simulation suspended while a question is on screen
    QuizInterrupt,
    /// Run ended (failed revive)
    GameOver,
}

/// Power-up effect carried by a power-up entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Slow motion
    Freeze,
    /// Triple spawn rate
    Frenzy,
    /// Double fruit points
    Double,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Freeze, PowerUpKind::Frenzy, PowerUpKind::Double];

    pub fn color(&self) -> u32 {
        match self {
            PowerUpKind::Freeze => 0x0ea5e9,
            PowerUpKind::Frenzy => 0xf59e0b,
            PowerUpKind::Double => 0x8b5cf6,
        }
    }

    pub fn glyph(&self) -> Glyph {
        match self {
            PowerUpKind::Freeze => Glyph::Snowflake,
            PowerUpKind::Frenzy => Glyph::Fire,
            PowerUpKind::Double => Glyph::Sparkles,
        }
    }

    /// Banner shown on pickup
    pub fn banner(&self) -> (&'static str, u32) {
        match self {
            PowerUpKind::Freeze => ("❄️ FREEZE! ❄️", 0x38bdf8),
            PowerUpKind::Frenzy => ("🔥 FRENZY! 🔥", 0xfbbf24),
            PowerUpKind::Double => ("✨ 2x SCORE! ✨", 0xa78bfa),
        }
    }
}

/// Entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Fruit,
    Bomb,
    PowerUp(PowerUpKind),
    /// Cosmetic debris of a cut fruit (never sliceable)
    Half,
}

/// Visual glyph, opaque to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Glyph {
    Apple,
    Orange,
    Banana,
    Grapes,
    Strawberry,
    Peach,
    Kiwi,
    Pineapple,
    Bomb,
    Snowflake,
    Fire,
    Sparkles,
}

impl Glyph {
    pub const FRUITS: [Glyph; 8] = [
        Glyph::Apple,
        Glyph::Orange,
        Glyph::Banana,
        Glyph::Grapes,
        Glyph::Strawberry,
        Glyph::Peach,
        Glyph::Kiwi,
        Glyph::Pineapple,
    ];

    pub fn emoji(&self) -> &'static str {
        match self {
            Glyph::Apple => "🍎",
            Glyph::Orange => "🍊",
            Glyph::Banana => "🍌",
            Glyph::Grapes => "🍇",
            Glyph::Strawberry => "🍓",
            Glyph::Peach => "🍑",
            Glyph::Kiwi => "🥝",
            Glyph::Pineapple => "🍍",
            Glyph::Bomb => "💣",
            Glyph::Snowflake => "❄️",
            Glyph::Fire => "🔥",
            Glyph::Sparkles => "✨",
        }
    }
}

/// Fruit tints (0xRRGGBB)
pub const FRUIT_COLORS: [u32; 7] = [
    0xf87171, 0xfbbf24, 0x34d399, 0x60a5fa, 0x818cf8, 0xa78bfa, 0xf472b6,
];
pub const BOMB_COLOR: u32 = 0x1e293b;

/// A simulated object under gravity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Rotation angle (radians)
    pub angle: f32,
    /// Spin rate (radians per integration unit)
    pub spin: f32,
    pub kind: EntityKind,
    pub sliced: bool,
    pub color: u32,
    pub glyph: Glyph,
}

impl Entity {
    /// Whether a slice segment can still cut this entity
    pub fn is_sliceable(&self) -> bool {
        !self.sliced && self.kind != EntityKind::Half
    }

    /// The two halves a cut fruit breaks into: mirrored lateral kick, opposite spin
    pub fn split(&self, first_id: u32) -> [Entity; 2] {
        let half = |id: u32, dir: f32, angle: f32| Entity {
            id,
            pos: self.pos,
            vel: Vec2::new(
                self.vel.x + dir * HALF_SPREAD_VX,
                self.vel.y - HALF_KICK_VY,
            ),
            radius: self.radius,
            angle,
            spin: dir * HALF_SPIN,
            kind: EntityKind::Half,
            sliced: true,
            color: self.color,
            glyph: self.glyph,
        };
        [
            half(first_id, -1.0, self.angle),
            half(first_id + 1, 1.0, self.angle + std::f32::consts::PI),
        ]
    }
}

/// A decorative particle (not gameplay-affecting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub gravity: f32,
    pub size: f32,
    pub color: u32,
    /// Simulation time of birth (ms)
    pub born_ms: f64,
    pub life_ms: f32,
}

impl Particle {
    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.born_ms > self.life_ms as f64
    }
}

/// Floating text ("+2", "CHAIN +1", "LEVEL 3", ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePopup {
    pub pos: Vec2,
    pub vy: f32,
    pub text: String,
    pub color: u32,
    pub born_ms: f64,
    pub life_ms: f32,
}

impl ScorePopup {
    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.born_ms > self.life_ms as f64
    }
}

/// Remaining time on each power-up effect (ms). Independent and overlappable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTimers {
    pub freeze_ms: f32,
    pub frenzy_ms: f32,
    pub double_ms: f32,
}

impl PowerUpTimers {
    pub fn freeze_active(&self) -> bool {
        self.freeze_ms > 0.0
    }

    pub fn frenzy_active(&self) -> bool {
        self.frenzy_ms > 0.0
    }

    pub fn double_active(&self) -> bool {
        self.double_ms > 0.0
    }
}

/// Per-run bookkeeping, reinitialised on every start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    pub lives: u8,
    /// Consecutive fruit slices without a miss segment
    pub combo: u32,
    pub max_combo: u32,
    /// Fruit slices since the last life loss
    pub streak: u32,
    pub level: u32,
    /// Streak value that grants the next bonus life
    pub next_streak_reward: u32,
    pub timers: PowerUpTimers,
    /// Simulation speed multiplier (0.4 while frozen)
    pub time_scale: f32,
    pub spawn_interval_ms: f32,
    pub mode: DifficultyMode,
    pub settings: ModeSettings,
}

impl RunState {
    pub fn new(mode: DifficultyMode) -> Self {
        let settings = mode.settings();
        Self {
            score: 0,
            lives: MAX_LIVES,
            combo: 0,
            max_combo: 0,
            streak: 0,
            level: 1,
            next_streak_reward: STREAK_REWARD_STEP,
            timers: PowerUpTimers::default(),
            time_scale: 1.0,
            spawn_interval_ms: settings.base_spawn_ms,
            mode,
            settings,
        }
    }
}

/// Summary handed to the game-over screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub final_score: u64,
    pub max_combo: u32,
    pub level: u32,
    pub mode: DifficultyMode,
}

/// Notifications for the audio/UI collaborators, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { mode: DifficultyMode },
    FruitSliced { combo: u32, points: u64 },
    BombSliced,
    PowerUpCollected(PowerUpKind),
    ChainBonus { bonus: u64 },
    LifeGained { lives: u8 },
    LifeLost { lives: u8 },
    LevelUp { level: u32 },
    QuizOpened { kind: InterruptKind },
    QuizAnswered { correct: bool },
    QuizClosed,
    Paused,
    Resumed,
    ReturnedToMenu,
    GameOver(RunReport),
}

/// Complete game state
pub struct GameState {
    pub config: GameConfig,
    pub phase: GamePhase,
    pub run: RunState,
    /// Live entities in spawn order
    pub entities: Vec<Entity>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub popups: Vec<ScorePopup>,
    /// Play-field size (logical pixels)
    pub field: Vec2,
    /// Accumulated running time (ms); frozen while paused or interrupted
    pub sim_time_ms: f64,
    /// Host timestamp of the previous frame; `None` resets the elapsed baseline
    pub last_frame_at: Option<f64>,
    /// Simulation time of the last interval spawn
    pub last_spawn_at: Option<f64>,
    pub pointer: PointerTracker,
    pub interrupt: Option<PendingInterrupt>,
    /// Screen shake intensity, decays every frame
    pub screen_shake: f32,
    /// Score at the moment the run ended
    pub final_score: Option<u64>,
    /// Pending collaborator notifications
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    pub(crate) bank: Box<dyn QuestionBank>,
    next_id: u32,
}

impl GameState {
    /// Create an idle game; call [`GameState::reset`] to start a run
    pub fn new(config: GameConfig, bank: Box<dyn QuestionBank>) -> Self {
        let field = Vec2::new(config.field_width, config.field_height);
        let rng = Pcg32::seed_from_u64(config.seed);
        let run = RunState::new(config.mode);
        Self {
            config,
            phase: GamePhase::Idle,
            run,
            entities: Vec::new(),
            particles: Vec::new(),
            popups: Vec::new(),
            field,
            sim_time_ms: 0.0,
            last_frame_at: None,
            last_spawn_at: None,
            pointer: PointerTracker::default(),
            interrupt: None,
            screen_shake: 0.0,
            final_score: None,
            events: Vec::new(),
            rng,
            bank,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Live (still in the registry) entity by id
    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Kind of the open interrupt, if any
    pub fn interrupt_kind(&self) -> Option<InterruptKind> {
        self.interrupt.as_ref().map(|i| i.kind)
    }

    /// Resize the play-field (spawner and wall bounds follow)
    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.field = Vec2::new(width, height);
        } else {
            log::warn!("Ignoring invalid play-field size {}x{}", width, height);
        }
    }

    /// Change the difficulty mode; only allowed outside a run
    pub fn set_mode(&mut self, mode: DifficultyMode) -> bool {
        match self.phase {
            GamePhase::Idle | GamePhase::GameOver => {
                self.config.mode = mode;
                true
            }
            _ => false,
        }
    }

    /// Start (or restart) a run with full state reinitialisation.
    ///
    /// Safe to call while an interrupt is pending: the interrupt is discarded.
    pub fn reset(&mut self) {
        self.entities.clear();
        self.particles.clear();
        self.popups.clear();
        self.events.clear();
        self.run = RunState::new(self.config.mode);
        self.interrupt = None;
        self.pointer.release();
        self.pointer.clear_trail();
        self.sim_time_ms = 0.0;
        self.last_frame_at = None;
        self.last_spawn_at = None;
        self.screen_shake = 0.0;
        self.final_score = None;
        self.phase = GamePhase::Running;
        log::info!(
            "Run started: mode={}, field={}x{}",
            self.config.mode.as_str(),
            self.field.x,
            self.field.y
        );
        self.events.push(GameEvent::RunStarted {
            mode: self.config.mode,
        });
    }

    /// Report for the game-over screen
    pub fn report(&self) -> RunReport {
        RunReport {
            final_score: self.final_score.unwrap_or(self.run.score),
            max_combo: self.run.max_combo,
            level: self.run.level,
            mode: self.run.mode,
        }
    }

    /// Drain pending collaborator notifications
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn shake(&mut self, intensity: f32) {
        self.screen_shake = self.screen_shake.max(intensity);
    }

    /// Queue a "+N" popup at a position
    pub(crate) fn points_popup(&mut self, pos: Vec2, points: u64, color: u32) {
        self.popups.push(ScorePopup {
            pos,
            vy: -2.0,
            text: format!("+{}", points),
            color,
            born_ms: self.sim_time_ms,
            life_ms: POINTS_POPUP_MS,
        });
    }

    /// Queue a text banner; `at` is a fraction of the field size
    pub(crate) fn text_popup(&mut self, at: Vec2, text: impl Into<String>, color: u32) {
        self.popups.push(ScorePopup {
            pos: at * self.field,
            vy: -1.0,
            text: text.into(),
            color,
            born_ms: self.sim_time_ms,
            life_ms: TEXT_POPUP_MS,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_produces_mirrored_halves() {
        let fruit = Entity {
            id: 1,
            pos: Vec2::new(100.0, 200.0),
            vel: Vec2::new(1.0, -10.0),
            radius: 30.0,
            angle: 0.5,
            spin: 0.1,
            kind: EntityKind::Fruit,
            sliced: false,
            color: FRUIT_COLORS[0],
            glyph: Glyph::Apple,
        };
        let [left, right] = fruit.split(10);
        assert_eq!((left.id, right.id), (10, 11));
        assert!(left.sliced && right.sliced);
        assert_eq!(left.kind, EntityKind::Half);
        assert_eq!(left.vel, Vec2::new(-2.0, -12.0));
        assert_eq!(right.vel, Vec2::new(4.0, -12.0));
        assert_eq!(left.spin, -right.spin);
        assert!((right.angle - left.angle - std::f32::consts::PI).abs() < 1e-6);
        assert!(!left.is_sliceable());
    }

    #[test]
    fn test_run_state_defaults() {
        let run = RunState::new(DifficultyMode::Hard);
        assert_eq!(run.lives, MAX_LIVES);
        assert_eq!(run.level, 1);
        assert_eq!(run.next_streak_reward, 12);
        assert_eq!(run.spawn_interval_ms, 760.0);
        assert_eq!(run.time_scale, 1.0);
    }

    #[test]
    fn test_popup_expires_after_lifetime() {
        let popup = ScorePopup {
            pos: Vec2::ZERO,
            vy: -1.0,
            text: "+1".into(),
            color: 0xffffff,
            born_ms: 100.0,
            life_ms: 1000.0,
        };
        assert!(!popup.is_expired(600.0));
        assert!(!popup.is_expired(1100.0));
        assert!(popup.is_expired(1100.5));
    }
}
