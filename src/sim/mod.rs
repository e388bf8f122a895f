//! Simulation module
//!
//! All gameplay logic lives here:
//! - Explicit time only (host timestamps in, no wall clock reads)
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or DOM dependencies

pub mod input;
pub mod physics;
pub mod quiz;
pub mod scoring;
pub mod slice;
pub mod spawner;
pub mod state;
pub mod tick;

pub use input::{PointerTracker, TrailPoint};
pub use quiz::{
    InterruptKind, PendingInterrupt, Question, QuestionBank, QuestionBankError, QuestionPool,
    QuizAnswer,
};
pub use slice::{SliceOutcome, slice_hits};
pub use state::{
    Entity, EntityKind, GameEvent, GamePhase, GameState, Glyph, Particle, PowerUpKind,
    PowerUpTimers, RunReport, RunState, ScorePopup,
};
pub use tick::tick;
