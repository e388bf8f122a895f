//! Quiz interrupts
//!
//! Slicing a bomb or running out of lives suspends the simulation behind a
//! multiple-choice question. The pending interrupt carries its continuation as
//! an [`InterruptKind`]; answering it is an explicit state transition.

use std::collections::HashMap;

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{GameEvent, GamePhase, GameState};
use crate::config::DifficultyMode;
use crate::consts::BOMB_DEFUSE_POINTS;

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "q")]
    pub prompt: String,
    pub options: Vec<String>,
    /// Text of the correct option
    pub answer: String,
}

impl Question {
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.answer)
    }
}

/// Source of questions, one pool per difficulty mode
pub trait QuestionBank {
    fn questions(&self, mode: DifficultyMode) -> &[Question];

    /// Uniformly random question for a mode, falling back to the easy pool
    fn random_question(&self, mode: DifficultyMode, rng: &mut dyn RngCore) -> Option<&Question> {
        let mut pool = self.questions(mode);
        if pool.is_empty() {
            log::warn!("No questions for mode '{}', using easy pool", mode.as_str());
            pool = self.questions(DifficultyMode::Easy);
        }
        if pool.is_empty() {
            return None;
        }
        pool.get(rng.random_range(0..pool.len()))
    }
}

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("invalid question bank JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{mode} question {index}: answer '{answer}' is not one of its options")]
    AnswerNotInOptions {
        mode: &'static str,
        index: usize,
        answer: String,
    },
}

/// In-memory question pools keyed by mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionPool {
    pools: HashMap<DifficultyMode, Vec<Question>>,
}

const BUILTIN_QUESTIONS: &str = include_str!("../../assets/questions.json");

impl QuestionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{"easy": [...], "medium": [...], ...}`
    pub fn from_json(json: &str) -> Result<Self, QuestionBankError> {
        let pools: HashMap<DifficultyMode, Vec<Question>> = serde_json::from_str(json)?;
        for (mode, questions) in &pools {
            for (index, q) in questions.iter().enumerate() {
                if q.correct_index().is_none() {
                    return Err(QuestionBankError::AnswerNotInOptions {
                        mode: mode.as_str(),
                        index,
                        answer: q.answer.clone(),
                    });
                }
            }
        }
        let count: usize = pools.values().map(Vec::len).sum();
        log::info!("Loaded {} questions across {} modes", count, pools.len());
        Ok(Self { pools })
    }

    /// Sample pools bundled with the crate
    pub fn builtin() -> Result<Self, QuestionBankError> {
        Self::from_json(BUILTIN_QUESTIONS)
    }

    pub fn insert(&mut self, mode: DifficultyMode, question: Question) {
        self.pools.entry(mode).or_default().push(question);
    }

    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QuestionBank for QuestionPool {
    fn questions(&self, mode: DifficultyMode) -> &[Question] {
        self.pools.get(&mode).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Why the quiz was opened; decides what a right or wrong answer does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptKind {
    /// Bomb sliced: right = +5 points and a life, wrong = lose a life
    Bomb,
    /// Out of lives: right = one life back, wrong = game over
    Revive,
}

impl InterruptKind {
    pub fn is_revive(&self) -> bool {
        matches!(self, InterruptKind::Revive)
    }

    pub fn title(&self) -> &'static str {
        match self {
            InterruptKind::Bomb => "Bomb Challenge",
            InterruptKind::Revive => "Final Chance: Revive",
        }
    }
}

/// The player's pick, shown until the reveal delay runs out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub picked: usize,
    pub correct: bool,
    pub remaining_ms: f64,
}

/// An open question challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInterrupt {
    pub kind: InterruptKind,
    pub prompt: String,
    /// Options in display (shuffled) order
    pub options: Vec<String>,
    pub correct_index: usize,
    pub answer: Option<QuizAnswer>,
}

impl PendingInterrupt {
    /// Build from a question, shuffling the displayed options
    pub fn new<R: Rng + ?Sized>(kind: InterruptKind, question: &Question, rng: &mut R) -> Option<Self> {
        let mut options = question.options.clone();
        options.shuffle(rng);
        let correct_index = options.iter().position(|o| *o == question.answer)?;
        Some(Self {
            kind,
            prompt: question.prompt.clone(),
            options,
            correct_index,
            answer: None,
        })
    }

    /// Correct option text, revealed once an answer is in
    pub fn revealed_answer(&self) -> Option<&str> {
        self.answer
            .map(|_| self.options[self.correct_index].as_str())
    }
}

impl GameState {
    /// Suspend the simulation behind a question.
    ///
    /// Ignored if an interrupt is already open or the game is over; the first
    /// interrupt wins. Returns whether an interrupt was opened.
    pub fn open_interrupt(&mut self, kind: InterruptKind) -> bool {
        if self.interrupt.is_some()
            || matches!(self.phase, GamePhase::QuizInterrupt | GamePhase::GameOver)
        {
            log::debug!("Ignoring {:?} interrupt, one is already pending", kind);
            return false;
        }

        let mode = self.run.mode;
        let pending = self
            .bank
            .random_question(mode, &mut self.rng)
            .cloned()
            .and_then(|q| PendingInterrupt::new(kind, &q, &mut self.rng));

        self.pointer.release();
        self.phase = GamePhase::QuizInterrupt;
        self.events.push(GameEvent::QuizOpened { kind });

        match pending {
            Some(pending) => {
                log::info!("{}: {}", kind.title(), pending.prompt);
                self.interrupt = Some(pending);
            }
            None => {
                // Nothing to ask: let the player through
                log::warn!("No usable question for {:?} interrupt, resolving as correct", kind);
                self.finish_interrupt(kind, true);
            }
        }
        true
    }

    /// Report the player's pick (index into the displayed options).
    ///
    /// Returns whether it was correct, or `None` if there is no open question,
    /// it was already answered, or the index is out of range.
    pub fn answer(&mut self, option: usize) -> Option<bool> {
        if self.phase != GamePhase::QuizInterrupt {
            return None;
        }
        let reveal = self.interrupt.as_mut()?;
        if reveal.answer.is_some() || option >= reveal.options.len() {
            return None;
        }

        let correct = option == reveal.correct_index;
        let delay = if correct {
            self.config.correct_reveal_ms
        } else {
            self.config.wrong_reveal_ms
        };
        reveal.answer = Some(QuizAnswer {
            picked: option,
            correct,
            remaining_ms: delay,
        });
        log::info!(
            "Quiz answered {} (correct: {})",
            if correct { "right" } else { "wrong" },
            reveal.options[reveal.correct_index]
        );
        self.events.push(GameEvent::QuizAnswered { correct });

        if delay <= 0.0 {
            self.resolve_interrupt();
        }
        Some(correct)
    }

    /// Count down the reveal display; resumes once it runs out
    pub(crate) fn advance_reveal(&mut self, elapsed_ms: f64) {
        let Some(answer) = self.interrupt.as_mut().and_then(|i| i.answer.as_mut()) else {
            return;
        };
        answer.remaining_ms -= elapsed_ms;
        if answer.remaining_ms <= 0.0 {
            self.resolve_interrupt();
        }
    }

    /// Close an answered interrupt and run its continuation
    fn resolve_interrupt(&mut self) {
        let Some(pending) = self.interrupt.take() else {
            return;
        };
        let correct = pending.answer.is_some_and(|a| a.correct);
        self.finish_interrupt(pending.kind, correct);
    }

    fn finish_interrupt(&mut self, kind: InterruptKind, correct: bool) {
        self.interrupt = None;
        self.phase = GamePhase::Running;
        // Resume without a large elapsed-time jump
        self.last_frame_at = None;
        self.events.push(GameEvent::QuizClosed);

        match (kind, correct) {
            (InterruptKind::Bomb, true) => {
                self.run.score += BOMB_DEFUSE_POINTS;
                self.gain_life(1);
                let center = self.field * Vec2::new(0.5, 0.45);
                self.points_popup(center, BOMB_DEFUSE_POINTS, 0xfbbf24);
                self.text_popup(Vec2::new(0.5, 0.52), "BOMB DEFUSED +1 LIFE", 0x10b981);
                self.update_progression();
            }
            (InterruptKind::Bomb, false) => self.lose_life(),
            (InterruptKind::Revive, true) => {
                self.gain_life(1);
                self.text_popup(Vec2::new(0.5, 0.5), "REVIVED! +1 LIFE", 0x10b981);
            }
            (InterruptKind::Revive, false) => {
                self.shake(15.0);
                self.game_over();
            }
        }
    }
}
