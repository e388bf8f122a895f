//! Host-side collaborators
//!
//! The simulation never calls out directly. It queues [`GameEvent`]s, and the
//! host drains them each frame with [`dispatch`], which fans them out to an
//! optional audio sink and optional UI hooks. Rendering reads a borrowed
//! [`RenderSnapshot`].

use std::collections::VecDeque;

use glam::Vec2;
use serde::Serialize;

use crate::config::DifficultyMode;
use crate::consts::{MAX_LIVES, MAX_PENDING_EVENTS};
use crate::sim::{
    Entity, GameEvent, GamePhase, GameState, InterruptKind, Particle, RunReport, ScorePopup,
    TrailPoint,
};

/// Oscillator shape for a tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

/// A fire-and-forget sound request
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tone {
    pub frequency: f32,
    pub duration_secs: f32,
    pub waveform: Waveform,
}

impl Tone {
    pub const fn new(frequency: f32, duration_secs: f32, waveform: Waveform) -> Self {
        Self {
            frequency,
            duration_secs,
            waveform,
        }
    }
}

/// Audio collaborator
pub trait AudioSink {
    fn play_tone(&mut self, tone: Tone);
}

/// Sink for hosts without audio
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play_tone(&mut self, _tone: Tone) {}
}

impl GameEvent {
    /// Sound for this event, if it has one
    pub fn tone(&self) -> Option<Tone> {
        let tone = match self {
            GameEvent::FruitSliced { combo, .. } => {
                let pitch = (*combo as f32 * 50.0).min(500.0);
                Tone::new(300.0 + pitch, 0.1, Waveform::Triangle)
            }
            GameEvent::BombSliced => Tone::new(100.0, 0.5, Waveform::Sawtooth),
            GameEvent::PowerUpCollected(_) => Tone::new(600.0, 0.3, Waveform::Sine),
            GameEvent::ChainBonus { .. } => Tone::new(520.0, 0.08, Waveform::Triangle),
            GameEvent::LifeGained { .. } => Tone::new(680.0, 0.2, Waveform::Triangle),
            GameEvent::LifeLost { .. } => Tone::new(150.0, 0.2, Waveform::Sawtooth),
            GameEvent::LevelUp { .. } => Tone::new(760.0, 0.15, Waveform::Sine),
            GameEvent::QuizAnswered { correct: true } => Tone::new(600.0, 0.2, Waveform::Sine),
            GameEvent::QuizAnswered { correct: false } => {
                Tone::new(150.0, 0.4, Waveform::Sawtooth)
            }
            _ => return None,
        };
        Some(tone)
    }
}

/// HUD numbers and hearts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub lives: u8,
    pub max_lives: u8,
    pub combo: u32,
    pub level: u32,
    pub mode: DifficultyMode,
    pub freeze: bool,
    pub frenzy: bool,
    pub double: bool,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        let run = &state.run;
        Self {
            score: run.score,
            lives: run.lives,
            max_lives: MAX_LIVES,
            combo: run.combo,
            level: run.level,
            mode: run.mode,
            freeze: run.timers.freeze_active(),
            frenzy: run.timers.frenzy_active(),
            double: run.timers.double_active(),
        }
    }

    /// Hearts string, filled then empty
    pub fn hearts(&self) -> String {
        let filled = self.lives.min(self.max_lives) as usize;
        let empty = self.max_lives as usize - filled;
        format!("{}{}", "❤️".repeat(filled), "🤍".repeat(empty))
    }
}

/// What the quiz overlay shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizView<'a> {
    pub kind: InterruptKind,
    pub title: &'static str,
    pub prompt: &'a str,
    pub options: &'a [String],
    /// The player's pick, once answered
    pub picked: Option<usize>,
    /// Correct option index, revealed once answered
    pub correct: Option<usize>,
}

impl<'a> QuizView<'a> {
    pub fn from_state(state: &'a GameState) -> Option<Self> {
        let pending = state.interrupt.as_ref()?;
        let answer = pending.answer;
        Some(Self {
            kind: pending.kind,
            title: pending.kind.title(),
            prompt: &pending.prompt,
            options: &pending.options,
            picked: answer.map(|a| a.picked),
            correct: answer.map(|_| pending.correct_index),
        })
    }
}

/// UI/DOM collaborator. Every hook defaults to a no-op.
pub trait UiHooks {
    fn update_hud(&mut self, _hud: &Hud) {}
    fn show_pause(&mut self, _paused: bool) {}
    fn show_quiz(&mut self, _quiz: &QuizView<'_>) {}
    fn hide_quiz(&mut self) {}
    fn show_game_over(&mut self, _report: &RunReport) {}
    fn show_menu(&mut self) {}
}

/// Drain queued events and notify the collaborators that are present.
///
/// The quiz overlay is refreshed once, after the whole batch, from the quiz
/// that is still open by then. Returns the drained events so the host can
/// forward them elsewhere.
pub fn dispatch(
    state: &mut GameState,
    mut audio: Option<&mut dyn AudioSink>,
    mut ui: Option<&mut dyn UiHooks>,
) -> Vec<GameEvent> {
    let events = state.take_events();
    if events.is_empty() {
        return events;
    }

    let mut quiz_changed = false;
    for event in &events {
        if let (Some(audio), Some(tone)) = (audio.as_mut(), event.tone()) {
            audio.play_tone(tone);
        }
        let Some(ui) = ui.as_mut() else {
            continue;
        };
        match event {
            GameEvent::RunStarted { .. } => {
                ui.show_pause(false);
                ui.hide_quiz();
            }
            GameEvent::Paused => ui.show_pause(true),
            GameEvent::Resumed => ui.show_pause(false),
            GameEvent::QuizOpened { .. } | GameEvent::QuizAnswered { .. } => quiz_changed = true,
            GameEvent::QuizClosed => ui.hide_quiz(),
            GameEvent::GameOver(report) => ui.show_game_over(report),
            GameEvent::ReturnedToMenu => {
                ui.show_pause(false);
                ui.show_menu();
            }
            _ => {}
        }
    }

    if let Some(ui) = ui.as_mut() {
        if quiz_changed {
            if let Some(view) = QuizView::from_state(state) {
                ui.show_quiz(&view);
            }
        }
        ui.update_hud(&Hud::from_state(state));
    }
    events
}

/// Events waiting for a host that polls instead of taking callbacks.
///
/// Holds at most `capacity` events; when the host falls behind the oldest are
/// dropped.
#[derive(Debug)]
pub struct EventOutbox {
    events: VecDeque<GameEvent>,
    capacity: usize,
    dropped: usize,
}

impl Default for EventOutbox {
    fn default() -> Self {
        Self::with_capacity(MAX_PENDING_EVENTS)
    }
}

impl EventOutbox {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            if self.events.len() == self.capacity {
                self.events.pop_front();
                self.dropped += 1;
            }
            self.events.push_back(event);
        }
    }

    /// Take everything queued, oldest first
    pub fn drain(&mut self) -> Vec<GameEvent> {
        if self.dropped > 0 {
            log::warn!("Event outbox overflowed, dropped {} events", self.dropped);
            self.dropped = 0;
        }
        self.events.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Read-only view of everything the renderer draws this frame
#[derive(Debug, Serialize)]
pub struct RenderSnapshot<'a> {
    pub phase: GamePhase,
    pub field: Vec2,
    pub sim_time_ms: f64,
    pub screen_shake: f32,
    pub entities: &'a [Entity],
    pub particles: &'a [Particle],
    pub popups: &'a [ScorePopup],
    pub trail: Vec<TrailPoint>,
    pub hud: Hud,
    pub quiz: Option<QuizView<'a>>,
    pub final_score: Option<u64>,
}

impl<'a> RenderSnapshot<'a> {
    pub fn capture(state: &'a GameState) -> Self {
        Self {
            phase: state.phase,
            field: state.field,
            sim_time_ms: state.sim_time_ms,
            screen_shake: state.screen_shake,
            entities: &state.entities,
            particles: &state.particles,
            popups: &state.popups,
            trail: state.pointer.trail().copied().collect(),
            hud: Hud::from_state(state),
            quiz: QuizView::from_state(state),
            final_score: state.final_score,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::{PowerUpKind, QuestionPool};

    #[derive(Default)]
    struct RecordingAudio {
        tones: Vec<Tone>,
    }

    impl AudioSink for RecordingAudio {
        fn play_tone(&mut self, tone: Tone) {
            self.tones.push(tone);
        }
    }

    #[derive(Default)]
    struct RecordingUi {
        huds: Vec<Hud>,
        paused: Option<bool>,
        quiz_shown: Vec<(InterruptKind, Option<usize>)>,
        quiz_hidden: usize,
        game_over: Option<RunReport>,
    }

    impl UiHooks for RecordingUi {
        fn update_hud(&mut self, hud: &Hud) {
            self.huds.push(*hud);
        }
        fn show_pause(&mut self, paused: bool) {
            self.paused = Some(paused);
        }
        fn show_quiz(&mut self, quiz: &QuizView<'_>) {
            self.quiz_shown.push((quiz.kind, quiz.picked));
        }
        fn hide_quiz(&mut self) {
            self.quiz_hidden += 1;
        }
        fn show_game_over(&mut self, report: &RunReport) {
            self.game_over = Some(*report);
        }
    }

    fn running_game() -> GameState {
        let mut state = GameState::new(
            GameConfig::default(),
            Box::new(QuestionPool::builtin().unwrap()),
        );
        state.reset();
        state
    }

    #[test]
    fn test_combo_raises_fruit_pitch_with_cap() {
        let pitch = |combo| {
            GameEvent::FruitSliced { combo, points: 1 }
                .tone()
                .map(|t| t.frequency)
        };
        assert_eq!(pitch(1), Some(350.0));
        assert_eq!(pitch(4), Some(500.0));
        assert_eq!(pitch(10), Some(800.0));
        assert_eq!(pitch(40), Some(800.0));
    }

    #[test]
    fn test_state_only_events_are_silent() {
        assert!(GameEvent::Paused.tone().is_none());
        assert!(GameEvent::QuizClosed.tone().is_none());
        let wrong = GameEvent::QuizAnswered { correct: false }.tone().unwrap();
        assert_eq!(wrong.waveform, Waveform::Sawtooth);
        assert_eq!(wrong.duration_secs, 0.4);
    }

    #[test]
    fn test_dispatch_without_collaborators_drains() {
        let mut state = running_game();
        state.events.push(GameEvent::BombSliced);
        let events = dispatch(&mut state, None, None);
        assert_eq!(events.len(), 2);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_dispatch_notifies_audio_and_ui() {
        let mut state = running_game();
        let mut audio = RecordingAudio::default();
        let mut ui = RecordingUi::default();

        state.activate_power_up(PowerUpKind::Double);
        state.events.push(GameEvent::PowerUpCollected(PowerUpKind::Double));
        state.toggle_pause();
        dispatch(&mut state, Some(&mut audio), Some(&mut ui));

        assert_eq!(audio.tones.len(), 1);
        assert_eq!(audio.tones[0].frequency, 600.0);
        assert_eq!(ui.paused, Some(true));
        let hud = ui.huds.last().unwrap();
        assert!(hud.double);
        assert_eq!(hud.lives, MAX_LIVES);

        // Nothing queued: no HUD refresh
        dispatch(&mut state, Some(&mut audio), Some(&mut ui));
        assert_eq!(ui.huds.len(), 1);
    }

    #[test]
    fn test_dispatch_shows_quiz_and_game_over() {
        let mut state = running_game();
        let mut ui = RecordingUi::default();
        dispatch(&mut state, None, None);
        state.config.wrong_reveal_ms = 0.0;
        state.run.lives = 0;
        state.open_interrupt(InterruptKind::Revive);
        dispatch(&mut state, None, Some(&mut ui));
        assert_eq!(ui.quiz_shown, vec![(InterruptKind::Revive, None)]);

        let pending = state.interrupt.as_ref().unwrap();
        let wrong = (pending.correct_index + 1) % pending.options.len();
        state.run.score = 42;
        assert_eq!(state.answer(wrong), Some(false));
        dispatch(&mut state, None, Some(&mut ui));

        assert_eq!(ui.quiz_shown.len(), 1);
        assert_eq!(ui.quiz_hidden, 1);
        assert_eq!(ui.game_over.map(|r| r.final_score), Some(42));
    }

    #[test]
    fn test_quiz_overlay_shows_question_still_open_after_batch() {
        let mut state = running_game();
        let mut ui = RecordingUi::default();
        dispatch(&mut state, None, None);
        state.config.wrong_reveal_ms = 0.0;
        state.run.lives = 1;
        state.open_interrupt(InterruptKind::Bomb);
        let pending = state.interrupt.as_ref().unwrap();
        let wrong = (pending.correct_index + 1) % pending.options.len();

        // Wrong bomb answer costs the last life and opens the revive in one batch
        assert_eq!(state.answer(wrong), Some(false));
        assert_eq!(state.interrupt_kind(), Some(InterruptKind::Revive));
        dispatch(&mut state, None, Some(&mut ui));

        assert_eq!(ui.quiz_hidden, 1);
        assert_eq!(ui.quiz_shown, vec![(InterruptKind::Revive, None)]);
    }

    #[test]
    fn test_outbox_drops_oldest_when_full() {
        let mut outbox = EventOutbox::with_capacity(3);
        outbox.extend([GameEvent::Paused, GameEvent::Resumed]);
        outbox.extend([
            GameEvent::LevelUp { level: 2 },
            GameEvent::LevelUp { level: 3 },
        ]);
        assert_eq!(outbox.len(), 3);
        assert_eq!(
            outbox.drain(),
            vec![
                GameEvent::Resumed,
                GameEvent::LevelUp { level: 2 },
                GameEvent::LevelUp { level: 3 },
            ]
        );
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_outbox_default_capacity_bounds_unpolled_frames() {
        let mut state = running_game();
        let mut outbox = EventOutbox::default();
        for _ in 0..(MAX_PENDING_EVENTS + 50) {
            state.toggle_pause();
            outbox.extend(dispatch(&mut state, None, None));
        }
        assert_eq!(outbox.len(), MAX_PENDING_EVENTS);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = running_game();
        state.frame(0.0);
        state.pointer_down(Vec2::new(10.0, 10.0), 0.0);
        state.pointer_move(Vec2::new(20.0, 10.0), 5.0);

        let snapshot = RenderSnapshot::capture(&state);
        assert_eq!(snapshot.phase, GamePhase::Running);
        assert_eq!(snapshot.entities.len(), state.entities.len());
        assert_eq!(snapshot.trail.len(), 2);
        assert!(snapshot.quiz.is_none());

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"phase\":\"Running\""));
        assert!(json.contains("\"hud\""));
    }

    #[test]
    fn test_hearts_render_remaining_lives() {
        let mut state = running_game();
        state.run.lives = 5;
        let hud = Hud::from_state(&state);
        assert_eq!(hud.hearts(), format!("{}{}", "❤️".repeat(5), "🤍".repeat(2)));
    }
}
