//! Frame driver and run state machine
//!
//! The host calls [`GameState::frame`] once per animation frame with its
//! monotonic timestamp. Spawning and physics only run in `Running`; a pending
//! quiz only counts down its answer reveal.

use super::physics;
use super::spawner;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::FRENZY_EXTRA_SPAWN_CHANCE;
use rand::Rng;

impl GameState {
    /// Advance by one host frame. `now_ms` is the host's monotonic clock.
    pub fn frame(&mut self, now_ms: f64) {
        let elapsed = match self.last_frame_at {
            Some(prev) => (now_ms - prev).clamp(0.0, self.config.max_frame_ms),
            None => 0.0,
        };
        self.last_frame_at = Some(now_ms);

        self.pointer.prune_trail(now_ms);

        // Decay screen shake
        self.screen_shake *= 0.9;
        if self.screen_shake < 0.5 {
            self.screen_shake = 0.0;
        }

        match self.phase {
            GamePhase::Running => tick(self, elapsed),
            GamePhase::QuizInterrupt => self.advance_reveal(elapsed),
            GamePhase::Idle | GamePhase::Paused | GamePhase::GameOver => {}
        }
    }

    /// Toggle between `Running` and `Paused`. Returns false if not applicable.
    ///
    /// Resuming resets the frame clock so the pause isn't replayed as one big step.
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                self.pointer.release();
                log::info!("Paused");
                self.events.push(GameEvent::Paused);
                true
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Running;
                self.last_frame_at = None;
                log::info!("Resumed");
                self.events.push(GameEvent::Resumed);
                true
            }
            _ => false,
        }
    }

    /// Leave a paused or finished run for the menu
    pub fn quit(&mut self) -> bool {
        match self.phase {
            GamePhase::Paused | GamePhase::GameOver => {
                self.phase = GamePhase::Idle;
                self.interrupt = None;
                self.pointer.release();
                self.events.push(GameEvent::ReturnedToMenu);
                true
            }
            _ => false,
        }
    }

    /// End the run, freezing the final score
    pub(crate) fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.interrupt = None;
        self.pointer.release();
        self.final_score = Some(self.run.score);
        let report = self.report();
        log::info!(
            "Game over: score={}, max combo={}, level={}",
            report.final_score,
            report.max_combo,
            report.level
        );
        self.events.push(GameEvent::GameOver(report));
    }
}

/// One simulation step of `elapsed_ms` (no-op unless running).
///
/// Order: interval spawn, power-up timers (and frenzy extra spawn), then
/// physics with off-screen removal.
pub fn tick(state: &mut GameState, elapsed_ms: f64) {
    if !state.is_running() {
        return;
    }
    state.sim_time_ms += elapsed_ms;
    let now = state.sim_time_ms;

    spawner::maybe_spawn(state, now);

    // The tick that exhausts the frenzy timer still gets its extra spawn roll
    let frenzy = state.run.timers.frenzy_active();
    let time_scale = state.run.advance_timers(elapsed_ms as f32);
    if frenzy && state.rng.random::<f32>() < FRENZY_EXTRA_SPAWN_CHANCE {
        spawner::spawn_entity(state);
    }

    physics::advance(state, elapsed_ms as f32, time_scale);
}
