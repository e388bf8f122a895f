//! Scoring, progression and life management
//!
//! `RunState` methods are pure bookkeeping; the `GameState` wrappers add the
//! popups, events and interrupts that go with each change.

use glam::Vec2;

use super::quiz::InterruptKind;
use super::state::{GameEvent, GameState, PowerUpKind, RunState};
use crate::consts::*;

impl RunState {
    /// Level for a score: one level per 20 points
    pub fn level_for_score(score: u64) -> u32 {
        (score / POINTS_PER_LEVEL) as u32 + 1
    }

    /// Count a fruit slice and return the points it is worth
    pub fn register_fruit(&mut self) -> u64 {
        self.combo += 1;
        self.streak += 1;
        self.max_combo = self.max_combo.max(self.combo);
        let mut points = if self.combo >= COMBO_BONUS_AT { 2 } else { 1 };
        if self.timers.double_active() {
            points *= 2;
        }
        self.score += points;
        points
    }

    /// Lose one life; combo and streak restart. Returns lives left.
    pub fn take_life(&mut self) -> u8 {
        self.lives = self.lives.saturating_sub(1);
        self.combo = 0;
        self.streak = 0;
        self.next_streak_reward = STREAK_REWARD_STEP;
        self.lives
    }

    /// Add lives up to the cap. Returns true if lives actually rose.
    pub fn add_lives(&mut self, amount: u8) -> bool {
        let prev = self.lives;
        self.lives = self.lives.saturating_add(amount).min(MAX_LIVES);
        self.lives > prev
    }

    /// Consume a streak reward if the threshold has been reached
    pub fn claim_streak_reward(&mut self) -> bool {
        if self.streak >= self.next_streak_reward {
            self.next_streak_reward += STREAK_REWARD_STEP;
            true
        } else {
            false
        }
    }

    /// Recompute level and spawn interval. Returns the new level on change.
    pub fn recompute_level(&mut self) -> Option<u32> {
        let level = Self::level_for_score(self.score);
        let changed = level != self.level;
        self.level = level;
        self.spawn_interval_ms = self.settings.spawn_interval_ms(level);
        changed.then_some(level)
    }

    pub fn activate(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::Freeze => self.timers.freeze_ms = FREEZE_MS,
            PowerUpKind::Frenzy => self.timers.frenzy_ms = FRENZY_MS,
            PowerUpKind::Double => self.timers.double_ms = DOUBLE_MS,
        }
    }

    /// Count down power-up timers by unscaled elapsed time.
    ///
    /// The time scale for this tick is decided before the countdown, so the tick
    /// that exhausts the freeze timer still runs slowed and the next one doesn't.
    pub fn advance_timers(&mut self, elapsed_ms: f32) -> f32 {
        if self.timers.freeze_active() {
            self.timers.freeze_ms -= elapsed_ms;
            self.time_scale = FREEZE_TIME_SCALE;
        } else {
            self.time_scale = 1.0;
        }
        if self.timers.double_active() {
            self.timers.double_ms -= elapsed_ms;
        }
        if self.timers.frenzy_active() {
            self.timers.frenzy_ms -= elapsed_ms;
        }
        self.time_scale
    }
}

impl GameState {
    /// Lose a life; reaching zero lives opens a revive interrupt
    pub fn lose_life(&mut self) {
        let lives = self.run.take_life();
        log::debug!("Life lost, {} left", lives);
        self.events.push(GameEvent::LifeLost { lives });
        if lives == 0 {
            self.shake(10.0);
            self.open_interrupt(InterruptKind::Revive);
        }
    }

    /// Gain lives up to the cap; only notifies if lives rose
    pub fn gain_life(&mut self, amount: u8) -> bool {
        let gained = self.run.add_lives(amount);
        if gained {
            self.events.push(GameEvent::LifeGained {
                lives: self.run.lives,
            });
        }
        gained
    }

    /// Re-derive level and spawn rate from the score
    pub fn update_progression(&mut self) {
        if let Some(level) = self.run.recompute_level() {
            log::info!(
                "Level {} (spawn every {}ms)",
                level,
                self.run.spawn_interval_ms
            );
            self.text_popup(Vec2::new(0.5, 0.35), format!("LEVEL {}", level), 0x38bdf8);
            self.events.push(GameEvent::LevelUp { level });
        }
    }

    /// Grant a life if the streak crossed the next reward threshold
    pub fn check_streak_reward(&mut self) {
        if self.run.claim_streak_reward() {
            self.gain_life(1);
            let text = format!("STREAK {}! +1 LIFE", self.run.streak);
            self.text_popup(Vec2::new(0.5, 0.4), text, 0x34d399);
        }
    }

    pub fn activate_power_up(&mut self, kind: PowerUpKind) {
        self.run.activate(kind);
        log::info!("Power-up: {:?}", kind);
        let (banner, color) = kind.banner();
        self.text_popup(Vec2::new(0.5, 0.5), banner, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifficultyMode;
    use proptest::prelude::*;

    #[test]
    fn test_combo_bonus_from_third_fruit() {
        let mut run = RunState::new(DifficultyMode::Easy);
        assert_eq!(run.register_fruit(), 1);
        assert_eq!(run.register_fruit(), 1);
        assert_eq!(run.register_fruit(), 2);
        assert_eq!(run.combo, 3);
        assert_eq!(run.score, 4);
    }

    #[test]
    fn test_double_score_stacks_with_combo() {
        let mut run = RunState::new(DifficultyMode::Easy);
        run.activate(PowerUpKind::Double);
        run.combo = 2;
        assert_eq!(run.register_fruit(), 4);
    }

    #[test]
    fn test_take_life_clamps_and_resets() {
        let mut run = RunState::new(DifficultyMode::Easy);
        run.lives = 1;
        run.combo = 5;
        run.streak = 9;
        run.next_streak_reward = 24;
        assert_eq!(run.take_life(), 0);
        assert_eq!(run.take_life(), 0);
        assert_eq!((run.combo, run.streak, run.next_streak_reward), (0, 0, 12));
    }

    #[test]
    fn test_add_lives_capped() {
        let mut run = RunState::new(DifficultyMode::Easy);
        assert!(!run.add_lives(1));
        run.lives = 6;
        assert!(run.add_lives(3));
        assert_eq!(run.lives, MAX_LIVES);
    }

    #[test]
    fn test_streak_reward_threshold_moves() {
        let mut run = RunState::new(DifficultyMode::Easy);
        run.streak = 11;
        assert!(!run.claim_streak_reward());
        run.streak = 12;
        assert!(run.claim_streak_reward());
        assert_eq!(run.next_streak_reward, 24);
        assert!(!run.claim_streak_reward());
    }

    #[test]
    fn test_level_and_spawn_interval() {
        let mut run = RunState::new(DifficultyMode::Medium);
        run.score = 19;
        assert_eq!(run.recompute_level(), None);
        run.score = 45;
        assert_eq!(run.recompute_level(), Some(3));
        assert_eq!(run.spawn_interval_ms, 840.0 - 36.0);
        assert_eq!(run.recompute_level(), None);
    }

    #[test]
    fn test_freeze_reverts_exactly_once() {
        let mut run = RunState::new(DifficultyMode::Easy);
        run.activate(PowerUpKind::Freeze);
        let mut scales = Vec::new();
        for _ in 0..8 {
            scales.push(run.advance_timers(1000.0));
        }
        // 5 slowed ticks consume the 5000ms, then normal speed for good
        assert_eq!(scales, vec![0.4, 0.4, 0.4, 0.4, 0.4, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_timers_overlap_independently() {
        let mut run = RunState::new(DifficultyMode::Easy);
        run.activate(PowerUpKind::Frenzy);
        run.activate(PowerUpKind::Double);
        run.advance_timers(3000.0);
        assert!(!run.timers.frenzy_active());
        assert!(run.timers.double_active());
        assert_eq!(run.time_scale, 1.0);
    }

    proptest! {
        #[test]
        fn prop_lives_stay_in_range(ops in proptest::collection::vec(0u8..3, 0..200)) {
            let mut run = RunState::new(DifficultyMode::Easy);
            let mut last_score = 0;
            for op in ops {
                match op {
                    0 => { run.take_life(); }
                    1 => { run.add_lives(1); }
                    _ => { run.register_fruit(); }
                }
                prop_assert!(run.lives <= MAX_LIVES);
                prop_assert!(run.score >= last_score);
                last_score = run.score;
            }
        }
    }
}
