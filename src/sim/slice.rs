//! Slice detection
//!
//! A slice is the short hop between two consecutive pointer samples. Every
//! live, uncut entity is tested against it with a forgiving radius, so one hop
//! can cut several targets ("chain"). A bomb ends the sweep immediately.

use glam::Vec2;
use rand::Rng;

use super::quiz::InterruptKind;
use super::state::{EntityKind, GameEvent, GameState, Particle, ScorePopup};
use crate::consts::*;
use crate::segment_hits_circle;

/// What one slice segment did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceOutcome {
    /// Fruit cut by this segment
    pub fruit: u32,
    /// Power-ups picked up by this segment
    pub power_ups: u32,
    /// A bomb was cut (a quiz interrupt is now pending)
    pub bomb: bool,
    /// Points from fruit (excluding chain bonus)
    pub points: u64,
    pub chain_bonus: u64,
}

impl SliceOutcome {
    pub fn is_miss(&self) -> bool {
        self.fruit == 0 && self.power_ups == 0 && !self.bomb
    }
}

/// Hit test with slice forgiveness applied
#[inline]
pub fn slice_hits(p1: Vec2, p2: Vec2, center: Vec2, radius: f32) -> bool {
    segment_hits_circle(p1, p2, center, radius * SLICE_FORGIVENESS)
}

impl GameState {
    /// Sweep the segment `p1 -> p2` through every live entity in spawn order.
    ///
    /// No-op unless the run is active. Zero-length segments are skipped.
    pub fn slice(&mut self, p1: Vec2, p2: Vec2) -> SliceOutcome {
        let mut outcome = SliceOutcome::default();
        if !self.is_running() || p1 == p2 {
            return outcome;
        }

        let mut halves = Vec::new();
        let mut i = 0;
        while i < self.entities.len() {
            let e = &self.entities[i];
            if !e.is_sliceable() || !slice_hits(p1, p2, e.pos, e.radius) {
                i += 1;
                continue;
            }

            let mut cut = self.entities.remove(i);
            cut.sliced = true;

            match cut.kind {
                EntityKind::Bomb => {
                    log::debug!("Bomb {} sliced", cut.id);
                    self.shake(20.0);
                    self.events.push(GameEvent::BombSliced);
                    // Earlier fruit keep their points; streak and level wait for the quiz
                    self.entities.append(&mut halves);
                    self.open_interrupt(InterruptKind::Bomb);
                    outcome.bomb = true;
                    return outcome;
                }
                EntityKind::PowerUp(kind) => {
                    self.shake(10.0);
                    self.activate_power_up(kind);
                    self.emit_particles(cut.pos, cut.color, POWERUP_PARTICLES);
                    self.events.push(GameEvent::PowerUpCollected(kind));
                    outcome.power_ups += 1;
                }
                EntityKind::Fruit => {
                    self.shake(4.0);
                    let points = self.run.register_fruit();
                    outcome.fruit += 1;
                    outcome.points += points;
                    self.points_popup(cut.pos, points, cut.color);
                    self.emit_particles(cut.pos, cut.color, FRUIT_PARTICLES);
                    self.events.push(GameEvent::FruitSliced {
                        combo: self.run.combo,
                        points,
                    });
                    let first_id = self.next_entity_id();
                    self.next_entity_id();
                    halves.extend(cut.split(first_id));
                }
                EntityKind::Half => {}
            }
        }
        self.entities.append(&mut halves);

        if outcome.fruit >= 2 {
            let bonus = (outcome.fruit - 1) as u64;
            self.run.score += bonus;
            outcome.chain_bonus = bonus;
            self.popups.push(ScorePopup {
                pos: p2,
                vy: -1.0,
                text: format!("CHAIN +{}", bonus),
                color: 0xfbbf24,
                born_ms: self.sim_time_ms,
                life_ms: TEXT_POPUP_MS,
            });
            self.events.push(GameEvent::ChainBonus { bonus });
        }

        self.check_streak_reward();

        // Power-ups alone don't keep a combo alive
        if outcome.fruit == 0 {
            self.run.combo = 0;
        }
        self.update_progression();
        outcome
    }

    /// Burst of decorative particles
    pub(crate) fn emit_particles(&mut self, at: Vec2, color: u32, count: usize) {
        for _ in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                self.particles.remove(0);
            }
            let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
            let speed = 4.0 + self.rng.random::<f32>() * 8.0;
            self.particles.push(Particle {
                pos: at,
                vel: Vec2::new(angle.cos() * speed, angle.sin() * speed - 4.0),
                gravity: 0.2 + self.rng.random::<f32>() * 0.3,
                size: 1.0 + self.rng.random::<f32>() * 4.0,
                color,
                born_ms: self.sim_time_ms,
                life_ms: 600.0 + self.rng.random::<f32>() * 600.0,
            });
        }
    }
}
