//! Ballistic integration
//!
//! Semi-implicit Euler on a millisecond clock scaled by `INTEGRATION_FACTOR`.
//! Entities reflect off the side walls and are removed once they fall below
//! the field; effects age out by lifetime instead.

use super::state::{Entity, EntityKind, GameState, Particle, ScorePopup};
use crate::consts::*;

/// Integrate one entity; returns true once it has fallen out of the field
pub fn integrate_entity(e: &mut Entity, scaled_dt: f32, width: f32, height: f32) -> bool {
    e.vel.y += GRAVITY * scaled_dt;
    e.pos += e.vel * scaled_dt;
    e.angle += e.spin * scaled_dt;

    // Elastic side walls
    if e.pos.x < e.radius {
        e.pos.x = e.radius;
        e.vel.x = -e.vel.x;
    }
    if e.pos.x > width - e.radius {
        e.pos.x = width - e.radius;
        e.vel.x = -e.vel.x;
    }

    e.pos.y > height + DESPAWN_BELOW
}

pub fn integrate_particle(p: &mut Particle, dt: f32) {
    p.vel.y += p.gravity * dt;
    p.pos += p.vel * dt;
}

pub fn integrate_popup(p: &mut ScorePopup, dt: f32) {
    p.pos.y += p.vy * dt;
}

/// Advance entities and effects by `elapsed_ms` of tick time.
///
/// Un-sliced fruit that falls out costs a life; bombs and power-ups are
/// dropped silently. Time scale only affects entities, not effects.
pub fn advance(state: &mut GameState, elapsed_ms: f32, time_scale: f32) {
    let scaled_dt = elapsed_ms * time_scale * INTEGRATION_FACTOR;
    let (width, height) = (state.field.x, state.field.y);

    let mut missed = 0;
    state.entities.retain_mut(|e| {
        let fell = integrate_entity(e, scaled_dt, width, height);
        if fell && e.kind == EntityKind::Fruit && !e.sliced {
            missed += 1;
        }
        !fell
    });
    for _ in 0..missed {
        state.lose_life();
    }

    let dt = elapsed_ms * INTEGRATION_FACTOR;
    let now = state.sim_time_ms;
    for particle in state.particles.iter_mut() {
        integrate_particle(particle, dt);
    }
    state.particles.retain(|p| !p.is_expired(now));

    for popup in state.popups.iter_mut() {
        integrate_popup(popup, dt);
    }
    state.popups.retain(|p| !p.is_expired(now));
}
