//! Force solver.
//!
//! Fills every particle's `acceleration` from four sources: pairwise
//! inverse-square interaction inside a distance band, the pointer
//! attractor, phase-driven drift, and soft boundary containment.
//!
//! Pairs are visited directly, O(n²). The field holds tens to low hundreds
//! of particles so a frame stays well inside its budget without a spatial
//! index.

use glam::Vec2;

use crate::config::PhysicsConfig;
use crate::input::Attractor;
use crate::particle::Particle;

/// Recompute the acceleration of every particle.
///
/// Only `acceleration` is written; positions, velocities, masses and phases
/// are read as they are.
pub fn solve(particles: &mut [Particle], attractor: &Attractor, bounds: Vec2, physics: &PhysicsConfig) {
    for p in particles.iter_mut() {
        let pull = attractor_force(p.position, attractor, physics) / p.mass;
        p.acceleration = pull + drift_force(p.phase, physics) + boundary_force(p.position, bounds, physics);
    }

    for i in 0..particles.len() {
        let (head, tail) = particles.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            let force = pair_force(b.position - a.position, a.mass, b.mass, physics);
            if force == Vec2::ZERO {
                continue;
            }
            a.acceleration += force / a.mass;
            b.acceleration -= force / b.mass;
        }
    }
}

/// Magnitude of the pair force at distance `distance`.
///
/// Zero outside the open band `(pair_min_distance, pair_max_distance)`.
/// Signed like `pair_strength`.
pub fn pair_force_magnitude(distance: f32, mass_a: f32, mass_b: f32, physics: &PhysicsConfig) -> f32 {
    if distance <= physics.pair_min_distance || distance >= physics.pair_max_distance {
        return 0.0;
    }
    physics.pair_strength * mass_a * mass_b / (distance * distance)
}

/// Force on the first particle of a pair, given `offset` from it to the other.
///
/// The second particle receives the negation.
pub fn pair_force(offset: Vec2, mass_a: f32, mass_b: f32, physics: &PhysicsConfig) -> Vec2 {
    let distance = offset.length();
    let magnitude = pair_force_magnitude(distance, mass_a, mass_b, physics);
    if magnitude == 0.0 {
        return Vec2::ZERO;
    }
    offset / distance * magnitude
}

/// Magnitude of the attractor pull at `distance`.
///
/// Bounded by `|strength| * attractor_gain / attractor_softening`, which it
/// reaches at distance zero.
pub fn attractor_force_magnitude(distance: f32, strength: f32, physics: &PhysicsConfig) -> f32 {
    if strength == 0.0 || distance >= physics.attractor_radius {
        return 0.0;
    }
    strength * physics.attractor_gain / (distance + physics.attractor_softening)
}

/// Attractor force on a particle at `position`, before dividing by mass.
///
/// A particle sitting exactly on the attractor is pushed along +x with the
/// full bounded magnitude.
pub fn attractor_force(position: Vec2, attractor: &Attractor, physics: &PhysicsConfig) -> Vec2 {
    let offset = attractor.position - position;
    let distance = offset.length();
    let magnitude = attractor_force_magnitude(distance, attractor.strength(), physics);
    offset.try_normalize().unwrap_or(Vec2::X) * magnitude
}

/// Drift for a given phase. Its length is always `drift_amplitude`.
#[inline]
pub fn drift_force(phase: f32, physics: &PhysicsConfig) -> Vec2 {
    Vec2::new(phase.cos(), phase.sin()) * physics.drift_amplitude
}

/// Restoring force for a particle inside the edge margin, or past the edge.
///
/// Proportional to the depth past the margin line on each axis. Opposite
/// edges are summed so a viewport narrower than two margins settles the
/// particle on its centre line.
pub fn boundary_force(position: Vec2, bounds: Vec2, physics: &PhysicsConfig) -> Vec2 {
    let margin = physics.boundary_margin;
    let near = (Vec2::splat(margin) - position).max(Vec2::ZERO);
    let far = (position - (bounds - Vec2::splat(margin))).max(Vec2::ZERO);
    (near - far) * physics.boundary_stiffness
}
