//! Damped explicit Euler step.

use crate::config::PhysicsConfig;
use crate::particle::Particle;

/// Advance every particle by one frame.
///
/// `v += a; v *= damping; x += v`, then the drift phase moves on by
/// `drift_rate`. Visual plausibility is the goal, not physical accuracy.
pub fn integrate(particles: &mut [Particle], physics: &PhysicsConfig) {
    for p in particles.iter_mut() {
        p.velocity = (p.velocity + p.acceleration) * physics.damping;
        p.position += p.velocity;
        p.phase += physics.drift_rate;
    }
}
