//! Point masses and the store that owns them.
//!
//! The store is sized once when the field is seeded and never grows or
//! shrinks afterwards. Only the crate mutates particle state; callers get
//! shared slices for inspection.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

/// A single point mass in the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in logical surface units.
    pub position: Vec2,
    /// Velocity in units per frame.
    pub velocity: Vec2,
    /// Acceleration accumulated by the solver for the current frame.
    pub acceleration: Vec2,
    /// Always > 0.
    pub mass: f32,
    /// Drift phase in radians, increases every frame.
    pub phase: f32,
}

impl Particle {
    /// A particle at rest with a given mass and phase.
    pub fn at_rest(position: Vec2, mass: f32, phase: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            mass: mass.max(MIN_MASS),
            phase,
        }
    }

    /// Scalar speed in units per frame.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Whether position and velocity are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Lower bound applied to any mass handed to the store.
pub const MIN_MASS: f32 = 1e-3;

/// Fixed-size particle collection.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    /// Scatter `count` particles uniformly over a `size` rectangle.
    ///
    /// Velocities start small and random, masses fall in `[0.5, 1.0)` and
    /// phases anywhere on the circle so the drift is out of sync.
    pub fn seed<R: Rng + ?Sized>(count: usize, size: Vec2, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|_| Particle {
                position: Vec2::new(
                    rng.gen::<f32>() * size.x,
                    rng.gen::<f32>() * size.y,
                ),
                velocity: Vec2::new(
                    (rng.gen::<f32>() - 0.5) * 0.5,
                    (rng.gen::<f32>() - 0.5) * 0.5,
                ),
                acceleration: Vec2::ZERO,
                mass: rng.gen::<f32>() * 0.5 + 0.5,
                phase: rng.gen::<f32>() * TAU,
            })
            .collect();
        Self { particles }
    }

    /// Build a store from explicit particles. Masses are floored at [`MIN_MASS`].
    pub fn from_particles(particles: impl IntoIterator<Item = Particle>) -> Self {
        let particles = particles
            .into_iter()
            .map(|mut p| {
                p.mass = p.mass.max(MIN_MASS);
                p
            })
            .collect();
        Self { particles }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Whether every particle still has finite state.
    pub fn is_finite(&self) -> bool {
        self.particles.iter().all(Particle::is_finite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seed_respects_count_and_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let store = ParticleStore::seed(120, Vec2::new(800.0, 600.0), &mut rng);

        assert_eq!(store.len(), 120);
        for p in store.as_slice() {
            assert!(p.position.x >= 0.0 && p.position.x <= 800.0);
            assert!(p.position.y >= 0.0 && p.position.y <= 600.0);
            assert!(p.velocity.x.abs() <= 0.25 && p.velocity.y.abs() <= 0.25);
            assert!(p.mass >= 0.5 && p.mass <= 1.0);
            assert!(p.phase >= 0.0 && p.phase <= TAU);
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = ParticleStore::seed(10, Vec2::splat(100.0), &mut StdRng::seed_from_u64(3));
        let b = ParticleStore::seed(10, Vec2::splat(100.0), &mut StdRng::seed_from_u64(3));
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_from_particles_floors_mass() {
        let store = ParticleStore::from_particles([Particle::at_rest(Vec2::ZERO, 1.0, 0.0), Particle {
            mass: 0.0,
            ..Particle::at_rest(Vec2::ONE, 1.0, 0.0)
        }]);
        assert!(store.as_slice().iter().all(|p| p.mass > 0.0));
    }
}
