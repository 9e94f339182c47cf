//! Physical properties of the field, checked through the public API.

use gravfield::integrator::integrate;
use gravfield::solver::{attractor_force, attractor_force_magnitude, pair_force_magnitude, solve};
use gravfield::{Attractor, Particle, PhysicsConfig, Vec2};

fn rest(x: f32, y: f32) -> Particle {
    Particle::at_rest(Vec2::new(x, y), 1.0, 0.0)
}

#[test]
fn test_pair_force_vanishes_at_and_beyond_cutoff() {
    let physics = PhysicsConfig::default();
    for d in [physics.pair_max_distance, physics.pair_max_distance + 0.5, 1_000.0] {
        assert_eq!(pair_force_magnitude(d, 1.0, 1.0, &physics), 0.0, "d = {d}");
    }
}

#[test]
fn test_pair_force_monotonic_inside_band() {
    let physics = PhysicsConfig::default();
    let mut previous = 0.0;
    let mut d = physics.pair_max_distance - 1.0;
    while d > physics.pair_min_distance {
        let magnitude = pair_force_magnitude(d, 0.7, 0.9, &physics);
        assert!(magnitude > previous, "not increasing at d = {d}");
        previous = magnitude;
        d -= 1.0;
    }
}

#[test]
fn test_damping_never_increases_speed_over_many_frames() {
    let physics = PhysicsConfig { drift_amplitude: 0.0, ..PhysicsConfig::default() };
    let mut particles: Vec<Particle> = (0..8)
        .map(|i| Particle {
            velocity: Vec2::new(i as f32 - 4.0, 2.0),
            ..rest(500.0, 400.0 + i as f32 * 200.0)
        })
        .collect();

    for _ in 0..20 {
        let before: Vec<f32> = particles.iter().map(Particle::speed).collect();
        for p in particles.iter_mut() {
            p.acceleration = Vec2::ZERO;
        }
        integrate(&mut particles, &physics);
        for (p, speed) in particles.iter().zip(before) {
            assert!(p.speed() <= speed + f32::EPSILON);
        }
    }
}

#[test]
fn test_particles_drift_without_attractor_or_velocity() {
    let physics = PhysicsConfig::default();
    let bounds = Vec2::new(800.0, 600.0);
    let start = [rest(200.0, 300.0), rest(600.0, 300.0)];
    let mut particles = start;
    let attractor = Attractor::new(Vec2::new(400.0, 300.0), 0.0);

    for _ in 0..30 {
        solve(&mut particles, &attractor, bounds, &physics);
        integrate(&mut particles, &physics);
    }

    for (p, s) in particles.iter().zip(start.iter()) {
        assert!(p.position.distance(s.position) > 0.0);
        assert!(p.is_finite());
    }
}

#[test]
fn test_attractor_on_top_of_particle_stays_finite_and_bounded() {
    let physics = PhysicsConfig::default();
    let attractor = Attractor::new(Vec2::new(100.0, 100.0), 1.0);
    let mut particles = [rest(100.0, 100.0)];

    solve(&mut particles, &attractor, Vec2::new(800.0, 600.0), &physics);
    integrate(&mut particles, &physics);

    assert!(particles[0].is_finite());
    let bound = physics.attractor_gain / physics.attractor_softening;
    assert!(attractor_force_magnitude(0.0, 1.0, &physics) <= bound);
    let pull = attractor_force(Vec2::new(100.0, 100.0), &attractor, &physics);
    assert!(pull.length() > 0.0);
    assert!(pull.length() <= bound + 1e-6);
    assert!(particles[0].position != Vec2::new(100.0, 100.0));
    // one step later the pull has a direction and stays under the same bound
    let d = particles[0].position.distance(attractor.position);
    assert!(attractor_force_magnitude(d, 1.0, &physics) <= bound);
}

#[test]
fn test_repelling_attractor_pushes_away() {
    let physics = PhysicsConfig { drift_amplitude: 0.0, ..PhysicsConfig::default() };
    let attractor = Attractor::new(Vec2::new(400.0, 300.0), -1.0);
    let mut particles = [rest(450.0, 300.0)];

    solve(&mut particles, &attractor, Vec2::new(800.0, 600.0), &physics);

    assert!(particles[0].acceleration.x > 0.0);
}
