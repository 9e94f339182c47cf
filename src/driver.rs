//! The frame driver: lifecycle, input and the per-frame step.
//!
//! ```text
//! Uninitialized --attach--> Running --detach--> Stopped
//!                              |
//!                              +--frame fault--> Faulted
//! ```
//!
//! The host owns the schedule. It calls [`FieldDriver::tick`] once per
//! display refresh and keeps scheduling while ticks report
//! [`FrameStatus::Rendered`] or [`FrameStatus::Skipped`]. Pointer and resize
//! calls take `&mut self` like `tick` does, so they always land between
//! frames and show up in the next one.

use std::panic::{self, AssertUnwindSafe};

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{FieldConfig, PhysicsConfig, RenderConfig};
use crate::error::{ConfigError, FrameFault};
use crate::input::{Attractor, PointerEvent};
use crate::integrator::integrate;
use crate::particle::{Particle, ParticleStore};
use crate::render::{render, Canvas};
use crate::solver::solve;
use crate::time::Time;

/// Size of the drawable surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical width.
    pub width: f32,
    /// Logical height.
    pub height: f32,
    /// Physical pixels per logical unit.
    pub scale_factor: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, scale_factor: f32) -> Self {
        Self { width, height, scale_factor }
    }

    /// Build from a physical pixel size, as window systems report it.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = scale_factor as f32;
        Self {
            width: width as f32 / scale,
            height: height as f32 / scale,
            scale_factor: scale,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Pixel dimensions of the backing surface; zero when degenerate.
    pub fn physical_size(&self) -> (u32, u32) {
        if self.is_degenerate() {
            return (0, 0);
        }
        (
            (self.width * self.scale_factor).round() as u32,
            (self.height * self.scale_factor).round() as u32,
        )
    }

    /// Nothing sensible can be simulated or drawn on this surface.
    pub fn is_degenerate(&self) -> bool {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        !(positive(self.width) && positive(self.height) && positive(self.scale_factor))
    }
}

/// Where the driver is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Running,
    /// Detached by the host.
    Stopped,
    /// Stopped by a failed frame.
    Faulted,
}

/// Outcome of a single [`FieldDriver::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Physics advanced and the frame was drawn.
    Rendered,
    /// Viewport is degenerate; nothing happened this frame.
    Skipped,
    /// Driver is not running; nothing happened.
    Inactive,
    /// This frame failed and the driver has stopped.
    Faulted,
}

impl FrameStatus {
    /// Whether the host should schedule another frame.
    #[inline]
    pub fn keep_scheduling(self) -> bool {
        matches!(self, FrameStatus::Rendered | FrameStatus::Skipped)
    }
}

/// Owns the particle field and steps it one frame at a time.
pub struct FieldDriver {
    config: FieldConfig,
    state: LifecycleState,
    /// `None` until the first usable viewport arrives.
    particles: Option<ParticleStore>,
    attractor: Attractor,
    viewport: Viewport,
    rng: StdRng,
    time: Time,
    fault: Option<FrameFault>,
}

impl FieldDriver {
    /// Validate `config` and create a driver in the `Uninitialized` state.
    pub fn new(config: FieldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            state: LifecycleState::Uninitialized,
            particles: None,
            attractor: Attractor::default(),
            viewport: Viewport::new(0.0, 0.0, 1.0),
            rng,
            time: Time::new(),
            fault: None,
        })
    }

    /// Start running on `viewport`.
    ///
    /// Particles are seeded across the viewport now, or on the first frame
    /// with a usable viewport if this one is degenerate. Returns `false` if
    /// the driver was already attached once.
    pub fn attach(&mut self, viewport: Viewport) -> bool {
        if self.state != LifecycleState::Uninitialized {
            return false;
        }
        self.viewport = viewport;
        self.state = LifecycleState::Running;
        self.seed_if_needed();
        log::info!(
            "field attached: {} particles on {}x{} @{}x",
            self.config.particle_count,
            viewport.width,
            viewport.height,
            viewport.scale_factor
        );
        true
    }

    /// Like [`attach`](Self::attach) but with a caller-provided layout.
    ///
    /// The particle count becomes the length of `particles`.
    pub fn attach_with_particles(&mut self, viewport: Viewport, particles: ParticleStore) -> bool {
        if self.state != LifecycleState::Uninitialized {
            return false;
        }
        self.particles = Some(particles);
        self.attach(viewport)
    }

    /// Stop for good. Later ticks and input calls do nothing.
    pub fn detach(&mut self) {
        if self.state == LifecycleState::Running {
            log::info!("field detached after {} frames", self.time.frame());
        }
        if self.state != LifecycleState::Faulted {
            self.state = LifecycleState::Stopped;
        }
    }

    /// Run one frame: solve, integrate, draw.
    pub fn tick<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> FrameStatus {
        if self.state != LifecycleState::Running {
            return FrameStatus::Inactive;
        }
        if self.viewport.is_degenerate() {
            return FrameStatus::Skipped;
        }
        self.seed_if_needed();
        let Some(store) = self.particles.as_mut() else {
            return FrameStatus::Skipped;
        };

        let attractor = &self.attractor;
        let bounds = self.viewport.size();
        let config = &self.config;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let particles = store.as_mut_slice();
            solve(particles, attractor, bounds, &config.physics);
            integrate(particles, &config.physics);
            if !store.is_finite() {
                return Err(FrameFault::NonFinite);
            }
            render(store.as_slice(), &config.render, canvas);
            Ok(())
        }));

        let fault = match outcome {
            Ok(Ok(())) => {
                self.time.update();
                return FrameStatus::Rendered;
            }
            Ok(Err(fault)) => fault,
            Err(payload) => FrameFault::from_panic(payload.as_ref()),
        };
        log::error!("particle field stopped: {}", fault);
        self.fault = Some(fault);
        self.state = LifecycleState::Faulted;
        FrameStatus::Faulted
    }

    /// Surface size changed. Particles keep their state.
    pub fn resize(&mut self, viewport: Viewport) {
        if !self.accepts_input() {
            return;
        }
        log::debug!(
            "field resized to {}x{} @{}x",
            viewport.width,
            viewport.height,
            viewport.scale_factor
        );
        self.viewport = viewport;
    }

    /// Feed a pointer event to the attractor.
    pub fn pointer(&mut self, event: PointerEvent) {
        if !self.accepts_input() {
            return;
        }
        event.apply(&mut self.attractor, self.config.physics.pointer_strength);
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer(PointerEvent::Moved(Vec2::new(x, y)));
    }

    pub fn pointer_left(&mut self) {
        self.pointer(PointerEvent::Left);
    }

    /// Set the attractor strength directly, clamped to the allowed range.
    pub fn set_attractor_strength(&mut self, strength: f32) {
        if self.accepts_input() {
            self.attractor.set_strength(strength);
        }
    }

    /// Replace the physics constants. Takes effect next frame.
    ///
    /// Ignored once the driver has stopped or faulted.
    pub fn set_physics(&mut self, physics: PhysicsConfig) -> Result<(), ConfigError> {
        physics.validate()?;
        if self.accepts_input() {
            self.config.physics = physics;
        }
        Ok(())
    }

    /// Replace the drawing constants. Takes effect next frame.
    ///
    /// Ignored once the driver has stopped or faulted.
    pub fn set_render(&mut self, render: RenderConfig) -> Result<(), ConfigError> {
        render.validate()?;
        if self.accepts_input() {
            self.config.render = render;
        }
        Ok(())
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Current particles; empty until seeded.
    pub fn particles(&self) -> &[Particle] {
        self.particles.as_ref().map(ParticleStore::as_slice).unwrap_or(&[])
    }

    pub fn attractor(&self) -> &Attractor {
        &self.attractor
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.time.frame()
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Why the driver faulted, if it did.
    pub fn fault(&self) -> Option<&FrameFault> {
        self.fault.as_ref()
    }

    fn accepts_input(&self) -> bool {
        matches!(self.state, LifecycleState::Uninitialized | LifecycleState::Running)
    }

    fn seed_if_needed(&mut self) {
        if self.particles.is_some() || self.viewport.is_degenerate() {
            return;
        }
        let store = ParticleStore::seed(self.config.particle_count, self.viewport.size(), &mut self.rng);
        log::debug!("seeded {} particles", store.len());
        self.particles = Some(store);
    }
}
