//! Frame drawing.
//!
//! [`render`] turns the particle state into a handful of draw calls on a
//! [`Canvas`]. It takes the particles by shared reference, so drawing can
//! never disturb the simulation.
//!
//! Canvases in this crate:
//! - [`DrawList`] records commands; the GPU canvas consumes one per frame.
//! - [`RasterCanvas`](crate::raster::RasterCanvas) rasterizes on the CPU.

use glam::Vec2;

use crate::config::RenderConfig;
use crate::particle::Particle;

/// Alpha of a disc moving faster than `accent_speed`.
pub const ACCENT_ALPHA: f32 = 0.5;
/// Alpha of a slow disc.
pub const IDLE_ALPHA: f32 = 0.3;

/// Straight-alpha colour with sRGB channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub fn from_srgb8(rgb: [u8; 3], alpha: f32) -> Self {
        Self {
            r: rgb[0] as f32 / 255.0,
            g: rgb[1] as f32 / 255.0,
            b: rgb[2] as f32 / 255.0,
            a: alpha.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A drawing target.
///
/// Coordinates are logical surface units; canvases apply their own pixel
/// density.
pub trait Canvas {
    /// Erase everything drawn so far.
    fn clear(&mut self);
    /// One logical unit wide line segment.
    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba);
    /// Filled circle.
    fn disc(&mut self, center: Vec2, radius: f32, color: Rgba);
}

/// Draw one frame of the field.
pub fn render<C: Canvas + ?Sized>(particles: &[Particle], config: &RenderConfig, canvas: &mut C) {
    canvas.clear();

    let cutoff = config.connection_distance;
    let line_color = config.palette.signal;
    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            let distance = a.position.distance(b.position);
            if distance < cutoff {
                let alpha = config.line_alpha * (1.0 - distance / cutoff);
                canvas.line(a.position, b.position, Rgba::from_srgb8(line_color, alpha));
            }
        }
    }

    for p in particles {
        canvas.disc(p.position, p.mass * config.disc_radius_per_mass, disc_color(p, config));
    }
}

/// Colour of a particle's disc, picked by its speed.
pub fn disc_color(particle: &Particle, config: &RenderConfig) -> Rgba {
    if particle.speed() > config.accent_speed {
        Rgba::from_srgb8(config.palette.accent, ACCENT_ALPHA)
    } else {
        Rgba::from_srgb8(config.palette.signal, IDLE_ALPHA)
    }
}

/// A recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Clear,
    Line { from: Vec2, to: Vec2, color: Rgba },
    Disc { center: Vec2, radius: f32, color: Rgba },
}

/// Canvas that records commands instead of drawing them.
///
/// `clear` throws away the previous frame, so the list always holds the
/// latest frame. [`total_calls`](Self::total_calls) counts every call ever
/// made.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    total_calls: u64,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn total_calls(&self) -> u64 {
        self.total_calls
    }

    pub fn lines(&self) -> impl Iterator<Item = (Vec2, Vec2, Rgba)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::Line { from, to, color } => Some((from, to, color)),
            _ => None,
        })
    }

    pub fn discs(&self) -> impl Iterator<Item = (Vec2, f32, Rgba)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::Disc { center, radius, color } => Some((center, radius, color)),
            _ => None,
        })
    }
}

impl Canvas for DrawList {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.total_calls += 1;
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba) {
        self.commands.push(DrawCommand::Line { from, to, color });
        self.total_calls += 1;
    }

    fn disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Disc { center, radius, color });
        self.total_calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> Particle {
        Particle::at_rest(Vec2::new(x, y), 1.0, 0.0)
    }

    #[test]
    fn test_clear_comes_first_and_every_particle_drawn() {
        let particles = [at(0.0, 0.0), at(500.0, 0.0), at(0.0, 500.0)];
        let mut list = DrawList::new();
        render(&particles, &RenderConfig::default(), &mut list);

        assert_eq!(list.commands()[0], DrawCommand::Clear);
        assert_eq!(list.discs().count(), 3);
        assert_eq!(list.lines().count(), 0);
    }

    #[test]
    fn test_line_alpha_fades_with_distance() {
        let config = RenderConfig::default();
        let particles = [at(0.0, 0.0), at(0.0, 0.0), at(75.0, 0.0), at(149.0, 0.0)];
        let mut list = DrawList::new();
        render(&particles, &config, &mut list);

        let alphas: Vec<f32> = list.lines().map(|(_, _, c)| c.a).collect();
        // first pair coincides: full configured alpha
        assert!((alphas[0] - config.line_alpha).abs() < 1e-6);
        // 75 apart: half
        assert!((alphas[1] - config.line_alpha * 0.5).abs() < 1e-6);
        assert!(alphas.iter().all(|&a| a > 0.0 && a <= config.line_alpha));
    }

    #[test]
    fn test_no_line_at_cutoff() {
        let particles = [at(0.0, 0.0), at(150.0, 0.0)];
        let mut list = DrawList::new();
        render(&particles, &RenderConfig::default(), &mut list);
        assert_eq!(list.lines().count(), 0);
    }

    #[test]
    fn test_disc_style_follows_speed_and_mass() {
        let config = RenderConfig::default();
        let slow = Particle::at_rest(Vec2::ZERO, 0.75, 0.0);
        let fast = Particle { velocity: Vec2::new(0.0, 1.5), ..slow };

        assert_eq!(disc_color(&slow, &config), Rgba::from_srgb8(config.palette.signal, IDLE_ALPHA));
        assert_eq!(disc_color(&fast, &config), Rgba::from_srgb8(config.palette.accent, ACCENT_ALPHA));

        let mut list = DrawList::new();
        render(&[slow], &config, &mut list);
        let (_, radius, _) = list.discs().next().unwrap();
        assert_eq!(radius, 1.5);
    }

    #[test]
    fn test_render_leaves_particles_untouched() {
        let particles = vec![at(10.0, 10.0), Particle { velocity: Vec2::new(2.0, 0.0), ..at(20.0, 10.0) }];
        let snapshot = particles.clone();
        render(&particles, &RenderConfig::default(), &mut DrawList::new());
        assert_eq!(particles, snapshot);
    }
}
