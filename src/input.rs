//! Pointer input and the attractor it drives.
//!
//! Hosts translate their own events into [`PointerEvent`]s, or feed winit
//! window events through [`PointerEvent::from_window_event`], and hand them
//! to the driver. The solver only ever reads the resulting [`Attractor`].

use glam::Vec2;
use winit::event::WindowEvent;

use crate::config::ATTRACTOR_STRENGTH_LIMIT;

/// The single point pulling on every particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attractor {
    /// Position in logical surface units.
    pub position: Vec2,
    strength: f32,
}

impl Attractor {
    /// An attractor at `position`, strength clamped to the allowed range.
    pub fn new(position: Vec2, strength: f32) -> Self {
        let mut attractor = Self { position, strength: 0.0 };
        attractor.set_strength(strength);
        attractor
    }

    /// Negative values repel.
    #[inline]
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Set the strength, clamped to `±ATTRACTOR_STRENGTH_LIMIT`. NaN reads as zero.
    pub fn set_strength(&mut self, strength: f32) {
        self.strength = if strength.is_nan() {
            0.0
        } else {
            strength.clamp(-ATTRACTOR_STRENGTH_LIMIT, ATTRACTOR_STRENGTH_LIMIT)
        };
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.strength != 0.0
    }
}

impl Default for Attractor {
    fn default() -> Self {
        Self { position: Vec2::ZERO, strength: 0.0 }
    }
}

/// Pointer activity relevant to the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved to a point in logical surface units.
    Moved(Vec2),
    /// Pointer left the surface.
    Left,
}

impl PointerEvent {
    /// Translate a winit window event.
    ///
    /// Cursor positions arrive in physical pixels and are divided by
    /// `scale_factor` to land in the same logical units as the particles.
    pub fn from_window_event(event: &WindowEvent, scale_factor: f64) -> Option<Self> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(scale_factor);
                Some(PointerEvent::Moved(Vec2::new(logical.x, logical.y)))
            }
            WindowEvent::CursorLeft { .. } => Some(PointerEvent::Left),
            _ => None,
        }
    }

    /// Apply this event to an attractor.
    pub fn apply(self, attractor: &mut Attractor, pointer_strength: f32) {
        match self {
            PointerEvent::Moved(position) => {
                attractor.position = position;
                attractor.set_strength(pointer_strength);
            }
            PointerEvent::Left => attractor.set_strength(0.0),
        }
    }
}
