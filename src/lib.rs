//! # gravfield - gravitational particle field
//!
//! A small 2D particle simulation meant to sit behind a page or window: a
//! fixed set of point masses pull on each other, follow the pointer, drift
//! on their own and stay softly inside the viewport. Every frame is redrawn
//! as proximity lines plus speed-tinted discs.
//!
//! ## Quick Start
//!
//! ```
//! use gravfield::prelude::*;
//!
//! let mut driver = FieldDriver::new(FieldConfig::default()).unwrap();
//! driver.attach(Viewport::new(800.0, 600.0, 1.0));
//!
//! let mut canvas = DrawList::new();
//! driver.pointer_moved(400.0, 300.0);
//! assert_eq!(driver.tick(&mut canvas), FrameStatus::Rendered);
//!
//! driver.detach();
//! assert_eq!(driver.tick(&mut canvas), FrameStatus::Inactive);
//! ```
//!
//! ## Frame pipeline
//!
//! Each [`FieldDriver::tick`] runs, in order:
//!
//! | Stage | What it does |
//! |-------|--------------|
//! | [`solver::solve`] | Pair forces in a distance band, attractor pull, drift, boundary softening |
//! | [`integrator::integrate`] | `v += a; v *= damping; x += v` |
//! | [`render::render`] | Clear, proximity lines, one disc per particle |
//!
//! The host decides when to call `tick`. [`window::run`] drives it from a
//! winit redraw loop onto the GPU; [`headless::render_snapshot`] drives it
//! on the CPU into an image.
//!
//! ## Canvases
//!
//! Anything implementing [`Canvas`] can be drawn on: [`DrawList`] records
//! commands, [`RasterCanvas`] rasterizes into an `image::RgbaImage`, and the
//! GPU canvas used by the window host draws instanced quads with wgpu.

pub mod config;
pub mod driver;
pub mod error;
mod gpu;
pub mod headless;
pub mod input;
pub mod integrator;
#[cfg(feature = "egui")]
mod panel;
pub mod particle;
pub mod raster;
pub mod render;
pub mod solver;
pub mod time;
pub mod window;

pub use config::{FieldConfig, Palette, PhysicsConfig, RenderConfig, ATTRACTOR_STRENGTH_LIMIT};
pub use driver::{FieldDriver, FrameStatus, LifecycleState, Viewport};
pub use error::{ConfigError, FrameFault, GpuError, RunError};
pub use glam::Vec2;
pub use gpu::{GpuCanvas, OverlayTarget};
pub use input::{Attractor, PointerEvent};
pub use particle::{Particle, ParticleStore};
pub use raster::RasterCanvas;
pub use render::{Canvas, DrawCommand, DrawList, Rgba};

/// Convenient re-exports for common usage.
///
/// ```
/// use gravfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{FieldConfig, PhysicsConfig, RenderConfig};
    pub use crate::driver::{FieldDriver, FrameStatus, LifecycleState, Viewport};
    pub use crate::input::{Attractor, PointerEvent};
    pub use crate::particle::{Particle, ParticleStore};
    pub use crate::raster::RasterCanvas;
    pub use crate::render::{Canvas, DrawList, Rgba};
    pub use crate::Vec2;
}
