//! Headless rendering: run the field for a number of frames on the CPU
//! canvas and hand back the last frame.

use glam::Vec2;
use image::RgbaImage;

use crate::config::FieldConfig;
use crate::driver::{FieldDriver, FrameStatus, Viewport};
use crate::error::RunError;
use crate::raster::RasterCanvas;

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOptions {
    pub viewport: Viewport,
    /// Frames to simulate before the image is taken.
    pub frames: u32,
    /// Pointer position held for the whole run, if any.
    pub pointer: Option<Vec2>,
    /// Paint the palette's background instead of leaving it transparent.
    pub opaque: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(1280.0, 720.0, 1.0),
            frames: 240,
            pointer: None,
            opaque: true,
        }
    }
}

/// Simulate `options.frames` frames and return the final image.
///
/// A run that faults part way keeps the last good frame.
pub fn render_snapshot(config: FieldConfig, options: &SnapshotOptions) -> Result<RgbaImage, RunError> {
    let background = options.opaque.then_some(config.render.palette.void);
    let mut driver = FieldDriver::new(config)?;
    let mut canvas = RasterCanvas::new(options.viewport).with_background(background);

    driver.attach(options.viewport);
    if let Some(p) = options.pointer {
        driver.pointer_moved(p.x, p.y);
    }

    for _ in 0..options.frames {
        let status = driver.tick(&mut canvas);
        if status == FrameStatus::Faulted {
            log::warn!("snapshot stopped early at frame {}", driver.frame_count());
        }
        if !status.keep_scheduling() {
            break;
        }
    }
    driver.detach();

    log::info!("rendered {} frames", driver.frame_count());
    Ok(canvas.into_image())
}
