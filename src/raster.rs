//! CPU canvas backed by an `image::RgbaImage`.
//!
//! Used for headless snapshots. Coordinates are multiplied by the viewport's
//! scale factor, so a 800x600 viewport at scale 2 produces a 1600x1200
//! image with the same composition.

use std::path::Path;

use glam::Vec2;
use image::{Rgba as Pixel, RgbaImage};

use crate::driver::Viewport;
use crate::render::{Canvas, Rgba};

/// Line width in logical units.
const LINE_WIDTH: f32 = 1.0;

pub struct RasterCanvas {
    image: RgbaImage,
    scale: f32,
    background: Option<[u8; 3]>,
}

impl RasterCanvas {
    /// A transparent canvas sized for `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        let (width, height) = viewport.physical_size();
        Self {
            image: RgbaImage::new(width, height),
            scale: viewport.scale_factor,
            background: None,
        }
    }

    /// Fill with an opaque colour on every clear instead of transparency.
    pub fn with_background(mut self, background: Option<[u8; 3]>) -> Self {
        self.background = background;
        self
    }

    /// Reallocate for a new viewport. Contents are discarded.
    pub fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.physical_size();
        self.image = RgbaImage::new(width, height);
        self.scale = viewport.scale_factor;
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Write the current contents; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        self.image.save(path)
    }

    /// Blend `color` with `coverage` into the pixel at (x, y).
    fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let src_a = color.a * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        let mix = |s: f32, d: u8| -> u8 {
            let d = d as f32 / 255.0;
            let c = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            (c * 255.0).round().clamp(0.0, 255.0) as u8
        };
        *dst = Pixel([
            mix(color.r, dst[0]),
            mix(color.g, dst[1]),
            mix(color.b, dst[2]),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        ]);
    }

    /// Inclusive pixel range covering `[lo, hi]` in physical units.
    fn span(lo: f32, hi: f32) -> std::ops::RangeInclusive<i64> {
        (lo.floor() as i64)..=(hi.ceil() as i64)
    }
}

impl Canvas for RasterCanvas {
    fn clear(&mut self) {
        let fill = match self.background {
            Some([r, g, b]) => Pixel([r, g, b, 255]),
            None => Pixel([0, 0, 0, 0]),
        };
        for pixel in self.image.pixels_mut() {
            *pixel = fill;
        }
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba) {
        let a = from * self.scale;
        let b = to * self.scale;
        if !a.is_finite() || !b.is_finite() {
            return;
        }
        let half = LINE_WIDTH * self.scale * 0.5;
        let min = a.min(b) - Vec2::splat(half + 1.0);
        let max = a.max(b) + Vec2::splat(half + 1.0);
        let max = max.min(Vec2::new(self.image.width() as f32, self.image.height() as f32));
        let min = min.max(Vec2::ZERO);

        let ab = b - a;
        let len_sq = ab.length_squared();
        for y in Self::span(min.y, max.y) {
            for x in Self::span(min.x, max.x) {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 { ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0) } else { 0.0 };
                let distance = p.distance(a + ab * t);
                self.blend(x, y, color, half + 0.5 - distance);
            }
        }
    }

    fn disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let c = center * self.scale;
        let r = radius * self.scale;
        if !c.is_finite() || !r.is_finite() || r <= 0.0 {
            return;
        }
        let min = (c - Vec2::splat(r + 1.0)).max(Vec2::ZERO);
        let max = (c + Vec2::splat(r + 1.0))
            .min(Vec2::new(self.image.width() as f32, self.image.height() as f32));
        for y in Self::span(min.y, max.y) {
            for x in Self::span(min.x, max.x) {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                self.blend(x, y, color, r + 0.5 - p.distance(c));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba = Rgba { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    fn viewport(scale: f32) -> Viewport {
        Viewport::new(40.0, 30.0, scale)
    }

    #[test]
    fn test_size_follows_scale() {
        let canvas = RasterCanvas::new(viewport(2.0));
        assert_eq!(canvas.image().dimensions(), (80, 60));
    }

    #[test]
    fn test_disc_covers_center() {
        let mut canvas = RasterCanvas::new(viewport(1.0));
        canvas.clear();
        canvas.disc(Vec2::new(10.0, 10.0), 3.0, WHITE);

        assert_eq!(canvas.image().get_pixel(10, 10)[3], 255);
        assert_eq!(canvas.image().get_pixel(30, 20)[3], 0);
    }

    #[test]
    fn test_disc_is_scaled() {
        let mut canvas = RasterCanvas::new(viewport(2.0));
        canvas.disc(Vec2::new(10.0, 10.0), 1.0, WHITE);
        assert_eq!(canvas.image().get_pixel(20, 20)[3], 255);
        assert_eq!(canvas.image().get_pixel(10, 10)[3], 0);
    }

    #[test]
    fn test_line_midpoint_is_drawn() {
        let mut canvas = RasterCanvas::new(viewport(1.0));
        canvas.line(Vec2::new(2.0, 5.5), Vec2::new(30.0, 5.5), WHITE);
        assert!(canvas.image().get_pixel(16, 5)[3] > 200);
        assert_eq!(canvas.image().get_pixel(16, 15)[3], 0);
    }

    #[test]
    fn test_clear_uses_background() {
        let mut canvas = RasterCanvas::new(viewport(1.0)).with_background(Some([18, 18, 18]));
        canvas.disc(Vec2::new(5.0, 5.0), 2.0, WHITE);
        canvas.clear();
        assert!(canvas.image().pixels().all(|p| *p == Pixel([18, 18, 18, 255])));
    }

    #[test]
    fn test_offscreen_and_nan_draws_are_ignored() {
        let mut canvas = RasterCanvas::new(viewport(1.0));
        canvas.disc(Vec2::new(-500.0, 900.0), 4.0, WHITE);
        canvas.disc(Vec2::new(f32::NAN, 1.0), 4.0, WHITE);
        canvas.line(Vec2::new(-100.0, -100.0), Vec2::new(f32::INFINITY, 0.0), WHITE);
        assert!(canvas.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_translucent_blend() {
        let mut canvas = RasterCanvas::new(viewport(1.0)).with_background(Some([0, 0, 0]));
        canvas.clear();
        canvas.disc(Vec2::new(10.0, 10.0), 4.0, Rgba { a: 0.5, ..WHITE });
        let px = canvas.image().get_pixel(10, 10);
        assert_eq!(px[3], 255);
        assert!((px[0] as i32 - 128).abs() <= 1);
    }
}
