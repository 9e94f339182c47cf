//! Frame timing.
//!
//! The physics step is per frame, not per second, so timing here is only
//! for reporting: a frame count and a periodically refreshed FPS figure
//! for window titles and the tuning panel.
//!
//! # Example
//!
//! ```
//! use gravfield::time::Time;
//!
//! let mut time = Time::new();
//! time.update();
//! assert_eq!(time.frame(), 1);
//! ```

use std::time::{Duration, Instant};

/// How often the FPS figure is recomputed.
const FPS_UPDATE_INTERVAL: Duration = Duration::from_millis(500);

/// Frame counter with a smoothed FPS readout.
#[derive(Debug)]
pub struct Time {
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
}

impl Time {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: Instant::now(),
        }
    }

    /// Record a frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= FPS_UPDATE_INTERVAL {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    /// Total frames recorded.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last refresh interval.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
