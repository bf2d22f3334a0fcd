//! Time management utilities

use std::time::{Duration, Instant};

/// Frame clock driven by the host's delta time
///
/// The engine never samples the wall clock for simulation time; the host
/// hands it `delta_time` each frame. This timer keeps the running totals and
/// a windowed FPS estimate for diagnostics.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    window_time: f32,
    window_frames: u32,
    fps: f32,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            window_time: 0.0,
            window_frames: 0,
            fps: 0.0,
        }
    }

    /// Advance by one frame of `delta_time` seconds (negative values clamp to zero)
    pub fn tick(&mut self, delta_time: f32) {
        let delta_time = delta_time.max(0.0);
        self.delta_time = delta_time;
        self.total_time += delta_time;
        self.frame_count += 1;
        self.window_time += delta_time;
        self.window_frames += 1;
    }

    /// Close the current FPS window if it is at least `interval` seconds long
    ///
    /// Returns true when the FPS estimate was refreshed.
    pub fn roll_window(&mut self, interval: f32) -> bool {
        if self.window_time < interval || self.window_time <= 0.0 {
            return false;
        }
        self.fps = self.window_frames as f32 / self.window_time;
        self.window_time = 0.0;
        self.window_frames = 0;
        true
    }

    /// Seconds since the previous frame
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total simulated seconds
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// FPS measured over the last closed window
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Simple stopwatch for measuring elapsed wall-clock time
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let running = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + running
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    /// Check if the stopwatch is currently running
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_timer_accumulates() {
        let mut timer = FrameTimer::new();
        timer.tick(0.016);
        timer.tick(0.016);
        timer.tick(-1.0);
        assert_eq!(timer.frame_count(), 3);
        assert_relative_eq!(timer.total_time(), 0.032, epsilon = 1e-6);
        assert_eq!(timer.delta_time(), 0.0);
    }

    #[test]
    fn test_frame_timer_fps_window() {
        let mut timer = FrameTimer::new();
        timer.tick(0.0625);
        assert!(!timer.roll_window(0.1));
        timer.tick(0.0625);
        assert!(timer.roll_window(0.1));
        assert_relative_eq!(timer.fps(), 16.0, epsilon = 1e-4);
        assert!(!timer.roll_window(0.1));
    }

    #[test]
    fn test_stopwatch_stops_accumulating() {
        let mut stopwatch = Stopwatch::start_new();
        assert!(stopwatch.is_running());
        stopwatch.stop();
        let elapsed = stopwatch.elapsed();
        assert!(!stopwatch.is_running());
        assert_eq!(stopwatch.elapsed(), elapsed);
    }
}
