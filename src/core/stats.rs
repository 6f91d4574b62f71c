//! Frame statistics

use std::collections::VecDeque;
use std::time::Duration;

const MAX_SAMPLES: usize = 120;

/// Rolling frame time tracker
#[derive(Debug, Clone)]
pub struct FrameStats {
    /// Most recent frame times, oldest first
    frame_times: VecDeque<Duration>,
    fps: f32,
    avg_frame_time_ms: f32,
    min_frame_time_ms: f32,
    max_frame_time_ms: f32,
    total_frames: u64,
    /// Sum of every recorded step, including samples already dropped
    total_time: Duration,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(MAX_SAMPLES),
            fps: 0.0,
            avg_frame_time_ms: 0.0,
            min_frame_time_ms: 0.0,
            max_frame_time_ms: 0.0,
            total_frames: 0,
            total_time: Duration::ZERO,
        }
    }

    /// Record a frame with the given step
    pub fn record_frame(&mut self, delta: Duration) {
        self.total_frames += 1;
        self.total_time += delta;

        if self.frame_times.len() >= MAX_SAMPLES {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(delta);

        self.update_stats();
    }

    fn update_stats(&mut self) {
        let mut total = Duration::ZERO;
        let mut min = Duration::MAX;
        let mut max = Duration::ZERO;

        for &dt in &self.frame_times {
            total += dt;
            min = min.min(dt);
            max = max.max(dt);
        }

        let count = self.frame_times.len() as f32;
        let total_secs = total.as_secs_f32();

        if total_secs > 0.0 {
            self.avg_frame_time_ms = (total_secs / count) * 1000.0;
            self.fps = count / total_secs;
        } else {
            self.avg_frame_time_ms = 0.0;
            self.fps = 0.0;
        }

        self.min_frame_time_ms = min.as_secs_f32() * 1000.0;
        self.max_frame_time_ms = max.as_secs_f32() * 1000.0;
    }

    /// Frames per second over the sample window
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn avg_frame_time_ms(&self) -> f32 {
        self.avg_frame_time_ms
    }

    pub fn min_frame_time_ms(&self) -> f32 {
        self.min_frame_time_ms
    }

    pub fn max_frame_time_ms(&self) -> f32 {
        self.max_frame_time_ms
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Simulated time since the stage started
    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    /// One-line summary for logs
    pub fn format_stats(&self) -> String {
        format!(
            "FPS: {:.1} | Frame: {:.2}ms (min: {:.2}, max: {:.2}) | {} frames",
            self.fps,
            self.avg_frame_time_ms,
            self.min_frame_time_ms,
            self.max_frame_time_ms,
            self.total_frames
        )
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let stats = FrameStats::new();
        assert_eq!(stats.fps(), 0.0);
        assert_eq!(stats.total_frames(), 0);
    }

    #[test]
    fn test_average_and_extremes() {
        let mut stats = FrameStats::new();
        stats.record_frame(Duration::from_millis(10));
        stats.record_frame(Duration::from_millis(30));

        assert!((stats.avg_frame_time_ms() - 20.0).abs() < 0.01);
        assert!((stats.fps() - 50.0).abs() < 0.01);
        assert!((stats.min_frame_time_ms() - 10.0).abs() < 0.01);
        assert!((stats.max_frame_time_ms() - 30.0).abs() < 0.01);
        assert_eq!(stats.total_time(), Duration::from_millis(40));
    }

    #[test]
    fn test_window_drops_old_samples() {
        let mut stats = FrameStats::new();
        stats.record_frame(Duration::from_millis(500));
        for _ in 0..MAX_SAMPLES {
            stats.record_frame(Duration::from_millis(10));
        }
        assert!((stats.max_frame_time_ms() - 10.0).abs() < 0.01);
        assert_eq!(stats.total_frames(), MAX_SAMPLES as u64 + 1);
    }

    #[test]
    fn test_zero_steps() {
        let mut stats = FrameStats::new();
        stats.record_frame(Duration::ZERO);
        assert_eq!(stats.fps(), 0.0);
        assert_eq!(stats.avg_frame_time_ms(), 0.0);
    }
}
