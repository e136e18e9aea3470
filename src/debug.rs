/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains performance metrics
 * and simulation counters to be displayed in the UI.
 *
 * Includes metrics for:
 * - FPS (frames per second)
 * - Frame time
 * - Committed simulation tick and ticks per second
 * - Collisions seen on the last frame
 */

use std::time::{Duration, Instant};

pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub tick: u64,
    pub ticks_per_second: f32,
    pub collisions: usize,
    last_tick: u64,
    last_sample: Instant,
}

impl Default for DebugInfo {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time: Duration::ZERO,
            tick: 0,
            ticks_per_second: 0.0,
            collisions: 0,
            last_tick: 0,
            last_sample: Instant::now(),
        }
    }
}

impl DebugInfo {
    // Refresh the tick rate at most once a second
    pub fn record_tick(&mut self, tick: u64) {
        self.tick = tick;
        let elapsed = self.last_sample.elapsed();
        if elapsed >= Duration::from_secs(1) {
            let ticks = tick.saturating_sub(self.last_tick);
            self.ticks_per_second = ticks as f32 / elapsed.as_secs_f32();
            self.last_tick = tick;
            self.last_sample = Instant::now();
        }
    }
}
