/*
 * Stats Module
 *
 * Read-only time series of the population's signaling state for plotting.
 * Every `interval` ticks the mean of the most recent Notch activation and
 * the mean of the most recent active VEGFR level are recorded. Old samples
 * are dropped once `capacity` is reached.
 */

use std::collections::VecDeque;

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSample {
    pub tick: u64,
    pub mean_notch: f32,
    pub mean_vegfr: f32,
}

#[derive(Debug, Clone)]
pub struct SignalSeries {
    interval: u64,
    capacity: usize,
    samples: VecDeque<SignalSample>,
}

impl SignalSeries {
    pub fn new(interval: u64, capacity: usize) -> Self {
        Self {
            interval: interval.max(1),
            capacity: capacity.max(1),
            samples: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    // Record the means if `tick` falls on the sampling interval
    pub fn observe(&mut self, tick: u64, (mean_notch, mean_vegfr): (f32, f32)) -> Option<SignalSample> {
        if tick % self.interval != 0 {
            return None;
        }
        let sample = SignalSample {
            tick,
            mean_notch,
            mean_vegfr,
        };
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        Some(sample)
    }

    pub fn samples(&self) -> impl Iterator<Item = &SignalSample> + '_ {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&SignalSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    // Plot-ready [tick, value] pairs
    pub fn notch_points(&self) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .map(|s| [s.tick as f64, f64::from(s.mean_notch)])
            .collect()
    }

    pub fn vegfr_points(&self) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .map(|s| [s.tick as f64, f64::from(s.mean_vegfr)])
            .collect()
    }
}

// Headless stand-in for the plot: one log line per sample
pub fn log_sample(sample: &SignalSample) {
    info!(
        tick = sample.tick,
        mean_notch = sample.mean_notch,
        mean_vegfr = sample.mean_vegfr,
        "signal sample"
    );
}
