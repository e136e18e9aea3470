/*
 * Driver Module
 *
 * Runs a Flock either to completion without a window (batch mode) or on a
 * dedicated simulation thread for the interactive viewer. The thread steps
 * at a fixed rate and publishes an immutable Frame after every tick; the
 * renderer only ever reads the latest published frame, and the control
 * surface only writes through SharedWeights and the pause flag.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use nannou::prelude::*;
use parking_lot::{Mutex, RwLock};
use tracing::{error, info};

use crate::error::{SimError, TickError};
use crate::flock::Flock;
use crate::params::{SharedWeights, SimulationParams};
use crate::stats::{self, SignalSeries};

const SERIES_CAPACITY: usize = 512;

// Step `ticks` times, logging every signal sample
pub fn run_headless(flock: &mut Flock, ticks: u64) -> Result<SignalSeries, TickError> {
    let mut series = SignalSeries::new(flock.params().plot_interval, SERIES_CAPACITY);
    for _ in 0..ticks {
        let tick = flock.step()?;
        if let Some(sample) = series.observe(tick, flock.signal_means()) {
            stats::log_sample(&sample);
        }
    }
    Ok(series)
}

// Build a flock from `params` and run it headless in one call
pub fn simulate(params: SimulationParams, ticks: u64) -> Result<(Flock, SignalSeries), SimError> {
    let mut flock = Flock::new(params)?;
    let series = run_headless(&mut flock, ticks)?;
    Ok((flock, series))
}

// Everything the renderer needs from one committed tick
#[derive(Debug, Clone)]
pub struct Frame {
    pub tick: u64,
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    pub notch: Vec<f32>,
    pub collisions: Vec<(usize, usize)>,
    pub series: SignalSeries,
}

impl Frame {
    fn capture(flock: &Flock, series: &SignalSeries) -> Self {
        let boids = flock.boids();
        Self {
            tick: flock.tick(),
            positions: boids.iter().map(|b| b.position).collect(),
            velocities: boids.iter().map(|b| b.velocity).collect(),
            notch: boids.iter().map(|b| b.notch.latest()).collect(),
            collisions: flock.collisions(),
            series: series.clone(),
        }
    }
}

pub struct SimulationThread {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    frame: Arc<RwLock<Arc<Frame>>>,
    failure: Arc<Mutex<Option<TickError>>>,
    weights: SharedWeights,
}

impl SimulationThread {
    // Move the flock onto its own thread, stepping `ticks_per_second` times a second
    pub fn spawn(mut flock: Flock, ticks_per_second: f32) -> std::io::Result<Self> {
        let step = Duration::from_secs_f32(1.0 / ticks_per_second.max(1.0));
        let stop = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));
        let failure = Arc::new(Mutex::new(None));
        let weights = flock.weights().clone();

        let mut series = SignalSeries::new(flock.params().plot_interval, SERIES_CAPACITY);
        let frame = Arc::new(RwLock::new(Arc::new(Frame::capture(&flock, &series))));

        let handle = {
            let stop = Arc::clone(&stop);
            let paused = Arc::clone(&paused);
            let frame = Arc::clone(&frame);
            let failure = Arc::clone(&failure);

            thread::Builder::new()
                .name("simulation".into())
                .spawn(move || {
                    info!(agents = flock.len(), seed = flock.seed(), "simulation thread started");
                    let mut next_deadline = Instant::now();

                    while !stop.load(Ordering::Acquire) {
                        if !paused.load(Ordering::Acquire) {
                            match flock.step() {
                                Ok(tick) => {
                                    series.observe(tick, flock.signal_means());
                                    *frame.write() = Arc::new(Frame::capture(&flock, &series));
                                }
                                Err(err) => {
                                    error!(%err, "simulation halted");
                                    *failure.lock() = Some(err);
                                    break;
                                }
                            }
                        }

                        next_deadline += step;
                        let now = Instant::now();
                        if next_deadline > now {
                            thread::sleep(next_deadline - now);
                        } else {
                            // Fell behind; do not try to catch up
                            next_deadline = now;
                        }
                    }
                    info!(tick = flock.tick(), "simulation thread stopped");
                })?
        };

        Ok(Self {
            handle: Some(handle),
            stop,
            paused,
            frame,
            failure,
            weights,
        })
    }

    pub fn latest(&self) -> Arc<Frame> {
        Arc::clone(&self.frame.read())
    }

    pub fn weights(&self) -> &SharedWeights {
        &self.weights
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    pub fn failure(&self) -> Option<TickError> {
        self.failure.lock().clone()
    }

    // Teardown hook: stop stepping and wait for the thread to exit
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("simulation thread panicked");
            }
        }
    }
}

impl Drop for SimulationThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boid::Boid;
    use crate::error::ConfigError;
    use crate::params::Variant;
    use crate::spatial_grid::SpatialGrid;

    #[test]
    fn headless_run_samples_on_interval() {
        let params = SimulationParams {
            num_boids: 10,
            seed: Some(3),
            plot_interval: 5,
            ..SimulationParams::default()
        };
        let mut flock = Flock::new(params).expect("flock");
        let series = run_headless(&mut flock, 20).expect("run");
        assert_eq!(flock.tick(), 20);
        let ticks: Vec<u64> = series.samples().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![5, 10, 15, 20]);
    }

    #[test]
    fn simulate_rejects_invalid_parameters() {
        let params = SimulationParams {
            dll4_max: 0.0,
            ..SimulationParams::default()
        };
        match simulate(params, 10) {
            Err(SimError::Config(ConfigError::NonPositive { name, .. })) => assert_eq!(name, "dll4_max"),
            other => panic!("expected a config error, got {:?}", other.map(|(flock, _)| flock.tick())),
        }
    }

    #[test]
    fn thread_reports_a_failed_tick_and_stops() {
        let params = SimulationParams {
            num_boids: 2,
            ..SimulationParams::default()
        };
        let mut broken = Boid::new(0, vec3(10.0, 0.0, 0.0), &params);
        broken.velocity = vec3(f32::NAN, 0.0, 0.0);
        let healthy = Boid::new(1, vec3(-200.0, 0.0, 0.0), &params);
        let grid = SpatialGrid::new(params.closest_radius, params.boundary);
        let flock = Flock::from_boids(params, 2, vec![broken, healthy], grid);
        let mut sim = SimulationThread::spawn(flock, 500.0).expect("spawn");

        let deadline = Instant::now() + Duration::from_secs(5);
        while sim.failure().is_none() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(sim.failure(), Some(TickError::NonFinite { tick: 1, agent: 0 }));
        // Nothing past the last committed tick is ever published
        assert_eq!(sim.latest().tick, 0);
        sim.shutdown();
    }

    #[test]
    fn thread_publishes_frames_and_shuts_down() {
        let params = SimulationParams {
            num_boids: 8,
            seed: Some(9),
            variant: Variant::Simplified,
            ..SimulationParams::default()
        };
        let flock = Flock::new(params).expect("flock");
        let mut sim = SimulationThread::spawn(flock, 500.0).expect("spawn");

        let deadline = Instant::now() + Duration::from_secs(5);
        while sim.latest().tick < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        sim.weights().set_straying(0.5);
        let frame = sim.latest();
        assert!(frame.tick >= 3);
        assert_eq!(frame.positions.len(), 8);

        sim.shutdown();
        assert!(sim.failure().is_none());
    }
}
