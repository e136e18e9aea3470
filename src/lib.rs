/*
 * Angiogenic Flocking Simulation - Module Definitions
 *
 * This file defines the module structure of the simulation. Agents flock
 * under centering, random, alignment and Lennard-Jones forces while a
 * Notch/VEGFR/DLL4 feedback loop between closest neighbors sets how hard
 * each one accelerates. A simplified variant with live-tunable weights is
 * available for interactive exploration.
 */

// Re-export key components for easier access
pub use boid::Boid;
pub use error::{ConfigError, SimError, TickError};
pub use flock::Flock;
pub use params::{BoundaryPolicy, FlockWeights, MutantState, SharedWeights, SimulationParams, Variant};
pub use spatial_grid::{NeighborIndex, SpatialGrid};
pub use stats::{SignalSample, SignalSeries};

// Simulation core
pub mod boid;
pub mod error;
pub mod flock;
pub mod forces;
pub mod kinematics;
pub mod params;
pub mod physics;
pub mod signal_queue;
pub mod signaling;
pub mod spatial_grid;
pub mod stats;

// Runners and interactive front end
pub mod app;
pub mod camera;
pub mod debug;
pub mod driver;
pub mod input;
pub mod palette;
pub mod renderer;
pub mod ui;

// Physics ticks per second of the interactive viewer
pub const TICKS_PER_SECOND: f32 = 60.0;
