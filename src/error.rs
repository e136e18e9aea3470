/*
 * Error Module
 *
 * Errors raised while validating parameters at startup and while
 * committing a simulation tick.
 */

use thiserror::Error;

/// Invalid configuration detected before the first tick.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A signaling queue was configured with no capacity.
    #[error("{name} must be positive (got {value})")]
    NonPositiveLength { name: &'static str, value: usize },
    /// A scalar that divides or scales the model must be strictly positive.
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },
    /// The moving-average window reads more entries than a queue holds.
    #[error("average_window {window} exceeds {queue} length {length}")]
    WindowTooLarge {
        window: usize,
        queue: &'static str,
        length: usize,
    },
    #[error("vegfr_min {min} exceeds vegfr_max {max}")]
    InvertedVegfrBounds { min: f32, max: f32 },
    #[error("agent_radius {radius} must be smaller than boundary {boundary}")]
    RadiusExceedsBoundary { radius: f32, boundary: f32 },
    /// `name=value` override that could not be applied.
    #[error("cannot apply override `{0}`")]
    BadOverride(String),
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
}

/// A tick that could not be committed. The previous state stays in place.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TickError {
    #[error("agent {agent} produced a non-finite state at tick {tick}")]
    NonFinite { tick: u64, agent: usize },
}

/// Top-level error for constructing and running a flock.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tick(#[from] TickError),
}
