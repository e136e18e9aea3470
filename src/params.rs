/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that contains every
 * tunable scalar of the simulation: signaling bounds, Lennard-Jones
 * constants, kinematic caps, boundary extent and flocking weights.
 * Parameters are validated once at startup. The three weights of the
 * simplified variant can additionally be edited live through
 * SharedWeights, which publishes whole snapshots so a running tick never
 * sees a half-written value.
 */

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;

use nannou::prelude::*;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// Genetic override applied to Notch activation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MutantState {
    #[default]
    None,
    PermanentlyInhibited,
    PermanentlyActive,
}

impl FromStr for MutantState {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(MutantState::None),
            "inhibited" | "permanently_inhibited" => Ok(MutantState::PermanentlyInhibited),
            "active" | "permanently_active" => Ok(MutantState::PermanentlyActive),
            other => Err(ConfigError::BadOverride(format!("mutant={other}"))),
        }
    }
}

// Which update rule drives the agents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Biological,
    Simplified,
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "biological" => Ok(Variant::Biological),
            "simplified" => Ok(Variant::Simplified),
            other => Err(ConfigError::BadOverride(format!("variant={other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    #[default]
    Fixed,
    Periodic,
}

impl FromStr for BoundaryPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(BoundaryPolicy::Fixed),
            "periodic" => Ok(BoundaryPolicy::Periodic),
            other => Err(ConfigError::BadOverride(format!("boundary_policy={other}"))),
        }
    }
}

// Weights of the simplified variant, adjustable in real time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FlockWeights {
    pub centering: f32,
    pub avoidance: f32,
    pub straying: f32,
}

impl Default for FlockWeights {
    fn default() -> Self {
        Self {
            centering: -0.01,
            avoidance: 0.05,
            straying: 1.0,
        }
    }
}

// Lennard-Jones coefficients A = 4 eps sigma^12 and B = 4 eps sigma^6
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LennardJones {
    pub a: f64,
    pub b: f64,
}

impl LennardJones {
    pub fn new(epsilon: f32, sigma: f32) -> Self {
        let epsilon = epsilon as f64;
        let sigma6 = (sigma as f64).powi(6);
        Self {
            a: 4.0 * epsilon * sigma6 * sigma6,
            b: 4.0 * epsilon * sigma6,
        }
    }

    // A/r^12 - B/r^6
    #[inline]
    pub fn potential(&self, distance: f64) -> f64 {
        let inv6 = distance.powi(6).recip();
        self.a * inv6 * inv6 - self.b * inv6
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationParams {
    pub num_boids: usize,
    pub seed: Option<u64>,
    pub variant: Variant,
    pub boundary_policy: BoundaryPolicy,

    // Volume and kinematics
    pub boundary: f32,
    pub agent_radius: f32,
    pub time_step: f32,
    pub max_velocity: f32,
    pub max_acceleration: f32,
    pub swarm_center: [f32; 3],

    // Neighborhood queries
    pub closest_radius: f32,
    pub neighborhood_radius: f32,

    // Force model
    pub centering_weight: f32,
    pub random_weight: f32,
    pub alignment_weight: f32,
    pub lj_epsilon: f32,
    pub lj_sigma: f32,

    // Signaling model
    pub vegf_max: f32,
    pub suppress_notch: bool,
    pub mutant: MutantState,
    pub notch_norm: f32,
    pub dll4_max: f32,
    pub vegfr_max: f32,
    pub vegfr_min: f32,
    pub k_actvegfr_dll4: f32,
    pub notch_queue_length: usize,
    pub vegfr_queue_length: usize,
    pub average_window: usize,
    pub jitter_scale: f32,

    // Simplified variant
    pub weights: FlockWeights,

    // Ticks between samples of the signal time series
    pub plot_interval: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_boids: 200,
            seed: None,
            variant: Variant::Biological,
            boundary_policy: BoundaryPolicy::Fixed,
            boundary: 300.0,
            agent_radius: 25.0,
            time_step: 0.5,
            max_velocity: 10.0,
            max_acceleration: 1.0,
            swarm_center: [0.0, 0.0, 0.0],
            closest_radius: 60.0,
            neighborhood_radius: 100.0,
            centering_weight: 0.01,
            random_weight: 0.5,
            alignment_weight: 0.1,
            lj_epsilon: 1.0,
            lj_sigma: 20.0,
            vegf_max: 1.0,
            suppress_notch: false,
            mutant: MutantState::None,
            notch_norm: 1.0,
            dll4_max: 1.0,
            vegfr_max: 1.0,
            vegfr_min: 0.1,
            k_actvegfr_dll4: 1.0,
            notch_queue_length: 10,
            vegfr_queue_length: 10,
            average_window: 5,
            jitter_scale: 1e-4,
            weights: FlockWeights::default(),
            plot_interval: 50,
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    // NaN fails this check too
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn positive_len(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveLength { name, value })
    }
}

fn parse<T: FromStr>(raw: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::BadOverride(raw.to_string()))
}

impl SimulationParams {
    // Reject any configuration the update rule cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_len("notch_queue_length", self.notch_queue_length)?;
        positive_len("vegfr_queue_length", self.vegfr_queue_length)?;
        positive_len("average_window", self.average_window)?;
        if self.average_window > self.notch_queue_length {
            return Err(ConfigError::WindowTooLarge {
                window: self.average_window,
                queue: "notch_queue",
                length: self.notch_queue_length,
            });
        }
        if self.average_window > self.vegfr_queue_length {
            return Err(ConfigError::WindowTooLarge {
                window: self.average_window,
                queue: "vegfr_queue",
                length: self.vegfr_queue_length,
            });
        }

        positive("dll4_max", self.dll4_max)?;
        positive("lj_epsilon", self.lj_epsilon)?;
        positive("lj_sigma", self.lj_sigma)?;
        positive("jitter_scale", self.jitter_scale)?;
        positive("boundary", self.boundary)?;
        positive("time_step", self.time_step)?;
        positive("max_velocity", self.max_velocity)?;
        positive("max_acceleration", self.max_acceleration)?;
        positive("closest_radius", self.closest_radius)?;
        positive("neighborhood_radius", self.neighborhood_radius)?;

        if self.agent_radius < 0.0 || self.agent_radius >= self.boundary {
            return Err(ConfigError::RadiusExceedsBoundary {
                radius: self.agent_radius,
                boundary: self.boundary,
            });
        }
        if self.vegfr_min > self.vegfr_max {
            return Err(ConfigError::InvertedVegfrBounds {
                min: self.vegfr_min,
                max: self.vegfr_max,
            });
        }
        Ok(())
    }

    pub fn lennard_jones(&self) -> LennardJones {
        LennardJones::new(self.lj_epsilon, self.lj_sigma)
    }

    pub fn center(&self) -> Vec3 {
        let [x, y, z] = self.swarm_center;
        vec3(x, y, z)
    }

    // Load parameters from a JSON file; absent keys keep their defaults
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
    }

    // Apply a single `name=value` override from the command line
    pub fn apply_override(&mut self, raw: &str) -> Result<(), ConfigError> {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| ConfigError::BadOverride(raw.to_string()))?;

        match name.trim() {
            "num_boids" => self.num_boids = parse(raw, value)?,
            "seed" => self.seed = Some(parse(raw, value)?),
            "variant" => self.variant = parse(raw, value)?,
            "boundary_policy" => self.boundary_policy = parse(raw, value)?,
            "boundary" | "boundary_extent" => self.boundary = parse(raw, value)?,
            "agent_radius" => self.agent_radius = parse(raw, value)?,
            "time_step" => self.time_step = parse(raw, value)?,
            "max_velocity" => self.max_velocity = parse(raw, value)?,
            "max_acceleration" => self.max_acceleration = parse(raw, value)?,
            "closest_radius" => self.closest_radius = parse(raw, value)?,
            "neighborhood_radius" => self.neighborhood_radius = parse(raw, value)?,
            "centering_weight" => self.centering_weight = parse(raw, value)?,
            "random_weight" => self.random_weight = parse(raw, value)?,
            "alignment_weight" => self.alignment_weight = parse(raw, value)?,
            "lj_epsilon" => self.lj_epsilon = parse(raw, value)?,
            "lj_sigma" => self.lj_sigma = parse(raw, value)?,
            "vegf_max" => self.vegf_max = parse(raw, value)?,
            "suppress_notch" => self.suppress_notch = parse(raw, value)?,
            "mutant" => self.mutant = parse(raw, value)?,
            "notch_norm" => self.notch_norm = parse(raw, value)?,
            "dll4_max" => self.dll4_max = parse(raw, value)?,
            "vegfr_max" => self.vegfr_max = parse(raw, value)?,
            "vegfr_min" => self.vegfr_min = parse(raw, value)?,
            "k_actvegfr_dll4" => self.k_actvegfr_dll4 = parse(raw, value)?,
            "notch_queue_length" => self.notch_queue_length = parse(raw, value)?,
            "vegfr_queue_length" => self.vegfr_queue_length = parse(raw, value)?,
            "average_window" => self.average_window = parse(raw, value)?,
            "jitter_scale" => self.jitter_scale = parse(raw, value)?,
            "simple_centering" => self.weights.centering = parse(raw, value)?,
            "simple_avoidance" => self.weights.avoidance = parse(raw, value)?,
            "simple_straying" => self.weights.straying = parse(raw, value)?,
            "plot_interval" => self.plot_interval = parse(raw, value)?,
            other => return Err(ConfigError::UnknownParameter(other.to_string())),
        }
        Ok(())
    }

    // Get parameter ranges for UI sliders
    pub fn get_centering_range() -> std::ops::RangeInclusive<f32> {
        -0.1..=0.1
    }

    pub fn get_avoidance_range() -> std::ops::RangeInclusive<f32> {
        -0.1..=0.5
    }

    pub fn get_straying_range() -> std::ops::RangeInclusive<f32> {
        0.0..=3.0
    }
}

// Live weights shared between the control surface and the simulation thread.
// Writers replace the whole Arc; readers clone it once per tick.
#[derive(Debug, Clone, Default)]
pub struct SharedWeights {
    inner: Arc<RwLock<Arc<FlockWeights>>>,
}

impl SharedWeights {
    pub fn new(weights: FlockWeights) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(weights))),
        }
    }

    pub fn snapshot(&self) -> Arc<FlockWeights> {
        Arc::clone(&self.inner.read())
    }

    pub fn publish(&self, weights: FlockWeights) {
        *self.inner.write() = Arc::new(weights);
    }

    fn update(&self, edit: impl FnOnce(&mut FlockWeights)) {
        let mut guard = self.inner.write();
        let mut next = **guard;
        edit(&mut next);
        *guard = Arc::new(next);
    }

    pub fn set_centering(&self, value: f32) {
        self.update(|w| w.centering = value);
    }

    pub fn set_avoidance(&self, value: f32) {
        self.update(|w| w.avoidance = value);
    }

    pub fn set_straying(&self, value: f32) {
        self.update(|w| w.straying = value);
    }
}
