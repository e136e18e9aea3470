/*
 * Boid Module
 *
 * This module defines the Boid struct, the physical and biological state of
 * one agent. Each boid carries a position, velocity and acceleration in the
 * 3D volume plus two fixed-length signaling histories (Notch activation and
 * active VEGFR). Visual state such as color is kept elsewhere.
 */

use nannou::prelude::*;
use rand::Rng;

use crate::params::SimulationParams;
use crate::signal_queue::SignalQueue;

#[derive(Debug, Clone, PartialEq)]
pub struct Boid {
    pub id: usize,
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub notch: SignalQueue,
    pub vegfr: SignalQueue,
}

impl Boid {
    pub fn new(id: usize, position: Vec3, params: &SimulationParams) -> Self {
        Self {
            id,
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            notch: SignalQueue::zeroed(params.notch_queue_length),
            vegfr: SignalQueue::zeroed(params.vegfr_queue_length),
        }
    }

    // Place a boid uniformly at random inside the boundary cube
    pub fn random<R: Rng + ?Sized>(id: usize, params: &SimulationParams, rng: &mut R) -> Self {
        let b = params.boundary;
        let position = vec3(
            rng.gen_range(-b..b),
            rng.gen_range(-b..b),
            rng.gen_range(-b..b),
        );
        Self::new(id, position, params)
    }

    // Every physical component is a real number
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.acceleration.is_finite()
            && self.notch.latest().is_finite()
            && self.vegfr.latest().is_finite()
    }
}
