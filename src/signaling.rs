/*
 * Signaling Module
 *
 * Abstracted Notch / VEGFR / DLL4 feedback loop. Every tick each boid:
 * 1. reads the VEGF level of its environment (a ramp along x)
 * 2. averages its own recent Notch activity into a total VEGFR level
 * 3. averages its closest neighbor's recent VEGFR activity into DLL4
 * 4. derives Notch activation from DLL4 (or from a mutant override)
 * 5. records both activations in its fixed-length queues
 * 6. reports a migration rate that later fixes its acceleration magnitude
 *
 * The neighbor's queue comes from the previous tick's snapshot.
 */

use nannou::prelude::*;
use rand::Rng;

use crate::boid::Boid;
use crate::params::{MutantState, SimulationParams};
use crate::signal_queue::SignalQueue;

// Intermediate levels of one signaling step, kept for inspection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalLevels {
    pub env_vegf: f32,
    pub vegfr_tot: f32,
    pub dll4_tot: f32,
    pub act_notch: f32,
    pub act_vegfr: f32,
    pub migration_rate: f32,
}

// Small strictly positive noise keeping downstream ratios away from zero
#[inline]
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, scale: f32) -> f32 {
    rng.gen_range(scale * 0.01..scale)
}

// VEGF grows linearly from 0 at the -x wall to vegf_max at the +x wall
pub fn env_vegf(position: Vec3, params: &SimulationParams) -> f32 {
    let ramp = (position.x + params.boundary) / (2.0 * params.boundary);
    params.vegf_max * ramp.clamp(0.0, 1.0)
}

// Floor first, then ceiling
pub fn vegfr_total(notch: &SignalQueue, jitter: f32, params: &SimulationParams) -> f32 {
    let level = notch.recent_mean(params.average_window) + jitter;
    level.max(params.vegfr_min).min(params.vegfr_max)
}

// Capped above only
pub fn dll4_total(neighbor_vegfr: Option<&SignalQueue>, jitter: f32, params: &SimulationParams) -> f32 {
    match neighbor_vegfr {
        None => 0.0,
        Some(vegfr) => {
            let level = params.k_actvegfr_dll4 * vegfr.recent_mean(params.average_window) + jitter;
            level.min(params.dll4_max)
        }
    }
}

pub fn notch_activation(dll4_tot: f32, params: &SimulationParams) -> f32 {
    if params.suppress_notch {
        return 0.0;
    }
    match params.mutant {
        MutantState::PermanentlyInhibited => params.notch_norm,
        MutantState::PermanentlyActive => 0.0,
        MutantState::None => 1.0 - dll4_tot,
    }
}

pub fn migration_rate(dll4_tot: f32, has_neighbor: bool, params: &SimulationParams) -> f32 {
    if has_neighbor {
        dll4_tot / params.dll4_max
    } else {
        1.0
    }
}

// Advance the signaling state of `boid` by one tick, pushing onto its queues
pub fn step<R: Rng + ?Sized>(
    boid: &mut Boid,
    neighbor: Option<&Boid>,
    params: &SimulationParams,
    rng: &mut R,
) -> SignalLevels {
    let env_vegf = env_vegf(boid.position, params);
    let vegfr_tot = vegfr_total(&boid.notch, jitter(rng, params.jitter_scale), params);
    let dll4_tot = dll4_total(
        neighbor.map(|other| &other.vegfr),
        jitter(rng, params.jitter_scale),
        params,
    );
    let act_notch = notch_activation(dll4_tot, params);
    let act_vegfr = vegfr_tot.min(env_vegf);

    boid.notch.push(act_notch);
    boid.vegfr.push(act_vegfr);

    SignalLevels {
        env_vegf,
        vegfr_tot,
        dll4_tot,
        act_notch,
        act_vegfr,
        migration_rate: migration_rate(dll4_tot, neighbor.is_some(), params),
    }
}
