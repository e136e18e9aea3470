/*
 * Physics Module
 *
 * This module holds the per-agent update rules, one per simulation variant.
 * Each rule reads only the previous tick's snapshot (through the neighbor
 * index) and returns the agent's next state, so the driver can run every
 * agent in parallel and in any order.
 *
 * Per tick, for one agent:
 * 1. Correct the position at the volume boundary
 * 2. Query neighbors in the snapshot
 * 3. Compute the new acceleration (biological: signaling + forces)
 * 4. Integrate velocity (capped) and position with the fixed time step
 */

use nannou::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::boid::Boid;
use crate::error::TickError;
use crate::forces;
use crate::kinematics::{apply_boundary, clamp_magnitude, periodic_boundary};
use crate::params::{FlockWeights, LennardJones, SimulationParams};
use crate::signaling;
use crate::spatial_grid::NeighborIndex;

// Everything an update rule may read besides the snapshot
pub struct TickContext<'a> {
    pub tick: u64,
    pub seed: u64,
    pub params: &'a SimulationParams,
    pub lj: LennardJones,
    pub weights: FlockWeights,
}

// SplitMix64 finalizer
#[inline]
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// Random stream of one agent for one tick. Depends only on (seed, tick, id)
// so results do not change with the number of worker threads.
pub fn agent_rng(seed: u64, tick: u64, id: usize) -> SmallRng {
    let stream = mix(seed ^ mix(tick.wrapping_add(0x9E37_79B9_7F4A_7C15)) ^ mix(id as u64).rotate_left(17));
    SmallRng::seed_from_u64(stream)
}

#[inline]
fn integrate(boid: &mut Boid, params: &SimulationParams) {
    let dt = params.time_step;
    boid.velocity = clamp_magnitude(boid.velocity + boid.acceleration * dt, params.max_velocity);
    boid.position += boid.velocity * dt;
}

#[inline]
fn commit(boid: Boid, tick: u64) -> Result<Boid, TickError> {
    if boid.is_finite() {
        Ok(boid)
    } else {
        Err(TickError::NonFinite { tick, agent: boid.id })
    }
}

// Biological variant: signaling feedback + Lennard-Jones flocking
pub fn update_biological<I: NeighborIndex + ?Sized>(
    snapshot: &[Boid],
    idx: usize,
    index: &I,
    ctx: &TickContext<'_>,
) -> Result<Boid, TickError> {
    let params = ctx.params;
    let mut next = snapshot[idx].clone();
    let mut rng = agent_rng(ctx.seed, ctx.tick, next.id);

    next.position = apply_boundary(
        params.boundary_policy,
        next.position,
        params.boundary,
        params.agent_radius,
    );

    let neighbor = index
        .nearest(idx, params.closest_radius)
        .map(|other| &snapshot[other]);

    let levels = signaling::step(&mut next, neighbor, params, &mut rng);
    next.acceleration = forces::acceleration(
        &next,
        neighbor,
        levels.migration_rate,
        params,
        &ctx.lj,
        &mut rng,
    );

    integrate(&mut next, params);
    commit(next, ctx.tick)
}

// Simplified variant: straying, centering on the neighborhood centroid and
// avoidance of the closest neighbor, weighted by the live weights
pub fn update_simplified<I: NeighborIndex + ?Sized>(
    snapshot: &[Boid],
    idx: usize,
    index: &I,
    ctx: &TickContext<'_>,
) -> Result<Boid, TickError> {
    let params = ctx.params;
    let weights = &ctx.weights;
    let mut next = snapshot[idx].clone();
    let mut rng = agent_rng(ctx.seed, ctx.tick, next.id);

    next.position = periodic_boundary(next.position, params.boundary);

    let mut acceleration = forces::random_unit_cube(&mut rng) * weights.straying;

    let neighborhood = index.within(idx, params.neighborhood_radius);
    if !neighborhood.is_empty() {
        let sum = neighborhood
            .iter()
            .fold(Vec3::ZERO, |acc, &other| acc + snapshot[other].position);
        let centroid = sum / neighborhood.len() as f32;
        acceleration += (next.position - centroid) * weights.centering;
    }

    if let Some(closest) = index.nearest(idx, params.closest_radius) {
        acceleration += (next.position - snapshot[closest].position) * weights.avoidance;
    }

    next.acceleration = clamp_magnitude(acceleration, params.max_acceleration);
    integrate(&mut next, params);
    commit(next, ctx.tick)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BoundaryPolicy;

    // Stub index over a fixed neighbor table
    struct FixedNeighbors {
        nearest: Vec<Option<usize>>,
        within: Vec<Vec<usize>>,
    }

    impl NeighborIndex for FixedNeighbors {
        fn rebuild(&mut self, _positions: &[Vec3]) {}

        fn nearest(&self, idx: usize, _radius: f32) -> Option<usize> {
            self.nearest[idx]
        }

        fn within(&self, idx: usize, _radius: f32) -> Vec<usize> {
            self.within[idx].clone()
        }
    }

    fn context(params: &SimulationParams) -> TickContext<'_> {
        TickContext {
            tick: 1,
            seed: 99,
            params,
            lj: params.lennard_jones(),
            weights: params.weights,
        }
    }

    #[test]
    fn agent_streams_are_reproducible_and_distinct() {
        use rand::Rng;
        let a: u64 = agent_rng(1, 2, 3).gen();
        let b: u64 = agent_rng(1, 2, 3).gen();
        let c: u64 = agent_rng(1, 2, 4).gen();
        let d: u64 = agent_rng(1, 3, 3).gen();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn boundary_is_corrected_before_integration() {
        let params = SimulationParams {
            random_weight: 0.0,
            centering_weight: 0.0,
            ..SimulationParams::default()
        };
        let mut boid = Boid::new(0, vec3(400.0, 0.0, 0.0), &params);
        boid.velocity = Vec3::ZERO;
        let index = FixedNeighbors { nearest: vec![None], within: vec![vec![]] };

        let next = update_biological(&[boid], 0, &index, &context(&params)).expect("tick");
        // Zero force sum leaves the agent at rest on the clipped wall
        assert_eq!(next.position, vec3(275.0, 0.0, 0.0));
        assert_eq!(next.velocity, Vec3::ZERO);
    }

    #[test]
    fn periodic_policy_is_selectable_for_biological_agents() {
        let params = SimulationParams {
            random_weight: 0.0,
            centering_weight: 0.0,
            boundary_policy: BoundaryPolicy::Periodic,
            ..SimulationParams::default()
        };
        let boid = Boid::new(0, vec3(350.0, 0.0, 0.0), &params);
        let index = FixedNeighbors { nearest: vec![None], within: vec![vec![]] };
        let next = update_biological(&[boid], 0, &index, &context(&params)).expect("tick");
        assert!((next.position.x + 250.0).abs() < 1e-4);
    }

    #[test]
    fn biological_update_reads_only_the_snapshot() {
        let params = SimulationParams::default();
        let a = Boid::new(0, vec3(0.0, 0.0, 0.0), &params);
        let b = Boid::new(1, vec3(30.0, 0.0, 0.0), &params);
        let snapshot = vec![a, b];
        let index = FixedNeighbors {
            nearest: vec![Some(1), Some(0)],
            within: vec![vec![1], vec![0]],
        };
        let ctx = context(&params);

        let first = update_biological(&snapshot, 0, &index, &ctx).expect("a");
        let second = update_biological(&snapshot, 1, &index, &ctx).expect("b");
        // Same snapshot, same result regardless of evaluation order
        assert_eq!(update_biological(&snapshot, 1, &index, &ctx).expect("b"), second);
        assert_eq!(update_biological(&snapshot, 0, &index, &ctx).expect("a"), first);

        // Neighbor queues were zero, so DLL4 is only jitter and Notch is near 1
        assert!(first.notch.latest() > 0.99 && first.notch.latest() < 1.0);
        assert!(first.acceleration.length() < 1e-3);
    }

    #[test]
    fn simplified_update_combines_centroid_and_avoidance() {
        let params = SimulationParams {
            weights: FlockWeights {
                centering: 0.1,
                avoidance: 0.2,
                straying: 0.0,
            },
            max_acceleration: 100.0,
            ..SimulationParams::default()
        };
        let snapshot = vec![
            Boid::new(0, vec3(0.0, 0.0, 0.0), &params),
            Boid::new(1, vec3(10.0, 0.0, 0.0), &params),
            Boid::new(2, vec3(0.0, 20.0, 0.0), &params),
        ];
        let index = FixedNeighbors {
            nearest: vec![Some(1), Some(0), Some(0)],
            within: vec![vec![1, 2], vec![0, 2], vec![0, 1]],
        };

        let next = update_simplified(&snapshot, 0, &index, &context(&params)).expect("tick");
        // centroid (5, 10, 0): 0.1 * (-5, -10, 0) + 0.2 * (-10, 0, 0)
        let expected = vec3(-2.5, -1.0, 0.0);
        assert!((next.acceleration - expected).length() < 1e-5);
        assert!((next.velocity - expected * params.time_step).length() < 1e-5);
        assert!(next.notch.to_vec().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn simplified_update_without_neighbors_only_strays() {
        let params = SimulationParams {
            weights: FlockWeights {
                centering: 0.1,
                avoidance: 0.2,
                straying: 0.0,
            },
            ..SimulationParams::default()
        };
        let snapshot = vec![Boid::new(0, vec3(1.0, 2.0, 3.0), &params)];
        let index = FixedNeighbors { nearest: vec![None], within: vec![vec![]] };
        let next = update_simplified(&snapshot, 0, &index, &context(&params)).expect("tick");
        assert_eq!(next.acceleration, Vec3::ZERO);
        assert_eq!(next.position, vec3(1.0, 2.0, 3.0));
    }

    #[test]
    fn non_finite_state_is_rejected() {
        let params = SimulationParams::default();
        let mut boid = Boid::new(7, Vec3::ZERO, &params);
        boid.velocity = vec3(f32::NAN, 0.0, 0.0);
        let index = FixedNeighbors { nearest: vec![None], within: vec![vec![]] };
        let result = update_simplified(&[boid], 0, &index, &context(&params));
        assert_eq!(result, Err(TickError::NonFinite { tick: 1, agent: 7 }));
    }
}
