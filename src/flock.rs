/*
 * Flock Module
 *
 * The population store and tick driver. A Flock owns every boid in two
 * buffers: the committed snapshot of the last tick and a back buffer the
 * next tick is written into. Each tick:
 * 1. All boids are updated in parallel from the committed snapshot
 * 2. If every boid produced a finite state, the buffers are swapped
 * 3. The neighbor index is rebuilt from the new positions
 *
 * A failed tick leaves the committed snapshot untouched.
 */

use nannou::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, error};

use crate::boid::Boid;
use crate::error::{ConfigError, TickError};
use crate::params::{LennardJones, SharedWeights, SimulationParams, Variant};
use crate::physics::{self, TickContext};
use crate::spatial_grid::{NeighborIndex, SpatialGrid};

pub struct Flock<I = SpatialGrid> {
    params: SimulationParams,
    lj: LennardJones,
    seed: u64,
    tick: u64,
    current: Vec<Boid>,
    next: Vec<Boid>,
    index: I,
    weights: SharedWeights,
}

impl Flock<SpatialGrid> {
    // Validate parameters and scatter `num_boids` boids through the volume
    pub fn new(params: SimulationParams) -> Result<Self, ConfigError> {
        let grid = SpatialGrid::new(params.closest_radius, params.boundary);
        Self::with_index(params, grid)
    }
}

impl<I: NeighborIndex + Sync> Flock<I> {
    pub fn with_index(params: SimulationParams, index: I) -> Result<Self, ConfigError> {
        params.validate()?;
        let seed = params.seed.unwrap_or_else(rand::random);
        let mut rng = SmallRng::seed_from_u64(seed);
        let boids = (0..params.num_boids)
            .map(|id| Boid::random(id, &params, &mut rng))
            .collect();
        Ok(Self::from_boids(params, seed, boids, index))
    }

    // Start from explicit initial states; parameters must already be valid
    pub fn from_boids(params: SimulationParams, seed: u64, boids: Vec<Boid>, index: I) -> Self {
        let weights = SharedWeights::new(params.weights);
        let mut flock = Self {
            lj: params.lennard_jones(),
            params,
            seed,
            tick: 0,
            next: boids.clone(),
            current: boids,
            index,
            weights,
        };
        flock.reindex();
        flock
    }

    fn reindex(&mut self) {
        let positions: Vec<Vec3> = self.current.iter().map(|boid| boid.position).collect();
        self.index.rebuild(&positions);
    }

    // Advance every boid by one fixed time step
    pub fn step(&mut self) -> Result<u64, TickError> {
        let tick = self.tick + 1;
        let ctx = TickContext {
            tick,
            seed: self.seed,
            params: &self.params,
            lj: self.lj,
            // One weights snapshot for the whole tick
            weights: *self.weights.snapshot(),
        };
        let snapshot = &self.current;
        let index = &self.index;
        let variant = self.params.variant;

        let result = self
            .next
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(i, slot)| {
                *slot = match variant {
                    Variant::Biological => physics::update_biological(snapshot, i, index, &ctx)?,
                    Variant::Simplified => physics::update_simplified(snapshot, i, index, &ctx)?,
                };
                Ok(())
            });

        if let Err(err) = result {
            let TickError::NonFinite { tick, agent } = &err;
            error!(tick, agent, "tick aborted, state left at previous tick");
            return Err(err);
        }

        std::mem::swap(&mut self.current, &mut self.next);
        self.reindex();
        self.tick = tick;
        debug!(tick, agents = self.current.len(), "tick committed");
        Ok(tick)
    }

    // Pairs of boids closer than two radii, each pair once per tick.
    // Cosmetic only and only reported for the simplified variant.
    pub fn collisions(&self) -> Vec<(usize, usize)> {
        if self.params.variant != Variant::Simplified {
            return Vec::new();
        }
        let reach = 2.0 * self.params.agent_radius;
        let mut pairs = Vec::new();
        for i in 0..self.current.len() {
            for j in self.index.within(i, reach) {
                if i < j && self.current[i].position.distance(self.current[j].position) < reach {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    // Mean of the most recent Notch and VEGFR activation over the population
    pub fn signal_means(&self) -> (f32, f32) {
        if self.current.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.current.len() as f32;
        let (notch, vegfr) = self
            .current
            .iter()
            .fold((0.0, 0.0), |(notch, vegfr), boid| {
                (notch + boid.notch.latest(), vegfr + boid.vegfr.latest())
            });
        (notch / n, vegfr / n)
    }

    pub fn boids(&self) -> &[Boid] {
        &self.current
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    // Handle for the interactive control surface
    pub fn weights(&self) -> &SharedWeights {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(params: SimulationParams) -> Flock {
        Flock::new(SimulationParams {
            seed: Some(42),
            ..params
        })
        .expect("valid params")
    }

    #[test]
    fn invalid_params_fail_before_the_first_tick() {
        let params = SimulationParams {
            dll4_max: 0.0,
            ..SimulationParams::default()
        };
        assert!(matches!(
            Flock::new(params),
            Err(ConfigError::NonPositive { name: "dll4_max", .. })
        ));
    }

    #[test]
    fn tiny_neighbor_radius_still_builds_and_steps() {
        let mut flock = seeded(SimulationParams {
            num_boids: 20,
            closest_radius: 0.5,
            neighborhood_radius: 0.5,
            ..SimulationParams::default()
        });
        assert_eq!(flock.step(), Ok(1));
    }

    #[test]
    fn step_advances_tick_and_keeps_population() {
        let mut flock = seeded(SimulationParams {
            num_boids: 30,
            ..SimulationParams::default()
        });
        for expected in 1..=5 {
            assert_eq!(flock.step(), Ok(expected));
        }
        assert_eq!(flock.tick(), 5);
        assert_eq!(flock.len(), 30);
        for (id, boid) in flock.boids().iter().enumerate() {
            assert_eq!(boid.id, id);
        }
    }

    #[test]
    fn failed_tick_commits_nothing() {
        let params = SimulationParams {
            seed: Some(1),
            variant: Variant::Simplified,
            ..SimulationParams::default()
        };
        let mut boids = vec![
            Boid::new(0, vec3(0.0, 0.0, 0.0), &params),
            Boid::new(1, vec3(10.0, 0.0, 0.0), &params),
        ];
        boids[1].velocity = vec3(f32::INFINITY, 0.0, 0.0);
        let grid = SpatialGrid::new(params.closest_radius, params.boundary);
        let mut flock = Flock::from_boids(params, 1, boids.clone(), grid);

        assert_eq!(flock.step(), Err(TickError::NonFinite { tick: 1, agent: 1 }));
        assert_eq!(flock.tick(), 0);
        assert_eq!(flock.boids(), boids.as_slice());
    }

    #[test]
    fn live_weights_apply_on_the_next_tick() {
        let params = SimulationParams {
            num_boids: 1,
            variant: Variant::Simplified,
            ..SimulationParams::default()
        };
        let mut flock = seeded(params);
        flock.weights().set_straying(0.0);
        let before = flock.boids()[0].position;
        flock.step().expect("tick");
        // Lone boid with no straying has nothing to push it
        assert_eq!(flock.boids()[0].position, before);
    }

    #[test]
    fn collisions_report_each_pair_once_in_simplified_mode() {
        let params = SimulationParams {
            variant: Variant::Simplified,
            agent_radius: 5.0,
            ..SimulationParams::default()
        };
        let boids = vec![
            Boid::new(0, vec3(0.0, 0.0, 0.0), &params),
            Boid::new(1, vec3(6.0, 0.0, 0.0), &params),
            Boid::new(2, vec3(100.0, 0.0, 0.0), &params),
        ];
        let grid = SpatialGrid::new(params.closest_radius, params.boundary);
        let flock = Flock::from_boids(params.clone(), 0, boids.clone(), grid);
        assert_eq!(flock.collisions(), vec![(0, 1)]);

        let biological = SimulationParams {
            variant: Variant::Biological,
            ..params
        };
        let grid = SpatialGrid::new(biological.closest_radius, biological.boundary);
        let flock = Flock::from_boids(biological, 0, boids, grid);
        assert!(flock.collisions().is_empty());
    }

    #[test]
    fn signal_means_average_latest_entries() {
        let mut flock = seeded(SimulationParams {
            num_boids: 1,
            ..SimulationParams::default()
        });
        assert_eq!(flock.signal_means(), (0.0, 0.0));
        flock.step().expect("tick");
        let (notch, vegfr) = flock.signal_means();
        // A lone boid has no DLL4 input so Notch is fully active
        assert_eq!(notch, 1.0);
        assert!(vegfr >= 0.0 && vegfr <= 1.0);
    }
}
