/*
 * Forces Module
 *
 * Force and potential model of the biological variant. Four contributions
 * are summed:
 * 1. Centering: pull toward the swarm center
 * 2. Randomizing: uniform noise in [-0.5, 0.5]^3
 * 3. Alignment: match the closest neighbor's velocity
 * 4. Interaction: Lennard-Jones force along the separation to that neighbor
 *
 * The sum only provides a direction. Its magnitude is replaced by the
 * migration rate from the signaling model, then capped by max_acceleration.
 */

use nannou::prelude::*;
use rand::Rng;

use crate::boid::Boid;
use crate::kinematics::{clamp_magnitude, set_magnitude_wide, widen, Wide};
use crate::params::{LennardJones, SimulationParams};

// Uniform sample from the cube [-0.5, 0.5]^3
pub fn random_unit_cube<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    vec3(
        rng.gen_range(-0.5..=0.5),
        rng.gen_range(-0.5..=0.5),
        rng.gen_range(-0.5..=0.5),
    )
}

pub fn centering(position: Vec3, center: Vec3, weight: f32) -> Vec3 {
    (center - position) * weight
}

pub fn alignment(velocity: Vec3, neighbor: Option<&Boid>, weight: f32) -> Vec3 {
    match neighbor {
        Some(other) => (other.velocity - velocity) * weight,
        None => Vec3::ZERO,
    }
}

// Lennard-Jones force d * (potential / |d|) with d = position - neighbor,
// kept in f64. Overlapping agents have no defined direction and feel no force.
pub fn interaction_wide(position: Vec3, neighbor: Option<&Boid>, lj: &LennardJones) -> Wide {
    let Some(other) = neighbor else {
        return [0.0; 3];
    };
    let d = widen(position - other.position);
    let len = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
    if len == 0.0 {
        return [0.0; 3];
    }

    // Near overlap the potential overflows to infinity; saturate the
    // strength, never the individual components
    let strength = lj.potential(len).clamp(-f64::MAX, f64::MAX);
    d.map(|c| (c / len) * strength)
}

// The same force narrowed to f32. When it does not fit, the whole vector
// shrinks to the f32 range so its direction survives.
pub fn interaction(position: Vec3, neighbor: Option<&Boid>, lj: &LennardJones) -> Vec3 {
    let force = interaction_wide(position, neighbor, lj);
    let peak = force.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()));
    let limit = f32::MAX as f64;
    let shrink = if peak > limit { limit / peak } else { 1.0 };
    let [x, y, z] = force.map(|c| c * shrink);
    vec3(x as f32, y as f32, z as f32)
}

// Acceleration of one boid for this tick, before integration
pub fn acceleration<R: Rng + ?Sized>(
    boid: &Boid,
    neighbor: Option<&Boid>,
    migration_rate: f32,
    params: &SimulationParams,
    lj: &LennardJones,
    rng: &mut R,
) -> Vec3 {
    let steering = centering(boid.position, params.center(), params.centering_weight)
        + random_unit_cube(rng) * params.random_weight
        + alignment(boid.velocity, neighbor, params.alignment_weight);
    let lj_force = interaction_wide(boid.position, neighbor, lj);

    // Sum in f64 and rescale the whole vector: the interaction term can be
    // far beyond the f32 range and only the direction is kept
    let steering = widen(steering);
    let total = [
        steering[0] + lj_force[0],
        steering[1] + lj_force[1],
        steering[2] + lj_force[2],
    ];
    let directed = set_magnitude_wide(total, migration_rate);
    clamp_magnitude(directed, params.max_acceleration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn boid(position: Vec3, velocity: Vec3) -> Boid {
        let mut boid = Boid::new(0, position, &SimulationParams::default());
        boid.velocity = velocity;
        boid
    }

    #[test]
    fn neighborless_terms_are_zero() {
        let lj = LennardJones::new(1.0, 20.0);
        let position = vec3(1.0, 2.0, 3.0);
        assert_eq!(alignment(vec3(1.0, 0.0, 0.0), None, 0.5), Vec3::ZERO);
        assert_eq!(interaction(position, None, &lj), Vec3::ZERO);
    }

    #[test]
    fn overlapping_neighbor_feels_no_force() {
        let lj = LennardJones::new(1.0, 20.0);
        let other = boid(vec3(4.0, 4.0, 4.0), Vec3::ZERO);
        assert_eq!(interaction(vec3(4.0, 4.0, 4.0), Some(&other), &lj), Vec3::ZERO);
    }

    #[test]
    fn potential_minimum_is_minus_epsilon() {
        let epsilon = 1.5;
        let sigma = 10.0;
        let lj = LennardJones::new(epsilon, sigma);
        let r_min = sigma as f64 * 2f64.powf(1.0 / 6.0);

        assert!((lj.potential(r_min) + epsilon as f64).abs() < 1e-9);

        let other = boid(Vec3::ZERO, Vec3::ZERO);
        let force = interaction(vec3(r_min as f32, 0.0, 0.0), Some(&other), &lj);
        // Potential minimum: the derivative of the energy vanishes
        let h = 1e-6 * r_min;
        let slope = (lj.potential(r_min + h) - lj.potential(r_min - h)) / (2.0 * h);
        assert!(slope.abs() < 1e-6);
        // The force is d * potential / |d|, so its size there is epsilon, not zero
        assert!((force.x as f64 - lj.potential(r_min)).abs() < 1e-4);
        assert!((force.length() - epsilon).abs() < 1e-4);
    }

    #[test]
    fn interaction_repels_inside_sigma() {
        let lj = LennardJones::new(1.0, 10.0);
        let other = boid(Vec3::ZERO, Vec3::ZERO);
        let force = interaction(vec3(5.0, 0.0, 0.0), Some(&other), &lj);
        assert!(force.x > 0.0);
        assert_eq!(force.y, 0.0);
    }

    #[test]
    fn interaction_saturates_at_tiny_distances() {
        let lj = LennardJones::new(1.0, 20.0);
        let other = boid(Vec3::ZERO, Vec3::ZERO);
        let force = interaction(vec3(1e-3, 0.0, 0.0), Some(&other), &lj);
        assert!(force.is_finite());
        assert!(force.x > 0.0);
    }

    #[test]
    fn saturated_interaction_keeps_its_direction() {
        let lj = LennardJones::new(1.0, 20.0);
        let other = boid(Vec3::ZERO, Vec3::ZERO);
        let me = vec3(0.004, 0.001, 0.0);
        let expected = me.normalize();

        let force = interaction(me, Some(&other), &lj);
        assert!(force.is_finite());
        assert!(force.normalize().dot(expected) > 0.9999);

        // Every other term off: the acceleration points straight along d
        let params = SimulationParams {
            centering_weight: 0.0,
            random_weight: 0.0,
            alignment_weight: 0.0,
            ..SimulationParams::default()
        };
        let mut rng = SmallRng::seed_from_u64(5);
        let acc = acceleration(&boid(me, Vec3::ZERO), Some(&other), 1.0, &params, &lj, &mut rng);
        assert!((acc.length() - 1.0).abs() < 1e-4);
        assert!(acc.normalize().dot(expected) > 0.9999);
    }

    #[test]
    fn acceleration_magnitude_equals_migration_rate() {
        let params = SimulationParams::default();
        let lj = params.lennard_jones();
        let mut rng = SmallRng::seed_from_u64(21);
        let me = boid(vec3(50.0, -20.0, 10.0), vec3(1.0, 0.0, 0.0));
        let other = boid(vec3(60.0, -20.0, 10.0), vec3(0.0, 1.0, 0.0));

        for rate in [0.25, 0.6, 1.0] {
            let acc = acceleration(&me, Some(&other), rate, &params, &lj, &mut rng);
            assert!((acc.length() - rate).abs() < 1e-5, "rate {rate} gave {}", acc.length());
        }
    }

    #[test]
    fn acceleration_respects_max_acceleration() {
        let params = SimulationParams {
            max_acceleration: 0.3,
            ..SimulationParams::default()
        };
        let lj = params.lennard_jones();
        let mut rng = SmallRng::seed_from_u64(2);
        let me = boid(vec3(100.0, 0.0, 0.0), Vec3::ZERO);
        let acc = acceleration(&me, None, 1.0, &params, &lj, &mut rng);
        assert!(acc.length() <= 0.3 + 1e-6);
    }

    #[test]
    fn zero_sum_stays_zero() {
        let params = SimulationParams {
            centering_weight: 0.0,
            random_weight: 0.0,
            ..SimulationParams::default()
        };
        let lj = params.lennard_jones();
        let mut rng = SmallRng::seed_from_u64(4);
        let me = boid(vec3(10.0, 10.0, 10.0), Vec3::ZERO);
        assert_eq!(acceleration(&me, None, 1.0, &params, &lj, &mut rng), Vec3::ZERO);
    }
}
