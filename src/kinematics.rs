/*
 * Kinematics Module
 *
 * Magnitude limits for acceleration and velocity, and the two boundary
 * policies that keep agents inside the simulation cube:
 * - fixed: clip each axis to the wall minus the agent radius
 * - periodic: wrap each axis around to the opposite wall
 *
 * Lengths are computed in f64 so very large force sums (the Lennard-Jones
 * term grows with the 12th power of the inverse distance) are rescaled
 * instead of overflowing to infinity.
 */

use nannou::prelude::*;

use crate::params::BoundaryPolicy;

// Double-precision vector for sums that may exceed the f32 range
pub type Wide = [f64; 3];

#[inline]
pub fn widen(v: Vec3) -> Wide {
    [v.x as f64, v.y as f64, v.z as f64]
}

#[inline]
fn length_f64(v: Vec3) -> f64 {
    let [x, y, z] = widen(v);
    (x * x + y * y + z * z).sqrt()
}

#[inline]
fn scale_f64(v: Vec3, factor: f64) -> Vec3 {
    let [x, y, z] = widen(v);
    vec3((x * factor) as f32, (y * factor) as f32, (z * factor) as f32)
}

// Rescale `v` to exactly `magnitude`, keeping its direction. The zero
// vector has no direction and stays zero.
pub fn set_magnitude(v: Vec3, magnitude: f32) -> Vec3 {
    set_magnitude_wide(widen(v), magnitude)
}

// Same as `set_magnitude` for a wide vector. Components are first divided
// by the largest absolute one, so even values near f64::MAX keep their
// ratios and the length never overflows.
pub fn set_magnitude_wide(v: Wide, magnitude: f32) -> Vec3 {
    let peak = v.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()));
    if peak == 0.0 || !peak.is_finite() {
        return Vec3::ZERO;
    }
    let [x, y, z] = v.map(|c| c / peak);
    let factor = magnitude as f64 / (x * x + y * y + z * z).sqrt();
    vec3((x * factor) as f32, (y * factor) as f32, (z * factor) as f32)
}

// Shrink `v` to `max` when it is longer, otherwise return it untouched.
// The target sits one f32 epsilon under `max` so rounding can never leave
// the result above the cap, which keeps repeated clamping a no-op.
pub fn clamp_magnitude(v: Vec3, max: f32) -> Vec3 {
    let length = length_f64(v);
    if length > max as f64 {
        let target = max as f64 * (1.0 - f32::EPSILON as f64);
        scale_f64(v, target / length)
    } else {
        v
    }
}

// Reflective clipping to ±(boundary - agent_radius) on every axis
pub fn fixed_boundary(pos: Vec3, boundary: f32, agent_radius: f32) -> Vec3 {
    let limit = boundary - agent_radius;
    vec3(
        pos.x.clamp(-limit, limit),
        pos.y.clamp(-limit, limit),
        pos.z.clamp(-limit, limit),
    )
}

#[inline]
fn wrap_axis(value: f32, boundary: f32) -> f32 {
    // In-range values pass through untouched so the policy is idempotent
    if (-boundary..=boundary).contains(&value) {
        return value;
    }
    (value + boundary).rem_euclid(2.0 * boundary) - boundary
}

// Wrap every axis back into [-boundary, boundary]
pub fn periodic_boundary(pos: Vec3, boundary: f32) -> Vec3 {
    vec3(
        wrap_axis(pos.x, boundary),
        wrap_axis(pos.y, boundary),
        wrap_axis(pos.z, boundary),
    )
}

pub fn apply_boundary(policy: BoundaryPolicy, pos: Vec3, boundary: f32, agent_radius: f32) -> Vec3 {
    match policy {
        BoundaryPolicy::Fixed => fixed_boundary(pos, boundary, agent_radius),
        BoundaryPolicy::Periodic => periodic_boundary(pos, boundary),
    }
}
