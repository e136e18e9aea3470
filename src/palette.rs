/*
 * Palette Module
 *
 * Per-agent display colors. Colors live outside the physical state: the
 * biological variant shades each agent by its latest Notch activation,
 * while the simplified variant keeps a persistent color per agent and
 * repaints both members of every colliding pair.
 */

use nannou::prelude::*;
use rand::Rng;

use crate::params::Variant;

const LOW_NOTCH: (f32, f32, f32) = (0.15, 0.55, 1.0);
const HIGH_NOTCH: (f32, f32, f32) = (1.0, 0.25, 0.2);

fn resting() -> Rgb<u8> {
    rgb(220, 220, 220)
}

pub struct Palette {
    variant: Variant,
    colors: Vec<Rgb<u8>>,
}

impl Palette {
    pub fn new(variant: Variant, agents: usize) -> Self {
        Self {
            variant,
            colors: vec![resting(); agents],
        }
    }

    // Refresh colors from the latest published frame
    pub fn refresh(&mut self, notch: &[f32], collisions: &[(usize, usize)]) {
        if self.colors.len() != notch.len() {
            self.colors.resize(notch.len(), resting());
        }
        match self.variant {
            Variant::Biological => {
                for (color, &level) in self.colors.iter_mut().zip(notch) {
                    *color = notch_shade(level);
                }
            }
            Variant::Simplified => {
                let mut rng = rand::thread_rng();
                for &(a, b) in collisions {
                    self.on_collision(a, b, &mut rng);
                }
            }
        }
    }

    // Both agents of a colliding pair take the same fresh color
    pub fn on_collision<R: Rng + ?Sized>(&mut self, a: usize, b: usize, rng: &mut R) {
        let color = rgb(rng.gen_range(64..=255), rng.gen_range(64..=255), rng.gen_range(64..=255));
        for i in [a, b] {
            if let Some(slot) = self.colors.get_mut(i) {
                *slot = color;
            }
        }
    }

    pub fn color(&self, agent: usize) -> Rgb<u8> {
        self.colors.get(agent).copied().unwrap_or_else(resting)
    }
}

// Linear blend from blue (quiet) to red (fully active)
fn notch_shade(level: f32) -> Rgb<u8> {
    let t = if level.is_finite() { level.clamp(0.0, 1.0) } else { 0.0 };
    let mix = |lo: f32, hi: f32| ((lo + (hi - lo) * t) * 255.0).round() as u8;
    rgb(
        mix(LOW_NOTCH.0, HIGH_NOTCH.0),
        mix(LOW_NOTCH.1, HIGH_NOTCH.1),
        mix(LOW_NOTCH.2, HIGH_NOTCH.2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn biological_shades_follow_notch() {
        let mut palette = Palette::new(Variant::Biological, 2);
        palette.refresh(&[0.0, 1.0], &[]);
        assert!(palette.color(0).blue > palette.color(1).blue);
        assert!(palette.color(1).red > palette.color(0).red);
    }

    #[test]
    fn collision_recolors_both_agents() {
        let mut palette = Palette::new(Variant::Simplified, 3);
        let mut rng = SmallRng::seed_from_u64(1);
        palette.on_collision(0, 2, &mut rng);
        assert_eq!(palette.color(0), palette.color(2));
        assert_eq!(palette.color(1), resting());
    }

    #[test]
    fn simplified_ignores_notch_levels() {
        let mut palette = Palette::new(Variant::Simplified, 2);
        palette.refresh(&[1.0, 0.0], &[]);
        assert_eq!(palette.color(0), resting());
        assert_eq!(palette.color(1), resting());
    }
}
