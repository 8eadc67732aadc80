//! Floating background particles.
//!
//! Each section gets a handful of small dots drifting between two seeded
//! points in normalized `[0, 1]²` viewport space, easing back and forth
//! forever. Reseeding by section keeps the pattern fixed for a section.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::fast_math::{ease_in_out, lerp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Shortest one-way drift, in seconds
    pub min_period: f32,
    /// Longest one-way drift, in seconds
    pub max_period: f32,
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 25,
            min_period: 10.0,
            max_period: 20.0,
            seed: 0x9A27,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: usize,
    pub from: [f32; 2],
    pub to: [f32; 2],
    pub period: f32,
}

impl Particle {
    /// Normalized position at `t` seconds: there, back, there, ...
    pub fn position_at(&self, t: f32) -> [f32; 2] {
        if self.period <= 0.0 || !t.is_finite() {
            return self.from;
        }
        let cycle = (t.max(0.0) / self.period).rem_euclid(2.0);
        let leg = if cycle <= 1.0 { cycle } else { 2.0 - cycle };
        let k = ease_in_out(leg);
        [lerp(self.from[0], self.to[0], k), lerp(self.from[1], self.to[1], k)]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleField {
    pub particles: Vec<Particle>,
}

impl ParticleField {
    /// Particles for section `section_index`.
    pub fn for_section(config: &ParticleConfig, section_index: usize) -> Self {
        let seed = config
            .seed
            .wrapping_add((section_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let mut rng = StdRng::seed_from_u64(seed);

        let lo = if config.min_period.is_finite() {
            config.min_period.max(0.0)
        } else {
            0.0
        };
        let hi = if config.max_period.is_finite() {
            config.max_period.max(lo)
        } else {
            lo
        };

        let particles = (0..config.count)
            .map(|id| Particle {
                id,
                from: [rng.gen::<f32>(), rng.gen::<f32>()],
                to: [rng.gen::<f32>(), rng.gen::<f32>()],
                period: rng.gen_range(lo..=hi),
            })
            .collect();
        Self { particles }
    }

    pub fn positions_at(&self, t: f32) -> impl Iterator<Item = [f32; 2]> + '_ {
        self.particles.iter().map(move |p| p.position_at(t))
    }
}
