//! Pluggable fractal noise as a grid function.
//!
//! A [`NoiseFunction`] turns [`NoiseSettings`] into a concrete `noise` crate generator;
//! [`NoiseGenerator`] adapts that generator to [`GridFunction`]. The built-in
//! [`NoiseType`] covers fBm, billow and ridged multifractal over Perlin noise.
use glam::Vec2;
use noise::{Billow, Fbm, MultiFractal, NoiseFn, Perlin, RidgedMulti};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::GridFunction;

/// Boxed two-dimensional noise source.
pub type DynNoise = Box<dyn NoiseFn<f64, 2> + Send + Sync>;

/// Parameters handed to a [`NoiseFunction`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseSettings {
    pub frequency: f64,
    pub lacunarity: f64,
    pub persistence: f64,
    pub octaves: usize,
    pub seed: i32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            frequency: 0.021,
            lacunarity: 2.0,
            persistence: 0.5,
            octaves: 6,
            seed: 0,
        }
    }
}

/// Factory for noise sources.
pub trait NoiseFunction: Send + Sync {
    fn create(&self, settings: &NoiseSettings) -> DynNoise;
}

impl<F> NoiseFunction for F
where
    F: Fn(&NoiseSettings) -> DynNoise + Send + Sync,
{
    fn create(&self, settings: &NoiseSettings) -> DynNoise {
        self(settings)
    }
}

/// Built-in fractal noise flavours.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoiseType {
    #[default]
    Perlin,
    Billow,
    Ridged,
}

impl NoiseFunction for NoiseType {
    fn create(&self, s: &NoiseSettings) -> DynNoise {
        let seed = s.seed as u32;
        match self {
            NoiseType::Perlin => Box::new(
                Fbm::<Perlin>::new(seed)
                    .set_frequency(s.frequency)
                    .set_lacunarity(s.lacunarity)
                    .set_persistence(s.persistence)
                    .set_octaves(s.octaves),
            ),
            NoiseType::Billow => Box::new(
                Billow::<Perlin>::new(seed)
                    .set_frequency(s.frequency)
                    .set_lacunarity(s.lacunarity)
                    .set_persistence(s.persistence)
                    .set_octaves(s.octaves),
            ),
            NoiseType::Ridged => Box::new(
                RidgedMulti::<Perlin>::new(seed)
                    .set_frequency(s.frequency)
                    .set_lacunarity(s.lacunarity)
                    .set_persistence(s.persistence)
                    .set_octaves(s.octaves),
            ),
        }
    }
}

/// Grid function backed by a noise source.
pub struct NoiseGenerator {
    noise: DynNoise,
}

impl NoiseGenerator {
    pub fn new(function: &dyn NoiseFunction, settings: &NoiseSettings) -> Self {
        Self {
            noise: function.create(settings),
        }
    }
}

impl GridFunction<f32> for NoiseGenerator {
    #[inline]
    fn value_at(&self, p: Vec2) -> f32 {
        self.noise.get([p.x as f64, p.y as f64]) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(g: &NoiseGenerator) -> Vec<f32> {
        (0..16)
            .map(|i| g.value_at(Vec2::new(i as f32 * 7.3, 11.0)))
            .collect()
    }

    #[test]
    fn same_settings_same_field() {
        for ty in [NoiseType::Perlin, NoiseType::Billow, NoiseType::Ridged] {
            let s = NoiseSettings {
                seed: 42,
                ..Default::default()
            };
            let a = NoiseGenerator::new(&ty, &s);
            let b = NoiseGenerator::new(&ty, &s);
            assert_eq!(sample_row(&a), sample_row(&b));
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = NoiseGenerator::new(
            &NoiseType::Perlin,
            &NoiseSettings {
                seed: 1,
                ..Default::default()
            },
        );
        let b = NoiseGenerator::new(
            &NoiseType::Perlin,
            &NoiseSettings {
                seed: 2,
                ..Default::default()
            },
        );
        assert_ne!(sample_row(&a), sample_row(&b));
    }

    #[test]
    fn values_are_finite() {
        let g = NoiseGenerator::new(&NoiseType::Ridged, &NoiseSettings::default());
        assert!(sample_row(&g).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn closures_plug_in_as_noise_functions() {
        let flat = |_: &NoiseSettings| -> DynNoise { Box::new(noise::Constant::new(0.25)) };
        let g = NoiseGenerator::new(&flat, &NoiseSettings::default());
        assert_eq!(g.value_at(Vec2::new(3.0, 4.0)), 0.25);
    }
}
