use blockworld_common::TerrainConfig;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Terrain column heights, sampled at world block coordinates.
///
/// Values are raw: the streamer clamps them to the build range.
pub trait HeightField {
    fn height(&self, x: f64, z: f64) -> f64;
}

impl<F: Fn(f64, f64) -> f64> HeightField for F {
    fn height(&self, x: f64, z: f64) -> f64 {
        self(x, z)
    }
}

/// Fractal Perlin terrain.
pub struct PerlinHeightField {
    noise: Fbm<Perlin>,
    base_height: f64,
    amplitude: f64,
}

impl PerlinHeightField {
    pub fn new(terrain: &TerrainConfig) -> Self {
        let noise = Fbm::<Perlin>::new(terrain.seed)
            .set_octaves(terrain.octaves)
            .set_frequency(terrain.frequency);
        Self {
            noise,
            base_height: terrain.base_height,
            amplitude: terrain.amplitude,
        }
    }
}

impl HeightField for PerlinHeightField {
    fn height(&self, x: f64, z: f64) -> f64 {
        self.base_height + self.amplitude * self.noise.get([x, z])
    }
}

/// Constant height everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatHeightField(pub f64);

impl HeightField for FlatHeightField {
    fn height(&self, _x: f64, _z: f64) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perlin_is_deterministic_per_seed() {
        let terrain = TerrainConfig::default();
        let a = PerlinHeightField::new(&terrain);
        let b = PerlinHeightField::new(&terrain);
        for (x, z) in [(0.0, 0.0), (17.0, -3.0), (-250.0, 91.0)] {
            assert_eq!(a.height(x, z), b.height(x, z));
        }
    }

    #[test]
    fn perlin_stays_near_base() {
        let terrain = TerrainConfig::default();
        let field = PerlinHeightField::new(&terrain);
        for i in 0..200 {
            let h = field.height(i as f64 * 3.7, i as f64 * -1.3);
            assert!(h.is_finite());
            assert!((h - terrain.base_height).abs() <= terrain.amplitude * 2.0);
        }
    }

    #[test]
    fn closures_are_height_fields() {
        let slope = |x: f64, _z: f64| x / 2.0;
        assert_eq!(slope.height(8.0, 0.0), 4.0);
        assert_eq!(FlatHeightField(3.0).height(-9.0, 4.0), 3.0);
    }
}
