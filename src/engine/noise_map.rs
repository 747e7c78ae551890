// Fractal noise height displacement for terrain-like surfaces.

use glam::Vec3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use super::mesh::PositionBuffer;

/// Parameters for vertical noise displacement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseMap {
    /// Peak displacement in world units.
    pub amplitude: f32,
    /// Noise cycles per world unit.
    pub frequency: f32,
    pub octaves: usize,
    pub seed: u32,
}

impl Default for NoiseMap {
    fn default() -> Self {
        Self {
            amplitude: 0.6,
            frequency: 0.35,
            octaves: 3,
            seed: 42,
        }
    }
}

impl NoiseMap {
    fn fbm(&self) -> Fbm<Perlin> {
        Fbm::<Perlin>::new(self.seed)
            .set_octaves(self.octaves.max(1))
            .set_frequency(self.frequency as f64)
    }

    /// Noise height at (x, z), in [-amplitude, amplitude] (roughly).
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        self.fbm().get([x as f64, z as f64]) as f32 * self.amplitude
    }

    /// Raise or lower every vertex by the noise at its XZ position, scaled by `mask`.
    ///
    /// The offset depends on position only, so coincident vertices stay coincident.
    pub fn displace_vertical<B, M>(&self, buffer: &mut B, mask: M)
    where
        B: PositionBuffer + ?Sized,
        M: Fn(Vec3) -> f32,
    {
        if buffer.is_empty() || self.amplitude == 0.0 {
            return;
        }
        let fbm = self.fbm();
        for i in 0..buffer.len() {
            let p = buffer.position(i);
            let weight = mask(p);
            if weight == 0.0 {
                continue;
            }
            let h = fbm.get([p.x as f64, p.z as f64]) as f32 * self.amplitude * weight;
            buffer.set_position(i, p + Vec3::Y * h);
        }
        buffer.mark_positions_dirty();
    }
}
