// Vertex jitter for low-poly procedural geometry.
//
// Breaks up the regularity of generated meshes by nudging every vertex a small
// random amount. Vertices that sit on the same spot (a corner shared by several
// triangles of a flat-shaded soup) are grouped by a quantized position key and
// all receive the same offset, so the surface stays closed.

use std::collections::HashMap;
use glam::Vec3;
use rand::Rng;
use super::mesh::PositionBuffer;

/// Key cells per world unit. Positions within the same 1/100 cell share a key.
pub const JITTER_KEY_SCALE: f32 = 100.0;

/// Integer-quantized position used to group coincident vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantizedKey(pub i32, pub i32, pub i32);

impl QuantizedKey {
    /// Floors each coordinate into its 1/100 cell, so 1.004 and 1.006 both land in cell 100.
    ///
    /// Cell edges are hard: two positions one f32 step apart can straddle an
    /// exact hundredth (0.29999998 lands in cell 29, 0.3 in cell 30). Only
    /// bit-identical positions are guaranteed to share a key.
    pub fn from_position(p: Vec3) -> Self {
        let q = (p * JITTER_KEY_SCALE).floor();
        Self(q.x as i32, q.y as i32, q.z as i32)
    }
}

/// Displacement per vertex group. Lives for a single `jitter` call.
#[derive(Debug, Default)]
pub struct JitterMap {
    offsets: HashMap<QuantizedKey, Vec3>,
}

impl JitterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset for `key`, drawing a fresh one on first sight.
    pub fn offset_for<R: Rng>(&mut self, key: QuantizedKey, magnitude: f32, rng: &mut R) -> Vec3 {
        *self.offsets.entry(key).or_insert_with(|| random_offset(magnitude, rng))
    }

    pub fn group_count(&self) -> usize { self.offsets.len() }
}

/// Each axis uniform in [-magnitude, +magnitude].
fn random_offset<R: Rng>(magnitude: f32, rng: &mut R) -> Vec3 {
    if magnitude == 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.gen_range(-magnitude..=magnitude),
        rng.gen_range(-magnitude..=magnitude),
        rng.gen_range(-magnitude..=magnitude),
    )
}

/// Displace every vertex of `buffer` in place and flag it for re-upload.
///
/// Returns the number of distinct vertex groups that were moved. An empty
/// buffer returns 0 without being marked dirty. `magnitude = 0.0` walks the
/// buffer as usual and applies zero offsets.
pub fn jitter<B, R>(buffer: &mut B, magnitude: f32, rng: &mut R) -> usize
where
    B: PositionBuffer + ?Sized,
    R: Rng,
{
    if buffer.is_empty() {
        return 0;
    }
    debug_assert!(magnitude >= 0.0, "jitter magnitude must be non-negative, got {magnitude}");
    let magnitude = magnitude.abs();

    let mut map = JitterMap::new();
    for i in 0..buffer.len() {
        let p = buffer.position(i);
        let offset = map.offset_for(QuantizedKey::from_position(p), magnitude, rng);
        buffer.set_position(i, p + offset);
    }
    buffer.mark_positions_dirty();

    log::debug!(
        "jittered {} vertices in {} groups (magnitude {magnitude})",
        buffer.len(),
        map.group_count()
    );
    map.group_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mesh::{FlatPositions, PolyMesh, triangulate_flat};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn nearby_points_in_same_cell_share_offset() {
        let before = [
            Vec3::new(1.004, 0.0, 0.0),
            Vec3::new(1.006, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
        ];
        let mut buf = FlatPositions::from_points(&before);
        let groups = jitter(&mut buf, 0.5, &mut rng());
        assert_eq!(groups, 2);

        let d0 = buf.position(0) - before[0];
        let d1 = buf.position(1) - before[1];
        let d2 = buf.position(2) - before[2];
        assert!((d0 - d1).length() < 1e-5);
        assert!((d0 - d2).length() > 1e-5);
        for d in [d0, d1, d2] {
            assert!(d.abs().max_element() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn zero_magnitude_leaves_positions_unchanged() {
        let points = [Vec3::new(0.3, -2.0, 7.5), Vec3::new(0.3, -2.0, 7.5), Vec3::X];
        let mut buf = FlatPositions::from_points(&points);
        let groups = jitter(&mut buf, 0.0, &mut rng());
        assert_eq!(groups, 2);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(buf.position(i), *p);
        }
        assert!(buf.needs_update());
    }

    #[test]
    fn empty_buffer_is_untouched() {
        let mut buf = FlatPositions::new(Vec::new()).unwrap();
        assert_eq!(jitter(&mut buf, 1.0, &mut rng()), 0);
        assert!(!buf.needs_update());
    }

    #[test]
    fn shared_corners_of_a_soup_move_together() {
        let mut poly = PolyMesh::new();
        let corners = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ];
        for c in corners {
            poly.add_vertex(c);
        }
        poly.add_face(vec![0, 1, 2, 3]);
        let mut soup = triangulate_flat(&poly, [1.0; 3]);
        let original: Vec<Vec3> = (0..soup.len()).map(|i| soup.position(i)).collect();

        assert_eq!(jitter(&mut soup, 0.2, &mut rng()), 4);
        assert!(soup.normals_stale());

        // Every copy of the same original corner must end up at the same place.
        for i in 0..original.len() {
            for j in 0..original.len() {
                if original[i] == original[j] {
                    assert_eq!(soup.position(i), soup.position(j));
                }
            }
        }
    }

    #[test]
    fn same_seed_gives_same_result() {
        let points = [Vec3::ZERO, Vec3::ONE, Vec3::NEG_ONE];
        let mut a = FlatPositions::from_points(&points);
        let mut b = FlatPositions::from_points(&points);
        jitter(&mut a, 0.3, &mut rng());
        jitter(&mut b, 0.3, &mut rng());
        assert_eq!(a.coords(), b.coords());
    }

    #[test]
    fn equal_keys_get_equal_displacement_for_random_buffers() {
        for seed in 0..64 {
            let mut sampler = StdRng::seed_from_u64(seed);
            let distinct: Vec<Vec3> = (0..sampler.gen_range(1..24))
                .map(|_| {
                    Vec3::new(
                        sampler.gen_range(-10.0..10.0),
                        sampler.gen_range(-10.0..10.0),
                        sampler.gen_range(-10.0..10.0),
                    )
                })
                .collect();
            // Random copies, plus neighbours a little way off that may or may not share a cell.
            let points: Vec<Vec3> = (0..sampler.gen_range(1..96))
                .map(|_| {
                    let p = distinct[sampler.gen_range(0..distinct.len())];
                    if sampler.gen_bool(0.25) { p + Vec3::splat(sampler.gen_range(0.0..0.02)) } else { p }
                })
                .collect();

            let mut buf = FlatPositions::from_points(&points);
            let groups = jitter(&mut buf, 0.25, &mut StdRng::seed_from_u64(seed + 1000));

            let keys: Vec<QuantizedKey> = points.iter().map(|p| QuantizedKey::from_position(*p)).collect();
            let unique: std::collections::HashSet<_> = keys.iter().collect();
            assert_eq!(groups, unique.len(), "seed {seed}");

            for i in 0..points.len() {
                let di = buf.position(i) - points[i];
                assert!(di.abs().max_element() <= 0.25 + 1e-5, "seed {seed}");
                for j in i + 1..points.len() {
                    if points[i] == points[j] {
                        assert_eq!(buf.position(i), buf.position(j), "seed {seed}");
                    }
                    if keys[i] == keys[j] {
                        let dj = buf.position(j) - points[j];
                        assert!((di - dj).length() < 1e-5, "seed {seed}: {i} and {j} share a key");
                    }
                }
            }
        }
    }

    #[test]
    fn exact_hundredths_split_from_their_float_neighbour() {
        let at = Vec3::new(0.3, 0.0, 0.0);
        let below = Vec3::new(f32::from_bits(0.3_f32.to_bits() - 1), 0.0, 0.0);
        assert_eq!(QuantizedKey::from_position(at), QuantizedKey(30, 0, 0));
        assert_eq!(QuantizedKey::from_position(below), QuantizedKey(29, 0, 0));
    }

    #[test]
    fn key_separates_distinct_cells() {
        assert_eq!(
            QuantizedKey::from_position(Vec3::new(1.004, 0.0, 0.0)),
            QuantizedKey::from_position(Vec3::new(1.006, 0.0, 0.0)),
        );
        assert_ne!(
            QuantizedKey::from_position(Vec3::new(1.004, 0.0, 0.0)),
            QuantizedKey::from_position(Vec3::new(1.014, 0.0, 0.0)),
        );
        assert_eq!(
            QuantizedKey::from_position(Vec3::new(-0.004, 0.0, 0.0)),
            QuantizedKey(-1, 0, 0),
        );
    }
}
