// Click picking against the scene's islands.
//
// Each navigable island is registered once, at scene construction, with its
// rest anchor and a bounding-sphere radius. A click ray is tested against every
// sphere and the nearest hit yields the anchor to hand to the navigator.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// `direction` is normalized here; a zero direction gives a ray that hits nothing.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize_or_zero() }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first intersection with the sphere, if any.
    /// A ray starting inside the sphere hits at t = 0.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        if self.direction == Vec3::ZERO {
            return None;
        }
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        if c <= 0.0 {
            return Some(0.0);
        }
        let discriminant = b * b - c;
        if b > 0.0 || discriminant < 0.0 {
            // Sphere behind the origin, or missed.
            return None;
        }
        Some(-b - discriminant.sqrt())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickTarget {
    pub anchor: Vec3,
    pub radius: f32,
}

/// Explicit table of clickable islands.
#[derive(Debug, Clone, Default)]
pub struct IslandPicker {
    targets: Vec<PickTarget>,
}

impl IslandPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, anchor: Vec3, radius: f32) {
        self.targets.push(PickTarget { anchor, radius });
    }

    /// Anchor of the nearest island the ray hits.
    pub fn pick(&self, ray: &Ray) -> Option<Vec3> {
        self.targets
            .iter()
            .filter_map(|t| ray.intersect_sphere(t.anchor, t.radius).map(|d| (d, t.anchor)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, anchor)| anchor)
    }

    pub fn len(&self) -> usize { self.targets.len() }
    pub fn is_empty(&self) -> bool { self.targets.is_empty() }
}
