// Named camera destinations and the lookup table that resolves clicked anchors to them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Per-axis distance within which two anchors are considered the same point.
pub const ANCHOR_TOLERANCE: f32 = 0.1;

/// True if `a` and `b` differ by at most `ANCHOR_TOLERANCE` on every axis.
pub fn anchors_match(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() <= ANCHOR_TOLERANCE
}

/// A place the camera can travel to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    /// Rest position of the object that represents this waypoint (click target).
    pub anchor: Vec3,
    /// Where the camera eye ends up.
    pub camera_position: Vec3,
    /// What the camera looks at on arrival.
    pub look_at: Vec3,
}

/// Waypoints known to the scene, built once at scene construction.
#[derive(Debug, Clone, Default)]
pub struct WaypointTable {
    waypoints: Vec<Waypoint>,
}

impl WaypointTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, waypoint: Waypoint) -> usize {
        self.waypoints.push(waypoint);
        self.waypoints.len() - 1
    }

    /// Index of the waypoint whose anchor matches `anchor`, preferring the nearest.
    pub fn resolve_index(&self, anchor: Vec3) -> Option<usize> {
        self.waypoints
            .iter()
            .enumerate()
            .filter(|(_, w)| anchors_match(w.anchor, anchor))
            .min_by(|(_, a), (_, b)| {
                a.anchor
                    .distance_squared(anchor)
                    .total_cmp(&b.anchor.distance_squared(anchor))
            })
            .map(|(i, _)| i)
    }

    pub fn resolve(&self, anchor: Vec3) -> Option<&Waypoint> {
        self.resolve_index(anchor).map(|i| &self.waypoints[i])
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    pub fn len(&self) -> usize { self.waypoints.len() }
    pub fn is_empty(&self) -> bool { self.waypoints.is_empty() }
}

impl FromIterator<Waypoint> for WaypointTable {
    fn from_iter<I: IntoIterator<Item = Waypoint>>(iter: I) -> Self {
        Self { waypoints: iter.into_iter().collect() }
    }
}
