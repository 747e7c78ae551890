// ECS components for the island scene

use bevy_ecs::prelude::*;
use glam::Vec3;

/// Position of an entity in 3D space
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Transform {
    pub position: Vec3,
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position }
    }
}

/// A navigable island. `waypoint` indexes the navigator's waypoint table.
#[derive(Component, Debug, Clone)]
pub struct Island {
    pub name: String,
    pub waypoint: usize,
    /// Rest position; picking and waypoint matching always use this, never the bobbing position.
    pub anchor: Vec3,
}

/// Gentle vertical bobbing around a rest height.
#[derive(Component, Debug, Clone, Copy)]
pub struct Float {
    pub base_y: f32,
    /// Peak offset in world units
    pub amplitude: f32,
    /// Radians per second
    pub speed: f32,
    /// Phase offset in radians, so islands do not bob in lockstep
    pub phase: f32,
}

impl Float {
    pub fn offset_at(&self, elapsed_secs: f32) -> f32 {
        (elapsed_secs * self.speed + self.phase).sin() * self.amplitude
    }
}
