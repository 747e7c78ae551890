// Engine module - reusable pieces of the floating-islands scene

pub mod camera;
pub mod components;
pub mod config;
pub mod easing;
pub mod hud;
pub mod input;
pub mod island;
pub mod jitter;
pub mod mesh;
pub mod navigation;
pub mod noise_map;
pub mod picking;
pub mod systems;
pub mod waypoint;

// Re-export commonly used items
pub use camera::{CameraRig, OrbitCamera};
pub use components::*;
pub use jitter::jitter;
pub use mesh::{FlatPositions, PositionBuffer, RenderMesh};
pub use navigation::{MoveOutcome, WaypointNavigator};
pub use waypoint::{Waypoint, WaypointTable};
