// Floating-islands scene engine: jittered low-poly island geometry and
// click-to-travel camera navigation between waypoints.

pub mod engine;
