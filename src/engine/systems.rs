// ECS systems for updating the island scene
// Systems operate on entities with specific component combinations

use bevy_ecs::prelude::*;
use super::components::*;

/// Seconds since the scene started, updated by the host each frame.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SceneClock {
    pub elapsed_secs: f32,
}

/// Bob floating entities around their rest height.
pub fn float_system(clock: Res<SceneClock>, mut query: Query<(&mut Transform, &Float)>) {
    for (mut transform, float) in query.iter_mut() {
        transform.position.y = float.base_y + float.offset_at(clock.elapsed_secs);
    }
}

/// Render offset per island: how far each island currently sits from its rest anchor.
pub fn island_offsets(world: &mut World) -> Vec<(usize, glam::Vec3)> {
    let mut query = world.query::<(&Island, &Transform)>();
    query
        .iter(world)
        .map(|(island, transform)| (island.waypoint, transform.position - island.anchor))
        .collect()
}
