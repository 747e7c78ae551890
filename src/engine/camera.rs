// Orbit camera for the island scene
//
// Camera model:
//   - An eye position and a look-at target anywhere in 3D
//   - Left-drag orbits the eye around the target (yaw + clamped pitch)
//   - Mouse wheel zooms in/out along the look vector
//   - Waypoint travel moves eye and target directly through `CameraRig`

use glam::{Mat4, Vec3};
use super::input::InputState;
use super::picking::Ray;

/// The camera surface the waypoint navigator drives: an eye and the point it orbits / looks at.
pub trait CameraRig {
    fn eye(&self) -> Vec3;
    fn set_eye(&mut self, eye: Vec3);
    fn target(&self) -> Vec3;
    /// Re-aim the camera. Later orbit input pivots around this point.
    fn set_target(&mut self, target: Vec3);
}

pub struct OrbitCamera {
    /// World-space eye position. Use eye() / set_eye() to access.
    eye: Vec3,
    /// Point the camera looks at and orbits around.
    target: Vec3,

    pub min_distance: f32,
    pub max_distance: f32,

    /// Pitch limits in radians (0 = level with the target, PI/2 = straight down)
    pub min_pitch: f32,
    pub max_pitch: f32,

    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,

    /// Orbit rotation in radians per dragged pixel
    pub orbit_speed: f32,

    /// Zoom change (in distance units) per scroll line
    pub zoom_speed: f32,
}

impl OrbitCamera {
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            min_distance: 8.0,
            max_distance: 120.0,
            min_pitch: 5.0_f32.to_radians(),
            max_pitch: 85.0_f32.to_radians(),
            fov: 45.0_f32.to_radians(),
            near: 0.1,
            far: 500.0,
            orbit_speed: 0.005,
            zoom_speed: 2.5,
        }
    }

    /// Apply drag-to-orbit and scroll-to-zoom. Call once per frame before rendering.
    ///
    /// Input is ignored while `locked` (the navigator owns the camera during travel).
    pub fn update(&mut self, input: &InputState, locked: bool) {
        if locked {
            return;
        }
        if input.is_dragging() {
            self.orbit(input.mouse_delta.0, input.mouse_delta.1);
        }
        if input.scroll_delta != 0.0 {
            self.zoom(input.scroll_delta);
        }
    }

    /// Rotate the eye around the target by a pixel delta.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let (yaw, pitch, distance) = self.spherical();
        let yaw = yaw - dx * self.orbit_speed;
        let pitch = (pitch + dy * self.orbit_speed).clamp(self.min_pitch, self.max_pitch);
        self.eye = self.target + eye_offset(yaw, pitch, distance);
    }

    /// Scroll up (positive lines) moves the eye toward the target.
    pub fn zoom(&mut self, lines: f32) {
        let (yaw, pitch, distance) = self.spherical();
        let distance = (distance - lines * self.zoom_speed).clamp(self.min_distance, self.max_distance);
        self.eye = self.target + eye_offset(yaw, pitch, distance);
    }

    pub fn distance(&self) -> f32 { self.eye.distance(self.target) }

    /// View matrix: looks from the eye toward the target.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Perspective projection matrix.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix ready to upload to the GPU.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// World-space ray through a cursor position given in physical pixels.
    pub fn screen_ray(&self, cursor: (f32, f32), viewport: (u32, u32)) -> Ray {
        let (w, h) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
        let ndc_x = 2.0 * cursor.0 / w - 1.0;
        let ndc_y = 1.0 - 2.0 * cursor.1 / h;
        let inv = self.view_projection(w / h).inverse();
        let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        Ray::new(near, far - near)
    }

    /// (yaw, pitch, distance) of the eye relative to the target.
    /// yaw = 0 puts the eye on +Z of the target.
    fn spherical(&self) -> (f32, f32, f32) {
        let offset = self.eye - self.target;
        let distance = offset.length().max(f32::EPSILON);
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        (yaw, pitch, distance)
    }
}

impl CameraRig for OrbitCamera {
    fn eye(&self) -> Vec3 { self.eye }
    fn set_eye(&mut self, eye: Vec3) { self.eye = eye; }
    fn target(&self) -> Vec3 { self.target }
    fn set_target(&mut self, target: Vec3) { self.target = target; }
}

// Offset from target to eye for the given yaw, pitch and distance.
fn eye_offset(yaw: f32, pitch: f32, distance: f32) -> Vec3 {
    Vec3::new(
        yaw.sin() * pitch.cos() * distance,
        pitch.sin() * distance,
        yaw.cos() * pitch.cos() * distance,
    )
}
