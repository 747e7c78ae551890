// Waypoint navigation: click an island, fly the camera there.
//
// The navigator owns a table of waypoints and at most one in-flight transition.
// A transition snapshots the camera's eye and look-at target, then every frame
// eases both toward the waypoint using elapsed wall-clock time, so the flight
// takes the same time at any frame rate.
//
// Requests are fire-and-forget: a move while another is in flight, or to an
// anchor no waypoint matches, is dropped. There is no cancellation.

use std::time::Duration;
use glam::Vec3;
use super::camera::CameraRig;
use super::easing::{ease_in_out_cubic, progress};
use super::waypoint::{Waypoint, WaypointTable, anchors_match};

pub const DEFAULT_TRAVEL_DURATION: Duration = Duration::from_millis(2000);

/// What `move_to` did with a request. Informational; both non-`Started` cases are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Started,
    /// A transition is already in flight.
    Busy,
    /// No waypoint anchor within tolerance.
    NoWaypoint,
}

/// An in-flight camera flight.
#[derive(Debug, Clone, Copy)]
struct Transition {
    waypoint: usize,
    start_time: Duration,
    duration: Duration,
    start_eye: Vec3,
    start_target: Vec3,
}

impl Transition {
    fn progress(&self, now: Duration) -> f32 {
        progress(now.saturating_sub(self.start_time), self.duration)
    }
}

pub struct WaypointNavigator {
    waypoints: WaypointTable,
    transition: Option<Transition>,
    /// Waypoint the last completed transition arrived at.
    current: Option<usize>,
}

impl WaypointNavigator {
    pub fn new(waypoints: WaypointTable) -> Self {
        Self { waypoints, transition: None, current: None }
    }

    pub fn waypoints(&self) -> &WaypointTable { &self.waypoints }

    pub fn is_animating(&self) -> bool { self.transition.is_some() }

    /// True once a transition has finished at a waypoint whose anchor matches `position`.
    pub fn is_at_waypoint(&self, position: Vec3) -> bool {
        self.current_waypoint()
            .is_some_and(|w| anchors_match(w.anchor, position))
    }

    /// Waypoint the camera rests at, if it is not travelling.
    pub fn current_waypoint(&self) -> Option<&Waypoint> {
        self.current.and_then(|i| self.waypoints.get(i))
    }

    /// Destination of the flight in progress.
    pub fn destination(&self) -> Option<&Waypoint> {
        self.transition.and_then(|t| self.waypoints.get(t.waypoint))
    }

    /// Linear progress of the flight in progress, in [0, 1].
    pub fn progress(&self, now: Duration) -> Option<f32> {
        self.transition.map(|t| t.progress(now))
    }

    /// Start flying toward the waypoint whose anchor matches `anchor`.
    ///
    /// `now` is the host clock (any fixed epoch); the same clock must drive `update`.
    pub fn move_to<C: CameraRig + ?Sized>(
        &mut self,
        anchor: Vec3,
        duration: Duration,
        now: Duration,
        camera: &C,
    ) -> MoveOutcome {
        if self.transition.is_some() {
            log::debug!("ignoring move to {anchor:?}: already travelling");
            return MoveOutcome::Busy;
        }
        let Some(index) = self.waypoints.resolve_index(anchor) else {
            log::debug!("ignoring move to {anchor:?}: no waypoint there");
            return MoveOutcome::NoWaypoint;
        };

        self.transition = Some(Transition {
            waypoint: index,
            start_time: now,
            duration,
            start_eye: camera.eye(),
            start_target: camera.target(),
        });
        // Leaving; no longer "at" the previous waypoint.
        self.current = None;

        if let Some(w) = self.waypoints.get(index) {
            log::debug!("travelling to '{}' over {} ms", w.name, duration.as_millis());
        }
        MoveOutcome::Started
    }

    /// `move_to` by waypoint name.
    pub fn move_to_named<C: CameraRig + ?Sized>(
        &mut self,
        name: &str,
        duration: Duration,
        now: Duration,
        camera: &C,
    ) -> MoveOutcome {
        match self.waypoints.by_name(name) {
            Some(w) => {
                let anchor = w.anchor;
                self.move_to(anchor, duration, now, camera)
            }
            None => MoveOutcome::NoWaypoint,
        }
    }

    /// Advance the flight. Call once per frame.
    ///
    /// Returns the eased progress while a flight was in progress this frame,
    /// `None` when idle. The frame that reaches 1.0 places the camera exactly
    /// on the waypoint and ends the flight.
    pub fn update<C: CameraRig + ?Sized>(&mut self, now: Duration, camera: &mut C) -> Option<f32> {
        let t = self.transition?;
        let Some(dest) = self.waypoints.get(t.waypoint) else {
            self.transition = None;
            return None;
        };

        let p = t.progress(now);
        if p >= 1.0 {
            camera.set_eye(dest.camera_position);
            camera.set_target(dest.look_at);
            log::info!("arrived at '{}'", dest.name);
            self.transition = None;
            self.current = Some(t.waypoint);
            return Some(1.0);
        }

        let eased = ease_in_out_cubic(p);
        camera.set_eye(t.start_eye.lerp(dest.camera_position, eased));
        camera.set_target(t.start_target.lerp(dest.look_at, eased));
        Some(eased)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[derive(Default)]
    struct TestCamera {
        eye: Vec3,
        target: Vec3,
    }

    impl CameraRig for TestCamera {
        fn eye(&self) -> Vec3 { self.eye }
        fn set_eye(&mut self, eye: Vec3) { self.eye = eye; }
        fn target(&self) -> Vec3 { self.target }
        fn set_target(&mut self, target: Vec3) { self.target = target; }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn navigator() -> WaypointNavigator {
        let mut table = WaypointTable::new();
        table.push(Waypoint {
            name: "food".into(),
            anchor: Vec3::new(10.0, 0.0, 0.0),
            camera_position: Vec3::new(10.0, 20.0, 30.0),
            look_at: Vec3::new(10.0, 0.0, 0.0),
        });
        table.push(Waypoint {
            name: "venue".into(),
            anchor: Vec3::new(-40.0, 0.0, 5.0),
            camera_position: Vec3::new(-40.0, 18.0, 35.0),
            look_at: Vec3::new(-40.0, 2.0, 5.0),
        });
        WaypointNavigator::new(table)
    }

    fn camera() -> TestCamera {
        TestCamera { eye: Vec3::new(0.0, 50.0, 100.0), target: Vec3::ZERO }
    }

    fn strictly_between(v: f32, a: f32, b: f32) -> bool {
        v > a.min(b) && v < a.max(b)
    }

    #[test]
    fn not_at_any_waypoint_before_first_trip() {
        let nav = navigator();
        assert!(!nav.is_at_waypoint(Vec3::new(10.0, 0.0, 0.0)));
        assert!(!nav.is_animating());
        assert!(nav.current_waypoint().is_none());
    }

    #[test]
    fn arrives_at_waypoint_after_duration() {
        let mut nav = navigator();
        let mut cam = camera();
        let anchor = Vec3::new(10.0, 0.0, 0.0);

        assert_eq!(nav.move_to(anchor, ms(1000), ms(0), &cam), MoveOutcome::Started);
        assert!(nav.is_animating());

        nav.update(ms(500), &mut cam);
        let start = camera().eye;
        let end = Vec3::new(10.0, 20.0, 30.0);
        assert!(strictly_between(cam.eye.x, start.x, end.x));
        assert!(strictly_between(cam.eye.y, start.y, end.y));
        assert!(strictly_between(cam.eye.z, start.z, end.z));
        assert!(!nav.is_at_waypoint(anchor));

        assert_eq!(nav.update(ms(1000), &mut cam), Some(1.0));
        assert!(cam.eye.abs_diff_eq(end, EPSILON));
        assert!(cam.target.abs_diff_eq(anchor, EPSILON));
        assert!(nav.is_at_waypoint(anchor));
        assert!(!nav.is_animating());
        assert_eq!(nav.update(ms(1100), &mut cam), None);
    }

    #[test]
    fn motion_is_eased_not_linear() {
        let mut nav = navigator();
        let mut cam = camera();
        let start = cam.eye;
        let end = Vec3::new(10.0, 20.0, 30.0);
        nav.move_to(Vec3::new(10.0, 0.0, 0.0), ms(1000), ms(0), &cam);

        let eased = nav.update(ms(250), &mut cam).unwrap();
        assert!((eased - 0.0625).abs() < 1e-6);
        let linear_quarter = start.lerp(end, 0.25);
        assert!(cam.eye.abs_diff_eq(start.lerp(end, 0.0625), EPSILON));
        assert!(cam.eye.distance(start) < linear_quarter.distance(start));
    }

    #[test]
    fn look_at_target_is_pushed_into_camera_each_frame() {
        let mut nav = navigator();
        let mut cam = camera();
        nav.move_to(Vec3::new(-40.0, 0.0, 5.0), ms(2000), ms(0), &cam);
        nav.update(ms(1000), &mut cam);
        assert!(cam.target.abs_diff_eq(Vec3::new(-20.0, 1.0, 2.5), EPSILON));
    }

    #[test]
    fn move_while_travelling_is_ignored() {
        let mut nav = navigator();
        let mut cam = camera();
        nav.move_to(Vec3::new(10.0, 0.0, 0.0), ms(1000), ms(0), &cam);
        nav.update(ms(300), &mut cam);

        let outcome = nav.move_to(Vec3::new(-40.0, 0.0, 5.0), ms(1000), ms(300), &cam);
        assert_eq!(outcome, MoveOutcome::Busy);
        assert_eq!(nav.destination().map(|w| w.name.as_str()), Some("food"));

        nav.update(ms(1000), &mut cam);
        assert!(nav.is_at_waypoint(Vec3::new(10.0, 0.0, 0.0)));
        assert!(!nav.is_at_waypoint(Vec3::new(-40.0, 0.0, 5.0)));
    }

    #[test]
    fn unknown_anchor_changes_nothing() {
        let mut nav = navigator();
        let mut cam = camera();
        nav.move_to(Vec3::new(10.0, 0.0, 0.0), ms(100), ms(0), &cam);
        nav.update(ms(100), &mut cam);
        assert!(nav.is_at_waypoint(Vec3::new(10.0, 0.0, 0.0)));

        let eye = cam.eye;
        assert_eq!(nav.move_to(Vec3::new(10.5, 0.0, 0.0), ms(100), ms(200), &cam), MoveOutcome::NoWaypoint);
        assert!(!nav.is_animating());
        assert!(nav.is_at_waypoint(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(nav.update(ms(300), &mut cam), None);
        assert_eq!(cam.eye, eye);
    }

    #[test]
    fn result_depends_on_elapsed_time_not_frame_count() {
        let mut few = navigator();
        let mut many = navigator();
        let mut cam_few = camera();
        let mut cam_many = camera();
        let anchor = Vec3::new(-40.0, 0.0, 5.0);
        few.move_to(anchor, ms(1000), ms(0), &cam_few);
        many.move_to(anchor, ms(1000), ms(0), &cam_many);

        few.update(ms(700), &mut cam_few);
        for t in (16..=700).step_by(16) {
            many.update(ms(t), &mut cam_many);
        }
        many.update(ms(700), &mut cam_many);
        assert!(cam_few.eye.abs_diff_eq(cam_many.eye, EPSILON));
    }

    #[test]
    fn zero_duration_arrives_on_next_update() {
        let mut nav = navigator();
        let mut cam = camera();
        nav.move_to_named("venue", Duration::ZERO, ms(0), &cam);
        assert_eq!(nav.update(ms(0), &mut cam), Some(1.0));
        assert!(nav.is_at_waypoint(Vec3::new(-40.05, 0.0, 5.05)));
        assert_eq!(cam.eye, Vec3::new(-40.0, 18.0, 35.0));
    }

    #[test]
    fn starting_a_new_trip_leaves_the_old_waypoint() {
        let mut nav = navigator();
        let mut cam = camera();
        nav.move_to_named("food", ms(10), ms(0), &cam);
        nav.update(ms(10), &mut cam);
        assert_eq!(nav.current_waypoint().map(|w| w.name.as_str()), Some("food"));

        nav.move_to_named("venue", ms(10), ms(20), &cam);
        assert!(!nav.is_at_waypoint(Vec3::new(10.0, 0.0, 0.0)));
        assert!(nav.progress(ms(25)).is_some_and(|p| (p - 0.5).abs() < 1e-6));
        assert_eq!(nav.move_to_named("bar", ms(10), ms(25), &cam), MoveOutcome::NoWaypoint);
    }
}
