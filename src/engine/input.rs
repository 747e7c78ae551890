// Input state tracking for keyboard and mouse
// Abstracts winit events into a queryable per-frame snapshot, and tells a
// click (travel to an island) apart from a drag (orbit the camera).

use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// A press and release further apart than this (in pixels) is a drag, not a click.
pub const CLICK_SLOP_PX: f32 = 5.0;

#[derive(Default)]
pub struct InputState {
    // Keyboard
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    // Mouse
    pub mouse_position: (f32, f32),
    /// Cursor movement accumulated this frame, reset in end_frame()
    pub mouse_delta: (f32, f32),
    left_held: bool,
    press_position: (f32, f32),
    // Furthest the cursor got from press_position during the current press
    press_travel: f32,
    pending_click: Option<(f32, f32)>,

    // Scroll: accumulated vertical scroll this frame, reset in end_frame()
    pub scroll_delta: f32,

    pub window_size: (u32, u32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a winit WindowEvent into the input state.
    /// Call this once per event before the scene's own event handling.
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.key(key, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.left_button(*state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.scroll(y);
            }
            WindowEvent::Resized(size) => {
                self.window_size = (size.width, size.height);
            }
            _ => {}
        }
    }

    /// Feed an event the HUD saw first. When the HUD claimed it, presses,
    /// scroll and clicks are dropped, but releases, cursor motion and resizes
    /// still land so a press that began in the scene always ends.
    pub fn process_event_behind_ui(&mut self, event: &WindowEvent, ui_consumed: bool) {
        if !ui_consumed {
            self.process_event(event);
            return;
        }
        match event {
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Released => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.key(key, false);
                }
            }
            WindowEvent::MouseInput { state: ElementState::Released, button: MouseButton::Left, .. } => {
                self.release_without_click();
            }
            WindowEvent::CursorMoved { .. } | WindowEvent::Resized(_) => self.process_event(event),
            _ => {}
        }
    }

    pub fn key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_held.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else {
            self.keys_held.remove(&key);
        }
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        self.mouse_delta.0 += x - self.mouse_position.0;
        self.mouse_delta.1 += y - self.mouse_position.1;
        self.mouse_position = (x, y);
        if self.left_held {
            let (px, py) = self.press_position;
            let travel = ((x - px).powi(2) + (y - py).powi(2)).sqrt();
            self.press_travel = self.press_travel.max(travel);
        }
    }

    pub fn left_button(&mut self, pressed: bool) {
        if pressed && !self.left_held {
            self.left_held = true;
            self.press_position = self.mouse_position;
            self.press_travel = 0.0;
        } else if !pressed && self.left_held {
            self.left_held = false;
            if self.press_travel <= CLICK_SLOP_PX {
                self.pending_click = Some(self.mouse_position);
            }
        }
    }

    /// End the current press without producing a click (the release landed on the HUD).
    pub fn release_without_click(&mut self) {
        self.left_held = false;
        self.press_travel = 0.0;
    }

    pub fn scroll(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }

    /// Call once per frame after update() and render() have consumed input.
    /// Resets per-frame accumulators.
    pub fn end_frame(&mut self) {
        self.scroll_delta = 0.0;
        self.mouse_delta = (0.0, 0.0);
        self.keys_pressed.clear();
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// True only on the frame the key went down.
    pub fn was_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Left button held and moved past the click slop.
    pub fn is_dragging(&self) -> bool {
        self.left_held && self.press_travel > CLICK_SLOP_PX
    }

    /// Cursor position of a completed click, consumed on read.
    pub fn take_click(&mut self) -> Option<(f32, f32)> {
        self.pending_click.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_press_is_a_click() {
        let mut input = InputState::new();
        input.cursor_moved(100.0, 100.0);
        input.left_button(true);
        input.cursor_moved(102.0, 101.0);
        input.left_button(false);
        assert_eq!(input.take_click(), Some((102.0, 101.0)));
        assert_eq!(input.take_click(), None);
    }

    #[test]
    fn drag_is_not_a_click() {
        let mut input = InputState::new();
        input.cursor_moved(100.0, 100.0);
        input.left_button(true);
        input.cursor_moved(160.0, 100.0);
        assert!(input.is_dragging());
        // Coming back to the start still counts as a drag.
        input.cursor_moved(100.0, 100.0);
        input.left_button(false);
        assert!(!input.is_dragging());
        assert_eq!(input.take_click(), None);
    }

    #[test]
    fn release_over_hud_still_ends_the_drag() {
        let mut input = InputState::new();
        input.cursor_moved(100.0, 100.0);
        input.left_button(true);
        input.cursor_moved(200.0, 100.0);
        assert!(input.is_dragging());

        input.release_without_click();
        input.end_frame();
        input.cursor_moved(300.0, 100.0);
        assert!(!input.is_dragging());
        assert_eq!(input.take_click(), None);

        // The next press in the scene is picked up again.
        input.left_button(true);
        input.left_button(false);
        assert_eq!(input.take_click(), Some((300.0, 100.0)));
    }

    fn left_mouse(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            // SAFETY: test-only placeholder, never handed back to winit.
            device_id: unsafe { winit::event::DeviceId::dummy() },
            state,
            button: MouseButton::Left,
        }
    }

    #[test]
    fn hud_claimed_release_is_still_forwarded() {
        let mut input = InputState::new();
        input.cursor_moved(100.0, 100.0);
        input.process_event_behind_ui(&left_mouse(ElementState::Pressed), false);
        input.cursor_moved(200.0, 100.0);
        assert!(input.is_dragging());

        input.process_event_behind_ui(&left_mouse(ElementState::Released), true);
        input.end_frame();
        input.cursor_moved(300.0, 100.0);
        assert!(!input.is_dragging());
        assert_eq!(input.take_click(), None);

        // A press the HUD claims never starts a drag.
        input.process_event_behind_ui(&left_mouse(ElementState::Pressed), true);
        input.cursor_moved(400.0, 100.0);
        assert!(!input.is_dragging());
    }

    #[test]
    fn mouse_delta_accumulates_until_end_of_frame() {
        let mut input = InputState::new();
        input.cursor_moved(10.0, 10.0);
        input.end_frame();
        input.cursor_moved(15.0, 12.0);
        input.cursor_moved(20.0, 8.0);
        assert_eq!(input.mouse_delta, (10.0, -2.0));
        input.end_frame();
        assert_eq!(input.mouse_delta, (0.0, 0.0));
    }

    #[test]
    fn key_press_edge_lasts_one_frame() {
        let mut input = InputState::new();
        input.key(KeyCode::F3, true);
        assert!(input.was_key_pressed(KeyCode::F3));
        input.end_frame();
        input.key(KeyCode::F3, true); // key repeat
        assert!(!input.was_key_pressed(KeyCode::F3));
        assert!(input.is_key_held(KeyCode::F3));
        input.key(KeyCode::F3, false);
        assert!(!input.is_key_held(KeyCode::F3));
    }

    #[test]
    fn scroll_resets_each_frame() {
        let mut input = InputState::new();
        input.scroll(1.0);
        input.scroll(0.5);
        assert_eq!(input.scroll_delta, 1.5);
        input.end_frame();
        assert_eq!(input.scroll_delta, 0.0);
    }
}
