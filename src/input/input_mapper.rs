//! Input mapping from raw events to semantic actions
//!
//! Keys map to one-shot actions; walking keys belong to
//! [`PlayerController`](crate::input::PlayerController). Mouse buttons map
//! to hands: the secondary (right) button drives the left hand and the
//! primary (left) button drives the right hand. [`InputState`] collects a frame's worth of edges and mouse
//! motion and hands them to the session as a [`FrameInput`].

use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

use woodcut_core::{FrameInput, GripInput, Hand, Vec3, Viewpoint};

/// Actions triggered by special input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Switch crosshair / screen-space aiming (Tab)
    ToggleAimMode,
    /// Pause or resume (Escape)
    TogglePause,
    /// Release hands and clear guards (Backspace)
    FailsafeReset,
    /// Toggle fullscreen mode (F11)
    ToggleFullscreen,
}

/// Maps raw input events to semantic actions
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Only presses produce actions.
    pub fn map_keyboard(key: KeyCode, state: ElementState) -> Option<InputAction> {
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::Tab => Some(InputAction::ToggleAimMode),
            KeyCode::Escape => Some(InputAction::TogglePause),
            KeyCode::Backspace => Some(InputAction::FailsafeReset),
            KeyCode::F11 => Some(InputAction::ToggleFullscreen),
            _ => None,
        }
    }

    /// Which hand a mouse button drives
    pub fn map_mouse_button(button: MouseButton) -> Option<Hand> {
        match button {
            MouseButton::Right => Some(Hand::Left),
            MouseButton::Left => Some(Hand::Right),
            _ => None,
        }
    }
}

/// Input accumulated between two ticks
#[derive(Debug, Default)]
pub struct InputState {
    grip: GripInput,
    toggle_aim_mode: bool,
    toggle_pause: bool,
    failsafe_reset: bool,
    mouse_delta: (f64, f64),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a semantic action; returns false for actions the session does not consume
    pub fn apply_action(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::ToggleAimMode => self.toggle_aim_mode = true,
            InputAction::TogglePause => self.toggle_pause = true,
            InputAction::FailsafeReset => self.failsafe_reset = true,
            InputAction::ToggleFullscreen => return false,
        }
        true
    }

    /// Record a mouse button edge
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let Some(hand) = InputMapper::map_mouse_button(button) else {
            return;
        };
        let pressed = state == ElementState::Pressed;
        match (hand, pressed) {
            (Hand::Left, true) => self.grip.left_pressed = true,
            (Hand::Left, false) => self.grip.left_released = true,
            (Hand::Right, true) => self.grip.right_pressed = true,
            (Hand::Right, false) => self.grip.right_released = true,
        }
    }

    /// Accumulate raw mouse motion
    pub fn process_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    /// Build this frame's session input and reset the accumulated edges
    ///
    /// `mouse_scale` converts raw motion to crosshair units.
    pub fn take_frame(
        &mut self,
        mouse_scale: f32,
        viewpoint: Viewpoint,
        hand_targets: [Vec3; 2],
        player_position: Vec3,
    ) -> FrameInput {
        let (dx, dy) = std::mem::take(&mut self.mouse_delta);
        let look_delta = (dx != 0.0 || dy != 0.0).then(|| (dx as f32 * mouse_scale, dy as f32 * mouse_scale));

        let mut grip = std::mem::take(&mut self.grip);
        grip.left_target = Some(hand_targets[0]);
        grip.right_target = Some(hand_targets[1]);

        FrameInput {
            grip,
            toggle_aim_mode: std::mem::take(&mut self.toggle_aim_mode),
            toggle_pause: std::mem::take(&mut self.toggle_pause),
            failsafe_reset: std::mem::take(&mut self.failsafe_reset),
            viewpoint: Some(viewpoint),
            look_delta,
            player_position: Some(player_position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Viewpoint {
        Viewpoint::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::Tab, ElementState::Pressed),
            Some(InputAction::ToggleAimMode)
        );
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::Escape, ElementState::Pressed),
            Some(InputAction::TogglePause)
        );
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::Backspace, ElementState::Pressed),
            Some(InputAction::FailsafeReset)
        );
    }

    #[test]
    fn test_key_release_ignored() {
        assert_eq!(InputMapper::map_keyboard(KeyCode::Tab, ElementState::Released), None);
    }

    #[test]
    fn test_movement_keys_are_not_actions() {
        let mut controller = crate::input::PlayerController::new();
        for key in [KeyCode::KeyW, KeyCode::KeyA, KeyCode::KeyS, KeyCode::KeyD, KeyCode::Space, KeyCode::KeyC] {
            assert_eq!(InputMapper::map_keyboard(key, ElementState::Pressed), None, "Key {:?} should not be an action", key);
            assert!(controller.process_keyboard(key, ElementState::Pressed), "Key {:?} should move the player", key);
        }
    }

    #[test]
    fn test_mouse_buttons_cross_over() {
        assert_eq!(InputMapper::map_mouse_button(MouseButton::Right), Some(Hand::Left));
        assert_eq!(InputMapper::map_mouse_button(MouseButton::Left), Some(Hand::Right));
        assert_eq!(InputMapper::map_mouse_button(MouseButton::Middle), None);
    }

    #[test]
    fn test_frame_collects_and_resets_edges() {
        let mut input = InputState::new();
        input.process_mouse_button(MouseButton::Right, ElementState::Pressed);
        input.process_mouse_button(MouseButton::Left, ElementState::Released);
        input.apply_action(InputAction::ToggleAimMode);
        input.process_mouse_motion(10.0, -4.0);

        let targets = [Vec3::new(-0.2, 1.0, -0.5), Vec3::new(0.2, 1.0, -0.5)];
        let frame = input.take_frame(0.01, view(), targets, Vec3::ZERO);
        assert!(frame.grip.left_pressed);
        assert!(frame.grip.right_released);
        assert!(!frame.grip.right_pressed);
        assert!(frame.toggle_aim_mode);
        assert_eq!(frame.grip.left_target, Some(targets[0]));
        let (dx, dy) = frame.look_delta.unwrap();
        assert!((dx - 0.1).abs() < 1e-6);
        assert!((dy + 0.04).abs() < 1e-6);

        let next = input.take_frame(0.01, view(), targets, Vec3::ZERO);
        assert!(!next.grip.left_pressed);
        assert!(!next.toggle_aim_mode);
        assert!(next.look_delta.is_none());
    }

    #[test]
    fn test_fullscreen_not_forwarded() {
        let mut input = InputState::new();
        assert!(!input.apply_action(InputAction::ToggleFullscreen));
        assert!(input.apply_action(InputAction::FailsafeReset));
        assert!(input.take_frame(1.0, view(), [Vec3::ZERO; 2], Vec3::ZERO).failsafe_reset);
    }
}
