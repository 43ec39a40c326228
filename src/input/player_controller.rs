//! Walking controls
//!
//! Controls:
//! - W/S: Forward/backward
//! - A/D: Strafe left/right
//! - Space: Jump
//! - C: Toggle crouch

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Held movement keys and pending jump/crouch edges
#[derive(Debug, Default)]
pub struct PlayerController {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    jump_pressed: bool,
    crouching: bool,
}

impl PlayerController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process keyboard input; returns true if the key is a movement key
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;

        match key {
            KeyCode::KeyW => self.forward = pressed,
            KeyCode::KeyS => self.backward = pressed,
            KeyCode::KeyA => self.left = pressed,
            KeyCode::KeyD => self.right = pressed,
            KeyCode::Space => {
                if pressed {
                    self.jump_pressed = true;
                }
            }
            KeyCode::KeyC => {
                if pressed {
                    self.crouching = !self.crouching;
                }
            }
            _ => return false,
        }
        true
    }

    /// Drop held keys, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
        self.jump_pressed = false;
    }

    /// Returns true if jump was pressed since the last call, then clears it
    pub fn consume_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_pressed)
    }

    /// (forward, right) in -1.0..=1.0
    pub fn movement_input(&self) -> (f32, f32) {
        let forward = (self.forward as i32 - self.backward as i32) as f32;
        let right = (self.right as i32 - self.left as i32) as f32;
        (forward, right)
    }

    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    pub fn is_crouching(&self) -> bool {
        self.crouching
    }
}
