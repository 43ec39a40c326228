//! Input handling module
//!
//! Maps raw window events to semantic actions, per-frame grip input and
//! walking controls.

mod input_mapper;
mod player_controller;

pub use input_mapper::{InputMapper, InputAction, InputState};
pub use player_controller::PlayerController;
