//! Application systems
//!
//! Modular systems extracted from main.rs for better organization and testability.

mod feedback;
mod simulation;
mod window;

pub use feedback::{LogAudio, LogEffects};
pub use simulation::{SimulationSystem, ViewCamera};
pub use window::{TitleStatus, WindowError, WindowSystem};
