//! Woodcutter application layer
//!
//! Configuration, input mapping and the window/simulation systems driving a
//! [`woodcut_core::ChopSession`].

pub mod config;
pub mod input;
pub mod systems;
