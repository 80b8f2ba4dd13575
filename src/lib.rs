pub mod anim;
pub mod config;
pub mod geometry;
pub mod gui;
pub mod launch;
mod macros;
