pub mod assets;
pub mod config;
pub mod error;
pub mod geometry;
pub mod glutils;
pub mod logging;
pub mod math;
pub mod render;
pub mod shaders;
pub mod system;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
