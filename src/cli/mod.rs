mod commands;
pub mod render;

pub use commands::*;
