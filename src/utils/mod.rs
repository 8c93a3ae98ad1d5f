//! Utility helpers: environment construction for spawned tools.
pub mod env;

pub use env::EnvManager;
