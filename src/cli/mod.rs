//! CLI argument parsing and usage text

pub mod args;
pub mod usage;

// Re-exports
pub use args::{Args, LogFormat};
pub use usage::usage;
