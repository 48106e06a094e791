//! Settings file handling

pub mod config;

pub use config::Settings;
