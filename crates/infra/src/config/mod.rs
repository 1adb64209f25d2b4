//! Configuration loading
//!
//! Builds a [`ingestlink_domain::ClientConfig`] from environment variables
//! or TOML/JSON files.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
