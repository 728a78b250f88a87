//! Configuration system — YAML config, env overrides, CLI flags.

pub mod loader;
pub mod schema;

// Re-export the most commonly used types.
pub use loader::{load_config, CliOverrides};
pub use schema::MultihookConfig;
