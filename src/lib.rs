//! multihook — multiplexed git hook management.
//!
//! Replaces git's one-script-per-event hook model with a directory-per-event
//! model: each hook gets a `<hook>.d/` script container (private and/or
//! version-tracked), and the real hook entry point becomes a symlink to one
//! generated dispatcher that runs every registered script and aggregates
//! the outcome.

pub mod cli;
pub mod config;
pub mod error;
pub mod fsops;
pub mod hooks;
pub mod logging;
pub mod registry;
pub mod repo;
