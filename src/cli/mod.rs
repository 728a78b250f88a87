//! Command-line UX: prompts, editor launching, suggestions, styled output.

pub mod ux;

pub use ux::{closest_hooks, edit_file, Prompter};
