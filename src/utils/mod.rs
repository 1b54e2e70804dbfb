//! Shared helpers for terminal output, tool detection and project layout

pub mod paths;
pub mod terminal;
pub mod tools;
