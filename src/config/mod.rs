//! Configuration read once at start-up
//!
//! [`Environment`] captures the process environment the tool depends on and
//! [`DevConfig`] holds the optional `dev.toml` overrides. Both are passed
//! down to the commands explicitly.

mod dev_toml;
mod environment;

pub use dev_toml::DevConfig;
pub use environment::Environment;
