//! Project layout of the rust-apt checkout

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::DevError;

/// Directory holding the C++ side of the bindings
pub const NATIVE_DIR: &str = "apt-pkg-c";

/// Paths that must exist in the project root
pub const PROJECT_MARKERS: &[&str] = &["Cargo.toml", NATIVE_DIR, "src", "ORIGINAL.MIT"];

/// Optional per-checkout configuration file
pub const CONFIG_FILE: &str = "dev.toml";

/// Verify `root` looks like the rust-apt checkout
///
/// Every missing marker is reported, not just the first one.
pub fn verify_project_root(root: &Path) -> Result<()> {
    let missing: Vec<String> = PROJECT_MARKERS
        .iter()
        .filter(|marker| !root.join(marker).exists())
        .map(|marker| marker.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(DevError::project_structure(missing).into());
    }
    Ok(())
}

/// Get the native sources directory
pub fn native_dir(project_root: &Path) -> PathBuf {
    project_root.join(NATIVE_DIR)
}
