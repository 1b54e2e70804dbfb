//! Optional `dev.toml` overrides

use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::error::{hints, DevError};
use crate::utils::paths::CONFIG_FILE;

/// Root of `dev.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevConfig {
    pub setup: SetupConfig,
    pub test: TestConfig,
    pub format: FormatConfig,
}

/// `[setup]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupConfig {
    /// Packages installed in addition to the built-in manifest
    pub extra_packages: Vec<String>,
}

/// `[test]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
    /// Integration test target whose executable is run, `tests/<target>.rs`
    pub target: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            target: "tests".to_string(),
        }
    }
}

/// `[format]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Restrict clang-format to these extensions; empty means every file
    pub extensions: Vec<String>,
}

impl DevConfig {
    /// Load `dev.toml` from the project root, falling back to defaults
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            DevError::config_error_with_hint(
                format!("Failed to read {}", path.display()),
                Some(e.into()),
                hints::invalid_dev_toml(),
            )
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            DevError::config_error_with_hint(
                format!("Failed to parse {}: {}", CONFIG_FILE, e.message()),
                Some(e.into()),
                hints::invalid_dev_toml(),
            )
        })?;

        let target = &config.test.target;
        if target.is_empty() || target.contains('/') || target.ends_with(".rs") {
            return Err(DevError::config_error_with_hint(
                format!(
                    "Invalid test target '{}': expected a bare target name like 'tests'",
                    target
                ),
                None,
                hints::invalid_dev_toml(),
            )
            .into());
        }

        Ok(config)
    }
}
