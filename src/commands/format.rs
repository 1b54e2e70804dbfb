//! Format command implementation

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use walkdir::WalkDir;

use crate::config::{DevConfig, Environment};
use crate::exec::{run_checked, CommandLine, Executor};
use crate::utils::paths::{self, NATIVE_DIR};
use crate::utils::{terminal, tools};

/// Format the rust-apt code with 'cargo fmt' and 'clang-format'
#[derive(Args, Debug)]
pub struct FormatCommand {}

impl FormatCommand {
    /// Execute the format command
    pub fn execute(
        self,
        env: &Environment,
        config: &DevConfig,
        exec: &mut dyn Executor,
    ) -> Result<()> {
        tools::require_tool("cargo", "formatting Rust code", &env.path, &env.project_root)?;
        tools::require_tool("clang-format", "formatting C++ code", &env.path, &env.project_root)?;
        self.run(env, config, exec)
    }

    fn run(&self, env: &Environment, config: &DevConfig, exec: &mut dyn Executor) -> Result<()> {
        // Format rust code.
        run_checked(exec, &CommandLine::parse("cargo +nightly fmt"))?;

        // Format c++ code.
        let sources = find_native_sources(&env.project_root, &config.format.extensions)?;
        if sources.is_empty() {
            terminal::print_warning(&format!(
                "No files found in {}, skipping clang-format",
                NATIVE_DIR
            ));
            return Ok(());
        }

        let files = sources
            .iter()
            .map(|path| path.to_string_lossy().into_owned());
        run_checked(exec, &CommandLine::parse("clang-format -i").args(files))?;

        terminal::print_success(&format!("Formatted Rust sources and {} C++ files", sources.len()));
        Ok(())
    }
}

/// Files directly inside the native sources directory, sorted by name
///
/// Paths are relative to `project_root`. A non-empty `extensions` keeps only
/// files with one of those extensions.
pub fn find_native_sources(project_root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let native_dir = paths::native_dir(project_root);
    let mut sources = Vec::new();

    for entry in WalkDir::new(&native_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read {}", native_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !extensions.is_empty() {
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.iter().any(|wanted| wanted == ext))
                .unwrap_or(false);
            if !matches {
                continue;
            }
        }

        let relative = path.strip_prefix(project_root).unwrap_or(path);
        sources.push(relative.to_path_buf());
    }

    Ok(sources)
}
