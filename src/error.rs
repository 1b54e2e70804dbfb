//! Error types and helpers for user-friendly error messages
//!
//! Every failure the tool can report on purpose is a [`DevError`]. Plumbing
//! errors travel as `anyhow::Error` and are downcast in `main` so the
//! process can exit with the right status.

use thiserror::Error;

/// Custom error types with helpful context and suggestions
#[derive(Error, Debug)]
pub enum DevError {
    /// The working directory is not the rust-apt checkout
    #[error("It appears you are not in the 'rust-apt' root directory")]
    ProjectStructure { missing: Vec<String>, hint: String },

    /// Tool/executable not found on PATH
    #[error("Missing tool: {tool} (required for {required_for})")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// An external command exited unsuccessfully
    #[error("Command `{command}` failed with exit code {exit_code}")]
    CommandFailed { command: String, exit_code: i32 },

    /// Package names the package manager has never heard of
    #[error("Can not locate: {}", .names.join(", "))]
    PackagesNotFound { names: Vec<String> },

    /// `cargo test --no-run` did not report the executable we were looking for
    #[error("Test executable not in build output (expected `{marker} (<path>)`)")]
    ExecutableNotFound { marker: String },

    /// Invalid dev.toml
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// The rustup installer could not be fetched
    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },
}

impl DevError {
    /// Create a project structure error listing the missing markers
    pub fn project_structure(missing: Vec<String>) -> Self {
        Self::ProjectStructure {
            missing,
            hint: hints::project_root().to_string(),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    pub fn command_failed(command: impl Into<String>, exit_code: i32) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
        }
    }

    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Exit status the process should terminate with
    ///
    /// Failed commands propagate their own code; everything else is a
    /// generic failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            DevError::CommandFailed { exit_code, .. } if *exit_code != 0 => *exit_code,
            _ => 1,
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        match self {
            DevError::Config { hint: Some(h), .. } => {
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
            }
            DevError::MissingTool { hint, .. } | DevError::ProjectStructure { hint, .. } => {
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
            }
            DevError::ExecutableNotFound { .. } => {
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), hints::executable_marker());
            }
            _ => {}
        }

        if let DevError::ProjectStructure { missing, .. } = self {
            if !missing.is_empty() {
                eprintln!("\n{}", style("MISSING:").cyan().bold());
                for path in missing {
                    eprintln!("  • {}", path);
                }
            }
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Hint for running outside the checkout
    pub fn project_root() -> &'static str {
        "Run this tool from the root of the rust-apt checkout, the directory\n\
         containing Cargo.toml, apt-pkg-c/, src/ and ORIGINAL.MIT."
    }

    /// Hint for a system without apt
    pub fn apt() -> &'static str {
        "This tool manages dependencies through apt and only works on\n\
         Debian based systems (Debian, Ubuntu, ...)."
    }

    /// Hint for a missing cargo after setup
    pub fn cargo() -> &'static str {
        "Install the Rust toolchain with: dev setup\n\
         If it was just installed, restart your shell or add ~/.cargo/bin to PATH."
    }

    /// Hint for a missing valgrind
    pub fn valgrind() -> &'static str {
        "Install valgrind with: sudo apt-get install valgrind\n\
         Or run: dev setup"
    }

    /// Hint for a missing clang-format
    pub fn clang_format() -> &'static str {
        "Install clang-format with: sudo apt-get install clang-format\n\
         Or run: dev setup"
    }

    /// Hint for an unreadable build output
    pub fn executable_marker() -> &'static str {
        "cargo may have changed the wording of its `Executable` lines.\n\
         Run `cargo test --no-run` manually and check the test target name\n\
         configured under [test] in dev.toml."
    }

    /// Hint for invalid dev.toml
    pub fn invalid_dev_toml() -> &'static str {
        "dev.toml is invalid. Supported keys:\n\
         • [setup] extra_packages = [\"...\"]\n\
         • [test] target = \"tests\"\n\
         • [format] extensions = [\"cc\", \"h\"]"
    }
}
