//! CLI argument parsing using clap derive macros

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{format::FormatCommand, setup::SetupCommand, test::TestCommand};
use crate::config::{DevConfig, Environment};
use crate::exec::SystemExecutor;
use crate::utils::{paths, tools};

/// Development helper for rust-apt
///
/// Must be run from the root of the rust-apt checkout on a system with apt.
#[derive(Parser, Debug)]
#[command(name = "dev")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print every external command before running it
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Setup the development environment for rust-apt
    Setup(SetupCommand),

    /// Run unit/integration tests
    Test(TestCommand),

    /// Format the rust-apt code with 'cargo fmt' and 'clang-format'
    Format(FormatCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let mut env = Environment::capture()?;
        preflight(&env)?;
        let config = DevConfig::load(&env.project_root)?;
        let mut exec = SystemExecutor::new(env.path.clone(), self.verbose);

        match self.command {
            Commands::Setup(cmd) => cmd.execute(&mut env, &config, &mut exec),
            Commands::Test(cmd) => cmd.execute(&env, &config, &mut exec),
            Commands::Format(cmd) => cmd.execute(&env, &config, &mut exec),
        }
    }
}

/// Checks that run before any command does any work
fn preflight(env: &Environment) -> Result<()> {
    paths::verify_project_root(&env.project_root)?;
    tools::require_tool("apt-get", "managing system packages", &env.path, &env.project_root)?;
    Ok(())
}
