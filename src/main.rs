//! rust-apt developer CLI
//!
//! Sets up a development machine, runs the test suite in its various modes
//! and formats both the Rust and the C++ halves of the bindings.
//!
//! ## Architecture
//!
//! ```text
//! cli → commands/{setup,test,format} → exec::Executor
//!     → cargo, rustup, apt, valgrind, clang-format
//! ```

mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod packages;
mod utils;

use clap::Parser;

use cli::Cli;
use error::DevError;
use utils::terminal;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli.execute() {
        let code = match err.downcast_ref::<DevError>() {
            Some(dev_err) => {
                dev_err.display_with_hints();
                dev_err.exit_code()
            }
            None => {
                terminal::print_error(&format!("{:#}", err));
                1
            }
        };
        std::process::exit(code);
    }
}
