//! External process execution
//!
//! Commands never spawn processes directly. They go through an
//! [`Executor`] so the argument assembly can be checked against a
//! recording fake.

pub mod download;
pub mod subprocess;

use std::ffi::OsString;

use anyhow::Result;

use crate::error::DevError;
use crate::utils::terminal;

pub use download::{Downloader, HttpDownloader};
pub use subprocess::{CommandLine, CommandResult, Io};

/// Runs external commands
pub trait Executor {
    /// Spawn `cmd`, wait for it and report how it went
    ///
    /// A non-zero exit is not an error at this level; see [`run_checked`].
    fn execute(&mut self, cmd: &CommandLine, io: Io) -> Result<CommandResult>;

    /// Replace the PATH handed to every subsequent child
    fn update_path(&mut self, path: &OsString);
}

/// Executor backed by real processes
pub struct SystemExecutor {
    path: OsString,
    verbose: bool,
}

impl SystemExecutor {
    pub fn new(path: OsString, verbose: bool) -> Self {
        Self { path, verbose }
    }
}

impl Executor for SystemExecutor {
    fn execute(&mut self, cmd: &CommandLine, io: Io) -> Result<CommandResult> {
        if self.verbose {
            terminal::print_command(cmd);
        }
        let result = subprocess::run_command(cmd, io, Some(&self.path))?;
        if self.verbose {
            eprintln!(
                "  exited with {} after {:.2}s",
                result.exit_code,
                result.duration.as_secs_f64()
            );
        }
        Ok(result)
    }

    fn update_path(&mut self, path: &OsString) {
        self.path = path.clone();
    }
}

/// Run a command with inherited stdio, failing on a non-zero exit
pub fn run_checked(exec: &mut dyn Executor, cmd: &CommandLine) -> Result<()> {
    let result = exec.execute(cmd, Io::Inherit)?;
    if !result.success {
        return Err(DevError::command_failed(cmd.to_string(), result.exit_code).into());
    }
    Ok(())
}

/// Run a command whose failure is tolerated, returning its exit code
pub fn run_unchecked(exec: &mut dyn Executor, cmd: &CommandLine) -> Result<i32> {
    let result = exec.execute(cmd, Io::Inherit)?;
    if !result.success {
        terminal::print_warning(&format!(
            "`{}` exited with code {}, continuing",
            cmd, result.exit_code
        ));
    }
    Ok(result.exit_code)
}

/// Run a command with captured output, failing on a non-zero exit
///
/// On failure the captured stderr is replayed so the user sees why.
pub fn capture_checked(exec: &mut dyn Executor, cmd: &CommandLine) -> Result<CommandResult> {
    let result = exec.execute(cmd, Io::Capture)?;
    if !result.success {
        eprint!("{}", result.stderr);
        return Err(DevError::command_failed(cmd.to_string(), result.exit_code).into());
    }
    Ok(result)
}

#[cfg(test)]
pub mod recording {
    //! Executor fake that records command lines and replays canned results

    use std::collections::VecDeque;
    use std::ffi::OsString;

    use anyhow::Result;

    use super::{CommandLine, CommandResult, Executor, Io};

    #[derive(Default)]
    pub struct RecordingExecutor {
        /// Every command executed, in order
        pub commands: Vec<(CommandLine, Io)>,
        /// Every PATH handed to `update_path`
        pub paths: Vec<OsString>,
        /// Results keyed by a prefix of the rendered command line
        scripted: Vec<(String, VecDeque<CommandResult>)>,
    }

    impl RecordingExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Return `result` the next time a command starting with `prefix` runs
        pub fn script(&mut self, prefix: &str, result: CommandResult) -> &mut Self {
            match self.scripted.iter_mut().find(|(p, _)| p == prefix) {
                Some((_, queue)) => queue.push_back(result),
                None => self
                    .scripted
                    .push((prefix.to_string(), VecDeque::from([result]))),
            }
            self
        }

        /// Rendered command lines, in execution order
        pub fn lines(&self) -> Vec<String> {
            self.commands.iter().map(|(cmd, _)| cmd.to_string()).collect()
        }
    }

    impl Executor for RecordingExecutor {
        fn execute(&mut self, cmd: &CommandLine, io: Io) -> Result<CommandResult> {
            let line = cmd.to_string();
            self.commands.push((cmd.clone(), io));
            let canned = self
                .scripted
                .iter_mut()
                .find(|(prefix, queue)| line.starts_with(prefix.as_str()) && !queue.is_empty())
                .and_then(|(_, queue)| queue.pop_front());
            Ok(canned.unwrap_or_else(|| CommandResult::ok("", "")))
        }

        fn update_path(&mut self, path: &OsString) {
            self.paths.push(path.clone());
        }
    }
}
