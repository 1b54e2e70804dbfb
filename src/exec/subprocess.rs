//! Subprocess execution

use std::ffi::OsString;
use std::fmt;
use std::io::{ErrorKind, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// A program invocation: program, arguments and optional stdin payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    /// Bytes written to the child's stdin before waiting on it
    pub input: Option<Vec<u8>>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            input: None,
        }
    }

    /// Build a command line from a whitespace separated string
    ///
    /// Only for fixed command text; arguments that may contain spaces
    /// must be pushed with [`CommandLine::arg`].
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let program = parts.next().unwrap_or_default();
        Self::new(program).args(parts)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn input(mut self, input: Vec<u8>) -> Self {
        self.input = Some(input);
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Whether the child shares our terminal or has its output captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Io {
    Inherit,
    Capture,
}

/// Result of a subprocess execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code
    pub exit_code: i32,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(
        status: ExitStatus,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        let exit_code = status.code().unwrap_or(-1);
        Self {
            success: status.success(),
            exit_code,
            stdout,
            stderr,
            duration,
        }
    }
}

#[cfg(test)]
impl CommandResult {
    /// A successful result with the given captured output
    pub fn ok(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: 0,
            stdout: stdout.into(),
            stderr: stderr.into(),
            duration: Duration::ZERO,
        }
    }

    /// A failed result with the given exit code
    pub fn failed(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
            duration: Duration::ZERO,
        }
    }
}

/// Run a command, optionally overriding PATH for the child
pub fn run_command(cmd: &CommandLine, io: Io, path: Option<&OsString>) -> Result<CommandResult> {
    let start = Instant::now();

    let mut command = Command::new(&cmd.program);
    command.args(&cmd.args);
    if let Some(path) = path {
        command.env("PATH", path);
    }

    if cmd.input.is_some() {
        command.stdin(Stdio::piped());
    } else {
        command.stdin(Stdio::inherit());
    }

    match io {
        Io::Inherit => {
            command.stdout(Stdio::inherit());
            command.stderr(Stdio::inherit());
        }
        Io::Capture => {
            command.stdout(Stdio::piped());
            command.stderr(Stdio::piped());
        }
    }

    let mut child = command
        .spawn()
        .with_context(|| format!("Failed to execute {}", cmd.program))?;

    if let Some(input) = &cmd.input {
        // Dropping the handle closes the pipe so the child sees EOF.
        let mut stdin = child
            .stdin
            .take()
            .with_context(|| format!("Failed to open stdin of {}", cmd.program))?;
        match stdin.write_all(input) {
            // Child exited without draining stdin; report its status instead.
            Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
            result => result
                .with_context(|| format!("Failed to write to stdin of {}", cmd.program))?,
        }
    }

    let output = child
        .wait_with_output()
        .with_context(|| format!("Failed to wait for {}", cmd.program))?;

    let duration = start.elapsed();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    Ok(CommandResult::from_status(
        output.status,
        stdout,
        stderr,
        duration,
    ))
}
