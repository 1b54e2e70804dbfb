//! Process environment snapshot

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// The parts of the process environment the commands rely on
#[derive(Debug, Clone)]
pub struct Environment {
    /// PATH handed to every child process
    pub path: OsString,
    /// Home directory, used to locate `~/.cargo/bin`
    pub home: Option<PathBuf>,
    /// Working directory, expected to be the project root
    pub project_root: PathBuf,
    /// Whether we already run with root privileges
    pub is_root: bool,
}

impl Environment {
    /// Read PATH, HOME, the working directory and the effective user
    pub fn capture() -> Result<Self> {
        let project_root = env::current_dir().context("Failed to get current directory")?;
        Ok(Self {
            path: env::var_os("PATH").unwrap_or_default(),
            home: env::var_os("HOME").map(PathBuf::from),
            project_root,
            is_root: effective_user_is_root(),
        })
    }

    /// Directory rustup installs cargo and friends into
    pub fn cargo_bin_dir(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join(".cargo").join("bin"))
    }

    /// Append `~/.cargo/bin` to PATH unless it is already there
    ///
    /// Returns whether PATH changed.
    pub fn extend_path_with_cargo_bin(&mut self) -> Result<bool> {
        let Some(bin_dir) = self.cargo_bin_dir() else {
            return Ok(false);
        };
        self.append_path(&bin_dir)
    }

    fn append_path(&mut self, dir: &Path) -> Result<bool> {
        let mut entries: Vec<PathBuf> = env::split_paths(&self.path).collect();
        if entries.iter().any(|entry| entry == dir) {
            return Ok(false);
        }
        entries.push(dir.to_path_buf());
        self.path = env::join_paths(entries).context("Failed to extend PATH")?;
        Ok(true)
    }

    /// PATH rendered for passing through `env PATH=...`
    pub fn path_lossy(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

#[cfg(unix)]
fn effective_user_is_root() -> bool {
    use std::os::unix::fs::MetadataExt;

    // /proc/self is owned by the effective uid of the reading process.
    std::fs::metadata("/proc/self")
        .map(|meta| meta.uid() == 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn effective_user_is_root() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn environment(path: &str, home: Option<&str>) -> Environment {
        Environment {
            path: OsString::from(path),
            home: home.map(PathBuf::from),
            project_root: PathBuf::from("/src/rust-apt"),
            is_root: false,
        }
    }

    #[test]
    fn test_extend_path_appends_cargo_bin() {
        let mut env = environment("/usr/bin:/bin", Some("/home/dev"));
        assert!(env.extend_path_with_cargo_bin().unwrap());
        assert_eq!(env.path_lossy(), "/usr/bin:/bin:/home/dev/.cargo/bin");
    }

    #[test]
    fn test_extend_path_is_idempotent() {
        let mut env = environment("/usr/bin:/home/dev/.cargo/bin", Some("/home/dev"));
        assert!(!env.extend_path_with_cargo_bin().unwrap());
        assert_eq!(env.path_lossy(), "/usr/bin:/home/dev/.cargo/bin");
    }

    #[test]
    fn test_extend_path_without_home() {
        let mut env = environment("/usr/bin", None);
        assert!(!env.extend_path_with_cargo_bin().unwrap());
        assert_eq!(env.path_lossy(), "/usr/bin");
    }

    #[test]
    #[serial]
    fn test_capture_reads_home() {
        let previous = env::var_os("HOME");
        env::set_var("HOME", "/home/someone");
        let captured = Environment::capture();
        match previous {
            Some(home) => env::set_var("HOME", home),
            None => env::remove_var("HOME"),
        }

        let captured = captured.unwrap();
        assert_eq!(
            captured.cargo_bin_dir(),
            Some(PathBuf::from("/home/someone/.cargo/bin"))
        );
        assert_eq!(captured.project_root, env::current_dir().unwrap());
    }
}
