//! Setup command implementation
//!
//! Brings a machine to the point where rust-apt builds: rust toolchain,
//! apt build dependencies and a `compile_commands.json` for C++ linting.

use anyhow::Result;
use clap::Args;

use crate::config::{DevConfig, Environment};
use crate::exec::{run_checked, CommandLine, Downloader, Executor, HttpDownloader};
use crate::packages::{self, AptCache};
use crate::utils::{terminal, tools};

/// Official rustup installer script
pub const RUSTUP_INSTALLER_URL: &str = "https://sh.rustup.rs";

/// Interpreter the installer script is piped into
const INSTALLER_SHELL: &str = "/bin/sh";

/// Setup the development environment for rust-apt
///
/// Installs cargo, bear, build-essential, libapt-pkg-dev, clang-format and
/// valgrind, then builds rust-apt under bear to generate
/// compile_commands.json for C++ linting.
#[derive(Args, Debug)]
pub struct SetupCommand {
    /// Skip confirmation prompts from rustup and apt-get
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl SetupCommand {
    /// Execute the setup command
    pub fn execute(
        self,
        env: &mut Environment,
        config: &DevConfig,
        exec: &mut dyn Executor,
    ) -> Result<()> {
        self.run(env, config, exec, &HttpDownloader)
    }

    fn run(
        &self,
        env: &mut Environment,
        config: &DevConfig,
        exec: &mut dyn Executor,
        downloader: &dyn Downloader,
    ) -> Result<()> {
        let installed_cargo = self.install_cargo(env, exec, downloader)?;

        // Make sure that nightly is installed and then update
        for line in ["rustup default nightly", "rustup default stable", "rustup update"] {
            run_checked(exec, &CommandLine::parse(line))?;
        }

        self.install_apt_dependencies(config, exec)?;

        run_checked(exec, &CommandLine::parse("cargo clean"))?;
        run_checked(exec, &CommandLine::parse("bear -- cargo build"))?;

        if installed_cargo {
            println!("\nCargo was just installed.");
            println!("You may need to restart your shell to access the commands.");
        }
        Ok(())
    }

    /// Run the rustup installer if cargo is not on PATH
    ///
    /// Returns whether an installation happened.
    fn install_cargo(
        &self,
        env: &mut Environment,
        exec: &mut dyn Executor,
        downloader: &dyn Downloader,
    ) -> Result<bool> {
        if tools::tool_exists("cargo", &env.path, &env.project_root) {
            return Ok(false);
        }

        terminal::print_info("Starting rustup installer...");
        terminal::print_warning(&format!(
            "Downloading {} and piping it into {} without verification",
            RUSTUP_INSTALLER_URL, INSTALLER_SHELL
        ));
        let script = downloader.fetch(RUSTUP_INSTALLER_URL)?;

        if env.extend_path_with_cargo_bin()? {
            exec.update_path(&env.path);
        }

        let mut cmd = CommandLine::new(INSTALLER_SHELL);
        if self.yes {
            cmd = cmd.args(["-s", "--", "-y"]);
        }
        run_checked(exec, &cmd.input(script))?;
        Ok(true)
    }

    fn install_apt_dependencies(&self, config: &DevConfig, exec: &mut dyn Executor) -> Result<()> {
        let manifest = packages::manifest_with(&config.setup.extra_packages);

        let spinner = terminal::create_spinner("Checking apt dependencies...");
        let plan = packages::plan_install(&manifest, &mut AptCache::new(exec));
        spinner.finish_and_clear();
        let plan = plan?;

        if plan.is_empty() {
            terminal::print_success("All apt dependencies are installed");
            return Ok(());
        }
        packages::install(exec, &plan, self.yes)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::ffi::OsString;
    use std::fs;
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::*;
    use crate::error::DevError;
    use crate::exec::recording::RecordingExecutor;
    use crate::exec::{CommandResult, Io};

    struct FakeDownloader {
        fetched: RefCell<Vec<String>>,
    }

    impl FakeDownloader {
        fn new() -> Self {
            Self {
                fetched: RefCell::new(Vec::new()),
            }
        }
    }

    impl Downloader for FakeDownloader {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.fetched.borrow_mut().push(url.to_string());
            Ok(b"echo rustup\n".to_vec())
        }
    }

    fn environment(path: &Path, home: &Path) -> Environment {
        Environment {
            path: OsString::from(path),
            home: Some(home.to_path_buf()),
            project_root: PathBuf::from("/"),
            is_root: false,
        }
    }

    /// A PATH directory containing an executable `cargo`
    fn path_with_cargo(dir: &Path) -> PathBuf {
        let bin = dir.join("bin");
        fs::create_dir_all(&bin).unwrap();
        let cargo = bin.join("cargo");
        fs::write(&cargo, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&cargo, fs::Permissions::from_mode(0o755)).unwrap();
        }
        bin
    }

    fn policy(installed: &str) -> CommandResult {
        CommandResult::ok(format!("pkg:\n  Installed: {}\n  Candidate: 1.0\n", installed), "")
    }

    fn script_packages(exec: &mut RecordingExecutor, missing: &[&str]) {
        for name in packages::MANIFEST {
            let state = if missing.contains(name) { "(none)" } else { "1.0" };
            exec.script(&format!("apt-cache policy {}", name), policy(state));
        }
    }

    #[test]
    fn test_setup_with_toolchain_present() {
        let temp = TempDir::new().unwrap();
        let mut env = environment(&path_with_cargo(temp.path()), temp.path());
        let mut exec = RecordingExecutor::new();
        script_packages(&mut exec, &["bear", "valgrind"]);
        let downloader = FakeDownloader::new();

        let command = SetupCommand { yes: false };
        command
            .run(&mut env, &DevConfig::default(), &mut exec, &downloader)
            .unwrap();

        assert!(downloader.fetched.borrow().is_empty());
        let inherited: Vec<String> = exec
            .commands
            .iter()
            .filter(|(_, io)| *io == Io::Inherit)
            .map(|(cmd, _)| cmd.to_string())
            .collect();
        assert_eq!(
            inherited,
            vec![
                "rustup default nightly",
                "rustup default stable",
                "rustup update",
                "sudo apt-get update",
                "sudo apt-get install bear valgrind",
                "cargo clean",
                "bear -- cargo build",
            ]
        );
    }

    #[test]
    fn test_setup_installs_toolchain_and_extends_path() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty");
        fs::create_dir(&empty).unwrap();
        let mut env = environment(&empty, temp.path());
        let mut exec = RecordingExecutor::new();
        script_packages(&mut exec, &[]);
        let downloader = FakeDownloader::new();

        let command = SetupCommand { yes: true };
        command
            .run(&mut env, &DevConfig::default(), &mut exec, &downloader)
            .unwrap();

        assert_eq!(*downloader.fetched.borrow(), vec![RUSTUP_INSTALLER_URL]);

        let (installer, _) = &exec.commands[0];
        assert_eq!(installer.to_string(), "/bin/sh -s -- -y");
        assert_eq!(installer.input.as_deref(), Some(&b"echo rustup\n"[..]));

        let cargo_bin = temp.path().join(".cargo").join("bin");
        assert_eq!(exec.paths.len(), 1);
        assert!(std::env::split_paths(&exec.paths[0]).any(|p| p == cargo_bin));
        assert_eq!(env.path, exec.paths[0]);

        // Nothing to install, so apt-get is never invoked.
        assert!(!exec.lines().iter().any(|line| line.starts_with("sudo apt-get")));
    }

    #[test]
    fn test_setup_aborts_on_unlocatable_packages() {
        let temp = TempDir::new().unwrap();
        let mut env = environment(&path_with_cargo(temp.path()), temp.path());
        let mut exec = RecordingExecutor::new();
        exec.script("apt-cache policy build-essential", policy("1.0"));
        exec.script("apt-cache policy libapt-pkg-dev", policy("(none)"));
        exec.script("apt-cache policy clang-format", policy("1.0"));

        let command = SetupCommand { yes: false };
        let err = command
            .run(&mut env, &DevConfig::default(), &mut exec, &FakeDownloader::new())
            .unwrap_err();

        match err.downcast::<DevError>().unwrap() {
            DevError::PackagesNotFound { names } => assert_eq!(names, vec!["bear", "valgrind"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!exec.lines().iter().any(|line| line.contains("apt-get install")));
        assert!(!exec.lines().iter().any(|line| line == "cargo clean"));
    }

    #[test]
    fn test_setup_stops_on_failed_toolchain_step() {
        let temp = TempDir::new().unwrap();
        let mut env = environment(&path_with_cargo(temp.path()), temp.path());
        let mut exec = RecordingExecutor::new();
        exec.script("rustup default stable", CommandResult::failed(1));

        let command = SetupCommand { yes: false };
        let err = command
            .run(&mut env, &DevConfig::default(), &mut exec, &FakeDownloader::new())
            .unwrap_err();

        assert_eq!(err.downcast::<DevError>().unwrap().exit_code(), 1);
        assert_eq!(
            exec.lines(),
            vec!["rustup default nightly", "rustup default stable"]
        );
    }

    #[test]
    fn test_setup_installs_extra_packages_from_config() {
        let temp = TempDir::new().unwrap();
        let mut env = environment(&path_with_cargo(temp.path()), temp.path());
        let mut exec = RecordingExecutor::new();
        script_packages(&mut exec, &[]);
        exec.script("apt-cache policy gdb", policy("(none)"));
        let config = DevConfig::parse("[setup]\nextra_packages = [\"gdb\"]\n").unwrap();

        let command = SetupCommand { yes: true };
        command
            .run(&mut env, &config, &mut exec, &FakeDownloader::new())
            .unwrap();

        assert!(exec
            .lines()
            .contains(&"sudo apt-get install -y gdb".to_string()));
    }
}
