//! System packages the development environment needs from apt
//!
//! Deciding what to install is kept apart from asking apt about package
//! state, so the decision logic runs against an in-memory cache in tests.

use anyhow::Result;

use crate::error::DevError;
use crate::exec::{run_checked, run_unchecked, CommandLine, Executor, Io};
use crate::utils::terminal;

/// Packages required to build, lint and leak-check the bindings
pub const MANIFEST: &[&str] = &[
    "bear",
    "build-essential",
    "libapt-pkg-dev",
    "clang-format",
    "valgrind",
];

/// What the package cache knows about a package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    /// No such package in any configured source
    Missing,
    /// Known, but not installed
    NotInstalled,
    Installed,
}

/// Lookup of package state in the system package cache
pub trait PackageCache {
    fn state(&mut self, name: &str) -> Result<PackageState>;
}

/// [`PackageCache`] backed by `apt-cache policy`
pub struct AptCache<'a> {
    exec: &'a mut dyn Executor,
}

impl<'a> AptCache<'a> {
    pub fn new(exec: &'a mut dyn Executor) -> Self {
        Self { exec }
    }
}

impl PackageCache for AptCache<'_> {
    fn state(&mut self, name: &str) -> Result<PackageState> {
        let cmd = CommandLine::new("apt-cache").arg("policy").arg(name);
        let result = self.exec.execute(&cmd, Io::Capture)?;
        if !result.success {
            eprint!("{}", result.stderr);
            return Err(DevError::command_failed(cmd.to_string(), result.exit_code).into());
        }
        Ok(parse_policy(&result.stdout))
    }
}

/// Interpret the output of `apt-cache policy <name>`
///
/// apt prints nothing on stdout for names it cannot locate. Known packages
/// carry an `Installed:` line that reads `(none)` until installed. Virtual
/// and purely referenced names have no `Candidate:` either and cannot be
/// installed by name, so they count as missing.
pub fn parse_policy(output: &str) -> PackageState {
    let installed = policy_field(output, "Installed:");
    let candidate = policy_field(output, "Candidate:");

    match (installed, candidate) {
        (None, _) => PackageState::Missing,
        (Some("(none)"), Some("(none)")) => PackageState::Missing,
        (Some("(none)"), _) => PackageState::NotInstalled,
        (Some(_), _) => PackageState::Installed,
    }
}

fn policy_field<'a>(output: &'a str, key: &str) -> Option<&'a str> {
    output
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(key))
        .map(str::trim)
}

/// The built-in manifest followed by any extra packages, without duplicates
pub fn manifest_with(extra: &[String]) -> Vec<String> {
    let mut packages: Vec<String> = MANIFEST.iter().map(|name| name.to_string()).collect();
    for name in extra {
        if !packages.contains(name) {
            packages.push(name.clone());
        }
    }
    packages
}

/// Packages from `manifest` that still need installing, in manifest order
///
/// Fails with every unresolvable name when apt cannot locate some of them.
pub fn plan_install(manifest: &[String], cache: &mut dyn PackageCache) -> Result<Vec<String>> {
    let mut not_found = Vec::new();
    let mut needs_install = Vec::new();

    for name in manifest {
        match cache.state(name)? {
            PackageState::Missing => not_found.push(name.clone()),
            PackageState::NotInstalled => needs_install.push(name.clone()),
            PackageState::Installed => {}
        }
    }

    if !not_found.is_empty() {
        return Err(DevError::PackagesNotFound { names: not_found }.into());
    }
    Ok(needs_install)
}

/// Refresh the index and install `packages`
///
/// The index refresh is best effort; the install must succeed.
pub fn install(exec: &mut dyn Executor, packages: &[String], assume_yes: bool) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }

    println!("The following packages need to be installed:");
    println!("  {}", packages.join(", "));

    terminal::print_info("Starting apt-get...");
    run_unchecked(exec, &CommandLine::parse("sudo apt-get update"))?;

    let mut cmd = CommandLine::parse("sudo apt-get install");
    if assume_yes {
        cmd = cmd.arg("-y");
    }
    run_checked(exec, &cmd.args(packages.iter().cloned()))
}
