//! Tool detection against an explicit PATH

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use which::which_in;

use crate::error::{hints, DevError};

/// Locate `tool_name` in `path`, returning its full path
pub fn find_tool(tool_name: &str, path: &OsStr, cwd: &Path) -> Option<PathBuf> {
    which_in(tool_name, Some(path), cwd).ok()
}

/// Check if a tool exists in `path`
pub fn tool_exists(tool_name: &str, path: &OsStr, cwd: &Path) -> bool {
    find_tool(tool_name, path, cwd).is_some()
}

/// Require a tool to exist, return error with hint if missing
pub fn require_tool(
    tool_name: &str,
    required_for: &str,
    path: &OsStr,
    cwd: &Path,
) -> Result<PathBuf> {
    match find_tool(tool_name, path, cwd) {
        Some(found) => Ok(found),
        None => {
            let hint = get_tool_hint(tool_name);
            Err(DevError::missing_tool(tool_name, required_for, hint).into())
        }
    }
}

/// Get installation hint for a tool
fn get_tool_hint(tool_name: &str) -> &'static str {
    match tool_name {
        "apt-get" => hints::apt(),
        "cargo" | "rustup" => hints::cargo(),
        "valgrind" => hints::valgrind(),
        "clang-format" => hints::clang_format(),
        _ => "Install this tool and ensure it's in your PATH",
    }
}
