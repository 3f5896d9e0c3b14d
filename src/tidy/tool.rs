//! Locating the clang-tidy executable and reading its version.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use regex::Regex;

use crate::config::Config;
use crate::error::{DevtoolsError, Result};

/// Environment variable naming an explicit clang-tidy executable.
pub const CLANG_TIDY_ENV: &str = "CLANG_TIDY";

const DEFAULT_EXE: &str = "clang-tidy";

/// Tried in order; the first capture wins.
const VERSION_PATTERNS: &[&str] = &[
    r"(?i)LLVM version (\d+\.\d+\.\d+)",
    r"(?i)Homebrew LLVM version (\d+\.\d+\.\d+)",
    r"(?i)version (\d+\.\d+\.\d+)",
];

/// Resolve the clang-tidy executable.
///
/// Lookup order: `CLANG_TIDY`, `[analysis].clang_tidy`, `clang-tidy` on
/// `PATH`, then (macOS only) Homebrew LLVM cellars, newest first.
pub fn find_clang_tidy(config: &Config) -> Result<String> {
    let timeout = Duration::from_secs(config.settings.analysis.probe_timeout_secs);

    let explicit = std::env::var(CLANG_TIDY_ENV)
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| config.settings.analysis.clang_tidy.clone());
    if let Some(exe) = explicit {
        if Path::new(&exe).is_file() || probe_version(&exe, timeout).is_some() {
            tracing::info!(exe = %exe, "using configured clang-tidy");
            return Ok(exe);
        }
        tracing::warn!(exe = %exe, "configured clang-tidy is not usable, searching PATH");
    }

    if probe_version(DEFAULT_EXE, timeout).is_some() {
        return Ok(DEFAULT_EXE.to_string());
    }

    for candidate in homebrew_candidates() {
        if probe_version(&candidate, timeout).is_some() {
            tracing::info!(exe = %candidate, "using Homebrew clang-tidy");
            return Ok(candidate);
        }
    }

    Err(DevtoolsError::ToolNotFound)
}

/// Run `<exe> --version`, returning trimmed stdout on success.
///
/// A probe that outlives `timeout` is killed and treated as a failure.
#[must_use]
pub fn probe_version(exe: &str, timeout: Duration) -> Option<String> {
    let mut child = Command::new(exe)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                tracing::debug!(exe, "version probe timed out");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(20)),
            Err(_) => return None,
        }
    };
    if !status.success() {
        return None;
    }

    let output = child.wait_with_output().ok()?;
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Pull the `X.Y.Z` LLVM version out of `clang-tidy --version` output.
#[must_use]
pub fn extract_llvm_version(version_text: &str) -> Option<String> {
    for pattern in VERSION_PATTERNS {
        let re = Regex::new(pattern).ok()?;
        if let Some(caps) = re.captures(version_text) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    None
}

/// Sort key for a cellar path: `llvm@NN` major, else a `/X.Y.Z/` segment.
#[must_use]
pub fn cellar_version_key(path: &str) -> u64 {
    if let Some(caps) = Regex::new(r"llvm@?(\d+)").ok().and_then(|re| re.captures(path)) {
        return caps[1].parse().unwrap_or(0);
    }
    if let Some(caps) = Regex::new(r"/(\d+)\.(\d+)\.(\d+)")
        .ok()
        .and_then(|re| re.captures(path))
    {
        let part = |i: usize| caps[i].parse::<u64>().unwrap_or(0);
        return part(1) * 10_000 + part(2) * 100 + part(3);
    }
    0
}

#[cfg(target_os = "macos")]
fn homebrew_candidates() -> Vec<String> {
    let mut found: Vec<String> = [
        "/opt/homebrew/Cellar/llvm*/*/bin/clang-tidy",
        "/usr/local/Cellar/llvm*/*/bin/clang-tidy",
    ]
    .iter()
    .filter_map(|pattern| glob::glob(pattern).ok())
    .flat_map(|paths| paths.filter_map(std::result::Result::ok))
    .map(|p| p.to_string_lossy().into_owned())
    .collect();
    found.sort_by_key(|p| std::cmp::Reverse(cellar_version_key(p)));
    found
}

#[cfg(not(target_os = "macos"))]
fn homebrew_candidates() -> Vec<String> {
    Vec::new()
}
