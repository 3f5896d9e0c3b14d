//! Locating build artifacts under the project root.
//!
//! The compile database comes from a dedicated analysis build (configured
//! without precompiled headers). The analyzer plugin is optional and is
//! looked up at a fixed list of candidate locations.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{DevtoolsError, Result};

/// Compile database filename emitted by CMake.
pub const COMPILE_COMMANDS: &str = "compile_commands.json";

/// Find `compile_commands.json`.
///
/// With an explicit `build_dir` (relative paths resolve against the project
/// root) the file must exist there. Otherwise the configured analysis build
/// directory is used and a missing file yields an error telling the
/// operator how to generate it.
pub fn find_compile_commands(config: &Config, build_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = build_dir {
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            config.project_root.join(dir)
        };
        let candidate = dir.join(COMPILE_COMMANDS);
        if candidate.is_file() {
            return Ok(candidate);
        }
        return Err(DevtoolsError::CompileCommandsNotFound {
            dir: dir.display().to_string(),
        });
    }

    let default_dir = &config.settings.analysis.build_dir;
    let candidate = config.project_root.join(default_dir).join(COMPILE_COMMANDS);
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(DevtoolsError::CompileCommandsMissing {
            build_dir: default_dir.clone(),
        })
    }
}

/// Return the first configured plugin candidate that exists.
#[must_use]
pub fn find_plugin(config: &Config) -> Option<PathBuf> {
    config
        .settings
        .plugin
        .candidates
        .iter()
        .map(|rel| config.project_root.join(rel))
        .find(|p| p.exists())
}
