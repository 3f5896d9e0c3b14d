use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::{DevtoolsError, Result};

/// One record of `compile_commands.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileEntry {
    /// Working directory of the compiler invocation.
    pub directory: String,
    /// Source file, absolute or relative to `directory`.
    pub file: String,
    /// Shell-quoted invocation.
    #[serde(default)]
    pub command: Option<String>,
    /// Pre-split invocation (alternative to `command`).
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    #[serde(default)]
    pub output: Option<String>,
}

impl CompileEntry {
    /// Absolute path of the source file, with `.` and `..` folded away.
    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        let file = Path::new(&self.file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            normalize_lexically(&Path::new(&self.directory).join(file))
        }
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Load and parse a compile database.
pub fn load_compile_commands(path: &Path) -> Result<Vec<CompileEntry>> {
    let load_err = |detail: String| DevtoolsError::CompileCommandsLoad {
        path: path.display().to_string(),
        detail,
    };
    let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| load_err(e.to_string()))
}
