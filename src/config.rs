use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DevtoolsError, Result};

/// File whose presence marks the project root.
pub const ROOT_MARKER: &str = "CMakeLists.txt";
/// Directory holding devtools settings, relative to the project root.
const SETTINGS_DIR: &str = ".devtools";
/// Settings filename.
const SETTINGS_FILE: &str = "config.toml";
/// Hard upper bound on files per analyzer invocation (command-line length).
pub const MAX_BATCH_SIZE: usize = 50;

/// Project-level configuration resolved from the working directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory of the engine checkout.
    pub project_root: PathBuf,
    /// Path to the settings file (may not exist).
    pub settings_path: PathBuf,
    /// User settings loaded from `.devtools/config.toml`.
    pub settings: UserSettings,
}

/// User-configurable settings from `.devtools/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Analyzer invocation settings.
    pub analysis: AnalysisSettings,
    /// Source filtering settings.
    pub filter: FilterSettings,
    /// Analyzer plugin lookup.
    pub plugin: PluginSettings,
    /// Variant/Core tree layout for the file unifier.
    pub unify: UnifySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Build directory holding `compile_commands.json`, relative to the root.
    pub build_dir: String,
    /// Files per analyzer invocation (clamped to `1..=MAX_BATCH_SIZE`).
    pub batch_size: usize,
    /// Explicit clang-tidy executable.
    pub clang_tidy: Option<String>,
    /// Timeout for `--version` probes during discovery.
    pub probe_timeout_secs: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            build_dir: "build/clang-tidy".into(),
            batch_size: MAX_BATCH_SIZE,
            clang_tidy: None,
            probe_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Substring patterns always excluded, on top of `--exclude`.
    pub exclude_patterns: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            exclude_patterns: vec![
                "Dependencies/MaxSDK".into(),
                "_deps/".into(),
                "build/".into(),
                ".git/".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    /// Project-relative candidate locations of the analyzer plugin, in lookup order.
    pub candidates: Vec<String>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        let base = "scripts/clang-tidy-plugin/build";
        let name = "libGeneralsGameCodeClangTidyPlugin";
        Self {
            candidates: vec![
                format!("{base}/lib/{name}.so"),
                format!("{base}/lib/{name}.dylib"),
                format!("{base}/lib/{name}.dll"),
                format!("{base}/bin/{name}.dll"),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UnifySettings {
    pub generals_dir: String,
    pub zero_hour_dir: String,
    pub core_dir: String,
    /// Per-directory build list filename.
    pub manifest_name: String,
}

impl Default for UnifySettings {
    fn default() -> Self {
        Self {
            generals_dir: "Generals/Code".into(),
            zero_hour_dir: "GeneralsMD/Code".into(),
            core_dir: "Core".into(),
            manifest_name: ROOT_MARKER.into(),
        }
    }
}

impl AnalysisSettings {
    /// Batch size after clamping to the command-line safe range.
    #[must_use]
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }
}

impl Config {
    /// Create config for a known project root.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let settings_path = project_root.join(SETTINGS_DIR).join(SETTINGS_FILE);
        let settings = Self::load_settings(&settings_path).unwrap_or_default();

        Self {
            project_root,
            settings_path,
            settings,
        }
    }

    /// Discover the project root from the current working directory.
    pub fn from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| DevtoolsError::Config(format!("cannot get cwd: {e}")))?;
        Ok(Self::new(find_project_root(&cwd)?))
    }

    /// Use `root` when given, otherwise discover from the working directory.
    ///
    /// An explicit root is canonicalized so it compares equal to the
    /// resolved paths found in compile databases.
    pub fn resolve(root: Option<&Path>) -> Result<Self> {
        match root {
            Some(root) => {
                let root = root.canonicalize().map_err(|e| {
                    DevtoolsError::Config(format!("invalid project root {}: {e}", root.display()))
                })?;
                Ok(Self::new(root))
            }
            None => Self::from_cwd(),
        }
    }

    fn load_settings(settings_path: &Path) -> Option<UserSettings> {
        if !settings_path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(settings_path).ok()?;
        match toml::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(
                    path = %settings_path.display(),
                    "ignoring invalid settings file: {e}"
                );
                None
            }
        }
    }
}

/// Lexically relativize `path` against `root`, normalizing separators to `/`.
#[must_use]
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

/// Walk up from `start` until a directory containing `CMakeLists.txt` is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(ROOT_MARKER).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| DevtoolsError::ProjectRootNotFound {
            start: start.display().to_string(),
            marker: ROOT_MARKER.into(),
        })
}
