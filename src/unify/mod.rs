//! Moving source files from a game variant tree into the shared Core tree.
//!
//! The checkout holds two variant trees (Generals, Zero Hour) and the shared
//! Core tree. Each tree has per-group build lists at
//! `<tree>/<group>/CMakeLists.txt`, where `group` is the first component of
//! a tree-relative file path and the rest of the path is the build list entry.
//!
//! Operations stop at the first failure. Steps already done stay done.

pub mod manifest;
pub mod plan;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::Config;
use crate::error::{DevtoolsError, Result};

use manifest::{toggle_manifest, ManifestEdit};

/// One of the three source trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Tree {
    Generals,
    #[value(alias = "generalsmd", alias = "zh")]
    #[serde(alias = "generalsmd", alias = "zh")]
    ZeroHour,
    Core,
}

impl Tree {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tree::Generals => "generals",
            Tree::ZeroHour => "zero-hour",
            Tree::Core => "core",
        }
    }

    /// The other variant. Core has none.
    pub fn opposite(self) -> Result<Tree> {
        match self {
            Tree::Generals => Ok(Tree::ZeroHour),
            Tree::ZeroHour => Ok(Tree::Generals),
            Tree::Core => Err(DevtoolsError::NoOppositeTree {
                tree: self.as_str().into(),
            }),
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute roots of the three trees plus the build list filename.
#[derive(Debug, Clone)]
pub struct Layout {
    pub generals: PathBuf,
    pub zero_hour: PathBuf,
    pub core: PathBuf,
    pub manifest_name: String,
}

impl Layout {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let unify = &config.settings.unify;
        let root = &config.project_root;
        Self {
            generals: root.join(&unify.generals_dir),
            zero_hour: root.join(&unify.zero_hour_dir),
            core: root.join(&unify.core_dir),
            manifest_name: unify.manifest_name.clone(),
        }
    }

    #[must_use]
    pub fn tree_path(&self, tree: Tree) -> &Path {
        match tree {
            Tree::Generals => &self.generals,
            Tree::ZeroHour => &self.zero_hour,
            Tree::Core => &self.core,
        }
    }

    #[must_use]
    pub fn manifest_path(&self, tree: Tree, group: &str) -> PathBuf {
        self.tree_path(tree).join(group).join(&self.manifest_name)
    }

    #[must_use]
    pub fn file_path(&self, tree: Tree, rel: &str) -> PathBuf {
        self.tree_path(tree).join(rel)
    }
}

/// A tree-relative path split at its first `/` into build list group and entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPath<'a> {
    pub group: &'a str,
    pub entry: &'a str,
}

impl<'a> GroupPath<'a> {
    pub fn parse(path: &'a str) -> Result<Self> {
        match path.split_once('/') {
            Some((group, entry)) if !group.is_empty() => Ok(Self { group, entry }),
            _ => Err(DevtoolsError::PathShape { path: path.into() }),
        }
    }
}

fn require_core(to: Tree) -> Result<()> {
    if to == Tree::Core {
        Ok(())
    } else {
        Err(DevtoolsError::DestinationNotCore {
            tree: to.as_str().into(),
        })
    }
}

/// Unify a file present in both variants.
///
/// Comments the entry out of both variants' build lists, uncomments it in
/// Core's, deletes the opposite variant's copy and moves `from`'s copy into
/// Core.
pub fn unify_file(
    layout: &Layout,
    from: Tree,
    from_file: &str,
    to: Tree,
    to_file: &str,
) -> Result<()> {
    require_core(to)?;
    let opposite = from.opposite()?;
    let src = GroupPath::parse(from_file)?;
    let dst = GroupPath::parse(to_file)?;

    tracing::info!(%from, from_file, to_file, "unifying file");
    toggle_manifest(&layout.manifest_path(opposite, src.group), src.entry, ManifestEdit::Comment)?;
    toggle_manifest(&layout.manifest_path(from, src.group), src.entry, ManifestEdit::Comment)?;
    toggle_manifest(&layout.manifest_path(to, dst.group), dst.entry, ManifestEdit::Uncomment)?;

    delete_file(layout, opposite, from_file)?;
    move_file(layout, from, from_file, to, to_file)
}

/// Move a file that only exists in one variant into Core.
pub fn unify_move_file(
    layout: &Layout,
    from: Tree,
    from_file: &str,
    to: Tree,
    to_file: &str,
) -> Result<()> {
    require_core(to)?;
    let src = GroupPath::parse(from_file)?;
    let dst = GroupPath::parse(to_file)?;

    tracing::info!(%from, from_file, to_file, "moving file");
    toggle_manifest(&layout.manifest_path(from, src.group), src.entry, ManifestEdit::Comment)?;
    toggle_manifest(&layout.manifest_path(to, dst.group), dst.entry, ManifestEdit::Uncomment)?;

    move_file(layout, from, from_file, to, to_file)
}

fn delete_file(layout: &Layout, tree: Tree, rel: &str) -> Result<()> {
    let path = layout.file_path(tree, rel);
    fs::remove_file(&path)?;
    tracing::debug!(path = %path.display(), "deleted");
    Ok(())
}

fn move_file(layout: &Layout, from: Tree, from_file: &str, to: Tree, to_file: &str) -> Result<()> {
    let src = layout.file_path(from, from_file);
    let dst = layout.file_path(to, to_file);
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    if fs::rename(&src, &dst).is_err() {
        // rename fails across filesystems
        fs::copy(&src, &dst)?;
        fs::remove_file(&src)?;
    }
    tracing::debug!(from = %src.display(), to = %dst.display(), "moved");
    Ok(())
}
