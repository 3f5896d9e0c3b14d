//! Narrowing the compile database down to the files to analyze.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::relative_key;
use crate::tidy::compile_db::CompileEntry;

/// Extensions of translation units the analyzer is run on.
pub const COMPILABLE_EXTENSIONS: &[&str] = &["cpp", "cxx", "cc", "c"];

/// Extensions accepted when files are named explicitly on the command line.
pub const EXPLICIT_EXTENSIONS: &[&str] = &["cpp", "cxx", "cc", "c", "h", "hpp"];

/// Suffixes a diagnostic's leading path must carry to be reported.
pub const DIAGNOSTIC_SUFFIXES: &[&str] = &[".cpp", ".cxx", ".cc", ".c", ".h", ".hpp", ".hxx"];

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed.contains(&ext))
}

/// Check if a path is a compilable translation unit.
#[must_use]
pub fn is_compilable(path: &Path) -> bool {
    has_extension(path, COMPILABLE_EXTENSIONS)
}

/// Check if a diagnostic's leading token names a source or header file.
#[must_use]
pub fn is_diagnostic_source(token: &str) -> bool {
    DIAGNOSTIC_SUFFIXES.iter().any(|ext| token.ends_with(ext))
}

/// Check a project-relative path against include/exclude substring patterns.
///
/// An empty include list lets everything through the include stage.
#[must_use]
pub fn matches_patterns(rel_path: &str, include: &[String], exclude: &[String]) -> bool {
    let included = include.is_empty() || include.iter().any(|p| rel_path.contains(p.as_str()));
    included && !exclude.iter().any(|p| rel_path.contains(p.as_str()))
}

/// Filter compile entries into a sorted, de-duplicated list of absolute paths.
///
/// Entries outside `project_root` are dropped silently.
#[must_use]
pub fn filter_source_files(
    entries: &[CompileEntry],
    project_root: &Path,
    include: &[String],
    exclude: &[String],
) -> Vec<String> {
    let files: BTreeSet<String> = entries
        .iter()
        .filter_map(|entry| {
            let path = entry.source_path();
            let rel = relative_key(project_root, &path)?;
            if !matches_patterns(&rel, include, exclude) || !is_compilable(&path) {
                return None;
            }
            Some(path.to_string_lossy().into_owned())
        })
        .collect();
    files.into_iter().collect()
}

/// Positional arguments split into explicit files and analyzer passthrough.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Positionals {
    pub files: Vec<String>,
    pub passthrough: Vec<String>,
}

/// Split trailing positionals into existing source files and analyzer arguments.
///
/// Relative paths are resolved against the project root. Explicit files are
/// canonicalized; everything else is handed to the analyzer untouched.
#[must_use]
pub fn classify_positionals(args: &[String], project_root: &Path) -> Positionals {
    let mut out = Positionals::default();
    for arg in args {
        let path = PathBuf::from(arg);
        let path = if path.is_absolute() {
            path
        } else {
            project_root.join(path)
        };

        if path.is_file() && has_extension(&path, EXPLICIT_EXTENSIONS) {
            let resolved = path.canonicalize().unwrap_or(path);
            out.files.push(resolved.to_string_lossy().into_owned());
        } else {
            out.passthrough.push(arg.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entry(file: &str) -> CompileEntry {
        CompileEntry {
            directory: "/proj/build".into(),
            file: file.into(),
            command: Some(format!("c++ -c {file}")),
            arguments: None,
            output: None,
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn pattern_semantics() {
        let none: Vec<String> = vec![];
        assert!(matches_patterns("Core/Foo.cpp", &none, &none));
        assert!(matches_patterns("Core/Foo.cpp", &strings(&["Core/"]), &none));
        assert!(!matches_patterns("Generals/Foo.cpp", &strings(&["Core/"]), &none));
        assert!(!matches_patterns(
            "Core/Foo.cpp",
            &strings(&["Core/"]),
            &strings(&["Foo"])
        ));
        // Any include suffices
        assert!(matches_patterns(
            "GeneralsMD/Bar.cpp",
            &strings(&["Core/", "GeneralsMD/"]),
            &none
        ));
    }

    #[test]
    fn filters_sorts_and_dedups() {
        let entries = vec![
            entry("/proj/Core/Zeta.cpp"),
            entry("/proj/Core/Alpha.cpp"),
            entry("/proj/Core/Alpha.cpp"),
            entry("/proj/Core/Header.h"),
            entry("/proj/Core/Shader.hlsl"),
            entry("/proj/_deps/zlib/inflate.c"),
            entry("/elsewhere/Other.cpp"),
        ];
        let files = filter_source_files(
            &entries,
            Path::new("/proj"),
            &[],
            &strings(&["_deps/"]),
        );
        assert_eq!(files, strings(&["/proj/Core/Alpha.cpp", "/proj/Core/Zeta.cpp"]));
    }

    #[test]
    fn include_patterns_apply_to_relative_path() {
        let entries = vec![
            entry("/proj/Core/Libraries/WWLib/crc.cpp"),
            entry("/proj/GeneralsMD/Code/GameEngine/Source/Common/Energy.cpp"),
            entry("/proj/Core/GameEngine/Source/Common/RandomValue.cxx"),
        ];
        let files = filter_source_files(
            &entries,
            Path::new("/proj"),
            &strings(&["Core/Libraries/", "Common/"]),
            &strings(&["GeneralsMD"]),
        );
        assert_eq!(
            files,
            strings(&[
                "/proj/Core/GameEngine/Source/Common/RandomValue.cxx",
                "/proj/Core/Libraries/WWLib/crc.cpp",
            ])
        );
    }

    #[test]
    fn relative_entries_resolve_against_directory() {
        let entries = vec![entry("../Core/Rel.cc")];
        let files = filter_source_files(&entries, Path::new("/proj"), &[], &strings(&["build/"]));
        assert_eq!(files, strings(&["/proj/Core/Rel.cc"]));
    }

    #[test]
    fn extension_sets() {
        assert!(is_compilable(Path::new("a/b.cc")));
        assert!(!is_compilable(Path::new("a/b.h")));
        assert!(is_diagnostic_source("/proj/Core/Foo.hxx"));
        assert!(is_diagnostic_source("Core/Foo.cpp"));
        assert!(!is_diagnostic_source("Core/Foo.inl"));
        assert!(!is_diagnostic_source("error"));
    }

    #[test]
    fn classify_positionals_splits_files_and_args() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("Core");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("Keyboard.cpp"), "").unwrap();
        fs::write(src.join("Keyboard.h"), "").unwrap();
        fs::write(src.join("notes.txt"), "").unwrap();

        let args = strings(&[
            "Core/Keyboard.cpp",
            "Core/Keyboard.h",
            "Core/notes.txt",
            "Core/Missing.cpp",
            "-checks=-*,modernize-use-nullptr",
        ]);
        let out = classify_positionals(&args, tmp.path());

        assert_eq!(out.files.len(), 2);
        assert!(out.files[0].ends_with("Keyboard.cpp"));
        assert!(out.files[1].ends_with("Keyboard.h"));
        assert_eq!(
            out.passthrough,
            strings(&[
                "Core/notes.txt",
                "Core/Missing.cpp",
                "-checks=-*,modernize-use-nullptr"
            ])
        );
    }
}
