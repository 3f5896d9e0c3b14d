//! Turning raw analyzer output into a per-file issue report.
//!
//! Classification is a heuristic over free text, not a parser: a line is a
//! diagnostic when it mentions "warning" or "error" (any case) and the text
//! before its first colon looks like a source or header path. Lines whose
//! first colon is a drive-letter separator therefore never classify; that
//! behavior is kept as-is.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::config::relative_key;
use crate::tidy::filter::is_diagnostic_source;

/// Diagnostic lines keyed by project-relative file path, in encounter order.
pub type IssueMap = BTreeMap<String, Vec<String>>;

/// Check whether a line mentions a warning or error, case-insensitively.
#[must_use]
pub fn is_diagnostic(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("warning") || lower.contains("error")
}

/// Parse one invocation's combined stdout+stderr into an issue map.
///
/// In verbose mode every non-blank line with a colon is kept, provided its
/// leading token still names a source or header file.
#[must_use]
pub fn parse_output(text: &str, project_root: &Path, verbose: bool) -> IssueMap {
    let mut issues = IssueMap::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if !(is_diagnostic(line) || verbose) {
            continue;
        }
        let Some((head, _)) = line.split_once(':') else {
            continue;
        };
        let file_path = head.trim();
        if !is_diagnostic_source(file_path) {
            continue;
        }
        let key = relative_key(project_root, Path::new(file_path))
            .unwrap_or_else(|| file_path.to_string());
        issues.entry(key).or_default().push(line.to_string());
    }
    issues
}

/// Issues merged across every batch of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueReport {
    pub issues: IssueMap,
    pub files_with_issues: BTreeSet<String>,
    pub total_issues: usize,
}

impl IssueReport {
    /// Fold one batch's issues into the running totals.
    pub fn merge(&mut self, batch: IssueMap) {
        for (file, lines) in batch {
            if lines.is_empty() {
                continue;
            }
            self.total_issues += lines.len();
            self.files_with_issues.insert(file.clone());
            self.issues.entry(file).or_default().extend(lines);
        }
    }

    /// One-line count summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "Summary: {} file(s) with issues, {} total issue(s)",
            self.files_with_issues.len(),
            self.total_issues
        )
    }

    /// Human-readable report: summary, then files in sorted order with their
    /// lines indented beneath.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", self.summary_line());
        if !self.issues.is_empty() {
            out.push_str("\nIssues found:\n");
            for (file, lines) in &self.issues {
                let _ = writeln!(out, "\n{file}:");
                for line in lines {
                    let _ = writeln!(out, "  {line}");
                }
            }
        }
        out
    }
}
