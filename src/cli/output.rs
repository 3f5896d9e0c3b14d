use serde::Serialize;

use crate::tidy::aggregate::{IssueMap, IssueReport};

/// Machine-readable form of a finished analysis run.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub exit_code: i32,
    pub files_with_issues: usize,
    pub total_issues: usize,
    pub issues: &'a IssueMap,
}

impl<'a> JsonReport<'a> {
    #[must_use]
    pub fn new(exit_code: i32, report: &'a IssueReport) -> Self {
        Self {
            exit_code,
            files_with_issues: report.files_with_issues.len(),
            total_issues: report.total_issues,
            issues: &report.issues,
        }
    }
}

/// Format a result as minified JSON.
pub fn format_json<T: Serialize>(result: &T) -> String {
    serde_json::to_string(result).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

/// Format a fatal error for stderr.
pub fn format_error(err: &dyn std::fmt::Display) -> String {
    format!("Error: {err}")
}

/// Print an operator notice. In JSON mode stdout is reserved for the report.
pub fn notice(json: bool, msg: &str) {
    if json {
        eprintln!("{msg}");
    } else {
        println!("{msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_report_is_minified_and_complete() {
        let mut report = IssueReport::default();
        let mut batch = IssueMap::new();
        batch.insert("Core/Foo.cpp".into(), vec!["Core/Foo.cpp:1:1: warning: x".into()]);
        report.merge(batch);

        let json = format_json(&JsonReport::new(2, &report));
        assert!(!json.contains('\n'));
        assert!(json.contains("\"exit_code\":2"));
        assert!(json.contains("\"files_with_issues\":1"));
        assert!(json.contains("\"total_issues\":1"));
        assert!(json.contains("\"Core/Foo.cpp\":[\"Core/Foo.cpp:1:1: warning: x\"]"));
    }

    #[test]
    fn format_error_prefixes_message() {
        let err = "compile_commands.json not found in build/x";
        assert_eq!(
            format_error(&err),
            "Error: compile_commands.json not found in build/x"
        );
    }
}
