//! Line-level comment toggling in per-directory build lists.

use std::path::Path;

use crate::error::Result;

/// CMake line comment marker.
pub const COMMENT_MARKER: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestEdit {
    /// Prefix matching lines with the marker.
    Comment,
    /// Drop one leading marker from matching lines.
    Uncomment,
}

/// Apply `edit` to every line containing `needle`. Returns the rewritten
/// text and the number of lines changed. Line endings are preserved.
#[must_use]
pub fn toggle_lines(content: &str, needle: &str, edit: ManifestEdit) -> (String, usize) {
    let mut out = String::with_capacity(content.len() + 8);
    let mut changed = 0;
    for line in content.split_inclusive('\n') {
        if !line.contains(needle) {
            out.push_str(line);
            continue;
        }
        match edit {
            ManifestEdit::Comment => {
                out.push(COMMENT_MARKER);
                out.push_str(line);
                changed += 1;
            }
            ManifestEdit::Uncomment => {
                let indent = line.len() - line.trim_start().len();
                if line[indent..].starts_with(COMMENT_MARKER) {
                    out.push_str(&line[..indent]);
                    out.push_str(&line[indent + COMMENT_MARKER.len_utf8()..]);
                    changed += 1;
                } else {
                    out.push_str(line);
                }
            }
        }
    }
    (out, changed)
}

/// Rewrite a build list file in place. Returns the number of lines changed.
pub fn toggle_manifest(path: &Path, needle: &str, edit: ManifestEdit) -> Result<usize> {
    let content = std::fs::read_to_string(path)?;
    let (rewritten, changed) = toggle_lines(&content, needle, edit);
    std::fs::write(path, rewritten)?;
    if changed == 0 {
        tracing::warn!(
            manifest = %path.display(),
            needle,
            ?edit,
            "no build list line changed"
        );
    } else {
        tracing::debug!(manifest = %path.display(), needle, ?edit, changed, "build list updated");
    }
    Ok(changed)
}
