//! Recursive CSS inlining: `@import` expansion and `url(...)` rewriting.
//!
//! This is text-level scanning, not a CSS parser — the rule set is kept
//! deliberately small so generated stylesheets round-trip predictably.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::file::{parent_dir, FileKind};
use crate::resolver::AssetIndex;

/// `@import "x.css";` / `@import url('x.css');` — the path must be quoted.
fn import_regex() -> &'static Regex {
    static IMPORT: OnceLock<Regex> = OnceLock::new();
    IMPORT.get_or_init(|| {
        Regex::new(r#"@import\s+(?:url\()?(?:"([^"']+)"|'([^"']+)')\)?.*;"#).unwrap()
    })
}

/// `url(path)` with an optionally quoted path.
fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r#"url\((?:"([^"]*)"|'([^']*)'|([^)]*?))\)"#).unwrap())
}

fn first_group<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
        .unwrap_or("")
}

/// Expands every `@import` in `css_text` and rewrites every `url(...)`
/// reference into the resolved file's content (a data URI for binary
/// assets). Pure over the current file set.
///
/// Unresolved imports are deleted; unresolved `url(...)` references are
/// preserved verbatim. The asymmetry is intentional — generated content
/// relies on it.
pub fn inline_css(css_text: &str, css_file_name: &str, index: &AssetIndex) -> String {
    let mut visited = HashSet::new();
    visited.insert(css_file_name.to_string());
    inline_with_visited(css_text, css_file_name, index, &mut visited)
}

/// The recursion carries a visited set of file names; a revisited stylesheet
/// is treated as an unresolved import and dropped, bounding total work to
/// the file count even for self- or mutually-importing chains.
fn inline_with_visited(
    css_text: &str,
    css_file_name: &str,
    index: &AssetIndex,
    visited: &mut HashSet<String>,
) -> String {
    let base_dir = parent_dir(css_file_name);

    // Expand imports first: nested stylesheets resolve their own url()
    // references against their own directory before the combined text is
    // scanned below.
    let expanded = import_regex().replace_all(css_text, |caps: &Captures| {
        let reference = first_group(caps);
        match index.resolve(base_dir, reference) {
            Some(file) if file.kind == FileKind::Css => {
                if !visited.insert(file.name.clone()) {
                    warn!(stylesheet = %file.name, "dropping cyclic stylesheet import");
                    return String::new();
                }
                inline_with_visited(&file.content, &file.name, index, visited)
            }
            _ => {
                debug!(reference, from = css_file_name, "dropping unresolved import");
                String::new()
            }
        }
    });

    url_regex()
        .replace_all(&expanded, |caps: &Captures| {
            let reference = first_group(caps);
            match index.resolve(base_dir, reference) {
                Some(file) => format!("url({})", file.content),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
