//! Pure path resolution over the virtual file set (string-only, no I/O).
//! Used by the CSS inliner and the preview assembler to turn relative
//! references into exact file-name keys.

use std::collections::HashMap;

use crate::file::ProjectFile;

/// Resolves a reference against a base directory into a canonical lookup key.
///
/// - Empty references and scheme-like prefixes (`http…`, `//`, `data:`) never
///   resolve; the caller must leave the original literal untouched.
/// - A reference starting with `/` is project-root-relative: the remainder is
///   the key, verbatim.
/// - Otherwise the reference is joined onto `base_dir` segment by segment:
///   `..` pops (popping past the root is a no-op), `.` and empty segments are
///   skipped, anything else is appended.
///
/// # Examples
///
/// - `resolve_key("a/b/", "c.css")` → `Some("a/b/c.css")`
/// - `resolve_key("a/b/", "../c.css")` → `Some("a/c.css")`
/// - `resolve_key("a/", "/c.css")` → `Some("c.css")`
/// - `resolve_key("a/", "https://cdn.example/x.css")` → `None`
pub fn resolve_key(base_dir: &str, reference: &str) -> Option<String> {
    if reference.is_empty()
        || reference.starts_with("http")
        || reference.starts_with("//")
        || reference.starts_with("data:")
    {
        return None;
    }

    if let Some(rest) = reference.strip_prefix('/') {
        return Some(rest.to_string());
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in reference.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

/// Exact-match lookup table over the project's non-folder entries.
///
/// Lookup misses are expected and non-fatal: callers fail open, leaving the
/// original reference in place so broken links render as broken.
pub struct AssetIndex<'a> {
    files: HashMap<&'a str, &'a ProjectFile>,
}

impl<'a> AssetIndex<'a> {
    pub fn new(files: &'a [ProjectFile]) -> Self {
        Self {
            files: files
                .iter()
                .filter(|f| !f.is_folder())
                .map(|f| (f.name.as_str(), f))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&'a ProjectFile> {
        self.files.get(name).copied()
    }

    /// Resolves `reference` against `base_dir` and looks the key up. No fuzzy
    /// matching, no extension inference.
    pub fn resolve(&self, base_dir: &str, reference: &str) -> Option<&'a ProjectFile> {
        resolve_key(base_dir, reference).and_then(|key| self.get(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileKind;

    fn project() -> Vec<ProjectFile> {
        vec![
            ProjectFile::new("index.html", FileKind::Html, "<html></html>"),
            ProjectFile::new("a/b/deep.css", FileKind::Css, "body{}"),
            ProjectFile::new("a/x.css", FileKind::Css, "p{}"),
            ProjectFile::folder("a"),
        ]
    }

    #[test]
    fn resolve_dot_keeps_base() {
        assert_eq!(resolve_key("a/b/", ".").as_deref(), Some("a/b"));
    }

    #[test]
    fn resolve_parent_traversal() {
        assert_eq!(resolve_key("a/b/", "../x.css").as_deref(), Some("a/x.css"));
        assert_eq!(
            resolve_key("a/b", "../x.css"),
            resolve_key("a", "x.css"),
            "going up one level equals resolving from the parent"
        );
        assert_eq!(
            resolve_key("a/b", "x.css"),
            resolve_key("a/b/", "x.css"),
            "trailing slash on the base must not matter"
        );
    }

    #[test]
    fn resolve_pop_past_root_is_noop() {
        assert_eq!(resolve_key("", "../../x.css").as_deref(), Some("x.css"));
    }

    #[test]
    fn resolve_root_relative_ignores_base() {
        assert_eq!(resolve_key("a/b/", "/index.html").as_deref(), Some("index.html"));
    }

    #[test]
    fn resolve_skips_dot_and_empty_segments() {
        assert_eq!(
            resolve_key("a/", ".//b//deep.css").as_deref(),
            Some("a/b/deep.css")
        );
    }

    #[test]
    fn scheme_prefixes_never_resolve() {
        assert_eq!(resolve_key("a/", "http://cdn.example/x.css"), None);
        assert_eq!(resolve_key("a/", "https://cdn.example/x.css"), None);
        assert_eq!(resolve_key("a/", "//cdn.example/x.css"), None);
        assert_eq!(resolve_key("a/", "data:image/png;base64,AAAA"), None);
        assert_eq!(resolve_key("a/", ""), None);
    }

    #[test]
    fn index_resolves_exact_matches_only() {
        let files = project();
        let index = AssetIndex::new(&files);

        assert!(index.resolve("a/b/", "deep.css").is_some());
        assert!(index.resolve("a/b/", "../x.css").is_some());
        assert!(index.resolve("", "a/b/deep.css").is_some());
        assert!(index.resolve("a/b/", "missing.css").is_none());
        assert!(index.resolve("a/b/", "DEEP.css").is_none(), "no fuzzy matching");
    }

    #[test]
    fn index_skips_folder_entries() {
        let files = project();
        let index = AssetIndex::new(&files);
        assert!(index.get("a").is_none());
    }
}
