//! The preview compiler: turns the virtual file set into one self-contained
//! HTML document suitable for a sandboxed iframe (srcdoc).
//!
//! Rewriting is a fixed sequence of text-level passes; each pass operates on
//! the output of the previous one. There is no HTML parser behind this — the
//! pass rules are the compatibility contract, so keep them regex-shaped.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::css::inline_css;
use crate::file::{parent_dir, FileKind, ProjectFile};
use crate::resolver::AssetIndex;

/// Placeholder returned when the project has no HTML entry document.
pub const NO_PREVIEW_DOCUMENT: &str =
    "<html><body>No HTML file found to preview. Create an index.html file.</body></html>";

fn link_tag_regex() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| {
        Regex::new(r#"<link[^>]+href=(?:"([^"']+)"|'([^"']+)')[^>]*>"#).unwrap()
    })
}

fn style_block_regex() -> &'static Regex {
    static STYLE: OnceLock<Regex> = OnceLock::new();
    STYLE.get_or_init(|| Regex::new(r"(?s)<style>(.*?)</style>").unwrap())
}

fn style_attr_regex() -> &'static Regex {
    static ATTR: OnceLock<Regex> = OnceLock::new();
    ATTR.get_or_init(|| Regex::new(r#"(?s)style=(?:"(.*?)"|'(.*?)')"#).unwrap())
}

fn script_tag_regex() -> &'static Regex {
    static SCRIPT: OnceLock<Regex> = OnceLock::new();
    SCRIPT.get_or_init(|| {
        Regex::new(r#"<script[^>]+src=(?:"([^"']+)"|'([^"']+)')[^>]*></script>"#).unwrap()
    })
}

fn src_attr_regex() -> &'static Regex {
    static SRC: OnceLock<Regex> = OnceLock::new();
    SRC.get_or_init(|| Regex::new(r#"(?i)(<[^>]*?src=["'])([^"']+)(["'])"#).unwrap())
}

fn poster_attr_regex() -> &'static Regex {
    static POSTER: OnceLock<Regex> = OnceLock::new();
    POSTER.get_or_init(|| Regex::new(r#"(?i)(<[^>]*?poster=["'])([^"']+)(["'])"#).unwrap())
}

fn srcset_attr_regex() -> &'static Regex {
    static SRCSET: OnceLock<Regex> = OnceLock::new();
    SRCSET.get_or_init(|| Regex::new(r#"(?i)(<[^>]+srcset=["'])([^"']+)(["'])"#).unwrap())
}

fn quoted_value<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or("")
}

/// Picks the document the preview renders from, in priority order: a
/// root-level `index.html`, any nested `index.html`, then any HTML file.
pub fn find_entry_file(files: &[ProjectFile]) -> Option<&ProjectFile> {
    files
        .iter()
        .find(|f| !f.is_folder() && f.name == "index.html")
        .or_else(|| {
            files
                .iter()
                .find(|f| !f.is_folder() && f.name.ends_with("/index.html"))
        })
        .or_else(|| files.iter().find(|f| !f.is_folder() && f.kind == FileKind::Html))
}

/// Compiles the current file set into a single self-contained HTML string
/// with every internal reference inlined. Idempotent and recomputed from
/// scratch on every call; never fails — a project without an HTML entry
/// degrades to [`NO_PREVIEW_DOCUMENT`].
pub fn build_preview_document(files: &[ProjectFile]) -> String {
    let Some(entry) = find_entry_file(files) else {
        debug!("no HTML entry document, emitting placeholder");
        return NO_PREVIEW_DOCUMENT.to_string();
    };
    debug!(entry = %entry.name, kind = entry.kind.as_str(), "compiling preview document");

    let index = AssetIndex::new(files);
    let entry_dir = parent_dir(&entry.name);
    let mut content = entry.content.clone();

    // 1. Linked stylesheets: <link ... href="x.css"> becomes an inline
    //    <style> wrapping the fully inlined sheet. Non-CSS links (favicons,
    //    preconnects) survive untouched.
    content = link_tag_regex()
        .replace_all(&content, |caps: &Captures| {
            let href = quoted_value(caps);
            if href.to_lowercase().ends_with(".css") {
                if let Some(file) = index.resolve(entry_dir, href) {
                    if file.kind == FileKind::Css {
                        return format!(
                            "<style>\n{}\n</style>",
                            inline_css(&file.content, &file.name, &index)
                        );
                    }
                }
            }
            caps[0].to_string()
        })
        .into_owned();

    // 2. Inline <style> blocks, resolved against the entry document itself.
    content = style_block_regex()
        .replace_all(&content, |caps: &Captures| {
            format!("<style>{}</style>", inline_css(&caps[1], &entry.name, &index))
        })
        .into_owned();

    // 3. Inline style="..." attributes, same base, preserving the quote.
    content = style_attr_regex()
        .replace_all(&content, |caps: &Captures| {
            let (quote, value) = match caps.get(1) {
                Some(m) => ('"', m.as_str()),
                None => ('\'', caps.get(2).map(|m| m.as_str()).unwrap_or("")),
            };
            format!("style={q}{}{q}", inline_css(value, &entry.name, &index), q = quote)
        })
        .into_owned();

    // 4. External scripts that resolve to a JavaScript file are inlined.
    content = script_tag_regex()
        .replace_all(&content, |caps: &Captures| {
            let src = quoted_value(caps);
            match index.resolve(entry_dir, src) {
                Some(file) if file.kind == FileKind::Javascript => {
                    format!("<script>{}</script>", file.content)
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned();

    // 5. Single-valued asset attributes (src, poster) on any tag.
    content = rewrite_attribute(&content, src_attr_regex(), entry_dir, &index);
    content = rewrite_attribute(&content, poster_attr_regex(), entry_dir, &index);

    // 6. srcset: each candidate's url is replaced, descriptors preserved.
    content = srcset_attr_regex()
        .replace_all(&content, |caps: &Captures| {
            let rewritten = rewrite_srcset(&caps[2], entry_dir, &index);
            format!("{}{}{}", &caps[1], rewritten, &caps[3])
        })
        .into_owned();

    content
}

fn rewrite_attribute(content: &str, regex: &Regex, entry_dir: &str, index: &AssetIndex) -> String {
    regex
        .replace_all(content, |caps: &Captures| {
            match index.resolve(entry_dir, &caps[2]) {
                Some(file) => format!("{}{}{}", &caps[1], file.content, &caps[3]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn rewrite_srcset(srcset: &str, entry_dir: &str, index: &AssetIndex) -> String {
    srcset
        .split(',')
        .map(|candidate| {
            let candidate = candidate.trim();
            let mut parts = candidate.split_whitespace();
            let url = parts.next().unwrap_or("");
            let descriptor = parts.collect::<Vec<_>>().join(" ");
            match index.resolve(entry_dir, url) {
                Some(file) if descriptor.is_empty() => file.content.clone(),
                Some(file) => format!("{} {}", file.content, descriptor),
                None => candidate.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
