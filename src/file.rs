use serde::{Deserialize, Serialize};

/// Extensions that map to the `Image` kind when files arrive from the
/// builder flow or a manual create.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "gif", "webp"];

/// What a project entry contains and how its `content` is interpreted.
///
/// Text kinds hold raw source text; `Image` holds a data URI; `Folder`
/// entries have empty content and exist only to shape the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Html,
    Css,
    Javascript,
    Image,
    Folder,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Html => "html",
            FileKind::Css => "css",
            FileKind::Javascript => "javascript",
            FileKind::Image => "image",
            FileKind::Folder => "folder",
        }
    }

    /// Kind inferred from a file extension. Unknown extensions fall back to
    /// `Javascript`, matching how builder-flow upserts are classified.
    pub fn from_extension(extension: &str) -> FileKind {
        match extension {
            "html" => FileKind::Html,
            "css" => FileKind::Css,
            ext if IMAGE_EXTENSIONS.contains(&ext) => FileKind::Image,
            _ => FileKind::Javascript,
        }
    }

}

/// One file or folder in the virtual project.
///
/// `name` is the full slash-delimited path and acts as the primary key:
/// folders and files share the namespace, and a folder's descendants are
/// exactly the entries whose name starts with `name + "/"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub name: String,
    pub kind: FileKind,
    pub content: String,
}

impl ProjectFile {
    pub fn new(name: impl Into<String>, kind: FileKind, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            content: content.into(),
        }
    }

    /// A zero-content folder entry.
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::Folder,
            content: String::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, FileKind::Folder)
    }
}

/// Last path segment, or `""` for an empty path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

/// Everything up to and including the last `/`, or `""` for a root-level
/// path. `parent_dir("a/b/c.css")` is `"a/b/"`.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx + 1],
        None => "",
    }
}

/// Lowercased extension of the last path segment, `""` when there is none.
pub fn extension(path: &str) -> String {
    base_name(path)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}
