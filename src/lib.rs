//! # Pagecraft Core
//!
//! The engine behind an AI-assisted website builder: an in-memory virtual
//! project (HTML/CSS/JS files, assets as data URIs) plus a preview compiler
//! that flattens the whole project into one self-contained HTML document for
//! sandboxed rendering.
//!
//! ## Features
//! - Virtual file model with folder semantics over flat slash-delimited names
//! - Relative/absolute path resolution against the virtual tree
//! - Recursive CSS `@import` expansion and `url(...)` inlining
//! - Multi-pass HTML rewriting (stylesheets, scripts, `src`/`poster`/`srcset`)
//! - Explorer mutations: create, cascading delete, move-into-folder, tabs
//! - Builder-flow contract (upsert/`DELETE` instructions) and session history
//! - Zip project import/export
//!
//! ## Example
//! ```
//! use pagecraft::{build_preview_document, FileKind, ProjectFile};
//!
//! let files = vec![
//!     ProjectFile::new(
//!         "index.html",
//!         FileKind::Html,
//!         r#"<link rel="stylesheet" href="style.css">"#,
//!     ),
//!     ProjectFile::new("style.css", FileKind::Css, "body{color:red}"),
//! ];
//!
//! let doc = build_preview_document(&files);
//! assert_eq!(doc, "<style>\nbody{color:red}\n</style>");
//! ```

pub mod archive;
pub mod assistant;
pub mod css;
pub mod error;
pub mod file;
pub mod preview;
pub mod project;
pub mod resolver;
pub mod session;

// --- Core types ---
pub use error::{StudioError, StudioResult};
pub use file::{base_name, extension, parent_dir, FileKind, ProjectFile};
pub use project::{ActiveView, DropOutcome, Project};

// --- Preview pipeline ---
pub use css::inline_css;
pub use preview::{build_preview_document, find_entry_file, NO_PREVIEW_DOCUMENT};
pub use resolver::{resolve_key, AssetIndex};

// --- Collaborator contracts ---
pub use archive::{export_archive, import_archive};
pub use assistant::{
    parse_build_response, ApiError, BuildRequest, BuildResponse, FilePayload, DELETE_SENTINEL,
};
pub use session::{
    HistoryStore, MemoryHistoryStore, Message, Role, SavedProject, Session, GREETING,
};
