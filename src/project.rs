//! Project state: the ordered virtual file collection, open-tab bookkeeping,
//! the active view, and every file-tree mutation the explorer offers.
//!
//! Mutations are synchronous and last-writer-wins on the single in-memory
//! collection; there is no concurrent writer.

use std::collections::HashSet;

use crate::assistant::FilePayload;
use crate::error::{StudioError, StudioResult};
use crate::file::{base_name, extension, FileKind, ProjectFile, IMAGE_EXTENSIONS};

const HTML_TEMPLATE: &str = "<!DOCTYPE html>\n<html>\n<head>\n  <title>New Page</title>\n</head>\n<body>\n  <h1>Welcome</h1>\n</body>\n</html>";
const CSS_TEMPLATE: &str = "/* New CSS file */\nbody {\n  font-family: sans-serif;\n}";

/// Which pane the editor shows: a single open file, the live preview, or
/// nothing. Exactly one target at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    None,
    Preview,
    File(String),
}

impl ActiveView {
    pub fn file_name(&self) -> Option<&str> {
        match self {
            ActiveView::File(name) => Some(name),
            _ => None,
        }
    }
}

/// Result of dropping one explorer entry onto another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// A leaf file moved into a folder; carries the new name.
    Moved(String),
    /// List-position reorder, no renaming.
    Reordered,
    /// Self-drop, nothing to do.
    Ignored,
}

/// The in-memory virtual project.
///
/// File insertion order is preserved — it drives default tab ordering and
/// archive iteration. Names are unique across files and folders.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub(crate) files: Vec<ProjectFile>,
    pub(crate) open_tabs: Vec<String>,
    pub(crate) active_view: ActiveView,
    pub(crate) expanded_folders: Vec<String>,
}

impl Project {
    pub fn from_files(files: Vec<ProjectFile>) -> Self {
        Self {
            files,
            ..Self::default()
        }
    }

    pub fn files(&self) -> &[ProjectFile] {
        &self.files
    }

    pub fn open_tabs(&self) -> &[String] {
        &self.open_tabs
    }

    pub fn active_view(&self) -> &ActiveView {
        &self.active_view
    }

    pub fn expanded_folders(&self) -> &[String] {
        &self.expanded_folders
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file(&self, name: &str) -> Option<&ProjectFile> {
        self.files.iter().find(|f| f.name == name)
    }

    fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }

    // ─── Creation ────────────────────────────────────────────────────────

    /// Creates a file with a starter template inferred from the extension
    /// and opens it. Image extensions are rejected — images arrive through
    /// uploads, which carry a data URI.
    pub fn create_file(&mut self, name: &str) -> StudioResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::EmptyName);
        }
        if self.contains(name) {
            return Err(StudioError::ItemExists { name: name.to_string() });
        }

        let ext = extension(name);
        let (kind, content) = match ext.as_str() {
            "html" => (FileKind::Html, HTML_TEMPLATE.to_string()),
            "css" => (FileKind::Css, CSS_TEMPLATE.to_string()),
            ext if IMAGE_EXTENSIONS.contains(&ext) => {
                return Err(StudioError::DirectImageCreate { name: name.to_string() });
            }
            _ => (FileKind::Javascript, format!("// New file: {name}")),
        };

        self.files.push(ProjectFile::new(name, kind, content));
        self.open(name);
        Ok(name.to_string())
    }

    /// Creates a zero-content folder entry.
    pub fn create_folder(&mut self, name: &str) -> StudioResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::EmptyName);
        }
        if self.contains(name) {
            return Err(StudioError::ItemExists { name: name.to_string() });
        }
        self.files.push(ProjectFile::folder(name));
        Ok(name.to_string())
    }

    /// Inserts a file, replacing any existing entry with the same name in
    /// place (position preserved) or appending a new one.
    pub fn upsert(&mut self, file: ProjectFile) {
        match self.files.iter_mut().find(|f| f.name == file.name) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }

    /// Replaces a named file's content verbatim (manual editor change).
    pub fn set_content(&mut self, name: &str, content: &str) -> StudioResult<()> {
        match self.files.iter_mut().find(|f| f.name == name) {
            Some(file) => {
                file.content = content.to_string();
                Ok(())
            }
            None => Err(StudioError::UnknownFile { name: name.to_string() }),
        }
    }

    // ─── Deletion ────────────────────────────────────────────────────────

    /// Deletes an entry. Folders cascade to every entry under
    /// `name + "/"`. Open tabs among the deleted set are closed; if the
    /// active view was one of them it moves to the last remaining tab, else
    /// the preview when files remain, else nothing.
    pub fn delete(&mut self, name: &str) -> StudioResult<()> {
        let target = self
            .file(name)
            .ok_or_else(|| StudioError::UnknownFile { name: name.to_string() })?;
        let is_folder = target.is_folder();
        let prefix = format!("{name}/");

        let doomed = |candidate: &str| {
            candidate == name || (is_folder && candidate.starts_with(&prefix))
        };

        self.files.retain(|f| !doomed(&f.name));

        let closed: Vec<String> = self
            .open_tabs
            .iter()
            .filter(|t| doomed(t))
            .cloned()
            .collect();
        self.open_tabs.retain(|t| !doomed(t));

        let active_was_closed = self
            .active_view
            .file_name()
            .map(|n| closed.iter().any(|c| c == n))
            .unwrap_or(false);
        if active_was_closed {
            self.active_view = match self.open_tabs.last() {
                Some(tab) => ActiveView::File(tab.clone()),
                None if !self.files.is_empty() => ActiveView::Preview,
                None => ActiveView::None,
            };
        }
        Ok(())
    }

    // ─── Drag and drop ───────────────────────────────────────────────────

    /// Dispatches a drop: a leaf file dropped onto a folder moves into it,
    /// anything else is a list reorder.
    pub fn drop_onto(&mut self, dragged: &str, target: &str) -> StudioResult<DropOutcome> {
        if dragged == target {
            return Ok(DropOutcome::Ignored);
        }
        let dragged_is_folder = self
            .file(dragged)
            .ok_or_else(|| StudioError::UnknownFile { name: dragged.to_string() })?
            .is_folder();
        let target_is_folder = self
            .file(target)
            .ok_or_else(|| StudioError::UnknownFile { name: target.to_string() })?
            .is_folder();

        if target_is_folder && !dragged_is_folder {
            self.move_into_folder(dragged, target).map(DropOutcome::Moved)
        } else {
            self.reorder(dragged, target)?;
            Ok(DropOutcome::Reordered)
        }
    }

    /// Moves a leaf file into a folder, renaming it to
    /// `folder + "/" + base_name(file)`. Open tabs and the active view
    /// pointing at the old name are retargeted, and the destination folder
    /// is expanded so the file stays visible.
    ///
    /// Folders cannot be moved, and a target nested under the dragged
    /// entry's own name is refused.
    pub fn move_into_folder(&mut self, file_name: &str, folder_name: &str) -> StudioResult<String> {
        let source = self
            .file(file_name)
            .ok_or_else(|| StudioError::UnknownFile { name: file_name.to_string() })?;
        if source.is_folder() || folder_name.starts_with(&format!("{file_name}/")) {
            return Err(StudioError::MoveNotAllowed {
                file: file_name.to_string(),
                folder: folder_name.to_string(),
            });
        }

        let new_name = format!("{folder_name}/{}", base_name(file_name));
        if self.contains(&new_name) {
            return Err(StudioError::ItemExists {
                name: base_name(file_name).to_string(),
            });
        }

        let idx = self.files.iter().position(|f| f.name == file_name).unwrap();
        let mut moved = self.files.remove(idx);
        moved.name = new_name.clone();
        self.files.push(moved);

        for tab in &mut self.open_tabs {
            if tab == file_name {
                *tab = new_name.clone();
            }
        }
        if self.active_view.file_name() == Some(file_name) {
            self.active_view = ActiveView::File(new_name.clone());
        }
        if !self.expanded_folders.iter().any(|f| f == folder_name) {
            self.expanded_folders.push(folder_name.to_string());
        }
        Ok(new_name)
    }

    /// Reorders the list: the dragged entry is reinserted at the target's
    /// position. No renaming.
    pub fn reorder(&mut self, dragged: &str, target: &str) -> StudioResult<()> {
        let from = self
            .files
            .iter()
            .position(|f| f.name == dragged)
            .ok_or_else(|| StudioError::UnknownFile { name: dragged.to_string() })?;
        let moved = self.files.remove(from);
        let to = self
            .files
            .iter()
            .position(|f| f.name == target)
            .ok_or_else(|| StudioError::UnknownFile { name: target.to_string() })?;
        self.files.insert(to, moved);
        Ok(())
    }

    // ─── Tabs and views ──────────────────────────────────────────────────

    /// Opens an entry: folders toggle their expansion state, files gain a
    /// tab (if absent) and become active. Unknown names are ignored.
    pub fn open(&mut self, name: &str) {
        let Some(file) = self.file(name) else { return };
        if file.is_folder() {
            self.toggle_folder(name);
            return;
        }
        if !self.open_tabs.iter().any(|t| t == name) {
            self.open_tabs.push(name.to_string());
        }
        self.active_view = ActiveView::File(name.to_string());
    }

    pub fn toggle_folder(&mut self, name: &str) {
        if let Some(idx) = self.expanded_folders.iter().position(|f| f == name) {
            self.expanded_folders.remove(idx);
        } else {
            self.expanded_folders.push(name.to_string());
        }
    }

    pub fn set_active_view(&mut self, view: ActiveView) {
        self.active_view = view;
    }

    /// Closes a tab. When the closed tab was active, the tab immediately
    /// preceding it in the old order becomes active, or nothing remains.
    pub fn close_tab(&mut self, name: &str) {
        let Some(old_idx) = self.open_tabs.iter().position(|t| t == name) else {
            return;
        };
        self.open_tabs.remove(old_idx);

        if self.active_view.file_name() == Some(name) {
            self.active_view = if self.open_tabs.is_empty() {
                ActiveView::None
            } else {
                ActiveView::File(self.open_tabs[old_idx.saturating_sub(1)].clone())
            };
        }
    }

    // ─── Builder-flow instructions ───────────────────────────────────────

    /// Applies a builder-flow response: deletion instructions
    /// (`content == "DELETE"`) filter the file list and tabs, everything
    /// else upserts by name with the kind inferred from the extension.
    /// When tabs were closed and the active view is gone, it falls back to
    /// the first remaining tab or the preview.
    pub fn apply_instructions(&mut self, instructions: &[FilePayload]) {
        let deletions: HashSet<&str> = instructions
            .iter()
            .filter(|i| i.is_delete())
            .map(|i| i.name.as_str())
            .collect();

        self.files.retain(|f| !deletions.contains(f.name.as_str()));

        for instruction in instructions.iter().filter(|i| !i.is_delete()) {
            let kind = FileKind::from_extension(&extension(&instruction.name));
            self.upsert(ProjectFile::new(
                &instruction.name,
                kind,
                &instruction.content,
            ));
        }

        let before = self.open_tabs.len();
        self.open_tabs.retain(|t| !deletions.contains(t.as_str()));
        if self.open_tabs.len() != before {
            let active_still_open = self
                .active_view
                .file_name()
                .map(|n| self.open_tabs.iter().any(|t| t == n))
                .unwrap_or(false);
            if !active_still_open {
                self.active_view = match self.open_tabs.first() {
                    Some(tab) => ActiveView::File(tab.clone()),
                    None => ActiveView::Preview,
                };
            }
        }
    }

    // ─── Explorer listing ────────────────────────────────────────────────

    /// The rows the explorer shows: root entries plus entries whose parent
    /// folder is expanded, ordered by parent path, folders before files,
    /// then name.
    pub fn explorer_rows(&self) -> Vec<&ProjectFile> {
        let mut rows: Vec<&ProjectFile> = self
            .files
            .iter()
            .filter(|f| match f.name.rsplit_once('/') {
                None => true,
                Some((parent, _)) => self.expanded_folders.iter().any(|e| e == parent),
            })
            .collect();

        rows.sort_by(|a, b| {
            let a_parent = a.name.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
            let b_parent = b.name.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
            a_parent
                .cmp(b_parent)
                .then_with(|| b.is_folder().cmp(&a.is_folder()))
                .then_with(|| a.name.cmp(&b.name))
        });
        rows
    }
}
