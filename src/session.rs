//! Session layer: the conversation log, project history, and the
//! close/load/archive flows that tie the project to a persistence port.
//!
//! Persistence is a capability handed in at construction — the session never
//! reaches for ambient storage. The port is loaded once at start and flushed
//! at save points (close, load, delete-work).

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::assistant::{BuildRequest, BuildResponse, FilePayload};
use crate::error::{StudioError, StudioResult};
use crate::file::{FileKind, ProjectFile};
use crate::project::{ActiveView, Project};

/// Greeting seeding a fresh conversation.
pub const GREETING: &str = "Hello! Describe the website you want me to build.";
const CLOSED_GREETING: &str = "Alright, project closed. What should we create now?";
const FALLBACK_REPLY: &str = "I've updated the files for you.";

/// At most this many snapshots are kept in history.
const HISTORY_LIMIT: usize = 10;
/// How many tabs a restored project reopens.
const RESTORED_TAB_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            text: text.into(),
        }
    }
}

/// A project snapshot archived when a project is closed or swapped out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProject {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub files: Vec<ProjectFile>,
    pub messages: Vec<Message>,
}

/// Persistence port for the history list.
///
/// Injected at session construction; errors are surfaced to the caller but
/// never corrupt the in-memory state.
pub trait HistoryStore {
    fn load(&self) -> Result<Vec<SavedProject>, String>;
    fn save(&self, works: &[SavedProject]) -> Result<(), String>;
}

/// In-memory [`HistoryStore`], the default for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    works: Mutex<Vec<SavedProject>>,
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Vec<SavedProject>, String> {
        Ok(self.works.lock().map_err(|e| e.to_string())?.clone())
    }

    fn save(&self, works: &[SavedProject]) -> Result<(), String> {
        *self.works.lock().map_err(|e| e.to_string())? = works.to_vec();
        Ok(())
    }
}

/// One editing session: the live project, its conversation, and the history
/// of previously closed projects.
pub struct Session<S: HistoryStore> {
    project: Project,
    messages: Vec<Message>,
    history: Vec<SavedProject>,
    store: S,
}

impl<S: HistoryStore> Session<S> {
    pub fn new(store: S) -> Self {
        let history = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load project history, starting empty");
            Vec::new()
        });
        Self {
            project: Project::default(),
            messages: vec![Message::ai(GREETING)],
            history,
            store,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn history(&self) -> &[SavedProject] {
        &self.history
    }

    // ─── Builder-flow round trip ─────────────────────────────────────────

    /// Appends the user message optimistically and produces the request for
    /// the builder flow (folders excluded). Blank prompts yield nothing.
    pub fn begin_prompt(&mut self, prompt: &str) -> Option<BuildRequest> {
        if prompt.trim().is_empty() {
            return None;
        }
        self.messages.push(Message::user(prompt));
        Some(BuildRequest {
            prompt: prompt.to_string(),
            files: self
                .project
                .files()
                .iter()
                .filter(|f| !f.is_folder())
                .map(|f| FilePayload::new(&f.name, &f.content))
                .collect(),
        })
    }

    /// Applies the flow's file instructions and appends its summary message.
    pub fn apply_response(&mut self, response: &BuildResponse) {
        self.project.apply_instructions(&response.files);
        let text = if response.message.is_empty() {
            FALLBACK_REPLY
        } else {
            &response.message
        };
        self.messages.push(Message::ai(text));
    }

    /// Rolls back the optimistic user message after a failed round trip and
    /// hands the prompt text back so the input field can be restored.
    pub fn fail_prompt(&mut self) -> Option<String> {
        match self.messages.last() {
            Some(m) if m.role == Role::User => self.messages.pop().map(|m| m.text),
            _ => None,
        }
    }

    // ─── Project lifecycle ───────────────────────────────────────────────

    /// Closes the project: a non-empty project is archived to history
    /// (skipped when an identical snapshot is already there, capped at
    /// [`HISTORY_LIMIT`]), the store is flushed, and the session resets with
    /// a fresh greeting. Store failures leave the in-memory history intact.
    pub fn close_project(&mut self) -> Result<(), String> {
        let mut save_result = Ok(());
        if !self.project.is_empty() {
            if self.archive_current() {
                save_result = self.store.save(&self.history);
            }
        }
        self.project = Project::default();
        self.messages = vec![Message::ai(CLOSED_GREETING)];
        save_result
    }

    /// Restores a history snapshot: the current project is archived first
    /// (same dedup rule), the snapshot leaves the history list, and its
    /// first [`RESTORED_TAB_LIMIT`] non-folder files reopen as tabs.
    pub fn load_work(&mut self, id: &str) -> Result<(), String> {
        let idx = self
            .history
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| format!("No saved project with id {id}"))?;
        let snapshot = self.history.remove(idx);

        if !self.project.is_empty() {
            self.archive_current();
        }
        self.history.truncate(HISTORY_LIMIT);
        let save_result = self.store.save(&self.history);

        let tabs: Vec<String> = snapshot
            .files
            .iter()
            .filter(|f| !f.is_folder())
            .take(RESTORED_TAB_LIMIT)
            .map(|f| f.name.clone())
            .collect();
        let active = match tabs.first() {
            Some(first) => ActiveView::File(first.clone()),
            None => ActiveView::Preview,
        };

        self.project = Project::from_files(snapshot.files);
        self.project.open_tabs = tabs;
        self.project.active_view = active;
        self.messages = snapshot.messages;
        save_result
    }

    /// Removes a snapshot from history. A store failure restores the list.
    pub fn delete_work(&mut self, id: &str) -> Result<(), String> {
        let previous = self.history.clone();
        self.history.retain(|w| w.id != id);
        if let Err(e) = self.store.save(&self.history) {
            self.history = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Deletes a project entry; an emptied project triggers the
    /// close-and-archive flow.
    pub fn delete_entry(&mut self, name: &str) -> StudioResult<()> {
        self.project.delete(name)?;
        if self.project.is_empty() {
            // Nothing left to archive; resets the conversation.
            let _ = self.close_project();
        }
        Ok(())
    }

    /// Archives the current project unless an identical snapshot already
    /// exists. Returns whether history changed.
    fn archive_current(&mut self) -> bool {
        let duplicate = self
            .history
            .iter()
            .any(|w| w.files == self.project.files() && w.messages == self.messages);
        if duplicate {
            return false;
        }
        self.history.insert(
            0,
            SavedProject {
                id: Uuid::new_v4().to_string(),
                timestamp: Utc::now(),
                files: self.project.files().to_vec(),
                messages: self.messages.clone(),
            },
        );
        self.history.truncate(HISTORY_LIMIT);
        true
    }

    // ─── Archive and image intake ────────────────────────────────────────

    /// Replaces the project with an extracted archive: the file named
    /// `index.html` (case-insensitive) or the first extracted file opens as
    /// the single tab, otherwise the preview shows; the conversation resets
    /// to an upload greeting.
    pub fn load_archive(&mut self, archive_name: &str, files: Vec<ProjectFile>) {
        let first = files
            .iter()
            .filter(|f| !f.is_folder())
            .find(|f| f.name.to_lowercase() == "index.html")
            .or_else(|| files.iter().find(|f| !f.is_folder()))
            .map(|f| f.name.clone());

        self.project = Project::from_files(files);
        match first {
            Some(name) => {
                self.project.open_tabs = vec![name.clone()];
                self.project.active_view = ActiveView::File(name);
            }
            None => {
                self.project.active_view = ActiveView::Preview;
            }
        }
        self.messages = vec![Message::ai(format!(
            "Project \"{archive_name}\" uploaded successfully! What would you like to change?"
        ))];
    }

    /// Adds an uploaded image (already read as a data URI) and opens it.
    /// Non-image uploads are rejected.
    pub fn upload_image(&mut self, name: &str, mime: &str, data_uri: &str) -> StudioResult<()> {
        if !mime.starts_with("image/") {
            return Err(StudioError::NonImageUpload { mime: mime.to_string() });
        }
        self.project
            .upsert(ProjectFile::new(name, FileKind::Image, data_uri));
        self.project.open(name);
        Ok(())
    }

    /// Adds a generated image under a slugified-prompt file name and opens
    /// it. Returns the chosen name.
    pub fn add_generated_image(&mut self, prompt: &str, data_uri: &str) -> String {
        let name = format!("{}-{}.png", slugify(prompt), Utc::now().timestamp_millis());
        self.project
            .upsert(ProjectFile::new(&name, FileKind::Image, data_uri));
        self.project.open(&name);
        name
    }
}

/// Lowercases, strips everything outside `[a-z0-9 -]`, collapses whitespace
/// runs to `-`, and caps the result at 30 characters.
fn slugify(prompt: &str) -> String {
    let cleaned: String = prompt
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    let dashed = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    dashed.chars().take(30).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session_with_files(files: &[(&str, FileKind, &str)]) -> Session<MemoryHistoryStore> {
        let mut session = Session::new(MemoryHistoryStore::default());
        for (name, kind, content) in files {
            session.project_mut().upsert(ProjectFile::new(*name, *kind, *content));
        }
        session
    }

    #[test]
    fn new_session_greets() {
        let session = Session::new(MemoryHistoryStore::default());
        assert_eq!(session.messages(), [Message::ai(GREETING)]);
        assert!(session.project().is_empty());
    }

    #[test]
    fn begin_prompt_excludes_folders_and_blank_input() {
        let mut session = session_with_files(&[("index.html", FileKind::Html, "<h1></h1>")]);
        session.project_mut().upsert(ProjectFile::folder("assets"));

        assert!(session.begin_prompt("   ").is_none());

        let request = session.begin_prompt("make it blue").unwrap();
        assert_eq!(request.files.len(), 1);
        assert_eq!(request.files[0].name, "index.html");
        assert_eq!(session.messages().last().unwrap().role, Role::User);
    }

    #[test]
    fn fail_prompt_rolls_back_the_user_message() {
        let mut session = session_with_files(&[]);
        session.begin_prompt("make it blue");
        assert_eq!(session.fail_prompt().as_deref(), Some("make it blue"));
        assert_eq!(session.messages(), [Message::ai(GREETING)]);
        // A second rollback has nothing to undo.
        assert_eq!(session.fail_prompt(), None);
    }

    #[test]
    fn apply_response_falls_back_to_a_default_summary() {
        let mut session = session_with_files(&[]);
        session.begin_prompt("start");
        session.apply_response(&BuildResponse {
            files: vec![FilePayload::new("index.html", "<h1>hi</h1>")],
            message: String::new(),
        });
        assert_eq!(session.messages().last().unwrap().text, FALLBACK_REPLY);
        assert!(session.project().file("index.html").is_some());
    }

    #[test]
    fn close_project_archives_once_and_resets() {
        let mut session = session_with_files(&[("index.html", FileKind::Html, "<h1></h1>")]);
        session.close_project().unwrap();

        assert!(session.project().is_empty());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.messages().len(), 1);

        // Closing an identical restored project must not duplicate history.
        let id = session.history()[0].id.clone();
        session.load_work(&id).unwrap();
        assert_eq!(session.history().len(), 0);
        session.close_project().unwrap();
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn history_is_capped() {
        let mut session = session_with_files(&[]);
        for i in 0..12 {
            session
                .project_mut()
                .upsert(ProjectFile::new(format!("v{i}.html"), FileKind::Html, ""));
            session.close_project().unwrap();
        }
        assert_eq!(session.history().len(), HISTORY_LIMIT);
        // Newest first.
        assert!(session.history()[0].files.iter().any(|f| f.name == "v11.html"));
    }

    #[test]
    fn load_work_restores_a_limited_tab_set() {
        let mut session = session_with_files(&[]);
        for i in 0..7 {
            session
                .project_mut()
                .upsert(ProjectFile::new(format!("f{i}.css"), FileKind::Css, ""));
        }
        session.close_project().unwrap();
        let id = session.history()[0].id.clone();

        session.load_work(&id).unwrap();
        assert_eq!(session.project().open_tabs().len(), 5);
        assert_eq!(
            *session.project().active_view(),
            ActiveView::File("f0.css".into())
        );
    }

    #[test]
    fn load_work_with_unknown_id_fails() {
        let mut session = session_with_files(&[]);
        assert!(session.load_work("nope").is_err());
    }

    #[test]
    fn delete_last_entry_triggers_the_close_flow() {
        let mut session = session_with_files(&[("index.html", FileKind::Html, "x")]);
        session.delete_entry("index.html").unwrap();
        assert!(session.project().is_empty());
        assert_eq!(session.messages().len(), 1);
        assert!(session.history().is_empty(), "an emptied project archives nothing");
    }

    #[test]
    fn load_archive_opens_index_html_first() {
        let mut session = session_with_files(&[]);
        session.load_archive(
            "site.zip",
            vec![
                ProjectFile::folder("css"),
                ProjectFile::new("css/style.css", FileKind::Css, "body{}"),
                ProjectFile::new("index.html", FileKind::Html, "<h1></h1>"),
            ],
        );
        assert_eq!(session.project().open_tabs(), ["index.html"]);
        assert!(session.messages()[0].text.contains("site.zip"));
    }

    #[test]
    fn upload_rejects_non_images() {
        let mut session = session_with_files(&[]);
        assert!(matches!(
            session.upload_image("notes.txt", "text/plain", "data:text/plain;base64,AA"),
            Err(StudioError::NonImageUpload { .. })
        ));
        session
            .upload_image("logo.png", "image/png", "data:image/png;base64,AA")
            .unwrap();
        assert_eq!(session.project().open_tabs(), ["logo.png"]);
    }

    #[test]
    fn generated_image_names_are_slugged() {
        let mut session = session_with_files(&[]);
        let name = session.add_generated_image(
            "A Sunset over the Ocean, painted!",
            "data:image/png;base64,AA",
        );
        assert!(name.starts_with("a-sunset-over-the-ocean-paint"));
        assert!(name.ends_with(".png"));
        assert!(session.project().file(&name).is_some());
    }
}
