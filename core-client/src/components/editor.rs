//! The lyrics editor.
//!
//! The editor is hidden until a `CreateRequested` or `Selected` notification
//! arrives. Saving a valid draft creates or updates the document, announces
//! the result on the bus and hides the editor again; a failed save keeps the
//! draft open with an error message.

use crate::error::{ClientError, Result};
use crate::events::{publish, topics, LyricsBus, LyricsEvent};
use crate::models::{Lyrics, LyricsInput};
use crate::service::LyricsService;
use core_runtime::events::RecvError;
use core_runtime::scope::ComponentHandle;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const SAVE_FAILED_MESSAGE: &str = "Failed to save lyrics. Please try again.";

/// Song sections offered as one-click markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Intro,
    Verse,
    Chorus,
    Bridge,
    Outro,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Intro,
        Section::Verse,
        Section::Chorus,
        Section::Bridge,
        Section::Outro,
    ];

    pub fn marker(&self) -> &'static str {
        match self {
            Section::Intro => "--- [Intro] ---",
            Section::Verse => "--- [Verse] ---",
            Section::Chorus => "--- [Chorus] ---",
            Section::Bridge => "--- [Bridge] ---",
            Section::Outro => "--- [Outro] ---",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// An open editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// The document being edited; `None` for a new one.
    pub current: Option<Lyrics>,
    pub title: String,
    pub content: String,
    /// Message from the last failed save.
    pub error: Option<String>,
}

impl Draft {
    fn blank() -> Self {
        Self {
            current: None,
            title: String::new(),
            content: String::new(),
            error: None,
        }
    }

    fn of(lyrics: Lyrics) -> Self {
        Self {
            title: lyrics.title.clone(),
            content: lyrics.content.clone(),
            current: Some(lyrics),
            error: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.current.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Hidden,
    Editing(Draft),
}

/// Export file name for `title`: ASCII letters and digits kept, everything
/// else replaced by `_`, lowercased, `.txt` appended.
pub fn export_file_name(title: &str) -> String {
    let title = match title.trim() {
        "" => "Untitled",
        trimmed => trimmed,
    };
    let stem: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.txt")
}

/// Inserts `marker` on its own line at char index `cursor` of `content`.
/// Returns the char index just past the insertion.
fn insert_marker(content: &mut String, cursor: usize, marker: &str) -> usize {
    let byte_at = content
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(content.len());
    let cursor = content[..byte_at].chars().count();

    let mut insertion = format!("{marker}\n");
    if byte_at > 0 && !content[..byte_at].ends_with('\n') {
        insertion.insert(0, '\n');
    }

    content.insert_str(byte_at, &insertion);
    cursor + insertion.chars().count()
}

pub struct LyricsEditor {
    service: Arc<dyn LyricsService>,
    bus: LyricsBus,
    state: watch::Sender<EditorState>,
}

impl LyricsEditor {
    pub fn new(service: Arc<dyn LyricsService>, bus: LyricsBus) -> Self {
        let (state, _) = watch::channel(EditorState::Hidden);
        Self {
            service,
            bus,
            state,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<EditorState> {
        self.state.subscribe()
    }

    pub fn is_visible(&self) -> bool {
        matches!(*self.state.borrow(), EditorState::Editing(_))
    }

    pub fn open_new(&self) {
        debug!("Editor opened for new lyrics");
        self.state.send_replace(EditorState::Editing(Draft::blank()));
    }

    pub fn open_existing(&self, lyrics: Lyrics) {
        debug!(lyrics_id = %lyrics.id, "Editor opened");
        self.state.send_replace(EditorState::Editing(Draft::of(lyrics)));
    }

    fn edit<R>(&self, f: impl FnOnce(&mut Draft) -> R) -> Result<R> {
        let mut result = None;
        self.state.send_if_modified(|state| match state {
            EditorState::Editing(draft) => {
                result = Some(f(draft));
                true
            }
            EditorState::Hidden => false,
        });
        result.ok_or(ClientError::NotEditing)
    }

    pub fn set_title(&self, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        self.edit(|draft| draft.title = title)
    }

    pub fn set_content(&self, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        self.edit(|draft| draft.content = content)
    }

    /// Inserts the marker for `section` at char index `cursor` of the
    /// content, starting a new line if needed. Returns the new cursor.
    pub fn insert_template(&self, section: Section, cursor: usize) -> Result<usize> {
        self.edit(|draft| insert_marker(&mut draft.content, cursor, section.marker()))
    }

    /// Validates and stores the draft.
    ///
    /// An empty title is reported without calling the service. On success
    /// the stored document is announced and the editor hides.
    pub async fn save(&self) -> Result<Lyrics> {
        let draft = match self.state() {
            EditorState::Editing(draft) => draft,
            EditorState::Hidden => return Err(ClientError::NotEditing),
        };

        let title = draft.title.trim().to_string();
        let content = draft.content.trim().to_string();
        if title.is_empty() {
            let _ = self.edit(|d| d.error = Some(ClientError::EmptyTitle.to_string()));
            return Err(ClientError::EmptyTitle);
        }

        let input = LyricsInput::new(title, content);
        let saved = match &draft.current {
            Some(current) => self.service.update(&current.id, &input).await,
            None => self.service.create(&input).await,
        };

        match saved {
            Ok(lyrics) => {
                info!(lyrics_id = %lyrics.id, new = draft.is_new(), "Lyrics saved");
                let event = if draft.is_new() {
                    LyricsEvent::Created {
                        lyrics: lyrics.clone(),
                    }
                } else {
                    LyricsEvent::Updated {
                        lyrics: lyrics.clone(),
                    }
                };
                self.state.send_replace(EditorState::Hidden);
                publish(&self.bus, event);
                Ok(lyrics)
            }
            Err(e) => {
                warn!(error = %e, "Error saving lyrics");
                let _ = self.edit(|d| d.error = Some(SAVE_FAILED_MESSAGE.to_string()));
                Err(e)
            }
        }
    }

    /// Discards the draft.
    pub fn cancel(&self) {
        self.state.send_replace(EditorState::Hidden);
    }

    pub fn export_file_name(&self) -> Result<String> {
        self.edit(|draft| export_file_name(&draft.title))
    }

    /// Writes the draft content to `dir` and returns the file path.
    pub async fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        let (name, content) = self.edit(|draft| {
            (export_file_name(&draft.title), draft.content.clone())
        })?;
        let path = dir.join(name);
        tokio::fs::write(&path, content).await?;
        info!(path = %path.display(), "Lyrics exported");
        Ok(path)
    }

    /// Opens the editor on `CreateRequested` and `Selected` until the
    /// returned handle is disposed.
    ///
    /// A lagging listener loses only the oldest notifications. The newer
    /// ones still arrive and each open replaces the draft, so the editor
    /// settles on the most recent request.
    pub fn mount(self: &Arc<Self>) -> ComponentHandle {
        let mut handle = ComponentHandle::new("lyrics-editor");
        let mut stream = self
            .bus
            .subscribe_topics(&[topics::CREATE, topics::SELECTED]);
        let editor = Arc::clone(self);

        handle.spawn(async move {
            loop {
                match stream.recv().await {
                    Ok(LyricsEvent::CreateRequested) => editor.open_new(),
                    Ok(LyricsEvent::Selected { lyrics }) => editor.open_existing(lyrics),
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            skipped,
                            topics = ?[topics::CREATE, topics::SELECTED],
                            "Editor listener lagged; older open requests dropped"
                        );
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::{always, eq};

    mock! {
        Service {}

        #[async_trait::async_trait]
        impl LyricsService for Service {
            async fn create(&self, input: &LyricsInput) -> Result<Lyrics>;
            async fn list(&self) -> Result<Vec<Lyrics>>;
            async fn get_by_id(&self, id: &str) -> Result<Lyrics>;
            async fn update(&self, id: &str, input: &LyricsInput) -> Result<Lyrics>;
            async fn delete(&self, id: &str) -> Result<()>;
        }
    }

    fn stored(id: &str, title: &str, content: &str) -> Lyrics {
        Lyrics {
            id: id.to_string(),
            owner: "uid-1".to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: 1,
            updated_at: 1,
        }
    }

    fn editor_with(service: MockService, bus: &LyricsBus) -> LyricsEditor {
        LyricsEditor::new(Arc::new(service), bus.clone())
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("My Song!"), "my_song_.txt");
        assert_eq!(export_file_name("  "), "untitled.txt");
        assert_eq!(export_file_name("Åh nej"), "_h_nej.txt");
    }

    #[test]
    fn test_insert_marker() {
        let mut content = String::new();
        let cursor = insert_marker(&mut content, 0, Section::Verse.marker());
        assert_eq!(content, "--- [Verse] ---\n");
        assert_eq!(cursor, content.chars().count());

        let mut content = "first line".to_string();
        let cursor = insert_marker(&mut content, 10, Section::Chorus.marker());
        assert_eq!(content, "first line\n--- [Chorus] ---\n");
        assert_eq!(cursor, content.chars().count());

        let mut content = "a\nb".to_string();
        insert_marker(&mut content, 2, Section::Bridge.marker());
        assert_eq!(content, "a\n--- [Bridge] ---\nb");

        // Cursor beyond the end appends.
        let mut content = "é".to_string();
        insert_marker(&mut content, 99, Section::Outro.marker());
        assert_eq!(content, "é\n--- [Outro] ---\n");
    }

    #[tokio::test]
    async fn test_hidden_editor_rejects_edits() {
        let editor = editor_with(MockService::new(), &LyricsBus::default());
        assert!(matches!(editor.set_title("x"), Err(ClientError::NotEditing)));
        assert!(matches!(editor.save().await, Err(ClientError::NotEditing)));
    }

    #[tokio::test]
    async fn test_empty_title_skips_service() {
        let mut service = MockService::new();
        service.expect_create().never();

        let editor = editor_with(service, &LyricsBus::default());
        editor.open_new();
        editor.set_title("   ").unwrap();

        assert!(matches!(editor.save().await, Err(ClientError::EmptyTitle)));
        match editor.state() {
            EditorState::Editing(draft) => assert_eq!(
                draft.error.as_deref(),
                Some("Please enter a title for your lyrics.")
            ),
            EditorState::Hidden => panic!("editor should stay open"),
        }
    }

    #[tokio::test]
    async fn test_save_new_creates_and_broadcasts() {
        let mut service = MockService::new();
        service
            .expect_create()
            .with(eq(LyricsInput::new("Song", "words")))
            .times(1)
            .returning(|input| {
                Ok(stored(
                    "new-id",
                    input.title.as_deref().unwrap_or_default(),
                    input.content.as_deref().unwrap_or_default(),
                ))
            });

        let bus = LyricsBus::default();
        let mut stream = bus.subscribe_topics(&[topics::CREATED]);
        let editor = editor_with(service, &bus);

        editor.open_new();
        editor.set_title("  Song ").unwrap();
        editor.set_content("words\n\n").unwrap();

        let saved = editor.save().await.unwrap();
        assert_eq!(saved.id, "new-id");
        assert_eq!(editor.state(), EditorState::Hidden);
        assert_eq!(
            stream.recv().await.unwrap(),
            LyricsEvent::Created { lyrics: saved }
        );
    }

    #[tokio::test]
    async fn test_save_existing_updates() {
        let mut service = MockService::new();
        service
            .expect_update()
            .with(eq("abc"), always())
            .times(1)
            .returning(|id, _| Ok(stored(id, "Renamed", "")));
        service.expect_create().never();

        let bus = LyricsBus::default();
        let mut stream = bus.subscribe_topics(&[topics::UPDATED]);
        let editor = editor_with(service, &bus);

        editor.open_existing(stored("abc", "Old", ""));
        editor.set_title("Renamed").unwrap();
        editor.save().await.unwrap();

        assert!(matches!(
            stream.recv().await.unwrap(),
            LyricsEvent::Updated { lyrics } if lyrics.title == "Renamed"
        ));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_draft() {
        let mut service = MockService::new();
        service.expect_create().returning(|_| {
            Err(ClientError::Api {
                status: 400,
                message: "Maximum number of lyrics reached (50). Please delete some lyrics to create new ones.".into(),
            })
        });

        let editor = editor_with(service, &LyricsBus::default());
        editor.open_new();
        editor.set_title("Song").unwrap();

        assert!(editor.save().await.is_err());
        match editor.state() {
            EditorState::Editing(draft) => {
                assert_eq!(draft.title, "Song");
                assert_eq!(draft.error.as_deref(), Some(SAVE_FAILED_MESSAGE));
            }
            EditorState::Hidden => panic!("editor should stay open"),
        }
    }

    #[tokio::test]
    async fn test_cancel_discards_draft() {
        let editor = editor_with(MockService::new(), &LyricsBus::default());
        editor.open_new();
        editor.set_title("Draft").unwrap();
        editor.cancel();

        assert_eq!(editor.state(), EditorState::Hidden);
        editor.open_new();
        match editor.state() {
            EditorState::Editing(draft) => assert!(draft.title.is_empty()),
            EditorState::Hidden => panic!("editor should be open"),
        }
    }

    #[tokio::test]
    async fn test_export_to_writes_content() {
        let dir = tempfile::tempdir().unwrap();
        let editor = editor_with(MockService::new(), &LyricsBus::default());
        editor.open_existing(stored("abc", "Night Drive", "la la"));

        let path = editor.export_to(dir.path()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "night_drive.txt");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "la la");
    }

    #[tokio::test]
    async fn test_mount_follows_notifications() {
        let bus = LyricsBus::default();
        let editor = Arc::new(editor_with(MockService::new(), &bus));
        let mut watcher = editor.watch();
        let handle = editor.mount();

        publish(&bus, LyricsEvent::CreateRequested);
        watcher
            .wait_for(|state| matches!(state, EditorState::Editing(d) if d.is_new()))
            .await
            .unwrap();

        publish(
            &bus,
            LyricsEvent::Selected {
                lyrics: stored("abc", "Picked", "text"),
            },
        );
        watcher
            .wait_for(|state| matches!(state, EditorState::Editing(d) if d.title == "Picked"))
            .await
            .unwrap();

        let subscribers = bus.subscriber_count();
        handle.dispose().await;
        assert_eq!(bus.subscriber_count(), subscribers - 1);
    }

    #[tokio::test]
    async fn test_lagged_editor_settles_on_latest_request() {
        let bus = LyricsBus::new(2);
        let editor = Arc::new(editor_with(MockService::new(), &bus));
        let mut watcher = editor.watch();
        let handle = editor.mount();

        // The listener has not run yet, so the first event overflows its buffer.
        publish(&bus, LyricsEvent::CreateRequested);
        publish(
            &bus,
            LyricsEvent::Selected {
                lyrics: stored("a", "First", ""),
            },
        );
        publish(
            &bus,
            LyricsEvent::Selected {
                lyrics: stored("b", "Second", ""),
            },
        );

        watcher
            .wait_for(|state| matches!(state, EditorState::Editing(d) if d.title == "Second"))
            .await
            .unwrap();

        handle.dispose().await;
    }
}
