//! The user's lyrics list.
//!
//! ```text
//! Loading --load()--> Populated(items) | Empty
//!    ^                        |
//!    +-- Created / Updated ---+   (re-fetch)
//! ```

use crate::error::Result;
use crate::events::{publish, topics, LyricsBus, LyricsEvent};
use crate::models::Lyrics;
use crate::service::LyricsService;
use core_runtime::events::{Event, RecvError};
use core_runtime::scope::ComponentHandle;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this lyrics?";

/// Asks the user to confirm a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything. For hosts without interactive prompts.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    /// e.g. `Last edited: 3 Mar`
    pub last_edited: String,
}

impl From<&Lyrics> for ListItem {
    fn from(lyrics: &Lyrics) -> Self {
        Self {
            id: lyrics.id.clone(),
            title: lyrics.title.clone(),
            last_edited: format!("Last edited: {}", lyrics.last_edited()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Populated(Vec<ListItem>),
    Empty,
}

pub struct LyricsList {
    service: Arc<dyn LyricsService>,
    bus: LyricsBus,
    confirm: Arc<dyn Confirm>,
    state: watch::Sender<ListState>,
}

impl LyricsList {
    pub fn new(
        service: Arc<dyn LyricsService>,
        bus: LyricsBus,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        let (state, _) = watch::channel(ListState::Loading);
        Self {
            service,
            bus,
            confirm,
            state,
        }
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    /// Fetches the list and publishes it. On failure the previous state stays.
    pub async fn load(&self) -> Result<()> {
        let lyrics = self.service.list().await.map_err(|e| {
            warn!(error = %e, "Error loading lyrics");
            e
        })?;

        let next = if lyrics.is_empty() {
            ListState::Empty
        } else {
            ListState::Populated(lyrics.iter().map(ListItem::from).collect())
        };
        debug!(count = lyrics.len(), "Lyrics list refreshed");
        self.state.send_replace(next);
        Ok(())
    }

    /// Opens `id` in the editor.
    pub async fn activate(&self, id: &str) -> Result<()> {
        let lyrics = self.service.get_by_id(id).await.map_err(|e| {
            warn!(lyrics_id = id, error = %e, "Error opening lyrics");
            e
        })?;
        publish(&self.bus, LyricsEvent::Selected { lyrics });
        Ok(())
    }

    /// Deletes `id` after confirmation. Returns `false` when the user declined.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        if !self.confirm.confirm(DELETE_PROMPT) {
            debug!(lyrics_id = id, "Delete cancelled");
            return Ok(false);
        }

        self.service.delete(id).await.map_err(|e| {
            warn!(lyrics_id = id, error = %e, "Error deleting lyrics");
            e
        })?;
        info!(lyrics_id = id, "Lyrics deleted");

        self.load().await?;
        publish(
            &self.bus,
            LyricsEvent::Deleted {
                lyrics_id: id.to_string(),
            },
        );
        Ok(true)
    }

    pub fn request_new(&self) {
        publish(&self.bus, LyricsEvent::CreateRequested);
    }

    /// Loads the list and keeps it fresh on `Created`/`Updated` until the
    /// returned handle is disposed.
    pub fn mount(self: &Arc<Self>) -> ComponentHandle {
        let mut handle = ComponentHandle::new("lyrics-list");
        // Subscribe before spawning so nothing emitted after mount is missed.
        let mut stream = self
            .bus
            .subscribe_topics(&[topics::CREATED, topics::UPDATED]);
        let list = Arc::clone(self);

        handle.spawn(async move {
            let _ = list.load().await;
            loop {
                match stream.recv().await {
                    Ok(event) => {
                        debug!(topic = event.topic(), "Refreshing list");
                        let _ = list.load().await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "List listener lagged");
                        let _ = list.load().await;
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
    use crate::models::LyricsInput;
    use mockall::mock;
    use mockall::predicate::eq;

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

    mock! {
        Prompt {}

        impl Confirm for Prompt {
            fn confirm(&self, prompt: &str) -> bool;
        }
    }

    fn lyrics(id: &str, title: &str) -> Lyrics {
        Lyrics {
            id: id.to_string(),
            owner: "uid-1".to_string(),
            title: title.to_string(),
            content: String::new(),
            created_at: 1_709_467_200_000,
            updated_at: 1_709_467_200_000,
        }
    }

    fn list_with(service: MockService, confirm: MockPrompt, bus: &LyricsBus) -> LyricsList {
        LyricsList::new(Arc::new(service), bus.clone(), Arc::new(confirm))
    }

    #[tokio::test]
    async fn test_load_populates_items() {
        let mut service = MockService::new();
        service
            .expect_list()
            .times(1)
            .returning(|| Ok(vec![lyrics("a", "First")]));

        let list = list_with(service, MockPrompt::new(), &LyricsBus::default());
        assert_eq!(list.state(), ListState::Loading);

        list.load().await.unwrap();
        assert_eq!(
            list.state(),
            ListState::Populated(vec![ListItem {
                id: "a".into(),
                title: "First".into(),
                last_edited: "Last edited: 3 Mar".into(),
            }])
        );
    }

    #[tokio::test]
    async fn test_load_empty() {
        let mut service = MockService::new();
        service.expect_list().returning(|| Ok(vec![]));

        let list = list_with(service, MockPrompt::new(), &LyricsBus::default());
        list.load().await.unwrap();
        assert_eq!(list.state(), ListState::Empty);
    }

    #[tokio::test]
    async fn test_activate_publishes_selection() {
        let mut service = MockService::new();
        service
            .expect_get_by_id()
            .with(eq("a"))
            .returning(|id| Ok(lyrics(id, "First")));

        let bus = LyricsBus::default();
        let mut stream = bus.subscribe_topics(&[topics::SELECTED]);
        let list = list_with(service, MockPrompt::new(), &bus);

        list.activate("a").await.unwrap();
        assert_eq!(
            stream.recv().await.unwrap(),
            LyricsEvent::Selected {
                lyrics: lyrics("a", "First")
            }
        );
    }

    #[tokio::test]
    async fn test_declined_delete_does_nothing() {
        let mut service = MockService::new();
        service.expect_delete().never();

        let mut confirm = MockPrompt::new();
        confirm
            .expect_confirm()
            .with(eq(DELETE_PROMPT))
            .times(1)
            .return_const(false);

        let list = list_with(service, confirm, &LyricsBus::default());
        assert!(!list.delete("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_confirmed_delete_refreshes_and_broadcasts() {
        let mut service = MockService::new();
        service
            .expect_delete()
            .with(eq("a"))
            .times(1)
            .returning(|_| Ok(()));
        service.expect_list().times(1).returning(|| Ok(vec![]));

        let mut confirm = MockPrompt::new();
        confirm.expect_confirm().return_const(true);

        let bus = LyricsBus::default();
        let mut stream = bus.subscribe_topics(&[topics::DELETED]);
        let list = list_with(service, confirm, &bus);

        assert!(list.delete("a").await.unwrap());
        assert_eq!(list.state(), ListState::Empty);
        assert_eq!(
            stream.recv().await.unwrap(),
            LyricsEvent::Deleted {
                lyrics_id: "a".into()
            }
        );
    }

    #[tokio::test]
    async fn test_request_new() {
        let bus = LyricsBus::default();
        let mut stream = bus.subscribe_topics(&[topics::CREATE]);
        let list = list_with(MockService::new(), MockPrompt::new(), &bus);

        list.request_new();
        assert_eq!(stream.recv().await.unwrap(), LyricsEvent::CreateRequested);
    }

    #[tokio::test]
    async fn test_mount_refetches_on_created() {
        let mut service = MockService::new();
        let mut calls = 0;
        service.expect_list().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(vec![])
            } else {
                Ok(vec![lyrics("a", "New")])
            }
        });

        let bus = LyricsBus::default();
        let list = Arc::new(list_with(service, MockPrompt::new(), &bus));
        let mut watcher = list.watch();

        let handle = list.mount();
        watcher
            .wait_for(|state| *state == ListState::Empty)
            .await
            .unwrap();

        publish(
            &bus,
            LyricsEvent::Created {
                lyrics: lyrics("a", "New"),
            },
        );
        watcher
            .wait_for(|state| matches!(state, ListState::Populated(items) if items.len() == 1))
            .await
            .unwrap();

        handle.dispose().await;
    }

    #[tokio::test]
    async fn test_dispose_releases_subscription() {
        let mut service = MockService::new();
        service.expect_list().returning(|| Ok(vec![]));

        let bus = LyricsBus::default();
        let list = Arc::new(list_with(service, MockPrompt::new(), &bus));
        let before = bus.subscriber_count();

        let handle = list.mount();
        assert_eq!(bus.subscriber_count(), before + 1);

        handle.dispose().await;
        assert_eq!(bus.subscriber_count(), before);
    }
}
