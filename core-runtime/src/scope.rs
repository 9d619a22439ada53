//! Component lifetimes.
//!
//! A mounted component owns a [`ComponentHandle`]. Every background task the
//! component starts (typically a loop draining an [`EventStream`]) is spawned
//! through the handle and shares one cancellation token, so disposing the
//! handle tears down exactly that component's listeners and nothing else.
//!
//! [`EventStream`]: crate::events::EventStream

use std::future::Future;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct ComponentHandle {
    name: &'static str,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl ComponentHandle {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            token: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Spawns `task` on the current runtime. The task is dropped, together
    /// with anything it owns, as soon as the handle is cancelled.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.token.clone();
        let name = self.name;
        self.tasks.push(tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(component = name, "Listener cancelled");
                }
                _ = task => {}
            }
        }));
    }

    /// Token shared by every task of this component.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Cancels all tasks and waits until each has released its resources.
    pub async fn dispose(mut self) {
        self.token.cancel();
        let tasks = std::mem::take(&mut self.tasks);
        let count = tasks.len();

        for result in join_all(tasks).await {
            if let Err(err) = result {
                if err.is_panic() {
                    warn!(component = self.name, error = %err, "Listener panicked");
                }
            }
        }

        debug!(component = self.name, tasks = count, "Component disposed");
    }
}

impl Drop for ComponentHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl std::fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("name", &self.name)
            .field("tasks", &self.tasks.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, EventBus, EventStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Clone)]
    struct Ping;

    impl Event for Ping {
        fn topic(&self) -> &'static str {
            "test:ping"
        }
    }

    fn listen(handle: &mut ComponentHandle, bus: &EventBus<Ping>, hits: Arc<AtomicUsize>) {
        let mut stream = EventStream::new(bus.subscribe());
        handle.spawn(async move {
            while stream.recv().await.is_ok() {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        });
    }

    #[tokio::test]
    async fn test_dispose_releases_only_own_subscriptions() {
        let bus = EventBus::<Ping>::new(8);
        let hits = Arc::new(AtomicUsize::new(0));

        let mut first = ComponentHandle::new("first");
        listen(&mut first, &bus, hits.clone());
        listen(&mut first, &bus, hits.clone());

        let mut second = ComponentHandle::new("second");
        listen(&mut second, &bus, hits.clone());

        assert_eq!(bus.subscriber_count(), 3);
        assert_eq!(first.task_count(), 2);

        first.dispose().await;
        assert_eq!(bus.subscriber_count(), 1);
        assert!(!second.is_disposed());

        bus.emit(Ping).unwrap();
        tokio::time::timeout(Duration::from_secs(1), async {
            while hits.load(Ordering::SeqCst) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        second.dispose().await;
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_drop_cancels_token() {
        let handle = ComponentHandle::new("dropped");
        let token = handle.token();
        assert!(!token.is_cancelled());

        drop(handle);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_dispose_without_tasks() {
        let handle = ComponentHandle::new("empty");
        assert_eq!(handle.task_count(), 0);
        handle.dispose().await;
    }
}
