//! Session-scoped store for the enriched catalog.
//!
//! One [`SessionStore`] lives for the whole process session and is handed to
//! every consumer. The bootstrap is its only writer; readers take cheap
//! snapshots (`Arc`) of the collections.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tracing::debug;

use yanaflow_shared::{Catalog, Course, Event, Teacher};

/// Lifecycle of the store within one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing fetched yet.
    Uninitialized,
    /// A bootstrap is fetching and joining.
    Loading,
    /// Collections are populated and final for the session.
    Ready,
    /// The last bootstrap failed; another attempt is allowed.
    Failed(String),
}

impl LoadState {
    /// `Ready` or `Failed`: no bootstrap is in flight.
    pub fn is_settled(&self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Failed(_))
    }
}

/// In-memory catalog plus its load state.
#[derive(Debug)]
pub struct SessionStore {
    teachers: RwLock<Arc<Vec<Teacher>>>,
    courses: RwLock<Arc<Vec<Course>>>,
    events: RwLock<Arc<Vec<Event>>>,
    state: watch::Sender<LoadState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// An empty, uninitialized store.
    pub fn new() -> Self {
        let (state, _) = watch::channel(LoadState::Uninitialized);
        Self {
            teachers: RwLock::new(Arc::default()),
            courses: RwLock::new(Arc::default()),
            events: RwLock::new(Arc::default()),
            state,
        }
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Whether the catalog has been loaded for this session.
    pub fn is_initialized(&self) -> bool {
        *self.state.borrow() == LoadState::Ready
    }

    /// Flip the initialized flag. `false` resets to `Uninitialized`.
    pub fn set_initialized(&self, status: bool) {
        let next = if status {
            LoadState::Ready
        } else {
            LoadState::Uninitialized
        };
        debug!(state = ?next, "store state changed");
        self.state.send_replace(next);
    }

    /// Claim the store for a load. Returns `false` if a load is already in
    /// flight or the store is ready.
    pub(crate) fn begin_loading(&self) -> bool {
        self.state.send_if_modified(|state| match state {
            LoadState::Uninitialized | LoadState::Failed(_) => {
                *state = LoadState::Loading;
                true
            }
            LoadState::Loading | LoadState::Ready => false,
        })
    }

    /// Record a failed load; the collections are left untouched.
    pub(crate) fn mark_failed(&self, reason: impl Into<String>) {
        self.state.send_replace(LoadState::Failed(reason.into()));
    }

    /// Wait until no load is in flight and return the resulting state.
    pub async fn wait_settled(&self) -> LoadState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(LoadState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Wait until the catalog is loaded. Failed attempts keep the caller
    /// waiting for a later successful one.
    pub async fn wait_ready(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| *state == LoadState::Ready).await;
    }

    // -----------------------------------------------------------------------
    // Writers (whole-collection overwrite)
    // -----------------------------------------------------------------------

    pub async fn set_teachers(&self, teachers: Vec<Teacher>) {
        *self.teachers.write().await = Arc::new(teachers);
    }

    pub async fn set_courses(&self, courses: Vec<Course>) {
        *self.courses.write().await = Arc::new(courses);
    }

    pub async fn set_events(&self, events: Vec<Event>) {
        *self.events.write().await = Arc::new(events);
    }

    // -----------------------------------------------------------------------
    // Readers
    // -----------------------------------------------------------------------

    pub async fn teachers(&self) -> Arc<Vec<Teacher>> {
        Arc::clone(&*self.teachers.read().await)
    }

    pub async fn courses(&self) -> Arc<Vec<Course>> {
        Arc::clone(&*self.courses.read().await)
    }

    pub async fn events(&self) -> Arc<Vec<Event>> {
        Arc::clone(&*self.events.read().await)
    }

    /// Owned copy of all three collections.
    pub async fn snapshot(&self) -> Catalog {
        Catalog {
            teachers: self.teachers().await.as_ref().clone(),
            courses: self.courses().await.as_ref().clone(),
            events: self.events().await.as_ref().clone(),
        }
    }

    /// Teacher whose page lives at `path`. With duplicate slugs the lowest id wins.
    pub async fn teacher_by_path(&self, path: &str) -> Option<Teacher> {
        self.teachers().await.iter().find(|t| t.path == path).cloned()
    }

    /// Course whose page lives at `path`. With duplicate slugs the lowest id wins.
    pub async fn course_by_path(&self, path: &str) -> Option<Course> {
        self.courses().await.iter().find(|c| c.path == path).cloned()
    }

    /// Event whose page lives at `path`; first in start order on duplicates.
    pub async fn event_by_path(&self, path: &str) -> Option<Event> {
        self.events().await.iter().find(|e| e.path == path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn teacher(id: i64, path: &str) -> Teacher {
        Teacher {
            id,
            first_name: "Ana".into(),
            last_name: "Lee".into(),
            origin_country: None,
            image_url: None,
            bio: None,
            insta_tag: None,
            quote: None,
            featured_in: None,
            path: path.into(),
            courses: vec![],
            events: vec![],
        }
    }

    #[tokio::test]
    async fn new_store_is_empty_and_uninitialized() {
        let store = SessionStore::new();
        assert!(!store.is_initialized());
        assert_eq!(store.state(), LoadState::Uninitialized);
        assert!(store.teachers().await.is_empty());
        assert!(store.courses().await.is_empty());
        assert!(store.events().await.is_empty());
    }

    #[tokio::test]
    async fn setters_overwrite_whole_collection() {
        let store = SessionStore::new();
        store
            .set_teachers(vec![teacher(1, "ana-lee"), teacher(2, "mara-costa")])
            .await;
        store.set_teachers(vec![teacher(3, "jonas-van-dijk")]).await;

        let teachers = store.teachers().await;
        assert_eq!(teachers.len(), 1);
        assert_eq!(teachers[0].id, 3);
    }

    #[tokio::test]
    async fn snapshots_survive_later_writes() {
        let store = SessionStore::new();
        store.set_teachers(vec![teacher(1, "ana-lee")]).await;
        let before = store.teachers().await;
        store.set_teachers(vec![]).await;
        assert_eq!(before.len(), 1);
        assert!(store.teachers().await.is_empty());
    }

    #[tokio::test]
    async fn lookup_by_path() {
        let store = SessionStore::new();
        store
            .set_teachers(vec![teacher(1, "ana-lee"), teacher(2, "ana-lee")])
            .await;
        assert_eq!(store.teacher_by_path("ana-lee").await.map(|t| t.id), Some(1));
        assert!(store.teacher_by_path("nobody").await.is_none());
        assert!(store.course_by_path("vinyasa-flow").await.is_none());
        assert!(store.event_by_path("open-house").await.is_none());
    }

    #[test]
    fn loading_claim_is_exclusive() {
        let store = SessionStore::new();
        assert!(store.begin_loading());
        assert!(!store.begin_loading());
        assert_eq!(store.state(), LoadState::Loading);

        store.mark_failed("boom");
        assert_eq!(store.state(), LoadState::Failed("boom".into()));
        assert!(!store.is_initialized());

        // A failed load may be retried.
        assert!(store.begin_loading());
        store.set_initialized(true);
        assert!(store.is_initialized());
        assert!(!store.begin_loading());

        store.set_initialized(false);
        assert_eq!(store.state(), LoadState::Uninitialized);
    }

    #[tokio::test]
    async fn wait_ready_resolves_after_initialization() {
        let store = Arc::new(SessionStore::new());
        assert!(store.begin_loading());

        let waiter = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.wait_ready().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        store.set_initialized(true);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter finished")
            .expect("waiter joined");
    }

    #[tokio::test]
    async fn wait_settled_reports_failure() {
        let store = Arc::new(SessionStore::new());
        assert!(store.begin_loading());

        let waiter = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.wait_settled().await })
        };

        store.mark_failed("network down");
        let state = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter finished")
            .expect("waiter joined");
        assert_eq!(state, LoadState::Failed("network down".into()));
    }

    #[tokio::test]
    async fn wait_ready_returns_immediately_when_ready() {
        let store = SessionStore::new();
        store.set_initialized(true);
        tokio::time::timeout(Duration::from_millis(100), store.wait_ready())
            .await
            .expect("already ready");
    }
}
