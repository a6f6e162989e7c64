//! Async driver for the gallery state machine

use parking_lot::Mutex;
use picshelf_model::{FileId, ImageSummary, Page, PageRequest};
use std::sync::Arc;

use super::state::{GalleryState, LoadError, LoadOutcome, Viewport};
use crate::infra::services::api::ApiService;

pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Infinite-scroll gallery over the backend listing.
///
/// Clones share state, so the trigger pipeline, the app shell and any number
/// of callers can hold one. The lock is never held across an `.await`.
#[derive(Debug, Clone)]
pub struct GalleryWorkflow {
    api: Arc<dyn ApiService>,
    state: Arc<Mutex<GalleryState>>,
    page_size: u32,
}

impl GalleryWorkflow {
    pub fn new(api: Arc<dyn ApiService>, page_size: u32) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(GalleryState::new())),
            page_size: page_size.max(1),
        }
    }

    /// Clears the list and fetches page 1 for `search_query`.
    pub async fn load_first_page(&self, search_query: &str) -> LoadOutcome {
        let deferred = {
            let mut state = self.state.lock();
            state.reset(search_query);
            state.reload_pending()
        };
        if deferred {
            log::debug!(
                "[Gallery] Reload for '{}' deferred until the in-flight page settles",
                search_query.trim()
            );
            return LoadOutcome::Deferred;
        }
        self.load_next_page().await
    }

    /// Restarts pagination with a new filter. Prior images are discarded.
    pub async fn search(&self, query: &str) -> LoadOutcome {
        self.load_first_page(query).await
    }

    /// Restarts pagination with the current filter.
    pub async fn reload(&self) -> LoadOutcome {
        let query = self.state.lock().search_query().to_string();
        self.load_first_page(&query).await
    }

    /// Fetches and appends the next page unless one is already in flight or
    /// the listing has ended.
    ///
    /// The request runs on its own task. Dropping the returned future does
    /// not abandon it: the page still lands and the in-flight slot is freed.
    pub async fn load_next_page(&self) -> LoadOutcome {
        let worker = self.clone();
        match tokio::spawn(async move { worker.drive_loads().await }).await {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("[Gallery] Page load task failed: {}", err);
                self.state.lock().abort_load();
                LoadOutcome::Failed(LoadError::Aborted(err.to_string()))
            }
        }
    }

    async fn drive_loads(&self) -> LoadOutcome {
        loop {
            let pending = { self.state.lock().begin_load(self.page_size) };
            let Some(pending) = pending else {
                return LoadOutcome::Skipped;
            };

            let result = self.fetch_page(&pending.request).await;
            let outcome = {
                let mut state = self.state.lock();
                let outcome = state.finish_load(pending.session, result);
                match &outcome {
                    LoadOutcome::Appended { added, has_more, .. } => {
                        log::debug!(
                            "[Gallery] Appended {} images (total {}, has_more={})",
                            added,
                            state.images().len(),
                            has_more
                        );
                    }
                    LoadOutcome::Failed(err) => {
                        log::error!("[Gallery] Error loading images: {}", err);
                    }
                    LoadOutcome::Discarded => {
                        log::debug!(
                            "[Gallery] Dropped page from superseded session {}",
                            pending.session
                        );
                    }
                    _ => {}
                }
                outcome
            };

            // A reset arrived while this request was in flight; serve it now.
            if outcome == LoadOutcome::Discarded && self.state.lock().reload_pending()
            {
                continue;
            }
            return outcome;
        }
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, LoadError> {
        let envelope = self.api.list_images(request).await?;
        let data = envelope.into_data()?;
        Ok(Page::from(data))
    }

    pub fn record_viewport(&self, viewport: Viewport) {
        self.state.lock().record_viewport(viewport);
    }

    /// Scroll offset the front end should apply after the latest append.
    pub fn take_scroll_restore(&self) -> Option<f32> {
        self.state.lock().take_scroll_restore()
    }

    pub fn can_load(&self) -> bool {
        self.state.lock().can_load()
    }

    pub fn images(&self) -> Vec<ImageSummary> {
        self.state.lock().images().to_vec()
    }

    pub fn len(&self) -> usize {
        self.state.lock().images().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().images().is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().has_more()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading()
    }

    pub fn search_query(&self) -> String {
        self.state.lock().search_query().to_string()
    }

    pub fn find(&self, file_id: &FileId) -> Option<ImageSummary> {
        self.state.lock().find(file_id).cloned()
    }

    pub fn image_url(&self, file_id: &FileId) -> String {
        self.api.image_url(file_id)
    }

    pub fn mark_loaded(&self, file_id: &FileId) -> bool {
        self.state.lock().mark_loaded(file_id)
    }

    pub fn toggle_description(&self, file_id: &FileId) -> Option<bool> {
        self.state.lock().toggle_description(file_id)
    }

    /// Runs `f` against a consistent view of the state.
    pub fn with_state<R>(&self, f: impl FnOnce(&GalleryState) -> R) -> R {
        f(&self.state.lock())
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}
