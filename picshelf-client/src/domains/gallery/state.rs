//! Gallery pagination state machine.
//!
//! All transitions are synchronous; the async driver in
//! [`super::service`] only moves requests and results in and out.
//! Invariants kept here:
//! - at most one page request is in flight (`is_loading`)
//! - accumulated images only grow within one search session
//! - a result from an older session is never appended

use picshelf_model::{Cursor, FileId, ImageSummary, Page, PageRequest};
use thiserror::Error;

use crate::infra::services::api::ApiError;
use picshelf_model::EnvelopeError;

/// Why a page could not be appended.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Transport(#[from] ApiError),
    #[error(transparent)]
    Server(#[from] EnvelopeError),
    #[error("page load aborted: {0}")]
    Aborted(String),
}

/// Geometry a front end reports for the scroll container.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub scroll_offset: f32,
    pub viewport_height: f32,
    /// Distance from the top of the content to the end-of-list sentinel.
    pub sentinel_top: f32,
}

impl Viewport {
    pub fn bottom(&self) -> f32 {
        self.scroll_offset + self.viewport_height
    }

    /// Whether the sentinel is within `margin` of the visible area.
    pub fn is_near_end(&self, margin: f32) -> bool {
        self.sentinel_top <= self.bottom() + margin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Guard refused: nothing more to load or a request is in flight.
    Skipped,
    /// A reload was requested while a page was in flight; page 1 follows as
    /// soon as that request settles.
    Deferred,
    Appended {
        added: usize,
        has_more: bool,
        /// Scroll offset that keeps the view where it was before the load.
        restore_scroll_to: Option<f32>,
    },
    /// The result belonged to a search session that has since been reset.
    Discarded,
    Failed(LoadError),
}

/// A request handed out by [`GalleryState::begin_load`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLoad {
    pub session: u64,
    pub request: PageRequest,
}

#[derive(Debug, Clone)]
pub struct GalleryState {
    images: Vec<ImageSummary>,
    cursor: Option<Cursor>,
    has_more: bool,
    is_loading: bool,
    search_query: String,
    session: u64,
    reload_pending: bool,
    viewport: Viewport,
    bottom_before_load: Option<f32>,
    /// Restore target of the latest append, until a front end takes it.
    scroll_restore: Option<f32>,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            cursor: None,
            has_more: true,
            is_loading: false,
            search_query: String::new(),
            session: 0,
            reload_pending: false,
            viewport: Viewport::default(),
            bottom_before_load: None,
            scroll_restore: None,
        }
    }
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new search session: drops accumulated images and the cursor.
    ///
    /// If a request is in flight it keeps running; its result will be
    /// discarded and page 1 of the new session requested right after.
    pub fn reset(&mut self, search_query: &str) {
        self.session += 1;
        self.images.clear();
        self.cursor = None;
        self.has_more = true;
        self.search_query = search_query.trim().to_string();
        self.bottom_before_load = None;
        self.scroll_restore = None;
        if self.is_loading {
            self.reload_pending = true;
        }
    }

    pub fn can_load(&self) -> bool {
        self.has_more && !self.is_loading
    }

    /// Claims the single in-flight slot and returns the request to send.
    pub fn begin_load(&mut self, page_size: u32) -> Option<PendingLoad> {
        if !self.can_load() {
            return None;
        }
        self.is_loading = true;
        self.reload_pending = false;
        self.bottom_before_load = Some(self.viewport.bottom());

        let search =
            (!self.search_query.is_empty()).then_some(self.search_query.as_str());
        let request = PageRequest::first(page_size)
            .with_cursor(self.cursor.clone())
            .with_search(search);

        Some(PendingLoad {
            session: self.session,
            request,
        })
    }

    /// Applies the result of the request handed out for `session`.
    pub fn finish_load(
        &mut self,
        session: u64,
        result: Result<Page, LoadError>,
    ) -> LoadOutcome {
        self.is_loading = false;
        let bottom_before = self.bottom_before_load.take();

        if session != self.session {
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                let added = page.images.len();
                self.images.extend(page.images);
                self.has_more = page.has_more && page.next_cursor.is_some();
                self.cursor = page.next_cursor;
                let restore_scroll_to = bottom_before.map(|bottom| {
                    (bottom - self.viewport.viewport_height).max(0.0)
                });
                self.scroll_restore = restore_scroll_to;
                LoadOutcome::Appended {
                    added,
                    has_more: self.has_more,
                    restore_scroll_to,
                }
            }
            // Cursor and has_more stay as they were so a later trigger retries.
            Err(error) => LoadOutcome::Failed(error),
        }
    }

    /// Releases the in-flight slot when the request will never report back.
    pub fn abort_load(&mut self) {
        self.is_loading = false;
        self.bottom_before_load = None;
    }

    pub fn record_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Hands the pending scroll restore target to the front end, once.
    pub fn take_scroll_restore(&mut self) -> Option<f32> {
        self.scroll_restore.take()
    }

    pub fn images(&self) -> &[ImageSummary] {
        &self.images
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn reload_pending(&self) -> bool {
        self.reload_pending
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn find(&self, file_id: &FileId) -> Option<&ImageSummary> {
        self.images.iter().find(|img| &img.file_id == file_id)
    }

    /// Marks an image's thumbnail as rendered. Returns false if unknown.
    pub fn mark_loaded(&mut self, file_id: &FileId) -> bool {
        match self.images.iter_mut().find(|img| &img.file_id == file_id) {
            Some(img) => {
                img.loaded = true;
                true
            }
            None => false,
        }
    }

    pub fn toggle_description(&mut self, file_id: &FileId) -> Option<bool> {
        let img = self.images.iter_mut().find(|img| &img.file_id == file_id)?;
        img.description_expanded = !img.description_expanded;
        Some(img.description_expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::testing::stubs::sample_images;

    fn page(images: usize, next: Option<&str>, has_more: bool) -> Page {
        Page {
            images: sample_images(images),
            next_cursor: next.map(Cursor::new),
            has_more,
        }
    }

    #[test]
    fn begin_load_is_refused_while_loading() {
        let mut state = GalleryState::new();
        assert!(state.begin_load(12).is_some());
        assert!(state.is_loading());
        assert_eq!(state.begin_load(12), None);
    }

    #[test]
    fn first_request_has_no_cursor_and_no_blank_search() {
        let mut state = GalleryState::new();
        state.reset("   ");
        let pending = state.begin_load(12).unwrap();
        assert_eq!(pending.request.cursor, None);
        assert_eq!(pending.request.search, None);
        assert_eq!(pending.request.limit, 12);
    }

    #[test]
    fn terminal_page_stops_pagination() {
        let mut state = GalleryState::new();
        let pending = state.begin_load(12).unwrap();
        let outcome = state.finish_load(pending.session, Ok(page(3, None, false)));
        assert!(matches!(
            outcome,
            LoadOutcome::Appended {
                added: 3,
                has_more: false,
                ..
            }
        ));
        assert!(!state.can_load());
        assert_eq!(state.begin_load(12), None);
    }

    #[test]
    fn has_more_without_cursor_is_terminal() {
        let mut state = GalleryState::new();
        let pending = state.begin_load(12).unwrap();
        state.finish_load(pending.session, Ok(page(2, None, true)));
        assert!(!state.has_more());
    }

    #[test]
    fn failure_keeps_cursor_images_and_has_more() {
        let mut state = GalleryState::new();
        let pending = state.begin_load(2).unwrap();
        state.finish_load(pending.session, Ok(page(2, Some("c1"), true)));

        let pending = state.begin_load(2).unwrap();
        assert_eq!(pending.request.cursor, Some(Cursor::new("c1")));
        let outcome = state.finish_load(
            pending.session,
            Err(LoadError::Transport(ApiError::Network("down".into()))),
        );
        assert!(matches!(outcome, LoadOutcome::Failed(_)));
        assert!(!state.is_loading());
        assert!(state.has_more());
        assert_eq!(state.cursor(), Some(&Cursor::new("c1")));
        assert_eq!(state.images().len(), 2);

        // Retry resumes from the same cursor.
        let retry = state.begin_load(2).unwrap();
        assert_eq!(retry.request.cursor, Some(Cursor::new("c1")));
    }

    #[test]
    fn stale_session_result_is_discarded() {
        let mut state = GalleryState::new();
        let pending = state.begin_load(12).unwrap();
        state.reset("cat");
        assert!(state.reload_pending());

        let outcome = state.finish_load(pending.session, Ok(page(5, Some("x"), true)));
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(state.images().is_empty());

        let fresh = state.begin_load(12).unwrap();
        assert!(!state.reload_pending());
        assert_eq!(fresh.request.search.as_deref(), Some("cat"));
        assert_eq!(fresh.request.cursor, None);
    }

    #[test]
    fn append_reports_scroll_restore_target() {
        let mut state = GalleryState::new();
        state.record_viewport(Viewport {
            scroll_offset: 1200.0,
            viewport_height: 800.0,
            sentinel_top: 2100.0,
        });
        let pending = state.begin_load(12).unwrap();
        let outcome = state.finish_load(pending.session, Ok(page(12, Some("n"), true)));
        match outcome {
            LoadOutcome::Appended {
                restore_scroll_to, ..
            } => assert_eq!(restore_scroll_to, Some(1200.0)),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(state.take_scroll_restore(), Some(1200.0));
        assert_eq!(state.take_scroll_restore(), None);
    }

    #[test]
    fn reset_drops_pending_scroll_restore() {
        let mut state = GalleryState::new();
        let pending = state.begin_load(12).unwrap();
        state.finish_load(pending.session, Ok(page(12, Some("n"), true)));
        state.reset("");
        assert_eq!(state.take_scroll_restore(), None);
    }

    #[test]
    fn aborted_load_frees_the_slot() {
        let mut state = GalleryState::new();
        state.begin_load(12).unwrap();
        state.abort_load();
        assert!(!state.is_loading());
        assert!(state.begin_load(12).is_some());
    }

    #[test]
    fn ui_flags_toggle_on_known_images_only() {
        let mut state = GalleryState::new();
        let pending = state.begin_load(12).unwrap();
        state.finish_load(pending.session, Ok(page(2, None, false)));

        let id = state.images()[1].file_id.clone();
        assert!(state.mark_loaded(&id));
        assert!(state.find(&id).unwrap().loaded);
        assert_eq!(state.toggle_description(&id), Some(true));
        assert_eq!(state.toggle_description(&id), Some(false));
        assert!(!state.mark_loaded(&FileId::new("nope")));
    }

    #[test]
    fn near_end_uses_margin() {
        let vp = Viewport {
            scroll_offset: 0.0,
            viewport_height: 600.0,
            sentinel_top: 790.0,
        };
        assert!(vp.is_near_end(200.0));
        assert!(!vp.is_near_end(100.0));
    }
}
