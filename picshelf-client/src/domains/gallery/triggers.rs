//! Load-more trigger pipeline.
//!
//! Front ends forward raw events here: sentinel visibility changes and
//! scroll/resize geometry. Geometry is recorded as it arrives so any load
//! captures the current scroll position. Visibility fires immediately; the
//! proximity check on geometry is debounced (trailing edge). Every accepted
//! trigger lands on the same guarded [`GalleryWorkflow::load_next_page`].
//! After an append, the front end reads the scroll offset to restore from
//! [`GalleryWorkflow::take_scroll_restore`].

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use super::service::GalleryWorkflow;
use super::state::Viewport;

pub const DEFAULT_SCROLL_DEBOUNCE: Duration = Duration::from_millis(200);
pub const DEFAULT_PREFETCH_MARGIN: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerEvent {
    SentinelVisibility { intersecting: bool },
    Scroll(Viewport),
    Resize(Viewport),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerSettings {
    pub debounce: Duration,
    /// Pixels before the sentinel at which the next page is requested.
    pub margin: f32,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_SCROLL_DEBOUNCE,
            margin: DEFAULT_PREFETCH_MARGIN,
        }
    }
}

/// Handle to a running pipeline. Dropping every sender stops it.
#[derive(Debug)]
pub struct TriggerPipeline {
    pub events: mpsc::Sender<TriggerEvent>,
    pub task: JoinHandle<()>,
}

pub fn spawn_trigger_pipeline(
    gallery: GalleryWorkflow,
    settings: TriggerSettings,
) -> TriggerPipeline {
    let (events, rx) = mpsc::channel(64);
    let task = tokio::spawn(run(gallery, settings, rx));
    TriggerPipeline { events, task }
}

async fn run(
    gallery: GalleryWorkflow,
    settings: TriggerSettings,
    mut rx: mpsc::Receiver<TriggerEvent>,
) {
    let mut pending: Option<Viewport> = None;
    let mut deadline = Instant::now();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                None => break,
                Some(TriggerEvent::SentinelVisibility { intersecting: true }) => {
                    request_page(&gallery);
                }
                Some(TriggerEvent::SentinelVisibility { intersecting: false }) => {}
                Some(TriggerEvent::Scroll(viewport) | TriggerEvent::Resize(viewport)) => {
                    gallery.record_viewport(viewport);
                    pending = Some(viewport);
                    deadline = Instant::now() + settings.debounce;
                }
            },
            _ = sleep_until(deadline), if pending.is_some() => {
                if let Some(viewport) = pending.take() {
                    if viewport.is_near_end(settings.margin) {
                        request_page(&gallery);
                    }
                }
            }
        }
    }
    log::debug!("[Gallery] Trigger pipeline stopped");
}

fn request_page(gallery: &GalleryWorkflow) {
    if !gallery.can_load() {
        return;
    }
    // Loads run detached so later events still reach the guard.
    let gallery = gallery.clone();
    tokio::spawn(async move {
        gallery.load_next_page().await;
    });
}
