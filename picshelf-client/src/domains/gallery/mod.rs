//! Gallery domain: cursor pagination, search and load-more triggers.

pub mod service;
pub mod state;
pub mod triggers;

pub use service::{DEFAULT_PAGE_SIZE, GalleryWorkflow};
pub use state::{GalleryState, LoadError, LoadOutcome, PendingLoad, Viewport};
pub use triggers::{
    TriggerEvent, TriggerPipeline, TriggerSettings, spawn_trigger_pipeline,
};
