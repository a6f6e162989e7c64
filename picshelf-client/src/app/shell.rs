use std::path::{Path, PathBuf};
use std::sync::Arc;

use picshelf_model::FileId;

use crate::common::messages::CrossDomainEvent;
use crate::config::ClientConfig;
use crate::domains::gallery::{
    GalleryWorkflow, LoadOutcome, TriggerPipeline, spawn_trigger_pipeline,
};
use crate::domains::preview::{DownloadError, ImagePreview, PreviewWorkflow};
use crate::domains::ui::notices::Notifier;
use crate::domains::upload::{UploadOutcome, UploadWorkflow};
use crate::infra::adapters::ApiClientAdapter;
use crate::infra::api_client::ApiClient;
use crate::infra::services::api::{ApiResult, ApiService};

/// Top-level client state.
///
/// Owns the single transport instance and hands clones of it to every
/// workflow, so all requests share one connection pool and base URL.
#[derive(Debug)]
pub struct App {
    config: ClientConfig,
    api: Arc<dyn ApiService>,
    notifier: Notifier,
    pub gallery: GalleryWorkflow,
    pub upload: UploadWorkflow,
    pub preview: PreviewWorkflow,
    upload_panel_open: bool,
    active_preview: Option<ImagePreview>,
}

impl App {
    /// Builds the HTTP transport from `config`.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let client =
            ApiClient::with_timeout(&config.api_url, config.request_timeout)?;
        log::info!("[App] Using image API at {}", client.base_url());
        let api: Arc<dyn ApiService> =
            Arc::new(ApiClientAdapter::new(Arc::new(client)));
        Ok(Self::with_api(config, api))
    }

    pub fn with_api(config: ClientConfig, api: Arc<dyn ApiService>) -> Self {
        let notifier = Notifier::new();
        Self {
            gallery: GalleryWorkflow::new(Arc::clone(&api), config.page_size),
            upload: UploadWorkflow::new(Arc::clone(&api), notifier.clone()),
            preview: PreviewWorkflow::new(Arc::clone(&api)),
            config,
            api,
            notifier,
            upload_panel_open: false,
            active_preview: None,
        }
    }

    /// Initial load: page 1, no filter.
    pub async fn start(&self) -> LoadOutcome {
        self.gallery.load_first_page("").await
    }

    pub async fn search(&self, query: &str) -> LoadOutcome {
        self.gallery.search(query).await
    }

    /// Starts the scroll/visibility pipeline for this app's gallery.
    pub fn spawn_triggers(&self) -> TriggerPipeline {
        spawn_trigger_pipeline(
            self.gallery.clone(),
            self.config.trigger_settings(),
        )
    }

    pub fn open_upload_panel(&mut self) {
        self.upload_panel_open = true;
    }

    /// Closing the panel abandons the draft.
    pub fn close_upload_panel(&mut self) {
        self.upload_panel_open = false;
        self.upload.reset();
    }

    pub fn is_upload_panel_open(&self) -> bool {
        self.upload_panel_open
    }

    /// Submits the upload form; on success the panel closes and the gallery
    /// reloads from page 1 with the current filter.
    pub async fn submit_upload(&mut self) -> UploadOutcome {
        let outcome = self.upload.submit().await;
        if outcome.is_completed() {
            self.handle_event(CrossDomainEvent::UploadCompleted).await;
        }
        outcome
    }

    pub async fn open_preview(&mut self, file_id: &FileId) -> Option<&ImagePreview> {
        self.handle_event(CrossDomainEvent::OpenPreview(file_id.clone()))
            .await;
        self.active_preview.as_ref()
    }

    pub async fn close_preview(&mut self) {
        self.handle_event(CrossDomainEvent::ClosePreview).await;
    }

    pub fn active_preview(&self) -> Option<&ImagePreview> {
        self.active_preview.as_ref()
    }

    /// Downloads the open preview into `dir`, or the configured download
    /// directory when `dir` is `None`.
    pub async fn download_active(
        &self,
        dir: Option<&Path>,
    ) -> Option<Result<PathBuf, DownloadError>> {
        let preview = self.active_preview.as_ref()?;
        let dir = dir.unwrap_or(self.config.download_dir.as_path());
        let result = self.preview.download(preview, dir).await;
        if let Err(err) = &result {
            self.notifier.error(format!("Download failed: {}", err));
        }
        Some(result)
    }

    pub async fn handle_event(&mut self, event: CrossDomainEvent) {
        log::debug!("[App] {:?}", event);
        match event {
            CrossDomainEvent::UploadCompleted => {
                self.upload_panel_open = false;
                self.gallery.reload().await;
            }
            CrossDomainEvent::OpenPreview(file_id) => {
                match self.gallery.find(&file_id) {
                    Some(image) => {
                        self.active_preview = Some(self.preview.open(&image));
                    }
                    None => {
                        log::warn!("[App] No image {} in the gallery", file_id);
                    }
                }
            }
            CrossDomainEvent::ClosePreview => {
                self.active_preview = None;
            }
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &Arc<dyn ApiService> {
        &self.api
    }
}
