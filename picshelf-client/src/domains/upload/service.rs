//! Upload workflow: select, validate, submit, report.

use parking_lot::Mutex;
use picshelf_model::{FileRejection, UploadDraft, UploadFile};
use std::path::Path;
use std::sync::Arc;

use super::files::{PickedFile, SelectFileError, read_picked_file};
use crate::domains::ui::notices::Notifier;
use crate::infra::services::api::ApiService;

pub const UPLOAD_SUCCESS_NOTICE: &str = "Image uploaded successfully!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Missing title, description or file. Nothing was sent.
    Incomplete,
    /// The backend accepted the upload; the draft has been cleared.
    Completed { message: String },
    /// Transport or backend failure; the draft is kept for a retry.
    Failed { message: String },
}

impl UploadOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, UploadOutcome::Completed { .. })
    }
}

#[derive(Debug, Default)]
struct UploadState {
    draft: UploadDraft,
    /// Submissions sent and not yet answered.
    in_flight: usize,
}

/// Upload form state plus submission. Clones share state so a front end can
/// watch `is_uploading` while a submit is pending.
#[derive(Debug, Clone)]
pub struct UploadWorkflow {
    api: Arc<dyn ApiService>,
    notifier: Notifier,
    state: Arc<Mutex<UploadState>>,
}

impl UploadWorkflow {
    pub fn new(api: Arc<dyn ApiService>, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            state: Arc::new(Mutex::new(UploadState::default())),
        }
    }

    /// Validates and stores `file` as the selection.
    ///
    /// A rejected file leaves any previous selection in place and raises an
    /// error notice.
    pub fn select_file(&self, file: PickedFile) -> Result<(), FileRejection> {
        match UploadFile::new(file.name, &file.content_type, file.bytes) {
            Ok(valid) => {
                log::debug!(
                    "[Upload] Selected '{}' ({}, {} bytes)",
                    valid.file_name(),
                    valid.media_type(),
                    valid.size()
                );
                self.state.lock().draft.select_file(valid);
                Ok(())
            }
            Err(rejection) => {
                log::warn!("[Upload] Rejected selection: {:?}", rejection);
                self.notifier.error(rejection.to_string());
                Err(rejection)
            }
        }
    }

    /// Drag-and-drop entry point. Only the first dropped file is considered.
    pub fn drop_files(
        &self,
        files: Vec<PickedFile>,
    ) -> Result<(), FileRejection> {
        let count = files.len();
        let Some(first) = files.into_iter().next() else {
            return Ok(());
        };
        if count > 1 {
            log::debug!("[Upload] Ignoring {} extra dropped files", count - 1);
        }
        self.select_file(first)
    }

    /// File-picker entry point for a path on disk.
    pub async fn select_path(&self, path: &Path) -> Result<(), SelectFileError> {
        match read_picked_file(path).await {
            Ok(picked) => Ok(self.select_file(picked)?),
            Err(SelectFileError::Rejected(rejection)) => {
                log::warn!(
                    "[Upload] Rejected {}: {:?}",
                    path.display(),
                    rejection
                );
                self.notifier.error(rejection.to_string());
                Err(SelectFileError::Rejected(rejection))
            }
            Err(err) => {
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.state.lock().draft.title = title.into();
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.state.lock().draft.description = description.into();
    }

    pub fn set_dimensions(&self, width: Option<u32>, height: Option<u32>) {
        let mut state = self.state.lock();
        state.draft.width = width;
        state.draft.height = height;
    }

    /// Sends the draft. An incomplete draft is a silent no-op.
    pub async fn submit(&self) -> UploadOutcome {
        let form = {
            let mut state = self.state.lock();
            let Some(form) = state.draft.to_form() else {
                log::debug!("[Upload] Submit ignored: draft incomplete");
                return UploadOutcome::Incomplete;
            };
            state.in_flight += 1;
            form
        };

        let result = self.api.upload_image(form).await;

        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        let failure = match result {
            Ok(envelope) => match envelope.into_result() {
                Ok(_) => {
                    log::info!("[Upload] Upload accepted");
                    state.draft.reset();
                    self.notifier.info(UPLOAD_SUCCESS_NOTICE);
                    return UploadOutcome::Completed {
                        message: UPLOAD_SUCCESS_NOTICE.to_string(),
                    };
                }
                Err(rejected) => rejected.message,
            },
            Err(err) => err.to_string(),
        };

        log::error!("[Upload] Upload failed: {}", failure);
        self.notifier.error(format!("Upload failed: {}", failure));
        UploadOutcome::Failed { message: failure }
    }

    /// Discards metadata and the selected file.
    pub fn reset(&self) {
        self.state.lock().draft.reset();
    }

    pub fn draft(&self) -> UploadDraft {
        self.state.lock().draft.clone()
    }

    pub fn selected_file_name(&self) -> Option<String> {
        self.state
            .lock()
            .draft
            .file()
            .map(|f| f.file_name().to_string())
    }

    /// True while any submission is still waiting for its response.
    pub fn is_uploading(&self) -> bool {
        self.state.lock().in_flight > 0
    }

    pub fn can_submit(&self) -> bool {
        self.state.lock().draft.is_complete()
    }
}
