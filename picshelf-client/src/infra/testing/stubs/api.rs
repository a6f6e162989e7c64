use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use picshelf_model::{
    Cursor, Envelope, FileId, ImageSummary, PageData, PageRequest, Pagination,
    UploadForm,
};
use tokio::sync::Semaphore;

use crate::infra::services::api::{
    ApiError, ApiResult, ApiService, StatusEnvelope,
};

/// In-memory backend with the same listing, upload and download contract as
/// the real service. Records every call so tests can count requests.
#[derive(Debug, Clone)]
pub struct TestApiService {
    inner: Arc<Mutex<InnerApiState>>,
    base_url: Arc<str>,
}

#[derive(Debug, Default)]
struct InnerApiState {
    images: Vec<ImageSummary>,
    blobs: HashMap<FileId, Vec<u8>>,
    list_calls: Vec<PageRequest>,
    uploads: Vec<UploadForm>,
    fetches: Vec<FileId>,
    list_failures: VecDeque<ListFailure>,
    upload_response: Option<StatusEnvelope>,
    upload_error: Option<ApiError>,
    list_gate: Option<Arc<Semaphore>>,
    upload_gate: Option<Arc<Semaphore>>,
    next_upload_id: usize,
}

#[derive(Debug)]
enum ListFailure {
    Transport(ApiError),
    Code { code: String, message: String },
}

impl Default for TestApiService {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TestApiService {
    pub fn new(images: Vec<ImageSummary>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InnerApiState {
                images,
                ..Default::default()
            })),
            base_url: Arc::from("http://localhost:3030/api/images"),
        }
    }

    /// Backend pre-populated with `count` numbered images.
    pub fn with_images(count: usize) -> Self {
        Self::new(sample_images(count))
    }

    pub fn insert_blob(&self, file_id: impl Into<FileId>, bytes: Vec<u8>) {
        self.inner.lock().blobs.insert(file_id.into(), bytes);
    }

    /// Makes the next listing call fail at the transport level.
    pub fn fail_next_list(&self, error: ApiError) {
        self.inner
            .lock()
            .list_failures
            .push_back(ListFailure::Transport(error));
    }

    /// Makes the next listing call answer with a non-success envelope.
    pub fn fail_next_list_with_code(&self, code: &str, message: &str) {
        self.inner.lock().list_failures.push_back(ListFailure::Code {
            code: code.to_string(),
            message: message.to_string(),
        });
    }

    pub fn set_upload_response(&self, envelope: StatusEnvelope) {
        self.inner.lock().upload_response = Some(envelope);
    }

    pub fn set_upload_error(&self, error: ApiError) {
        self.inner.lock().upload_error = Some(error);
    }

    /// Listing calls block until [`TestApiService::release_lists`] is called.
    pub fn hold_lists(&self) {
        self.inner.lock().list_gate = Some(Arc::new(Semaphore::new(0)));
    }

    /// Lets `count` held listing calls through.
    pub fn release_lists(&self, count: usize) {
        if let Some(gate) = self.inner.lock().list_gate.as_ref() {
            gate.add_permits(count);
        }
    }

    /// Stops holding listing calls and lets all waiting ones through.
    pub fn open_lists(&self) {
        if let Some(gate) = self.inner.lock().list_gate.take() {
            gate.close();
        }
    }

    /// Upload calls block until [`TestApiService::release_uploads`].
    pub fn hold_uploads(&self) {
        self.inner.lock().upload_gate = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_uploads(&self, count: usize) {
        if let Some(gate) = self.inner.lock().upload_gate.as_ref() {
            gate.add_permits(count);
        }
    }

    pub fn list_calls(&self) -> Vec<PageRequest> {
        self.inner.lock().list_calls.clone()
    }

    pub fn uploads(&self) -> Vec<UploadForm> {
        self.inner.lock().uploads.clone()
    }

    pub fn fetch_calls(&self) -> Vec<FileId> {
        self.inner.lock().fetches.clone()
    }

    pub fn stored_images(&self) -> Vec<ImageSummary> {
        self.inner.lock().images.clone()
    }

    fn page_for(state: &InnerApiState, request: &PageRequest) -> PageData {
        let offset = request
            .cursor
            .as_ref()
            .and_then(|c| c.as_str().strip_prefix("idx:"))
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(0);

        let needle = request.search.as_ref().map(|s| s.to_lowercase());
        let matching: Vec<&ImageSummary> = state
            .images
            .iter()
            .filter(|img| match &needle {
                Some(needle) => {
                    img.title.to_lowercase().contains(needle)
                        || img.description.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();

        let limit = request.limit.max(1) as usize;
        let end = (offset + limit).min(matching.len());
        let images = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|img| (*img).clone())
            .collect();
        let has_more = end < matching.len();

        PageData {
            images,
            pagination: Pagination {
                next_cursor: has_more.then(|| Cursor::new(format!("idx:{end}"))),
                has_more,
            },
        }
    }
}

#[async_trait]
impl ApiService for TestApiService {
    async fn list_images(
        &self,
        request: &PageRequest,
    ) -> ApiResult<Envelope<PageData>> {
        let gate = {
            let mut state = self.inner.lock();
            state.list_calls.push(request.clone());
            state.list_gate.clone()
        };

        if let Some(gate) = gate {
            // A closed gate means the test opened it for good.
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let mut state = self.inner.lock();
        match state.list_failures.pop_front() {
            Some(ListFailure::Transport(error)) => Err(error),
            Some(ListFailure::Code { code, message }) => {
                Ok(Envelope::failure(code, message))
            }
            None => Ok(Envelope::success(
                "ok",
                Some(Self::page_for(&state, request)),
            )),
        }
    }

    async fn upload_image(&self, form: UploadForm) -> ApiResult<StatusEnvelope> {
        let gate = {
            let mut state = self.inner.lock();
            state.uploads.push(form.clone());
            state.upload_gate.clone()
        };

        if let Some(gate) = gate
            && let Ok(permit) = gate.acquire().await
        {
            permit.forget();
        }

        let mut state = self.inner.lock();

        if let Some(error) = state.upload_error.clone() {
            return Err(error);
        }
        let response = state
            .upload_response
            .clone()
            .unwrap_or_else(|| Envelope::success("ok", None));

        if response.is_success() {
            state.next_upload_id += 1;
            let file_id = FileId::new(format!("upl-{}", state.next_upload_id));
            let mut summary = ImageSummary::new(file_id.clone(), form.title)
                .with_description(form.description)
                .with_content_type(form.file.media_type().mime());
            summary.width = form.width;
            summary.height = form.height;
            state.images.insert(0, summary);
            state.blobs.insert(file_id, form.file.into_bytes());
        }
        Ok(response)
    }

    async fn fetch_image(&self, file_id: &FileId) -> ApiResult<Vec<u8>> {
        let mut state = self.inner.lock();
        state.fetches.push(file_id.clone());
        state.blobs.get(file_id).cloned().ok_or_else(|| ApiError::Status {
            status: 404,
            body: format!("image {} not found", file_id),
        })
    }

    fn image_url(&self, file_id: &FileId) -> String {
        format!("{}/{}", self.base_url, file_id)
    }
}

pub fn sample_image(index: usize) -> ImageSummary {
    ImageSummary::new(format!("img-{index:04}"), format!("Image {index}"))
        .with_description(format!("Sample image number {index}"))
        .with_content_type("image/jpeg")
        .with_dimensions(800, 600)
}

pub fn sample_images(count: usize) -> Vec<ImageSummary> {
    (0..count).map(sample_image).collect()
}
