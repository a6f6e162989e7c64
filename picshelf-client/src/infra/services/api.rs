//! API service trait and error types
//!
//! Every workflow talks to the backend through [`ApiService`], so the real
//! HTTP client and the in-memory test stub are interchangeable.

use async_trait::async_trait;
use picshelf_model::{Envelope, FileId, PageData, PageRequest, UploadForm};
use serde::de::IgnoredAny;
use std::fmt::Debug;
use thiserror::Error;

/// Failures below the application envelope: the request never produced a
/// usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Envelope of endpoints that only report a status.
pub type StatusEnvelope = Envelope<IgnoredAny>;

/// Transport seam between workflows and the image backend.
///
/// `Err` means transport-level failure. An `Ok` envelope can still carry an
/// application failure code, which callers check with
/// [`Envelope::into_result`].
#[async_trait]
pub trait ApiService: Send + Sync + Debug {
    /// `GET {base}?limit=&cursor=&search=`
    async fn list_images(
        &self,
        request: &PageRequest,
    ) -> ApiResult<Envelope<PageData>>;

    /// `POST {base}/upload` as multipart form data.
    async fn upload_image(&self, form: UploadForm) -> ApiResult<StatusEnvelope>;

    /// `GET {base}/{fileId}`, raw bytes.
    async fn fetch_image(&self, file_id: &FileId) -> ApiResult<Vec<u8>>;

    /// URL a front end can use directly as an image source.
    fn image_url(&self, file_id: &FileId) -> String;
}
