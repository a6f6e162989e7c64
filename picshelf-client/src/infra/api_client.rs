use log::{debug, info, warn};
use picshelf_model::{Envelope, FileId, PageData, PageRequest, UploadForm};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::infra::services::api::{ApiError, ApiResult, StatusEnvelope};

/// Default request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Adds `http://` when the scheme is missing and trims trailing slashes.
///
/// Users tend to type "localhost:3030/api/images", which reqwest rejects.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme =
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };
    if with_scheme != raw {
        debug!(
            "[ApiClient] Normalized base URL from '{}' to '{}'",
            raw, with_scheme
        );
    }
    with_scheme
}

/// HTTP client for the image backend
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base.as_str())
            .finish()
    }
}

impl ApiClient {
    /// Create a new API client rooted at `base_url`
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let normalized = normalize_base_url(base_url);
        let base = Url::parse(&normalized).map_err(|e| {
            ApiError::InvalidRequest(format!(
                "invalid base URL '{}': {}",
                normalized, e
            ))
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "base URL '{}' cannot carry a path",
                normalized
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        info!("[ApiClient] Creating API client with base URL: {}", base);

        Ok(Self { client, base })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Appends one path segment to the base URL, percent-encoding it.
    pub fn build_url(&self, segment: &str) -> String {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        url.to_string()
    }

    /// Fetch one page of image summaries
    pub async fn list_images(
        &self,
        request: &PageRequest,
    ) -> ApiResult<Envelope<PageData>> {
        debug!(
            "[ApiClient] GET {} limit={} cursor={:?} search={:?}",
            self.base, request.limit, request.cursor, request.search
        );
        let response = self
            .client
            .get(self.base.clone())
            .query(&request.query_pairs())
            .send()
            .await
            .map_err(map_send_error)?;
        read_envelope(response).await
    }

    /// Submit a multipart upload
    pub async fn upload_image(
        &self,
        form: UploadForm,
    ) -> ApiResult<StatusEnvelope> {
        let url = self.build_url("upload");
        let fields = form.text_fields();
        let file_name = form.file.file_name().to_string();
        let media_type = form.file.media_type();
        let size = form.file.size();

        let part = Part::bytes(form.file.into_bytes())
            .file_name(file_name.clone())
            .mime_str(media_type.mime())
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let multipart = fields
            .into_iter()
            .fold(Form::new().part("image", part), |multipart, (name, value)| {
                multipart.text(name, value)
            });

        info!(
            "[ApiClient] Uploading '{}' ({}, {} bytes) to {}",
            file_name, media_type, size, url
        );
        let response = self
            .client
            .post(&url)
            .multipart(multipart)
            .send()
            .await
            .map_err(map_send_error)?;
        read_envelope(response).await
    }

    /// Fetch the original bytes of an image
    pub async fn fetch_image(&self, file_id: &FileId) -> ApiResult<Vec<u8>> {
        let url = self.build_url(file_id.as_str());
        debug!("[ApiClient] GET bytes from {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await.map_err(map_send_error)?;
        Ok(bytes.to_vec())
    }
}

fn map_send_error(err: reqwest::Error) -> ApiError {
    if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    warn!("[ApiClient] Request failed with status {}: {}", status, body);
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_envelope<T: DeserializeOwned>(
    response: Response,
) -> ApiResult<Envelope<T>> {
    let response = ensure_success(response).await?;
    let body = response.bytes().await.map_err(map_send_error)?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}
