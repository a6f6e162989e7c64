//! ApiClient adapter that implements the ApiService trait
//!
//! Wraps the reqwest-backed ApiClient so workflows only see the trait.

use async_trait::async_trait;
use picshelf_model::{Envelope, FileId, PageData, PageRequest, UploadForm};
use std::sync::Arc;

use crate::infra::api_client::ApiClient;
use crate::infra::services::api::{ApiResult, ApiService, StatusEnvelope};

/// Adapter that implements ApiService using the HTTP ApiClient
#[derive(Debug, Clone)]
pub struct ApiClientAdapter {
    client: Arc<ApiClient>,
}

impl ApiClientAdapter {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl ApiService for ApiClientAdapter {
    async fn list_images(
        &self,
        request: &PageRequest,
    ) -> ApiResult<Envelope<PageData>> {
        self.client.list_images(request).await
    }

    async fn upload_image(&self, form: UploadForm) -> ApiResult<StatusEnvelope> {
        self.client.upload_image(form).await
    }

    async fn fetch_image(&self, file_id: &FileId) -> ApiResult<Vec<u8>> {
        self.client.fetch_image(file_id).await
    }

    fn image_url(&self, file_id: &FileId) -> String {
        self.client.build_url(file_id.as_str())
    }
}
