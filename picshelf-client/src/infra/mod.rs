//! Transport layer: the HTTP client, its trait seam, and test doubles.

pub mod adapters;
pub mod api_client;
pub mod services;
pub mod testing;

pub use adapters::ApiClientAdapter;
pub use api_client::ApiClient;
pub use services::{ApiError, ApiResult, ApiService};
