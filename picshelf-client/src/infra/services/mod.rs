pub mod api;

pub use api::{ApiError, ApiResult, ApiService, StatusEnvelope};
