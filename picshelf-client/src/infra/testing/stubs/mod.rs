pub mod api;

pub use api::{TestApiService, sample_image, sample_images};
