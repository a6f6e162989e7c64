//! Test doubles for exercising workflows without a backend.

pub mod stubs;

pub use stubs::{TestApiService, sample_image, sample_images};
