//! Core data model definitions shared across picshelf crates.
#![allow(missing_docs)]

pub mod envelope;
pub mod ids;
pub mod image;
pub mod naming;
pub mod page;
pub mod upload;

// Intentionally curated re-exports for downstream consumers.
pub use envelope::{Envelope, EnvelopeError, SUCCESS_CODE};
pub use ids::{Cursor, FileId};
pub use image::{ImageMediaType, ImageSummary};
pub use naming::download_file_name;
pub use page::{Page, PageData, PageRequest, Pagination};
pub use upload::{
    FileRejection, MAX_UPLOAD_BYTES, UploadDraft, UploadFile, UploadForm,
    validate_file,
};
