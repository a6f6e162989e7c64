//! Upload domain: single-file selection, validation and submission.

pub mod files;
pub mod service;

pub use files::{PickedFile, SelectFileError, read_picked_file};
pub use service::{UPLOAD_SUCCESS_NOTICE, UploadOutcome, UploadWorkflow};
