//! Files picked or dropped by the user, before validation.

use picshelf_model::{FileRejection, ImageMediaType, validate_file};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Content type used when the extension says nothing useful.
pub const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// A candidate file as the platform hands it over.
#[derive(Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PickedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickedFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl PickedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

#[derive(Debug, Error)]
pub enum SelectFileError {
    #[error(transparent)]
    Rejected(#[from] FileRejection),
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Content type implied by a path's extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageMediaType::from_extension)
        .map(ImageMediaType::mime)
        .unwrap_or(UNKNOWN_CONTENT_TYPE)
}

/// Reads a file from disk as a [`PickedFile`].
///
/// Type and size are checked from the extension and metadata first, so an
/// oversized file is refused without reading it.
pub async fn read_picked_file(path: &Path) -> Result<PickedFile, SelectFileError> {
    let content_type = content_type_for_path(path);
    let io_err = |source| SelectFileError::Io {
        path: path.to_path_buf(),
        source,
    };

    let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
    validate_file(content_type, metadata.len())?;

    let bytes = tokio::fs::read(path).await.map_err(io_err)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(PickedFile::new(name, content_type, bytes))
}
