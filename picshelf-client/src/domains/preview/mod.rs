//! Preview and download of a single image.
//!
//! Downloads always re-fetch the original bytes; nothing is cached.

use picshelf_model::{FileId, ImageMediaType, ImageSummary, download_file_name};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::infra::services::api::{ApiError, ApiService};

pub const DEFAULT_PREVIEW_TITLE: &str = "Image Preview";

/// Attempts at finding a free ` (n)` name before giving up.
const MAX_NAME_ATTEMPTS: usize = 1000;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to fetch image {file_id}: {source}")]
    Fetch {
        file_id: FileId,
        #[source]
        source: ApiError,
    },
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no free file name for {name} in {dir}")]
    NameExhausted { dir: PathBuf, name: String },
}

/// View model for the full-size dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    pub file_id: FileId,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub content_type: String,
    pub dimensions: Option<(u32, u32)>,
}

impl ImagePreview {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_PREVIEW_TITLE
        } else {
            &self.title
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreviewWorkflow {
    api: Arc<dyn ApiService>,
}

impl PreviewWorkflow {
    pub fn new(api: Arc<dyn ApiService>) -> Self {
        Self { api }
    }

    pub fn open(&self, image: &ImageSummary) -> ImagePreview {
        ImagePreview {
            file_id: image.file_id.clone(),
            title: image.title.clone(),
            description: (!image.description.trim().is_empty())
                .then(|| image.description.clone()),
            image_url: self.api.image_url(&image.file_id),
            content_type: image.content_type.clone(),
            dimensions: image.dimensions(),
        }
    }

    /// Fetches the image and saves it under `dir`. Returns the written path.
    ///
    /// Existing files are never overwritten; a ` (n)` suffix is added
    /// instead, so overlapping downloads of one image land side by side.
    pub async fn download(
        &self,
        preview: &ImagePreview,
        dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let bytes = self.api.fetch_image(&preview.file_id).await.map_err(
            |source| DownloadError::Fetch {
                file_id: preview.file_id.clone(),
                source,
            },
        )?;

        let content_type = if ImageMediaType::from_mime(&preview.content_type)
            .is_some()
        {
            preview.content_type.clone()
        } else {
            sniff_media_type(&bytes)
                .map(|kind| kind.mime().to_string())
                .unwrap_or_default()
        };
        let name =
            download_file_name(&preview.title, &preview.file_id, &content_type);

        let path = write_unique(dir, &name, &bytes).await?;
        log::info!(
            "[Preview] Saved {} ({} bytes) to {}",
            preview.file_id,
            bytes.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Recognises the three accepted formats from their magic bytes.
pub fn sniff_media_type(bytes: &[u8]) -> Option<ImageMediaType> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageMediaType::Jpeg)
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(ImageMediaType::Png)
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(ImageMediaType::Webp)
    } else {
        None
    }
}

fn candidate_name(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            format!("{stem} ({attempt}).{ext}")
        }
        _ => format!("{name} ({attempt})"),
    }
}

async fn write_unique(
    dir: &Path,
    name: &str,
    bytes: &[u8],
) -> Result<PathBuf, DownloadError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| DownloadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(candidate_name(name, attempt));
        let opened = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        let file = match opened {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(DownloadError::Io { path, source }),
        };
        return match write_or_discard(file, &path, bytes).await {
            Ok(()) => Ok(path),
            Err(source) => Err(DownloadError::Io { path, source }),
        };
    }

    Err(DownloadError::NameExhausted {
        dir: dir.to_path_buf(),
        name: name.to_string(),
    })
}

/// Writes `bytes` into the freshly claimed `path`, removing it again if the
/// write fails so no truncated image is left behind.
async fn write_or_discard(
    mut file: tokio::fs::File,
    path: &Path,
    bytes: &[u8],
) -> std::io::Result<()> {
    let written = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(err) => Err(err),
    };
    if written.is_err() {
        drop(file);
        if let Err(err) = tokio::fs::remove_file(path).await {
            log::warn!(
                "[Preview] Could not remove partial file {}: {}",
                path.display(),
                err
            );
        }
    }
    written
}
