//! Events that cross from one domain into another.

use picshelf_model::FileId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossDomainEvent {
    /// The upload workflow stored a new image; the gallery should reload.
    UploadCompleted,
    /// The user picked an image in the gallery.
    OpenPreview(FileId),
    ClosePreview,
}
