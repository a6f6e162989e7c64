//! Upload draft state and client-side validation.

use thiserror::Error;

use crate::image::ImageMediaType;

/// Largest accepted upload, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Why a selected file was refused. The display text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileRejection {
    #[error("Invalid file type. Please upload JPG, PNG, or WEBP.")]
    UnsupportedType { content_type: String },
    #[error("File size exceeds 10MB limit.")]
    TooLarge { size: u64 },
}

/// Checks type then size, the same order the user is told about them.
pub fn validate_file(
    content_type: &str,
    size: u64,
) -> Result<ImageMediaType, FileRejection> {
    let media_type = ImageMediaType::from_mime(content_type).ok_or_else(|| {
        FileRejection::UnsupportedType {
            content_type: content_type.to_string(),
        }
    })?;
    if size > MAX_UPLOAD_BYTES {
        return Err(FileRejection::TooLarge { size });
    }
    Ok(media_type)
}

/// A file that already passed [`validate_file`].
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    file_name: String,
    media_type: ImageMediaType,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, FileRejection> {
        let media_type = validate_file(content_type, bytes.len() as u64)?;
        Ok(Self {
            file_name: file_name.into(),
            media_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> ImageMediaType {
        self.media_type
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// In-progress upload form: metadata plus at most one selected file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadDraft {
    pub title: String,
    pub description: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    file: Option<UploadFile>,
}

impl UploadDraft {
    pub fn file(&self) -> Option<&UploadFile> {
        self.file.as_ref()
    }

    /// Replaces the current selection. Only validated files can get here.
    pub fn select_file(&mut self, file: UploadFile) {
        self.file = Some(file);
    }

    pub fn has_metadata(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.has_metadata() && self.file.is_some()
    }

    /// Snapshot of the draft as a submittable form, if it is complete.
    pub fn to_form(&self) -> Option<UploadForm> {
        if !self.has_metadata() {
            return None;
        }
        let file = self.file.clone()?;
        Some(UploadForm {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            width: self.width,
            height: self.height,
            file,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Multipart payload for `POST {base}/upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub title: String,
    pub description: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file: UploadFile,
}

impl UploadForm {
    /// Text parts of the form. Dimensions are only sent when present.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.clone()),
            ("description", self.description.clone()),
        ];
        if let Some(width) = self.width {
            fields.push(("width", width.to_string()));
        }
        if let Some(height) = self.height {
            fields.push(("height", height.to_string()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_three_declared_types_at_the_ceiling() {
        for mime in ["image/jpeg", "image/png", "image/webp"] {
            assert!(validate_file(mime, MAX_UPLOAD_BYTES).is_ok(), "{mime}");
        }
    }

    #[test]
    fn rejects_other_types_and_oversized_files() {
        assert!(matches!(
            validate_file("image/gif", 10),
            Err(FileRejection::UnsupportedType { .. })
        ));
        assert_eq!(
            validate_file("image/png", MAX_UPLOAD_BYTES + 1),
            Err(FileRejection::TooLarge {
                size: 10_485_761
            })
        );
    }

    #[test]
    fn rejection_messages_are_user_facing() {
        let err = validate_file("text/plain", 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid file type. Please upload JPG, PNG, or WEBP."
        );
        let err = validate_file("image/png", MAX_UPLOAD_BYTES * 2).unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds 10MB limit.");
    }

    #[test]
    fn draft_needs_title_description_and_file() {
        let mut draft = UploadDraft {
            title: "Sunset".into(),
            description: "  ".into(),
            ..Default::default()
        };
        assert!(!draft.is_complete());
        assert!(draft.to_form().is_none());

        draft.description = "Over the bay".into();
        assert!(!draft.is_complete());

        draft.select_file(
            UploadFile::new("sunset.png", "image/png", vec![1, 2, 3]).unwrap(),
        );
        assert!(draft.is_complete());
        let form = draft.to_form().unwrap();
        assert_eq!(form.file.size(), 3);

        draft.reset();
        assert_eq!(draft, UploadDraft::default());
    }

    #[test]
    fn dimensions_only_appear_when_set() {
        let file = UploadFile::new("a.jpg", "image/jpeg", vec![0]).unwrap();
        let mut form = UploadForm {
            title: "t".into(),
            description: "d".into(),
            width: None,
            height: None,
            file,
        };
        let names: Vec<_> =
            form.text_fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["title", "description"]);

        form.width = Some(640);
        let fields = form.text_fields();
        assert!(fields.contains(&("width", "640".to_string())));
        assert!(!fields.iter().any(|(k, _)| *k == "height"));
    }
}
