use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::ids::FileId;

/// Image formats the backend accepts for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMediaType {
    Jpeg,
    Png,
    Webp,
}

impl ImageMediaType {
    pub const ALL: [ImageMediaType; 3] =
        [ImageMediaType::Jpeg, ImageMediaType::Png, ImageMediaType::Webp];

    pub const fn mime(self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "image/jpeg",
            ImageMediaType::Png => "image/png",
            ImageMediaType::Webp => "image/webp",
        }
    }

    /// Preferred file extension, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "jpg",
            ImageMediaType::Png => "png",
            ImageMediaType::Webp => "webp",
        }
    }

    /// Parses a MIME type, ignoring case and any `;` parameters.
    pub fn from_mime(raw: &str) -> Option<Self> {
        let essence = raw.split(';').next().unwrap_or("").trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.mime().eq_ignore_ascii_case(essence))
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageMediaType::Jpeg),
            "png" => Some(ImageMediaType::Png),
            "webp" => Some(ImageMediaType::Webp),
            _ => None,
        }
    }

    /// Whether `ext` is a conventional extension for this type.
    pub fn matches_extension(self, ext: &str) -> bool {
        Self::from_extension(ext) == Some(self)
    }
}

impl Display for ImageMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// One entry of the gallery listing.
///
/// Everything except the UI flags comes from the backend and is treated as
/// immutable once fetched. `loaded` and `description_expanded` never travel
/// over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    #[serde(alias = "file_id")]
    pub file_id: FileId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "content_type")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip)]
    pub loaded: bool,
    #[serde(skip)]
    pub description_expanded: bool,
}

impl ImageSummary {
    pub fn new(file_id: impl Into<FileId>, title: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            title: title.into(),
            description: String::new(),
            content_type: String::new(),
            width: None,
            height: None,
            loaded: false,
            description_expanded: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn media_type(&self) -> Option<ImageMediaType> {
        ImageMediaType::from_mime(&self.content_type)
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}
