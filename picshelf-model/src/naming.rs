//! File names for images saved to disk.
//!
//! The name comes from the image title when there is one, otherwise from a
//! short prefix of the identifier:
//! - `"Harbour at dusk"`, `image/jpeg` → `Harbour at dusk.jpg`
//! - `"scan.png"`, `image/png` → `scan.png`
//! - `""`, id `65f1c0ffee…`, `image/webp` → `image-65f1c0ff.webp`

use crate::ids::FileId;
use crate::image::ImageMediaType;

/// Characters of the identifier kept in the fallback name.
pub const FALLBACK_ID_CHARS: usize = 8;

pub fn download_file_name(
    title: &str,
    file_id: &FileId,
    content_type: &str,
) -> String {
    let stem = sanitize(title);
    let stem = if stem.is_empty() {
        format!("image-{}", sanitize(file_id.prefix(FALLBACK_ID_CHARS)))
    } else {
        stem
    };

    let Some(media_type) = ImageMediaType::from_mime(content_type) else {
        return stem;
    };

    let has_extension = stem
        .rsplit_once('.')
        .is_some_and(|(_, ext)| media_type.matches_extension(ext));
    if has_extension {
        stem
    } else {
        format!("{stem}.{}", media_type.extension())
    }
}

fn sanitize(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    replaced.trim().trim_matches('.').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> FileId {
        FileId::new("65f1c0ffee0123456789")
    }

    #[test]
    fn title_gets_extension_from_content_type() {
        assert_eq!(
            download_file_name("Harbour at dusk", &id(), "image/jpeg"),
            "Harbour at dusk.jpg"
        );
    }

    #[test]
    fn existing_matching_extension_is_kept() {
        assert_eq!(download_file_name("scan.PNG", &id(), "image/png"), "scan.PNG");
        assert_eq!(
            download_file_name("photo.jpeg", &id(), "image/jpeg"),
            "photo.jpeg"
        );
    }

    #[test]
    fn blank_title_falls_back_to_truncated_id() {
        assert_eq!(download_file_name("  ", &id(), "image/webp"), "image-65f1c0ff.webp");
    }

    #[test]
    fn unknown_content_type_adds_no_extension() {
        assert_eq!(download_file_name("raw", &id(), ""), "raw");
    }

    #[test]
    fn path_separators_and_dots_are_neutralised() {
        assert_eq!(
            download_file_name("../etc/passwd", &id(), "image/png"),
            "_etc_passwd.png"
        );
        assert_eq!(download_file_name("...", &id(), "image/png"), "image-65f1c0ff.png");
    }
}
