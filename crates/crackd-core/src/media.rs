//! Content-type resolution for upload candidates.
//!
//! The pipeline accepts a fixed set of image content types. A file whose
//! declared type is already in the set passes through unchanged; otherwise
//! the type is derived from the file extension. Files matching neither are
//! rejected before any network call is made.

/// Content types the pipeline accepts as declared by the picker.
pub const SUPPORTED_CONTENT_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/heic",
];

/// Map a lowercase file extension to a content type.
fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Resolve the content type to send for a selected file.
///
/// The declared type wins when it is in the supported set, regardless of
/// file name. Otherwise the extension (case-insensitive) decides. `None`
/// means the file is unsupported.
pub fn resolve_content_type(declared_type: &str, file_name: &str) -> Option<String> {
    if SUPPORTED_CONTENT_TYPES.contains(&declared_type) {
        return Some(declared_type.to_string());
    }

    let extension = file_name.to_lowercase().rsplit('.').next()?.to_string();
    content_type_for_extension(&extension).map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_passes_through_unchanged() {
        for declared in SUPPORTED_CONTENT_TYPES {
            assert_eq!(
                resolve_content_type(declared, "whatever.txt").as_deref(),
                Some(declared),
                "declared {declared} should pass through regardless of name"
            );
        }
        // image/jpg is kept verbatim, not normalized to image/jpeg
        assert_eq!(
            resolve_content_type("image/jpg", "photo.png").as_deref(),
            Some("image/jpg")
        );
    }

    #[test]
    fn extension_fallback_is_case_insensitive() {
        assert_eq!(
            resolve_content_type("application/octet-stream", "photo.JPG").as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(
            resolve_content_type("", "Shot.HeIc").as_deref(),
            Some("image/heic")
        );
        assert_eq!(
            resolve_content_type("text/plain", "a.b.webp").as_deref(),
            Some("image/webp")
        );
    }

    #[test]
    fn unresolvable_files_are_rejected() {
        assert_eq!(resolve_content_type("text/plain", "notes.txt"), None);
        assert_eq!(resolve_content_type("", "archive.tar.gz"), None);
        assert_eq!(resolve_content_type("image/tiff", "scan.tiff"), None);
        assert_eq!(resolve_content_type("", "noextension"), None);
    }
}
