use crate::{Error, Result};
use std::path::Path;

pub const ALLOWED_MIME_TYPES: [&str; 4] = [
    "video/mp4",
    "video/x-matroska",
    "video/avi",
    "video/quicktime",
];

/// Video MIME type for a file, judged by its extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "mp4" => Some("video/mp4"),
        "mkv" => Some("video/x-matroska"),
        "avi" => Some("video/avi"),
        "mov" | "qt" => Some("video/quicktime"),
        _ => None,
    }
}

pub fn validate_mime(mime: Option<&str>) -> Result<&'static str> {
    mime.and_then(|m| ALLOWED_MIME_TYPES.iter().find(|allowed| **allowed == m).copied())
        .ok_or_else(|| {
            Error::validation(
                "Invalid file type",
                "Please upload a valid video file (.mp4, .mkv, .avi, etc.)",
            )
        })
}

pub fn validate_size(size: u64, max_bytes: u64) -> Result<()> {
    if size > max_bytes {
        return Err(Error::validation(
            "File too large",
            format!(
                "Maximum file size is {}",
                crate::project::format::FileSizeUtils::format_size(max_bytes)
            ),
        ));
    }
    Ok(())
}
