//! `readFileContent`: bounded text file reads.

use serde::Serialize;

use super::errors::CapabilityError;

/// Content ceiling in characters (not bytes).
pub const MAX_FILE_CHARS: usize = 5000;

/// Appended when content is cut at [`MAX_FILE_CHARS`].
pub const TRUNCATION_MARKER: &str = "\n\n[... truncated: file exceeds 5000 characters]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    pub path: String,
    pub content: String,
    pub truncated: bool,
}

/// Read `path` as UTF-8 text, truncating to the ceiling.
pub async fn read_file_content(path: &str) -> Result<FileContent, CapabilityError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| CapabilityError::from_io(path, &e))?;

    if !metadata.is_file() {
        return Err(CapabilityError::NotAFile {
            path: path.to_string(),
        });
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CapabilityError::from_io(path, &e))?;

    let (content, truncated) = truncate_chars(&text, MAX_FILE_CHARS);
    tracing::debug!(path, chars = content.chars().count(), truncated, "file read");

    Ok(FileContent {
        path: path.to_string(),
        content,
        truncated,
    })
}

/// Keep the first `max_chars` characters, appending the marker when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (format!("{}{TRUNCATION_MARKER}", &text[..byte_idx]), true),
        None => (text.to_string(), false),
    }
}
