//! Capability error taxonomy.
//!
//! Every provider failure is converted into one of these at the provider
//! boundary. The `Display` text is what the model (or the user, on the
//! confirmation path) sees.

use thiserror::Error;

/// Errors a capability invocation can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The model named a capability that is not in the catalog.
    #[error("Unknown tool: '{name}'")]
    UnknownCapability { name: String },

    /// Arguments were not valid JSON or did not match the input schema.
    #[error("Invalid arguments for '{capability}': {reason}")]
    InvalidArguments { capability: String, reason: String },

    /// The target path does not exist.
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// The process lacks permission to access the target path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    /// The target exists but is a directory or special file.
    #[error("Path is not a file: {path}")]
    NotAFile { path: String },

    /// Any other filesystem failure while reading.
    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    /// The default-handler mechanism refused to open the target.
    #[error("Failed to open {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    /// Automation script content was empty or whitespace.
    #[error("Cannot execute empty script.")]
    EmptyScript,

    /// A helper process could not be started.
    #[error("Failed to run {program}: {reason}")]
    SpawnFailed { program: String, reason: String },
}

impl CapabilityError {
    /// Map an I/O error on `path` to the matching taxonomy entry.
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CapabilityError::NotFound {
                path: path.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => CapabilityError::PermissionDenied {
                path: path.to_string(),
            },
            _ => CapabilityError::ReadFailed {
                path: path.to_string(),
                reason: err.to_string(),
            },
        }
    }
}
