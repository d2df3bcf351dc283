use std::fmt;

/// The platform operation an [`FileManagerError::Io`] failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOperation {
    /// The writability pre-check done before opening or appending.
    PermissionCheck,
    /// Acquiring a handle.
    Open,
    /// Writing through an acquired handle.
    Write,
}

impl fmt::Display for IoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IoOperation::PermissionCheck => "permission check",
            IoOperation::Open => "open",
            IoOperation::Write => "write",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when acquiring, writing or appending to files.
#[derive(Debug, Clone, PartialEq)]
pub enum FileManagerError {
    /// A malformed value was passed where a valid one was required
    /// (an unknown mode token, a handle that is not an open file).
    InvalidArgument(String),
    /// A platform I/O operation failed.
    Io {
        path: String,
        operation: IoOperation,
        reason: String,
    },
    /// A one-shot append could not be completed.
    Manager {
        path: String,
        content_len: usize,
        reason: String,
    },
    /// The file handle was already released.
    UseAfterClose(String),
}

impl FileManagerError {
    pub(crate) fn io(path: &std::path::Path, operation: IoOperation, reason: impl fmt::Display) -> Self {
        FileManagerError::Io {
            path: path.display().to_string(),
            operation,
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for FileManagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileManagerError::InvalidArgument(msg) => {
                write!(f, "Invalid argument: {msg}")
            }
            FileManagerError::Io { path, operation, reason } => {
                write!(f, "I/O error during {operation} of \"{path}\": {reason}")
            }
            FileManagerError::Manager { path, content_len, reason } => {
                write!(f, "Could not append data to file \"{path}\" ({content_len} bytes): {reason}")
            }
            FileManagerError::UseAfterClose(path) => {
                write!(f, "File \"{path}\" has already been closed")
            }
        }
    }
}

impl std::error::Error for FileManagerError {}
