use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::trace;

use crate::{
    Result,
    error::{FileManagerError, IoOperation},
    mode::Mode,
};

/// An open file handle bound to the path and mode it was opened with.
///
/// Instances are handed out by [`FileManager::get`](crate::FileManager::get).
/// The handle is released by [`File::close`], by
/// [`FileManager::close`](crate::FileManager::close), or when the value is
/// dropped, whichever comes first.
#[derive(Debug)]
pub struct File {
    filepath: PathBuf,
    mode: Mode,
    handle: Option<fs::File>,
}

impl File {
    /// Binds `handle` to `filepath` and `mode`.
    ///
    /// The handle is queried once; it must be live and must not refer to a
    /// directory.
    pub(crate) fn new(filepath: impl Into<PathBuf>, mode: Mode, handle: fs::File) -> Result<Self> {
        let filepath = filepath.into();

        let metadata = handle.metadata().map_err(|e| {
            FileManagerError::InvalidArgument(format!(
                "Handle for \"{}\" is not an open file: {e}",
                filepath.display()
            ))
        })?;

        if metadata.is_dir() {
            return Err(FileManagerError::InvalidArgument(format!(
                "Handle for \"{}\" refers to a directory, not a file",
                filepath.display()
            )));
        }

        Ok(Self {
            filepath,
            mode,
            handle: Some(handle),
        })
    }

    /// Writes `content` at the handle's current position.
    ///
    /// Where the bytes land depends on the mode the file was opened with.
    /// Returns `self` so writes can be chained.
    ///
    /// # Errors
    ///
    /// Returns `FileManagerError::UseAfterClose` if the file was closed.
    /// Returns `FileManagerError::Io` if the platform write fails. The
    /// handle stays open in that case.
    pub fn write(&mut self, content: impl AsRef<[u8]>) -> Result<&mut Self> {
        let content = content.as_ref();
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| FileManagerError::UseAfterClose(self.filepath.display().to_string()))?;

        handle.write_all(content).map_err(|e| {
            FileManagerError::io(
                &self.filepath,
                IoOperation::Write,
                format!("cannot be written to a file: {e}"),
            )
        })?;

        trace!("wrote {} bytes to {}", content.len(), self.filepath.display());
        Ok(self)
    }

    /// Releases the handle.
    ///
    /// # Errors
    ///
    /// Returns `FileManagerError::UseAfterClose` if the handle was already
    /// released.
    pub fn close(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => {
                drop(handle);
                Ok(())
            }
            None => Err(FileManagerError::UseAfterClose(self.filepath.display().to_string())),
        }
    }

    /// Whether the handle has not been released yet.
    pub fn is_open(&self) -> bool { self.handle.is_some() }

    /// The path the file was opened from.
    pub fn filepath(&self) -> &Path { &self.filepath }

    /// The mode the file was opened with.
    pub fn mode(&self) -> Mode { self.mode }

    /// The underlying handle, or `None` once closed.
    pub fn handle(&self) -> Option<&fs::File> { self.handle.as_ref() }
}

impl Drop for File {
    fn drop(&mut self) {
        if self.handle.take().is_some() {
            trace!("released {} on drop", self.filepath.display());
        }
    }
}
