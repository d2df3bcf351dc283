use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};

use error::{FileManagerError, IoOperation};
use log::{debug, warn};

pub use append::AppendFlags;
pub use file::File;
pub use mode::{Mode, OpenMode};

mod append;
pub mod error;
mod file;
mod mode;

pub type Result<T> = std::result::Result<T, FileManagerError>;

/// Opens, closes and appends to files on the host filesystem.
///
/// Every call is independent and blocking. The manager only carries the
/// defaults used by [`FileManager::open`] and [`FileManager::append`].
///
/// # Examples
///
/// ```rust
/// use filewriter::{FileManager, OpenMode};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let dir = tempfile::tempdir()?;
///     let path = dir.path().join("log.txt");
///     let manager = FileManager::new();
///
///     let mut file = manager.open(&path)?;
///     file.write("hello")?.write(" world")?;
///     manager.close(file);
///
///     manager.append(&path, "!")?;
///     assert_eq!(std::fs::read_to_string(&path)?, "hello world!");
///
///     let file = manager.get(&path, OpenMode::Read)?;
///     assert!(file.is_open());
///     manager.close(file);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileManager {
    default_mode: Mode,
    append_flags: AppendFlags,
}

impl FileManager {
    /// Creates a manager opening files in `w+` mode and appending under an
    /// exclusive lock.
    pub fn new() -> Self {
        Self {
            default_mode: Mode::default(),
            append_flags: AppendFlags::default(),
        }
    }

    /// Sets the mode used by [`FileManager::open`].
    pub fn with_default_mode(mut self, mode: impl Into<Mode>) -> Self {
        self.default_mode = mode.into();
        self
    }

    /// Sets the flags used by [`FileManager::append`].
    pub fn with_append_flags(mut self, flags: AppendFlags) -> Self {
        self.append_flags = flags;
        self
    }

    /// The mode used by [`FileManager::open`].
    pub fn default_mode(&self) -> Mode { self.default_mode }

    /// The flags used by [`FileManager::append`].
    pub fn append_flags(&self) -> AppendFlags { self.append_flags }

    /// Opens `filepath` with the manager's default mode (`w+` unless
    /// configured otherwise, which truncates existing files).
    ///
    /// # Errors
    ///
    /// See [`FileManager::get`].
    pub fn open(&self, filepath: impl AsRef<Path>) -> Result<File> {
        self.get(filepath, self.default_mode)
    }

    /// Opens `filepath` with `mode`.
    ///
    /// # Arguments
    ///
    /// * `filepath` - The file to open
    /// * `mode` - How to open it; see [`OpenMode`] for the semantics of each mode
    ///
    /// # Errors
    ///
    /// Returns `FileManagerError::Io` if the file exists and is not writable,
    /// or if no file handle could be acquired (for example `r` on a missing
    /// file, `x` on an existing one, or any mode on a directory).
    ///
    /// A file whose permissions carry no write bit at all counts as not
    /// writable even when the process could write it anyway (as root, say).
    /// This holds for every mode, including `r`.
    pub fn get(&self, filepath: impl AsRef<Path>, mode: impl Into<Mode>) -> Result<File> {
        let filepath = filepath.as_ref();
        let mode = mode.into();

        check_permission(filepath)?;

        let handle = mode.open_options().open(filepath).map_err(|e| {
            FileManagerError::io(
                filepath,
                IoOperation::Open,
                format!("The resource could not be loaded: {e}"),
            )
        })?;

        if handle.metadata().is_ok_and(|metadata| metadata.is_dir()) {
            return Err(FileManagerError::io(
                filepath,
                IoOperation::Open,
                "The resource could not be loaded: is a directory",
            ));
        }

        debug!("opened {} in mode {mode}", filepath.display());
        File::new(filepath, mode, handle)
    }

    /// Releases the handle held by `file`.
    ///
    /// Release failures are logged and otherwise ignored.
    pub fn close(&self, mut file: File) {
        match file.close() {
            Ok(()) => debug!("closed {}", file.filepath().display()),
            Err(e) => warn!("ignoring close failure: {e}"),
        }
    }

    /// Opens `filepath`, hands the file to `f` and closes it again on every
    /// exit path.
    ///
    /// # Errors
    ///
    /// Returns the error from opening, or whatever `f` returns.
    pub fn with_file<T, F>(&self, filepath: impl AsRef<Path>, mode: impl Into<Mode>, f: F) -> Result<T>
    where
        F: FnOnce(&mut File) -> Result<T>,
    {
        let mut file = self.get(filepath, mode)?;
        let result = f(&mut file);
        self.close(file);
        result
    }

    /// Appends `content` to `filepath` in a single write, creating the file
    /// if it does not exist, using the manager's append flags.
    ///
    /// Appending empty content succeeds and still creates the file.
    ///
    /// # Errors
    ///
    /// Returns `FileManagerError::Io` if the file exists and is not writable.
    /// As with [`FileManager::get`], a file without any write permission bit
    /// is rejected regardless of the process's privileges.
    /// Returns `FileManagerError::Manager` if the data could not be written.
    pub fn append(&self, filepath: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Result<()> {
        self.append_with(filepath, content, self.append_flags)
    }

    /// Like [`FileManager::append`] with explicit flags.
    ///
    /// # Errors
    ///
    /// See [`FileManager::append`].
    pub fn append_with(
        &self,
        filepath: impl AsRef<Path>,
        content: impl AsRef<[u8]>,
        flags: AppendFlags,
    ) -> Result<()> {
        let filepath = filepath.as_ref();
        let content = content.as_ref();

        check_permission(filepath)?;

        put_contents(filepath, content, flags).map_err(|e| FileManagerError::Manager {
            path: filepath.display().to_string(),
            content_len: content.len(),
            reason: e.to_string(),
        })?;

        debug!("appended {} bytes to {}", content.len(), filepath.display());
        Ok(())
    }
}

impl Default for FileManager {
    fn default() -> Self { Self::new() }
}

/// Writes `content` to `filepath` in one go.
///
/// With a lock the file is opened without truncation so that replacing the
/// contents only happens once the lock is held. The lock is released when
/// the handle is dropped.
fn put_contents(filepath: &Path, content: &[u8], flags: AppendFlags) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.create(true);

    if flags.append {
        options.append(true);
    } else {
        options.write(true).truncate(!flags.exclusive_lock);
    }

    let mut handle = options.open(filepath)?;

    if flags.exclusive_lock {
        handle.lock()?;
        if !flags.append {
            handle.set_len(0)?;
        }
    }

    handle.write_all(content)
}

/// Fails if `filepath` exists and cannot be written to.
///
/// Read-only permissions fail outright. Otherwise a regular file is probed
/// by opening it for writing, which fails on `PermissionDenied` only.
/// A missing file passes; whether it gets created is up to the caller's
/// open call.
fn check_permission(filepath: &Path) -> Result<()> {
    let Ok(metadata) = fs::metadata(filepath) else {
        return Ok(());
    };

    let denied = metadata.permissions().readonly()
        || (metadata.is_file()
            && matches!(
                OpenOptions::new().write(true).open(filepath),
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied
            ));

    if denied {
        return Err(FileManagerError::io(
            filepath,
            IoOperation::PermissionCheck,
            "File is not writeable.",
        ));
    }

    Ok(())
}
