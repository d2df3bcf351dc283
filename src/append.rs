/// Flags controlling a one-shot [`FileManager::append`](crate::FileManager::append).
///
/// The default appends to the end of the file while holding an exclusive
/// lock for the duration of the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendFlags {
    /// Write at the end of the file. When unset the contents are replaced.
    pub append: bool,
    /// Hold an exclusive lock on the file while writing.
    pub exclusive_lock: bool,
}

impl AppendFlags {
    /// Builds flags from the two switches.
    pub const fn new(append: bool, exclusive_lock: bool) -> Self {
        Self {
            append,
            exclusive_lock,
        }
    }

    /// Appends without taking the lock.
    pub const fn unlocked() -> Self { Self::new(true, false) }
}

impl Default for AppendFlags {
    fn default() -> Self { Self::new(true, true) }
}
