use std::{collections::HashMap, fmt, fs::OpenOptions, str::FromStr};

use lazy_static::lazy_static;

use crate::error::FileManagerError;

/// Close-on-exec modifier, appended to a base mode token.
const CLOSE_ON_EXEC: char = 'e';

lazy_static! {
    static ref MODES_BY_TOKEN: HashMap<&'static str, OpenMode> =
        OpenMode::ALL.iter().map(|mode| (mode.token(), *mode)).collect();
}

/// The base open modes, with `fopen`-compatible semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// `r`: read only, positioned at the start. Fails if the file is absent.
    Read,
    /// `r+`: read and write, positioned at the start. Fails if the file is absent.
    ReadAndWriteBeginning,
    /// `w`: write only, truncates, creates if absent.
    WriteOnly,
    /// `w+`: read and write, truncates, creates if absent.
    ReadAndWrite,
    /// `a`: write only, every write goes to the end, creates if absent.
    WriteOnlyToEnd,
    /// `a+`: read and write, writes go to the end, creates if absent.
    ReadAndWriteToEnd,
    /// `x`: write only, creates the file and fails if it already exists.
    CreateAndWriteOnly,
    /// `x+`: read and write, otherwise like `x`.
    CreateAndReadAndWrite,
    /// `c`: write only, creates if absent, never truncates.
    WriteOnlyBeginning,
    /// `c+`: read and write, otherwise like `c`.
    ReadAndWriteOnlyBeginning,
}

impl OpenMode {
    /// Every base mode, in table order.
    pub const ALL: [OpenMode; 10] = [
        OpenMode::Read,
        OpenMode::ReadAndWriteBeginning,
        OpenMode::WriteOnly,
        OpenMode::ReadAndWrite,
        OpenMode::WriteOnlyToEnd,
        OpenMode::ReadAndWriteToEnd,
        OpenMode::CreateAndWriteOnly,
        OpenMode::CreateAndReadAndWrite,
        OpenMode::WriteOnlyBeginning,
        OpenMode::ReadAndWriteOnlyBeginning,
    ];

    /// The `fopen` token for this mode, such as `"r+"`.
    pub const fn token(self) -> &'static str {
        match self {
            OpenMode::Read => "r",
            OpenMode::ReadAndWriteBeginning => "r+",
            OpenMode::WriteOnly => "w",
            OpenMode::ReadAndWrite => "w+",
            OpenMode::WriteOnlyToEnd => "a",
            OpenMode::ReadAndWriteToEnd => "a+",
            OpenMode::CreateAndWriteOnly => "x",
            OpenMode::CreateAndReadAndWrite => "x+",
            OpenMode::WriteOnlyBeginning => "c",
            OpenMode::ReadAndWriteOnlyBeginning => "c+",
        }
    }

    /// Whether the handle can be read from.
    pub const fn is_readable(self) -> bool {
        !matches!(
            self,
            OpenMode::WriteOnly
                | OpenMode::WriteOnlyToEnd
                | OpenMode::CreateAndWriteOnly
                | OpenMode::WriteOnlyBeginning
        )
    }

    /// Whether the handle can be written to.
    pub const fn is_writable(self) -> bool { !matches!(self, OpenMode::Read) }

    /// Whether every write lands at the end of the file.
    pub const fn appends(self) -> bool {
        matches!(self, OpenMode::WriteOnlyToEnd | OpenMode::ReadAndWriteToEnd)
    }

    /// Whether opening empties an existing file.
    pub const fn truncates(self) -> bool {
        matches!(self, OpenMode::WriteOnly | OpenMode::ReadAndWrite)
    }

    /// Whether opening creates the file when it is absent.
    pub const fn creates(self) -> bool {
        !matches!(self, OpenMode::Read | OpenMode::ReadAndWriteBeginning)
    }

    /// Whether opening fails when the file already exists.
    pub const fn is_exclusive(self) -> bool {
        matches!(self, OpenMode::CreateAndWriteOnly | OpenMode::CreateAndReadAndWrite)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.token()) }
}

/// An open mode together with its optional close-on-exec modifier.
///
/// Parses from and renders to the usual `fopen` tokens:
///
/// ```rust
/// use filewriter::{Mode, OpenMode};
///
/// let mode: Mode = "a+e".parse().unwrap();
/// assert_eq!(mode.open_mode(), OpenMode::ReadAndWriteToEnd);
/// assert!(mode.close_on_exec());
/// assert_eq!(mode.to_string(), "a+e");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mode {
    open_mode: OpenMode,
    close_on_exec: bool,
}

impl Mode {
    /// Wraps `open_mode` without the close-on-exec modifier.
    pub const fn new(open_mode: OpenMode) -> Self {
        Self {
            open_mode,
            close_on_exec: false,
        }
    }

    /// Marks the handle as close-on-exec.
    ///
    /// Handles opened through the standard library on POSIX targets are
    /// already close-on-exec, so this only records the request.
    pub const fn with_close_on_exec(mut self) -> Self {
        self.close_on_exec = true;
        self
    }

    /// The base open mode.
    pub const fn open_mode(&self) -> OpenMode { self.open_mode }

    /// Whether the close-on-exec modifier was requested.
    pub const fn close_on_exec(&self) -> bool { self.close_on_exec }

    /// Builds the platform open options matching this mode.
    pub fn open_options(&self) -> OpenOptions {
        let mode = self.open_mode;
        let mut options = OpenOptions::new();
        options.read(mode.is_readable());

        if mode.appends() {
            options.append(true);
        } else {
            options.write(mode.is_writable());
        }

        if mode.is_exclusive() {
            options.create_new(true);
        } else {
            options.create(mode.creates()).truncate(mode.truncates());
        }

        options
    }
}

impl Default for Mode {
    fn default() -> Self { Self::new(OpenMode::ReadAndWrite) }
}

impl From<OpenMode> for Mode {
    fn from(open_mode: OpenMode) -> Self { Self::new(open_mode) }
}

impl FromStr for Mode {
    type Err = FileManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, close_on_exec) = match s.strip_suffix(CLOSE_ON_EXEC) {
            Some(base) => (base, true),
            None => (s, false),
        };

        let open_mode = MODES_BY_TOKEN
            .get(base)
            .copied()
            .ok_or_else(|| FileManagerError::InvalidArgument(format!("Unknown open mode \"{s}\"")))?;

        Ok(Self {
            open_mode,
            close_on_exec,
        })
    }
}

impl TryFrom<&str> for Mode {
    type Error = FileManagerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> { value.parse() }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.open_mode.token())?;
        if self.close_on_exec {
            write!(f, "{CLOSE_ON_EXEC}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_token() {
        for open_mode in OpenMode::ALL {
            let mode: Mode = open_mode.token().parse().unwrap();
            assert_eq!(mode.open_mode(), open_mode);
            assert!(!mode.close_on_exec());
        }
    }

    #[test]
    fn test_parse_close_on_exec() {
        let mode: Mode = "w+e".parse().unwrap();
        assert_eq!(mode, Mode::new(OpenMode::ReadAndWrite).with_close_on_exec());
        assert_eq!(mode.to_string(), "w+e");

        let mode: Mode = "re".parse().unwrap();
        assert_eq!(mode.open_mode(), OpenMode::Read);
        assert!(mode.close_on_exec());
    }

    #[test]
    fn test_parse_rejects_unknown_tokens() {
        for token in ["", "e", "z", "rw", "w++", "ee", "r+ee", "W"] {
            let result = token.parse::<Mode>();
            assert!(
                matches!(result, Err(FileManagerError::InvalidArgument(_))),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_default_is_read_and_write() {
        assert_eq!(Mode::default().to_string(), "w+");
        assert!(Mode::default().open_mode().truncates());
    }

    #[test]
    fn test_mode_table() {
        use OpenMode::*;

        let creating: Vec<_> = OpenMode::ALL.into_iter().filter(|m| m.creates()).collect();
        assert_eq!(creating.len(), 8);
        assert!(!Read.creates() && !ReadAndWriteBeginning.creates());

        assert!(WriteOnly.truncates() && ReadAndWrite.truncates());
        assert!(!WriteOnlyBeginning.truncates() && !WriteOnlyToEnd.truncates());

        assert!(CreateAndWriteOnly.is_exclusive() && CreateAndReadAndWrite.is_exclusive());
        assert!(!WriteOnlyBeginning.is_exclusive());

        assert!(!Read.is_writable());
        assert!(!WriteOnly.is_readable());
        assert!(ReadAndWriteToEnd.is_readable() && ReadAndWriteToEnd.appends());
    }
}
