//! File access capability.
//!
//! Two providers exist in practice: the native filesystem and a virtual file
//! system supplied by the host. Both sit behind these traits so callers never
//! see which one is active.

use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// Open mode. Only plain read or plain write are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

impl FromStr for AccessMode {
    type Err = io::Error;

    /// Parse a single-character mode string: `"r"` or `"w"`.
    fn from_str(s: &str) -> io::Result<Self> {
        match s {
            "r" => Ok(AccessMode::Read),
            "w" => Ok(AccessMode::Write),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported file mode {other:?}, expected \"r\" or \"w\""),
            )),
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessMode::Read => "r",
            AccessMode::Write => "w",
        })
    }
}

/// An open file from either provider.
pub trait FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Total file size in bytes. Must not move the read position.
    fn size(&mut self) -> io::Result<u64>;

    fn flush(&mut self) -> io::Result<()>;

    /// Flush and release the handle.
    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.flush()
    }

    /// Read a single byte, `None` at end of file.
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    fn write_byte(&mut self, value: u8) -> io::Result<()> {
        match self.write(&[value])? {
            1 => Ok(()),
            _ => Err(io::Error::new(io::ErrorKind::WriteZero, "short write")),
        }
    }

    /// Fill `buf` completely, failing on a short read.
    fn read_exact(&mut self, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.read(buf)? {
                0 => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "file ended early",
                    ));
                }
                n => {
                    let rest = buf;
                    buf = &mut rest[n..];
                }
            }
        }
        Ok(())
    }
}

/// A provider of file handles.
pub trait FileSystem {
    fn open(&self, path: &Path, mode: AccessMode) -> io::Result<Box<dyn FileHandle>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_accepts_single_characters_only() {
        assert_eq!("r".parse::<AccessMode>().ok(), Some(AccessMode::Read));
        assert_eq!("w".parse::<AccessMode>().ok(), Some(AccessMode::Write));
        assert!("rw".parse::<AccessMode>().is_err());
        assert!("rb".parse::<AccessMode>().is_err());
        assert!("a".parse::<AccessMode>().is_err());
        assert!("".parse::<AccessMode>().is_err());
    }
}
