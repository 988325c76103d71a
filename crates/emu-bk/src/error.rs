use std::io;
use std::path::PathBuf;

use emu_core::MachineFault;
use format_bk_bin::BinError;
use thiserror::Error;

use crate::media::MAX_UNITS;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown BK model {0:?}")]
    UnknownVariant(String),
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} media supplied, at most {MAX_UNITS} drive units exist")]
    TooMany(usize),

    #[error("out of memory allocating {len} bytes of storage")]
    OutOfMemory { len: usize },
}

#[derive(Debug, Error)]
pub enum RomError {
    #[error("couldn't open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("couldn't read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("incomplete or damaged file {path}: {size} bytes, need at least {min}")]
    Undersized { path: PathBuf, size: u64, min: usize },

    #[error("out of memory allocating {len} bytes for {path}")]
    OutOfMemory { path: PathBuf, len: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot is {found} bytes, expected at least {expected}")]
    TooShort { expected: usize, found: usize },

    #[error("destination holds {found} bytes, snapshot needs {expected}")]
    BufferTooSmall { expected: usize, found: usize },

    #[error("snapshot rebased at frame {base_frame}, after its own frame {frame_index}")]
    RebaseAhead { frame_index: u64, base_frame: u64 },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Media(#[from] MediaError),

    #[error("ROM error: {0}")]
    Rom(#[from] RomError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("invalid program image: {0}")]
    Program(#[from] BinError),

    #[error(transparent)]
    Machine(#[from] MachineFault),

    #[error("out of memory copying a {len}-byte program image")]
    OutOfMemory { len: usize },

    #[error("session stopped after a fatal error")]
    Halted,
}

impl SessionError {
    /// Whether the session can keep running after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SessionError::Snapshot(_))
    }
}
