//! BK-0010/BK-0011M session core.
//!
//! Composes a BK machine from host options, loads ROMs and content, and
//! drives the machine one host frame at a time at a fixed 25 Hz cadence.
//! The CPU, devices, raster and keyboard are collaborators behind the
//! `emu-core` traits; this crate owns configuration, storage, timing,
//! input latching and snapshots.

pub mod config;
pub mod content;
mod error;
pub mod input;
pub mod media;
pub mod options;
pub mod rom;
mod session;
pub mod snapshot;
pub mod vfs;

pub use config::{AspectRatio, ConfigChanges, MachineVariant, RomSet, SessionConfig};
pub use content::LoadBundle;
pub use error::{ConfigError, MediaError, Result, RomError, SessionError, SnapshotError};
pub use media::{StorageUnit, StorageUnits};
pub use options::CoreOptions;
pub use session::{AvInfo, SYSTEM_INFO, Session, SystemInfo};
pub use snapshot::SchedulerState;
pub use vfs::{FileAccess, NativeFileSystem, ProviderKind};
