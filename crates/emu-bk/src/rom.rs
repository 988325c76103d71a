//! ROM image loading.
//!
//! ROMs live in `<system directory>/bk`. A ROM name that already contains a
//! path separator is used as-is.

use std::path::{Path, PathBuf};

use emu_core::RomSlot;

use crate::error::RomError;
use crate::vfs::FileAccess;

/// Subdirectory of the host's system directory holding the BK ROMs.
pub const ROM_SUBDIR: &str = "bk";

/// Accepted image sizes for a socket as `(min, max)` bytes. Larger files are
/// truncated to `max`.
#[must_use]
pub const fn size_limits(slot: RomSlot) -> (usize, usize) {
    match slot {
        RomSlot::Monitor => (8192, 8192),
        // FOCAL fills 8K, Vilnius BASIC runs up to the I/O page.
        RomSlot::Language => (8192, 24_576),
        RomSlot::DiskController => (4096, 4096),
    }
}

/// ROM directory for a host system directory.
#[must_use]
pub fn rom_dir(system_dir: Option<&Path>) -> Option<PathBuf> {
    system_dir
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(ROM_SUBDIR))
}

/// Full path for a ROM name.
#[must_use]
pub fn rom_path(rom_dir: Option<&Path>, name: &str) -> PathBuf {
    match rom_dir {
        Some(dir) if !name.contains('/') => dir.join(name),
        _ => PathBuf::from(name),
    }
}

/// Load a ROM image of between `min` and `max` bytes.
///
/// Lookup progress goes to `notice`.
pub fn load_rom_file(
    files: &FileAccess,
    rom_dir: Option<&Path>,
    name: &str,
    (min, max): (usize, usize),
    notice: &mut dyn FnMut(&str),
) -> Result<Vec<u8>, RomError> {
    let path = rom_path(rom_dir, name);
    let (path, mut handle) = files
        .open_asset(&path, notice)
        .map_err(|source| RomError::Open {
            path: path.clone(),
            source,
        })?;

    let size = handle.size().map_err(|source| RomError::Read {
        path: path.clone(),
        source,
    })?;
    let len = usize::try_from(size).unwrap_or(usize::MAX).min(max);
    if len < min {
        return Err(RomError::Undersized { path, size, min });
    }

    let mut image = Vec::new();
    image
        .try_reserve_exact(len)
        .map_err(|_| RomError::OutOfMemory {
            path: path.clone(),
            len,
        })?;
    image.resize(len, 0);
    handle
        .read_exact(&mut image)
        .map_err(|source| RomError::Read { path, source })?;
    // Nothing was written, so a failed close loses nothing.
    let _ = handle.close();

    Ok(image)
}
