//! Floppy media for the BK disk controller.
//!
//! All inserted images live back to back in one buffer owned by the session.
//! The drive emulation reads and writes through per-unit views of it, and the
//! host sees the whole buffer as the save-data region, so disk writes persist
//! without any per-image bookkeeping.

use std::ops::Range;

use emu_core::DriveMedia;

use crate::error::MediaError;

/// Drive units on the BK floppy controller.
pub const MAX_UNITS: usize = 4;

/// Placement of one drive unit inside the shared buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageUnit {
    /// Byte offset of the unit's image. Always the sum of the lengths of the
    /// units before it, even when this unit is empty.
    pub offset: usize,
    /// Image length, 0 when no disk is inserted.
    pub length: usize,
    pub read_only: bool,
}

impl StorageUnit {
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.length != 0
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// The aggregated media of one session.
#[derive(Debug, Default)]
pub struct StorageUnits {
    buffer: Vec<u8>,
    units: [StorageUnit; MAX_UNITS],
}

impl StorageUnits {
    /// No disks inserted.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copy up to four images into one contiguous buffer.
    ///
    /// `None` and empty images leave their unit empty and take no space.
    /// Either every image is copied or nothing is.
    pub fn assemble(media: &[Option<&[u8]>]) -> Result<Self, MediaError> {
        if media.len() > MAX_UNITS {
            return Err(MediaError::TooMany(media.len()));
        }

        let total = media
            .iter()
            .flatten()
            .try_fold(0usize, |sum, image| sum.checked_add(image.len()))
            .ok_or(MediaError::OutOfMemory { len: usize::MAX })?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(total)
            .map_err(|_| MediaError::OutOfMemory { len: total })?;

        let mut units = [StorageUnit::default(); MAX_UNITS];
        for (unit, image) in units.iter_mut().zip(media) {
            let image = image.unwrap_or_default();
            *unit = StorageUnit {
                offset: buffer.len(),
                length: image.len(),
                read_only: false,
            };
            buffer.extend_from_slice(image);
        }
        // Units past the supplied list still sit at the end of the buffer.
        for unit in units.iter_mut().skip(media.len()) {
            unit.offset = buffer.len();
        }

        Ok(Self { buffer, units })
    }

    #[must_use]
    pub fn units(&self) -> &[StorageUnit; MAX_UNITS] {
        &self.units
    }

    /// Total bytes across all units.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.buffer.len()
    }

    /// Write-protect a unit.
    pub fn set_read_only(&mut self, index: usize, read_only: bool) {
        if let Some(unit) = self.units.get_mut(index) {
            unit.read_only = read_only;
        }
    }

    /// The whole buffer as the host's save-data region, `None` without disks.
    pub fn save_ram(&mut self) -> Option<&mut [u8]> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(&mut self.buffer)
        }
    }
}

impl DriveMedia for StorageUnits {
    fn unit_count(&self) -> usize {
        MAX_UNITS
    }

    fn unit(&self, index: usize) -> Option<&[u8]> {
        let unit = self.units.get(index).filter(|u| u.is_present())?;
        Some(&self.buffer[unit.range()])
    }

    fn unit_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let unit = *self
            .units
            .get(index)
            .filter(|u| u.is_present() && !u.read_only)?;
        Some(&mut self.buffer[unit.range()])
    }

    fn is_read_only(&self, index: usize) -> bool {
        self.units.get(index).is_some_and(|u| u.read_only)
    }
}
