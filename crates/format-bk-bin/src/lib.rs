//! BK-0010 `.bin` program images.
//!
//! The format is the one produced by the BK tape monitor when saving to a
//! file: a 4-byte header followed by the raw memory contents.
//!
//! | offset | size | content |
//! |---|---|---|
//! | 0 | 2 | load address (little-endian PDP-11 word) |
//! | 2 | 2 | payload length in bytes |
//! | 4 | n | payload |
//!
//! Files are often padded to a block boundary, so bytes after the declared
//! payload are ignored.

use thiserror::Error;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 4;

/// Size of the PDP-11 address space.
const ADDRESS_SPACE: usize = 0x1_0000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BinError {
    #[error("image is {0} bytes, shorter than the {HEADER_SIZE}-byte header")]
    MissingHeader(usize),

    #[error("header declares {declared} payload bytes but only {available} follow")]
    Truncated { declared: usize, available: usize },

    #[error("payload at {address:#o} with {length} bytes runs past the end of memory")]
    OutOfRange { address: u16, length: usize },
}

/// A parsed program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinImage<'a> {
    pub load_address: u16,
    pub payload: &'a [u8],
}

impl<'a> BinImage<'a> {
    /// Parse an image, borrowing the payload from `data`.
    pub fn parse(data: &'a [u8]) -> Result<Self, BinError> {
        if data.len() < HEADER_SIZE {
            return Err(BinError::MissingHeader(data.len()));
        }

        let load_address = u16::from_le_bytes([data[0], data[1]]);
        let length = usize::from(u16::from_le_bytes([data[2], data[3]]));

        let available = data.len() - HEADER_SIZE;
        if length > available {
            return Err(BinError::Truncated {
                declared: length,
                available,
            });
        }
        if usize::from(load_address) + length > ADDRESS_SPACE {
            return Err(BinError::OutOfRange {
                address: load_address,
                length,
            });
        }

        Ok(Self {
            load_address,
            payload: &data[HEADER_SIZE..HEADER_SIZE + length],
        })
    }

    /// Address execution starts from after the image is in memory.
    #[must_use]
    pub fn start_address(&self) -> u16 {
        self.load_address
    }

    /// `(address, byte)` pairs in load order.
    pub fn bytes(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        self.payload
            .iter()
            .enumerate()
            .map(move |(i, &b)| (self.load_address.wrapping_add(i as u16), b))
    }
}
