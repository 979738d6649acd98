//! Fixed-width integer reading and writing plus separator splitting.
//!
//! # Invariants
//!
//! 1. **Bounds before slicing**: every read checks the requested range
//!    against the buffer with overflow-checked arithmetic and reports the
//!    failing offset instead of panicking.
//!
//! 2. **No hidden state**: byte order is always an explicit argument; a
//!    [`ByteReader`] only tracks its own position inside one buffer.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between plural forms and between translation variants.
pub const NUL: u8 = 0x00;

/// Separator between a message context and the message itself.
pub const EOT: u8 = 0x04;

/// Byte order of multi-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    #[default]
    Little,
}

impl Endianness {
    /// Encodes `value` in this byte order.
    #[must_use]
    pub const fn u32_to_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::Big => value.to_be_bytes(),
            Self::Little => value.to_le_bytes(),
        }
    }

    /// Decodes four bytes in this byte order.
    #[must_use]
    pub const fn u32_from_bytes(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Big => u32::from_be_bytes(bytes),
            Self::Little => u32::from_le_bytes(bytes),
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Big => write!(f, "big-endian"),
            Self::Little => write!(f, "little-endian"),
        }
    }
}

/// Appends `value` to `out` in the given byte order.
pub fn put_u32(out: &mut Vec<u8>, value: u32, endianness: Endianness) {
    out.extend_from_slice(&endianness.u32_to_bytes(value));
}

/// Converts a length or offset to `u32`, failing when it does not fit.
pub fn to_u32(value: usize, what: &str) -> CodecResult<u32> {
    u32::try_from(value).map_err(|_| {
        CodecError::format(value, format!("{what} of {value} does not fit in 32 bits"))
    })
}

/// Cursor over a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `bytes`.
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current position in bytes.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the underlying buffer is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes left after the current position.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// Whether every byte has been consumed.
    #[must_use]
    pub const fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Moves the cursor to an absolute offset.
    pub fn seek(&mut self, offset: usize) -> CodecResult<()> {
        if offset > self.bytes.len() {
            return Err(CodecError::format(
                offset,
                format!("seek past end of {}-byte buffer", self.bytes.len()),
            ));
        }
        self.pos = offset;
        Ok(())
    }

    /// Borrows `len` bytes at `offset` without moving the cursor.
    pub fn slice_at(&self, offset: usize, len: usize, what: &str) -> CodecResult<&'a [u8]> {
        let end = offset.checked_add(len).ok_or_else(|| {
            CodecError::format(offset, format!("{what}: length {len} overflows"))
        })?;
        if end > self.bytes.len() {
            return Err(CodecError::format(
                offset,
                format!(
                    "{what}: expected {len} bytes ending at {end}, found buffer of {} bytes",
                    self.bytes.len()
                ),
            ));
        }
        Ok(&self.bytes[offset..end])
    }

    /// Reads `len` bytes and advances.
    pub fn read_slice(&mut self, len: usize, what: &str) -> CodecResult<&'a [u8]> {
        let slice = self.slice_at(self.pos, len, what)?;
        self.pos += len;
        Ok(slice)
    }

    /// Reads one byte and advances.
    pub fn read_u8(&mut self, what: &str) -> CodecResult<u8> {
        Ok(self.read_slice(1, what)?[0])
    }

    /// Reads a four-byte unsigned integer and advances.
    pub fn read_u32(&mut self, endianness: Endianness, what: &str) -> CodecResult<u32> {
        let raw = self.read_slice(4, what)?;
        Ok(endianness.u32_from_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    /// Reads a four-byte unsigned integer as a `usize`.
    pub fn read_len(&mut self, endianness: Endianness, what: &str) -> CodecResult<usize> {
        let at = self.pos;
        let value = self.read_u32(endianness, what)?;
        usize::try_from(value)
            .map_err(|_| CodecError::format(at, format!("{what} of {value} exceeds address space")))
    }
}

/// Splits `bytes` at the first occurrence of `separator`.
#[must_use]
pub fn split_once_byte(bytes: &[u8], separator: u8) -> Option<(&[u8], &[u8])> {
    let index = bytes.iter().position(|b| *b == separator)?;
    Some((&bytes[..index], &bytes[index + 1..]))
}

/// Splits `bytes` on every NUL byte. Always yields at least one part.
pub fn split_nul(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    bytes.split(|b| *b == NUL)
}

/// Interprets `bytes` as UTF-8, reporting the first bad byte's absolute offset.
pub fn utf8_at(bytes: &[u8], base_offset: usize) -> CodecResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| {
        CodecError::format(
            base_offset + e.valid_up_to(),
            "expected UTF-8 text, found invalid byte sequence",
        )
    })
}
