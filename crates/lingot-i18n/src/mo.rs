//! gettext MO catalog encoding and decoding.
//!
//! Layout (every integer is a `u32` in the file's byte order):
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ magic 0x950412de                                         │
//! │ revision │ N │ originals@ │ translations@ │ hash size │ hash@ │
//! ├──────────────────────────────────────────────────────────┤
//! │ N × (length, offset) for originals, byte-wise sorted     │
//! │ N × (length, offset) for translations, same order        │
//! ├──────────────────────────────────────────────────────────┤
//! │ originals, NUL terminated │ translations, NUL terminated │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! No hash table is written; its offset points at the (empty) region right
//! after the translation table.

use crate::model::{Catalog, MsgId, MsgStr};
use lingot_common::{check_arity, put_u32, to_u32, ByteReader, CodecError, CodecResult, Endianness};
use std::io::{Read, Write};
use tracing::{debug, trace, warn};

/// MO magic number as read in the file's own byte order.
pub const MO_MAGIC: u32 = 0x9504_12de;

/// Magic plus the six header fields.
pub const HEADER_SIZE: usize = 28;

/// Size of one `(length, offset)` table row.
const ROW_SIZE: usize = 8;

/// Fixed header following the magic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoHeader {
    /// File format revision; the major part is the upper 16 bits.
    pub revision: u32,
    /// Number of strings.
    pub count: u32,
    /// Offset of the original string table.
    pub originals_offset: u32,
    /// Offset of the translation string table.
    pub translations_offset: u32,
    /// Number of hash table slots.
    pub hash_size: u32,
    /// Offset of the hash table.
    pub hash_offset: u32,
}

impl MoHeader {
    /// Header for `count` entries with no hash table.
    pub fn for_count(count: usize) -> CodecResult<Self> {
        let table = count
            .checked_mul(ROW_SIZE)
            .ok_or_else(|| CodecError::format(0, format!("{count} entries overflow the tables")))?;
        let translations_offset = HEADER_SIZE + table;
        Ok(Self {
            revision: 0,
            count: to_u32(count, "string count")?,
            originals_offset: to_u32(HEADER_SIZE, "original table offset")?,
            translations_offset: to_u32(translations_offset, "translation table offset")?,
            hash_size: 0,
            hash_offset: to_u32(translations_offset + table, "hash table offset")?,
        })
    }

    fn write(&self, out: &mut Vec<u8>, endianness: Endianness) {
        for field in [
            self.revision,
            self.count,
            self.originals_offset,
            self.translations_offset,
            self.hash_size,
            self.hash_offset,
        ] {
            put_u32(out, field, endianness);
        }
    }

    fn read(reader: &mut ByteReader<'_>, endianness: Endianness) -> CodecResult<Self> {
        Ok(Self {
            revision: reader.read_u32(endianness, "revision")?,
            count: reader.read_u32(endianness, "string count")?,
            originals_offset: reader.read_u32(endianness, "original table offset")?,
            translations_offset: reader.read_u32(endianness, "translation table offset")?,
            hash_size: reader.read_u32(endianness, "hash table size")?,
            hash_offset: reader.read_u32(endianness, "hash table offset")?,
        })
    }

    /// Major part of the revision.
    #[must_use]
    pub const fn major_revision(&self) -> u32 {
        self.revision >> 16
    }
}

/// Determines the byte order from the leading magic number.
///
/// # Errors
///
/// [`CodecError::Format`] if the buffer is shorter than four bytes or the
/// magic matches neither byte order.
pub fn detect_endianness(bytes: &[u8]) -> CodecResult<Endianness> {
    let raw = ByteReader::new(bytes).read_u32(Endianness::Big, "magic number")?;
    if raw == MO_MAGIC {
        Ok(Endianness::Big)
    } else if raw == MO_MAGIC.swap_bytes() {
        Ok(Endianness::Little)
    } else {
        Err(CodecError::format(
            0,
            format!(
                "expected magic 0x{MO_MAGIC:08x} or 0x{:08x}, found 0x{raw:08x}",
                MO_MAGIC.swap_bytes()
            ),
        ))
    }
}

/// Encodes `catalog` as an MO file.
///
/// Entries are ordered by the byte-wise comparison of their serialized
/// identities, so equal catalogs always produce identical bytes.
///
/// # Errors
///
/// [`CodecError::Arity`] if any identity or translation has more than 253
/// variants; [`CodecError::Format`] if the file would exceed 4 GiB.
pub fn encode_mo(catalog: &Catalog, endianness: Endianness) -> CodecResult<Vec<u8>> {
    let entries = catalog.sorted_entries();
    for (_, id, message) in &entries {
        check_arity("message identity", id.arity())?;
        check_arity("translated message", message.arity())?;
    }

    let originals: Vec<&[u8]> = entries.iter().map(|(bytes, _, _)| bytes.as_slice()).collect();
    let translations: Vec<Vec<u8>> = entries
        .iter()
        .map(|(_, _, message)| message.to_mo_bytes())
        .collect();

    let header = MoHeader::for_count(entries.len())?;
    let blob_len: usize = originals
        .iter()
        .copied()
        .chain(translations.iter().map(Vec::as_slice))
        .map(|s| s.len() + 1)
        .sum();

    let mut out = Vec::with_capacity(header.hash_offset as usize + blob_len);
    put_u32(&mut out, MO_MAGIC, endianness);
    header.write(&mut out, endianness);

    let mut offset = header.hash_offset as usize;
    for text in originals.iter().copied().chain(translations.iter().map(Vec::as_slice)) {
        put_u32(&mut out, to_u32(text.len(), "string length")?, endianness);
        put_u32(&mut out, to_u32(offset, "string offset")?, endianness);
        offset += text.len() + 1;
    }
    to_u32(offset, "file size")?;

    for text in originals.iter().copied().chain(translations.iter().map(Vec::as_slice)) {
        out.extend_from_slice(text);
        out.push(0);
    }

    debug!(
        "Encoded MO catalog: {} entries, {} bytes, {}",
        entries.len(),
        out.len(),
        endianness
    );
    Ok(out)
}

/// Encodes `catalog` and writes it to `writer`.
///
/// Nothing is written if encoding fails.
pub fn write_mo<W: Write>(
    writer: &mut W,
    catalog: &Catalog,
    endianness: Endianness,
) -> CodecResult<()> {
    let bytes = encode_mo(catalog, endianness)?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Decodes an MO file in either byte order.
///
/// # Errors
///
/// [`CodecError::Format`] for a bad magic number, an unsupported major
/// revision, tables or strings reaching past the buffer, a missing NUL
/// terminator, invalid UTF-8, or a duplicated identity.
pub fn decode_mo(bytes: &[u8]) -> CodecResult<Catalog> {
    let endianness = detect_endianness(bytes)?;
    let mut reader = ByteReader::new(bytes);
    reader.seek(4)?;
    let header = MoHeader::read(&mut reader, endianness)?;

    match header.major_revision() {
        0 => {}
        1 => warn!(
            "MO revision 0x{:08x} may carry system-dependent strings, reading plain strings only",
            header.revision
        ),
        major => {
            return Err(CodecError::format(
                4,
                format!("expected major revision 0 or 1, found {major}"),
            ))
        }
    }
    if header.hash_size != 0 {
        trace!("Skipping MO hash table with {} slots", header.hash_size);
    }

    let count = header.count as usize;
    let originals = table_at(&reader, header.originals_offset, count, "original")?;
    let translations = table_at(&reader, header.translations_offset, count, "translation")?;

    let mut catalog = Catalog::new();
    for index in 0..count {
        let (len, offset) = row(originals, index, endianness);
        let id =
            MsgId::from_mo_bytes(string_at(&reader, offset, len, "original string")?, offset)?;

        let (len, offset) = row(translations, index, endianness);
        let message =
            MsgStr::from_mo_bytes(string_at(&reader, offset, len, "translated string")?, offset)?;

        if catalog.contains_key(&id) {
            return Err(CodecError::format(
                header.originals_offset as usize + index * ROW_SIZE,
                format!("duplicate message identity {id}"),
            ));
        }
        catalog.insert(id, message);
    }

    debug!(
        "Decoded MO catalog: {} entries, {} bytes, {}",
        catalog.len(),
        bytes.len(),
        endianness
    );
    Ok(catalog)
}

/// Reads a whole MO file from `reader` and decodes it.
pub fn read_mo<R: Read>(reader: &mut R) -> CodecResult<Catalog> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode_mo(&bytes)
}

fn table_at<'a>(
    reader: &ByteReader<'a>,
    offset: u32,
    count: usize,
    what: &str,
) -> CodecResult<&'a [u8]> {
    let size = count.checked_mul(ROW_SIZE).ok_or_else(|| {
        CodecError::format(8, format!("string count {count} overflows the {what} table"))
    })?;
    if size > reader.len() {
        return Err(CodecError::format(
            8,
            format!(
                "string count {count} needs a {size}-byte {what} table, found buffer of {} bytes",
                reader.len()
            ),
        ));
    }
    reader.slice_at(offset as usize, size, &format!("{what} table"))
}

/// Borrows a string and checks its NUL terminator is inside the buffer.
fn string_at<'a>(
    reader: &ByteReader<'a>,
    offset: usize,
    len: usize,
    what: &str,
) -> CodecResult<&'a [u8]> {
    let with_nul = len
        .checked_add(1)
        .ok_or_else(|| CodecError::format(offset, format!("{what}: length {len} overflows")))?;
    let raw = reader.slice_at(offset, with_nul, what)?;
    match raw.split_last() {
        Some((0, text)) => Ok(text),
        _ => Err(CodecError::format(
            offset + len,
            format!("{what}: expected NUL terminator after {len} bytes"),
        )),
    }
}

fn row(table: &[u8], index: usize, endianness: Endianness) -> (usize, usize) {
    let at = index * ROW_SIZE;
    let field = |start: usize| {
        endianness.u32_from_bytes([
            table[start],
            table[start + 1],
            table[start + 2],
            table[start + 3],
        ]) as usize
    };
    (field(at), field(at + 4))
}
