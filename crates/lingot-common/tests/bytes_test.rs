//! Tests for the shared byte helpers.
//!
//! These tests cover:
//! - Fixed-width integers in both byte orders
//! - Bounds reporting of the reader
//! - Separator splitting on multi-byte UTF-8 input

use lingot_common::*;
use proptest::prelude::*;

const FLAG_LV: &str = "\u{1F1F1}\u{1F1FB}";
const RAINBOW_FLAG: &str = "\u{1F3F3}\u{FE0F}\u{200D}\u{1F308}";
const SUPERHERO: &str = "\u{1F9B8}\u{1F3FF}\u{200D}\u{2642}\u{FE0F}";
const COMBINING: &str = "e\u{0301}\u{0308}";

#[test]
fn test_reader_walks_mixed_fields() {
    let mut buf = Vec::new();
    put_u32(&mut buf, 0x0102_0304, Endianness::Big);
    put_u32(&mut buf, 0x0102_0304, Endianness::Little);
    buf.extend_from_slice(SUPERHERO.as_bytes());

    assert_eq!(&buf[..8], &[1, 2, 3, 4, 4, 3, 2, 1]);

    let mut reader = ByteReader::new(&buf);
    assert_eq!(reader.read_u32(Endianness::Big, "a").unwrap(), 0x0102_0304);
    assert_eq!(reader.read_len(Endianness::Little, "b").unwrap(), 0x0102_0304);
    let text = reader.read_slice(reader.remaining(), "text").unwrap();
    assert_eq!(utf8_at(text, 8).unwrap(), SUPERHERO);
    assert!(reader.is_at_end());
}

#[test]
fn test_seek_bounds() {
    let mut reader = ByteReader::new(&[0u8; 8]);
    assert!(reader.seek(8).is_ok());
    assert!(reader.seek(9).unwrap_err().is_format());
}

#[test]
fn test_to_u32_limit() {
    assert_eq!(to_u32(7, "length").unwrap(), 7);
    assert!(to_u32(u32::MAX as usize, "length").is_ok());
    #[cfg(target_pointer_width = "64")]
    assert!(to_u32(u32::MAX as usize + 1, "length").unwrap_err().is_format());
}

#[test]
fn test_split_keeps_multibyte_sequences() {
    let joined = format!("{FLAG_LV}\0{RAINBOW_FLAG}\0{COMBINING}");
    let parts: Vec<&str> = split_nul(joined.as_bytes())
        .map(|part| std::str::from_utf8(part).unwrap())
        .collect();
    assert_eq!(parts, vec![FLAG_LV, RAINBOW_FLAG, COMBINING]);
}

proptest! {
    #[test]
    fn test_property_u32_roundtrip(value in any::<u32>(), big in any::<bool>()) {
        let endianness = if big { Endianness::Big } else { Endianness::Little };
        let mut buf = Vec::new();
        put_u32(&mut buf, value, endianness);
        let mut reader = ByteReader::new(&buf);
        prop_assert_eq!(reader.read_u32(endianness, "value").unwrap(), value);
    }
}
