//! Integration tests for lingot-i18n crate.
//!
//! These tests exercise the MO and Lang codecs end to end: byte order
//! handling, the 253 variant ceiling, Unicode fidelity, partial translations,
//! and the MO → Lang → MO round trip.

use lingot_common::test_utils::{assert_bytes_eq, init_test_logging, unicode_fixtures::*};
use lingot_i18n::*;
use std::collections::BTreeMap;

const HEADER: &str = "Content-Type: text/plain; charset=UTF-8";

fn id(strings: &[&str]) -> MsgId {
    MsgId::new(strings.iter().copied()).unwrap()
}

fn id_ctx(strings: &[&str], context: &str) -> MsgId {
    MsgId::with_context(strings.iter().copied(), context).unwrap()
}

fn msg(variants: &[&str]) -> MsgStr {
    MsgStr::new(variants.iter().copied()).unwrap()
}

fn numbered(first: &str, count: usize) -> Vec<String> {
    std::iter::once(first.to_string())
        .chain((2..=count).map(|n| n.to_string()))
        .collect()
}

fn metadata_only() -> Catalog {
    [(MsgId::metadata(), msg(&[HEADER]))].into_iter().collect()
}

fn rich_catalog() -> Catalog {
    [
        (MsgId::metadata(), msg(&[format!("Sing\nSing2\n{HEADER}").as_str()])),
        (id(&["1", "2", "3"]), msg(&["Sing"])),
        (id_ctx(&["1", "2"], "context"), msg(&["Singular", "Plural"])),
        (
            MsgId::new(numbered("Many plurals (253 is the maximum)", 253)).unwrap(),
            MsgStr::new(numbered("1", 253)).unwrap(),
        ),
        (
            id_ctx(&[format!("Emoji {HEART_EYES}").as_str(), FLAG_LV], CAT_JOY),
            msg(&[SUPERHERO, RAINBOW_FLAG, ""]),
        ),
        (id(&[UMLAUTS]), msg(&[SHARP_S])),
        (id(&[COMBINING]), msg(&[COMBINING, "plain"])),
    ]
    .into_iter()
    .collect()
}

fn without_metadata(catalog: &Catalog) -> Catalog {
    catalog.clone().split_metadata().0
}

// =============================================================================
// MO round trips
// =============================================================================

#[test]
fn test_mo_roundtrip_both_byte_orders() {
    init_test_logging();

    for catalog in [Catalog::new(), metadata_only(), rich_catalog()] {
        for endianness in [Endianness::Big, Endianness::Little] {
            let first = encode_mo(&catalog, endianness).unwrap();
            let decoded = decode_mo(&first).unwrap();
            assert_eq!(decoded, catalog, "{endianness}");

            let second = encode_mo(&decoded, endianness).unwrap();
            assert_bytes_eq(&first, &second);
            assert_eq!(decode_mo(&second).unwrap(), decoded);
        }
    }
}

#[test]
fn test_concrete_scenario_big_then_little() {
    let catalog: Catalog = [
        (id(&["1", "2", "3"]), msg(&["Sing"])),
        (id_ctx(&["1", "2"], "context"), msg(&["Singular", "Plural"])),
    ]
    .into_iter()
    .collect();

    let big = encode_mo(&catalog, Endianness::Big).unwrap();
    let little = encode_mo(&catalog, Endianness::Little).unwrap();
    assert_ne!(big, little);
    assert_eq!(decode_mo(&big).unwrap(), catalog);
    assert_eq!(decode_mo(&little).unwrap(), catalog);
}

#[test]
fn test_encoding_is_deterministic() {
    let catalog = rich_catalog();
    // rebuild from a differently ordered iterator to vary hash map insertion
    let mut entries: Vec<_> = catalog.clone().into_iter().collect();
    entries.reverse();
    let reordered: Catalog = entries.into_iter().collect();

    for endianness in [Endianness::Big, Endianness::Little] {
        let a = encode_mo(&catalog, endianness).unwrap();
        let b = encode_mo(&catalog, endianness).unwrap();
        let c = encode_mo(&reordered, endianness).unwrap();
        assert_bytes_eq(&a, &b);
        assert_bytes_eq(&a, &c);
    }
}

#[test]
fn test_unicode_bytes_unaltered() {
    let catalog = rich_catalog();
    let bytes = encode_mo(&catalog, Endianness::Little).unwrap();
    for needle in [HEART_EYES, FLAG_LV, CAT_JOY, SUPERHERO, RAINBOW_FLAG, UMLAUTS, SHARP_S, COMBINING] {
        assert!(
            bytes
                .windows(needle.len())
                .any(|window| window == needle.as_bytes()),
            "{needle:?} not found verbatim"
        );
    }
}

// =============================================================================
// Malformed MO input
// =============================================================================

#[test]
fn test_corrupted_magic_is_format_error() {
    let mut bytes = encode_mo(&rich_catalog(), Endianness::Big).unwrap();
    bytes[0] ^= 0xff;
    let err = decode_mo(&bytes).unwrap_err();
    assert!(err.is_format(), "{err}");
}

#[test]
fn test_truncated_mo_is_format_error() {
    let bytes = encode_mo(&rich_catalog(), Endianness::Little).unwrap();
    for len in [0, 3, 10, 27, bytes.len() / 2, bytes.len() - 1] {
        let err = decode_mo(&bytes[..len]).unwrap_err();
        assert!(err.is_format(), "length {len}: {err}");
    }
}

#[test]
fn test_oversized_count_is_format_error() {
    let mut bytes = encode_mo(&metadata_only(), Endianness::Big).unwrap();
    bytes[8..12].copy_from_slice(&0x1000_0000u32.to_be_bytes());
    assert!(decode_mo(&bytes).unwrap_err().is_format());
}

#[test]
fn test_string_offset_past_end_is_format_error() {
    let mut bytes = encode_mo(&metadata_only(), Endianness::Little).unwrap();
    // offset field of the first original string row
    bytes[32..36].copy_from_slice(&u32::MAX.to_le_bytes());
    let err = decode_mo(&bytes).unwrap_err();
    match err {
        CodecError::Format { offset, .. } => assert_eq!(offset, u32::MAX as usize),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_invalid_utf8_is_format_error() {
    let catalog: Catalog = [(id(&["abc"]), msg(&["xyz"]))].into_iter().collect();
    let mut bytes = encode_mo(&catalog, Endianness::Big).unwrap();
    let at = bytes.len() - 4;
    bytes[at] = 0xff;
    assert!(decode_mo(&bytes).unwrap_err().is_format());
}

// =============================================================================
// Plural ceiling
// =============================================================================

#[test]
fn test_plural_ceiling_mo() {
    let ok: Catalog = [(
        MsgId::new(numbered("a", MAX_VARIANTS)).unwrap(),
        MsgStr::new(numbered("b", MAX_VARIANTS)).unwrap(),
    )]
    .into_iter()
    .collect();
    assert!(encode_mo(&ok, Endianness::Big).is_ok());

    let big_id: Catalog = [(MsgId::new(numbered("a", 254)).unwrap(), msg(&["b"]))]
        .into_iter()
        .collect();
    assert!(encode_mo(&big_id, Endianness::Big).unwrap_err().is_arity());

    let big_msg: Catalog = [(id(&["a"]), MsgStr::new(numbered("b", 254)).unwrap())]
        .into_iter()
        .collect();
    let mut sink = Vec::new();
    assert!(write_mo(&mut sink, &big_msg, Endianness::Little)
        .unwrap_err()
        .is_arity());
    assert!(sink.is_empty(), "no partial output on arity failure");
}

#[test]
fn test_plural_ceiling_lang() {
    let ok = MsgId::new(numbered("a", MAX_VARIANTS)).unwrap();
    assert!(encode_template(&[ok.clone()]).is_ok());

    let too_many = MsgId::new(numbered("a", 254)).unwrap();
    let mut sink = Vec::new();
    let err = write_lang_stream(&mut sink, &[too_many], &Catalog::new(), true).unwrap_err();
    assert!(err.is_arity());
    assert!(sink.is_empty());

    let translations: Catalog = [(ok.clone(), MsgStr::new(numbered("x", 254)).unwrap())]
        .into_iter()
        .collect();
    let err = write_lang_stream(&mut sink, &[ok.clone()], &translations, false).unwrap_err();
    assert!(err.is_arity());
    assert!(sink.is_empty());

    let translations: Catalog = [(ok.clone(), MsgStr::new(numbered("x", 253)).unwrap())]
        .into_iter()
        .collect();
    write_lang_stream(&mut sink, &[ok], &translations, false).unwrap();
    assert!(!sink.is_empty());
}

// =============================================================================
// Lang streams and conversion
// =============================================================================

#[test]
fn test_mo_to_lang_and_back() {
    init_test_logging();

    for catalog in [metadata_only(), rich_catalog()] {
        let mo = encode_mo(&catalog, Endianness::Big).unwrap();
        let decoded = decode_mo(&mo).unwrap();
        assert_eq!(decoded, catalog);

        let (body, metadata) = decoded.clone().split_metadata();
        let keys = template_order([&body]);

        let mut template = Vec::new();
        write_lang_stream(&mut template, &keys, &Catalog::new(), true).unwrap();
        let mut spanish = Vec::new();
        write_lang_stream(&mut spanish, &keys, &decoded, false).unwrap();

        let mut streams = BTreeMap::new();
        streams.insert("es".to_string(), spanish.as_slice());
        let read = read_lang_streams("en", template.as_slice(), streams).unwrap();
        let es = read["es"].clone();
        assert_eq!(es.untranslated().count(), 0);

        let rebuilt = es.clone().into_catalog().with_metadata(metadata.clone());
        assert_eq!(rebuilt, decoded);

        let mo_again = partial_to_mo(es, metadata, Endianness::Little).unwrap();
        assert_eq!(decode_mo(&mo_again).unwrap(), decoded);
    }
}

#[test]
fn test_cross_format_without_metadata() {
    let catalog = without_metadata(&rich_catalog());
    let mo = encode_mo(&catalog, Endianness::Little).unwrap();
    let conversion = mo_to_lang(&mo).unwrap();
    assert!(conversion.metadata.is_none());

    let back = lang_to_mo(&conversion, Endianness::Little).unwrap();
    assert_bytes_eq(&back, &mo);
}

#[test]
fn test_partial_translation_reads_as_null_and_reencodes() {
    let keys = vec![id(&["Save"]), id_ctx(&["file", "files"], "count"), id(&["Quit"])];
    let german: Catalog = [(keys[0].clone(), msg(&["Speichern"]))].into_iter().collect();

    let template = encode_template(&keys).unwrap();
    let stream = encode_translations(&keys, &german).unwrap();

    let read = read_lang_streams("en", template.as_slice(), [("de", stream.as_slice())]).unwrap();
    let de = &read["de"];
    assert_eq!(de.len(), 3);
    assert_eq!(de.get(&keys[0]), Some(Some(&msg(&["Speichern"]))));
    assert_eq!(de.get(&keys[1]), Some(None));
    assert_eq!(de.get(&keys[2]), Some(None));

    let mut again = Vec::new();
    write_lang_stream(&mut again, &keys, de, false).unwrap();
    assert_bytes_eq(&again, &stream);
}

#[test]
fn test_absent_positions_survive_reencoding() {
    let keys = vec![id(&["one"]), id(&["two"])];
    let partial: PartialCatalog = [(keys[1].clone(), Some(msg(&["zwei"])))].into_iter().collect();

    let template = encode_template(&keys).unwrap();
    let stream = encode_translations(&keys, &partial).unwrap();
    let read = read_lang_streams("en", template.as_slice(), [("de", stream.as_slice())]).unwrap();
    assert_eq!(read["de"], partial);
    assert!(!read["de"].contains_key(&keys[0]));

    let again = encode_translations(&keys, &read["de"]).unwrap();
    assert_bytes_eq(&again, &stream);
}

#[test]
fn test_stream_position_mismatch() {
    let keys = vec![id(&["a"]), id(&["b"])];
    let template = encode_template(&keys).unwrap();
    let fewer = encode_translations(&keys[..1], &Catalog::new()).unwrap();
    let more = encode_translations(&[id(&["a"]), id(&["b"]), id(&["c"])], &Catalog::new()).unwrap();

    for stream in [fewer, more] {
        let err = read_lang_streams("en", template.as_slice(), [("fr", stream.as_slice())])
            .unwrap_err();
        assert!(err.is_format(), "{err}");
    }
}

#[test]
fn test_family_roundtrip_through_mo_files() {
    init_test_logging();

    let mut catalogs = BTreeMap::new();
    catalogs.insert("de".to_string(), rich_catalog());
    catalogs.insert(
        "fr".to_string(),
        [
            (MsgId::metadata(), msg(&["Language: fr"])),
            (id(&[UMLAUTS]), msg(&["Tréma"])),
            (id(&["only in fr"]), msg(&["seulement"])),
        ]
        .into_iter()
        .collect(),
    );

    let options = CodecOptions {
        endianness: Endianness::Big,
        ..CodecOptions::default()
    };
    let mo_files: BTreeMap<String, Vec<u8>> = catalogs
        .iter()
        .map(|(language, catalog)| {
            (language.clone(), encode_mo(catalog, options.endianness).unwrap())
        })
        .collect();

    let family = LangFamily::from_mo_files(&options, &mo_files).unwrap();
    assert_eq!(family.template_language, "en");

    let rebuilt = family.to_mo_files(options.endianness).unwrap();
    assert_bytes_eq(&rebuilt["de"], &mo_files["de"]);
    assert_bytes_eq(&rebuilt["fr"], &mo_files["fr"]);

    let en = decode_mo(&rebuilt["en"]).unwrap();
    assert!(en.metadata().is_none());
    assert_eq!(en.get(&id(&["only in fr"])), Some(&msg(&["only in fr"])));
}
