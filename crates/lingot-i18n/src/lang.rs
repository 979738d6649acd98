//! Compact, template-relative Lang catalogs.
//!
//! A *template* stream stores an ordered list of message identities once per
//! catalog family. Every per-language stream stores only translations, one
//! entry per template position, so keys are never repeated across languages.
//!
//! # Byte grammar
//!
//! This grammar is specific to lingot. Integers are big-endian.
//!
//! ```text
//! stream      := "LNG" 0x01  kind:u8  count:u32  entry{count}
//! kind        := 0x00 template | 0x01 translation
//! string      := length:u32  UTF-8 bytes
//!
//! template    := ctx:u8 [string if ctx = 0x01]  forms:u8 (1..=253)  string{forms}
//! translation := marker:u8 [string{marker} if marker in 1..=253]
//! marker      := 0x00 untranslated
//!              | 1..=253 variant count
//!              | 0xFE same as the template's own strings
//!              | 0xFF absent
//! ```
//!
//! # Invariants
//!
//! 1. **Positional**: a translation stream is only meaningful next to the
//!    template it was written against. The reader checks the position count
//!    and that the stream ends exactly after the last entry, never content.
//!
//! 2. **Reproducible tags**: reading a stream into a [`PartialCatalog`] and
//!    writing that back yields the same bytes, absent and untranslated
//!    positions included.
//!
//! 3. **No metadata**: the reserved metadata identity has no place in a
//!    template; callers split it off before writing and merge it back after
//!    reading.

use crate::model::{Catalog, MsgId, MsgStr, PartialCatalog};
use lingot_common::{
    check_arity, put_u32, to_u32, utf8_at, ByteReader, CodecError, CodecResult, Endianness,
    MAX_VARIANTS,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::BuildHasher;
use std::io::{Read, Write};
use tracing::debug;

/// Leading bytes of every Lang stream; the last byte is the grammar version.
pub const LANG_MAGIC: [u8; 4] = *b"LNG\x01";

const KIND_TEMPLATE: u8 = 0x00;
const KIND_TRANSLATION: u8 = 0x01;

const NO_CONTEXT: u8 = 0x00;
const HAS_CONTEXT: u8 = 0x01;

const MARKER_UNTRANSLATED: u8 = 0x00;
const MARKER_SAME_AS_ORIGINAL: u8 = 0xFE;
const MARKER_ABSENT: u8 = 0xFF;

const BYTE_ORDER: Endianness = Endianness::Big;

/// What a translation stream holds at one template position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LangSlot<T = MsgStr> {
    /// The key is not part of this language's result at all.
    Absent,
    /// The key exists but has no translation recorded.
    Untranslated,
    /// The key has a translation.
    Translated(T),
}

impl<T> LangSlot<T> {
    /// Whether this is [`LangSlot::Absent`].
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// `None` for absent, `Some(None)` for untranslated.
    pub fn into_entry(self) -> Option<Option<T>> {
        match self {
            Self::Absent => None,
            Self::Untranslated => Some(None),
            Self::Translated(message) => Some(Some(message)),
        }
    }
}

/// Lookup used by the writer to decide what each position holds.
pub trait TranslationSource {
    /// The slot for `id` in this language.
    fn slot(&self, id: &MsgId) -> LangSlot<&MsgStr>;
}

/// A missing key is written as untranslated.
impl TranslationSource for Catalog {
    fn slot(&self, id: &MsgId) -> LangSlot<&MsgStr> {
        self.get(id).map_or(LangSlot::Untranslated, LangSlot::Translated)
    }
}

/// A missing key is written as untranslated.
impl<S: BuildHasher> TranslationSource for HashMap<MsgId, MsgStr, S> {
    fn slot(&self, id: &MsgId) -> LangSlot<&MsgStr> {
        self.get(id).map_or(LangSlot::Untranslated, LangSlot::Translated)
    }
}

/// A missing key is written as absent and `None` as untranslated, mirroring
/// what the reader produced.
impl TranslationSource for PartialCatalog {
    fn slot(&self, id: &MsgId) -> LangSlot<&MsgStr> {
        match self.get(id) {
            None => LangSlot::Absent,
            Some(None) => LangSlot::Untranslated,
            Some(Some(message)) => LangSlot::Translated(message),
        }
    }
}

/// Writes one Lang stream.
///
/// With `is_template` set, `ordered_keys` themselves are written and
/// `translations` is ignored; otherwise one translation entry per key.
/// All validation happens before the first byte reaches `writer`.
///
/// # Errors
///
/// [`CodecError::Arity`] if an identity or translation has more than 253
/// variants; [`CodecError::Value`] if `ordered_keys` contains the metadata
/// identity or a duplicate; [`CodecError::Io`] if writing fails.
pub fn write_lang_stream<W, T>(
    writer: &mut W,
    ordered_keys: &[MsgId],
    translations: &T,
    is_template: bool,
) -> CodecResult<()>
where
    W: Write + ?Sized,
    T: TranslationSource + ?Sized,
{
    let bytes = if is_template {
        encode_template(ordered_keys)?
    } else {
        encode_translations(ordered_keys, translations)?
    };
    writer.write_all(&bytes)?;
    Ok(())
}

/// Encodes a template stream.
pub fn encode_template(ordered_keys: &[MsgId]) -> CodecResult<Vec<u8>> {
    validate_keys(ordered_keys)?;

    let mut out = stream_header(KIND_TEMPLATE, ordered_keys.len())?;
    for id in ordered_keys {
        match id.context() {
            Some(context) => {
                out.push(HAS_CONTEXT);
                put_string(&mut out, context)?;
            }
            None => out.push(NO_CONTEXT),
        }
        out.push(variant_count(id.arity()));
        for text in id.strings() {
            put_string(&mut out, text)?;
        }
    }

    debug!(
        "Encoded Lang template: {} keys, {} bytes",
        ordered_keys.len(),
        out.len()
    );
    Ok(out)
}

/// Encodes a translation stream aligned with `ordered_keys`.
pub fn encode_translations<T>(ordered_keys: &[MsgId], translations: &T) -> CodecResult<Vec<u8>>
where
    T: TranslationSource + ?Sized,
{
    validate_keys(ordered_keys)?;
    let slots: Vec<LangSlot<&MsgStr>> = ordered_keys.iter().map(|id| translations.slot(id)).collect();
    for slot in &slots {
        if let LangSlot::Translated(message) = slot {
            check_arity("translated message", message.arity())?;
        }
    }

    let mut out = stream_header(KIND_TRANSLATION, ordered_keys.len())?;
    let mut translated = 0usize;
    for (id, slot) in ordered_keys.iter().zip(&slots) {
        match slot {
            LangSlot::Absent => out.push(MARKER_ABSENT),
            LangSlot::Untranslated => out.push(MARKER_UNTRANSLATED),
            LangSlot::Translated(message) if message.same_as(id) => {
                translated += 1;
                out.push(MARKER_SAME_AS_ORIGINAL);
            }
            LangSlot::Translated(message) => {
                translated += 1;
                out.push(variant_count(message.arity()));
                for text in message.variants() {
                    put_string(&mut out, text)?;
                }
            }
        }
    }

    debug!(
        "Encoded Lang translations: {}/{} positions translated, {} bytes",
        translated,
        ordered_keys.len(),
        out.len()
    );
    Ok(out)
}

/// Reads the template and every per-language stream.
///
/// The template language itself is part of the result, each key mapping to
/// its own strings, unless `streams` supplies a stream for it.
///
/// # Errors
///
/// [`CodecError::Format`] if any stream is malformed or a translation
/// stream's position count differs from the template's. The message names
/// the offending language.
pub fn read_lang_streams<R, S, K, I>(
    template_language: &str,
    mut template: R,
    streams: I,
) -> CodecResult<BTreeMap<String, PartialCatalog>>
where
    R: Read,
    S: Read,
    K: Into<String>,
    I: IntoIterator<Item = (K, S)>,
{
    let mut bytes = Vec::new();
    template.read_to_end(&mut bytes)?;
    let keys = decode_template(&bytes).map_err(|e| e.in_source(template_language))?;

    let mut result = BTreeMap::new();
    for (language, mut stream) in streams {
        let language = language.into();
        bytes.clear();
        stream.read_to_end(&mut bytes)?;
        let slots = decode_translations(&bytes, &keys).map_err(|e| e.in_source(&language))?;
        let partial: PartialCatalog = keys
            .iter()
            .zip(slots)
            .filter_map(|(id, slot)| slot.into_entry().map(|entry| (id.clone(), entry)))
            .collect();
        debug!(
            "Read Lang stream for {}: {} entries, {} untranslated",
            language,
            partial.len(),
            partial.untranslated().count()
        );
        result.insert(language, partial);
    }

    if !result.contains_key(template_language) {
        let originals = keys
            .into_iter()
            .map(|id| {
                let message = MsgStr::new(id.strings().iter().cloned())?;
                Ok((id, Some(message)))
            })
            .collect::<CodecResult<PartialCatalog>>()?;
        result.insert(template_language.to_string(), originals);
    }

    Ok(result)
}

/// Decodes a template stream into its ordered identities.
pub fn decode_template(bytes: &[u8]) -> CodecResult<Vec<MsgId>> {
    let mut reader = ByteReader::new(bytes);
    let count = read_stream_header(&mut reader, KIND_TEMPLATE)?;

    let mut keys = Vec::with_capacity(count.min(reader.remaining()));
    let mut seen = HashSet::with_capacity(keys.capacity());
    for position in 0..count {
        let start = reader.position();
        let context = match reader.read_u8("context flag")? {
            NO_CONTEXT => None,
            HAS_CONTEXT => Some(read_string(&mut reader)?),
            flag => {
                return Err(CodecError::format(
                    start,
                    format!("expected context flag 0x00 or 0x01, found 0x{flag:02x}"),
                ))
            }
        };
        let forms_at = reader.position();
        let forms = usize::from(reader.read_u8("plural form count")?);
        if forms == 0 || forms > MAX_VARIANTS {
            return Err(CodecError::format(
                forms_at,
                format!("expected 1..={MAX_VARIANTS} plural forms, found {forms}"),
            ));
        }
        let strings = (0..forms)
            .map(|_| read_string(&mut reader))
            .collect::<CodecResult<Vec<_>>>()?;

        let id = match context {
            Some(context) => MsgId::with_context(strings, context),
            None => MsgId::new(strings),
        }
        .map_err(|e| CodecError::format(start, e.to_string()))?;
        if id.is_metadata() {
            return Err(CodecError::format(
                start,
                format!("position {position} holds the reserved metadata identity"),
            ));
        }
        if !seen.insert(id.clone()) {
            return Err(CodecError::format(
                start,
                format!("position {position} repeats identity {id}"),
            ));
        }
        keys.push(id);
    }
    expect_end(&reader, count)?;

    Ok(keys)
}

/// Decodes a translation stream against the template's `keys`, one slot per
/// position.
pub fn decode_translations(bytes: &[u8], keys: &[MsgId]) -> CodecResult<Vec<LangSlot>> {
    let mut reader = ByteReader::new(bytes);
    let count = read_stream_header(&mut reader, KIND_TRANSLATION)?;
    if count != keys.len() {
        return Err(CodecError::format(
            5,
            format!(
                "expected {} positions from the template, found {count}",
                keys.len()
            ),
        ));
    }

    let mut slots = Vec::with_capacity(count);
    for id in keys {
        let start = reader.position();
        let slot = match reader.read_u8("translation marker")? {
            MARKER_ABSENT => LangSlot::Absent,
            MARKER_UNTRANSLATED => LangSlot::Untranslated,
            MARKER_SAME_AS_ORIGINAL => {
                LangSlot::Translated(MsgStr::new(id.strings().iter().cloned())?)
            }
            variants => {
                let variants = (0..variants)
                    .map(|_| read_string(&mut reader))
                    .collect::<CodecResult<Vec<_>>>()?;
                LangSlot::Translated(
                    MsgStr::new(variants).map_err(|e| CodecError::format(start, e.to_string()))?,
                )
            }
        };
        slots.push(slot);
    }
    expect_end(&reader, count)?;

    Ok(slots)
}

fn validate_keys(ordered_keys: &[MsgId]) -> CodecResult<()> {
    let mut seen = HashSet::with_capacity(ordered_keys.len());
    for id in ordered_keys {
        if id.is_metadata() {
            return Err(CodecError::Value(
                "the metadata identity cannot be stored in a Lang template".to_string(),
            ));
        }
        check_arity("message identity", id.arity())?;
        if !seen.insert(id) {
            return Err(CodecError::Value(format!(
                "identity {id} appears twice in the template order"
            )));
        }
    }
    Ok(())
}

/// Callers have already run `check_arity`, so the count fits in a byte.
#[allow(clippy::cast_possible_truncation)]
fn variant_count(count: usize) -> u8 {
    debug_assert!((1..=MAX_VARIANTS).contains(&count));
    count as u8
}

fn stream_header(kind: u8, count: usize) -> CodecResult<Vec<u8>> {
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(&LANG_MAGIC);
    out.push(kind);
    put_u32(&mut out, to_u32(count, "position count")?, BYTE_ORDER);
    Ok(out)
}

fn put_string(out: &mut Vec<u8>, text: &str) -> CodecResult<()> {
    put_u32(out, to_u32(text.len(), "string length")?, BYTE_ORDER);
    out.extend_from_slice(text.as_bytes());
    Ok(())
}

fn read_stream_header(reader: &mut ByteReader<'_>, expected_kind: u8) -> CodecResult<usize> {
    let magic = reader.read_slice(LANG_MAGIC.len(), "magic")?;
    if magic != LANG_MAGIC {
        return Err(CodecError::format(
            0,
            format!("expected magic {LANG_MAGIC:02x?}, found {magic:02x?}"),
        ));
    }
    let kind = reader.read_u8("stream kind")?;
    if kind != expected_kind {
        let name = |kind| match kind {
            KIND_TEMPLATE => "template",
            KIND_TRANSLATION => "translation",
            _ => "unknown",
        };
        return Err(CodecError::format(
            4,
            format!(
                "expected a {} stream, found a {} stream (0x{kind:02x})",
                name(expected_kind),
                name(kind)
            ),
        ));
    }
    reader.read_len(BYTE_ORDER, "position count")
}

fn read_string(reader: &mut ByteReader<'_>) -> CodecResult<String> {
    let len = reader.read_len(BYTE_ORDER, "string length")?;
    let at = reader.position();
    let raw = reader.read_slice(len, "string")?;
    Ok(utf8_at(raw, at)?.to_string())
}

fn expect_end(reader: &ByteReader<'_>, count: usize) -> CodecResult<()> {
    if reader.is_at_end() {
        return Ok(());
    }
    Err(CodecError::format(
        reader.position(),
        format!(
            "expected end of stream after {count} positions, found {} more bytes",
            reader.remaining()
        ),
    ))
}
