//! In-memory catalog model shared by the MO and Lang codecs.
//!
//! # Invariants
//!
//! 1. **Non-empty**: a [`MsgId`] or [`MsgStr`] always holds at least one
//!    string. The 253 variant ceiling is *not* enforced here; encoders check
//!    it so oversize values can still be built and inspected.
//!
//! 2. **Separator free**: strings built through the public constructors never
//!    contain NUL, and identity strings and contexts never contain EOT, so
//!    the serialized MO form splits back into exactly the same parts.
//!
//! 3. **Byte order, not locale order**: [`MsgId::mo_cmp`] compares serialized
//!    bytes. It is the only ordering the codecs use; `MsgId` deliberately
//!    does not implement `Ord`.

use lingot_common::{split_nul, split_once_byte, utf8_at, CodecError, CodecResult, EOT, NUL};
use std::cmp::Ordering;
use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;

/// Original-language message used as a catalog key: singular, optional
/// plural forms, and an optional disambiguation context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MsgId {
    strings: Vec<String>,
    context: Option<String>,
}

impl MsgId {
    /// Creates an identity without context.
    ///
    /// # Errors
    ///
    /// [`CodecError::Value`] if `strings` is empty or a string contains NUL
    /// or EOT.
    pub fn new<I, S>(strings: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(strings.into_iter().map(Into::into).collect(), None)
    }

    /// Creates an identity with a disambiguation context.
    ///
    /// # Errors
    ///
    /// Same as [`MsgId::new`], and also if `context` contains NUL or EOT.
    pub fn with_context<I, S>(strings: I, context: impl Into<String>) -> CodecResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(
            strings.into_iter().map(Into::into).collect(),
            Some(context.into()),
        )
    }

    /// The reserved identity whose translation carries catalog metadata.
    #[must_use]
    pub fn metadata() -> Self {
        Self {
            strings: vec![String::new()],
            context: None,
        }
    }

    fn build(strings: Vec<String>, context: Option<String>) -> CodecResult<Self> {
        if strings.is_empty() {
            return Err(CodecError::Value(
                "message identity needs at least one string".to_string(),
            ));
        }
        for text in strings.iter().chain(context.as_ref()) {
            if let Some(byte) = text.bytes().find(|b| *b == NUL || *b == EOT) {
                return Err(CodecError::Value(format!(
                    "message identity {text:?} contains reserved byte 0x{byte:02x}"
                )));
            }
        }
        Ok(Self { strings, context })
    }

    /// All strings, singular first.
    #[must_use]
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// The singular form.
    #[must_use]
    pub fn singular(&self) -> &str {
        &self.strings[0]
    }

    /// Plural forms after the singular.
    #[must_use]
    pub fn plurals(&self) -> &[String] {
        &self.strings[1..]
    }

    /// The disambiguation context, if any.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Number of strings.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.strings.len()
    }

    /// Whether this is the reserved metadata identity.
    #[must_use]
    pub fn is_metadata(&self) -> bool {
        self.context.is_none() && self.strings.len() == 1 && self.strings[0].is_empty()
    }

    /// Serialized MO form: `context EOT singular [NUL plural]...`, without
    /// the trailing NUL terminator.
    #[must_use]
    pub fn to_mo_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(context) = &self.context {
            out.extend_from_slice(context.as_bytes());
            out.push(EOT);
        }
        join_nul(&mut out, &self.strings);
        out
    }

    /// Parses the serialized MO form. `offset` is only used in errors.
    ///
    /// Splits on the first EOT only, so anything the encoder writes parses
    /// back to an equal identity. A NUL inside the context or a second EOT
    /// is a format error, since no constructor could have produced it.
    pub(crate) fn from_mo_bytes(bytes: &[u8], offset: usize) -> CodecResult<Self> {
        let (context, rest, rest_offset) = match split_once_byte(bytes, EOT) {
            Some((context, rest)) => {
                reject_byte(context, NUL, offset, "context")?;
                (
                    Some(utf8_at(context, offset)?.to_string()),
                    rest,
                    offset + context.len() + 1,
                )
            }
            None => (None, bytes, offset),
        };
        reject_byte(rest, EOT, rest_offset, "message identity")?;
        Ok(Self {
            strings: split_utf8(rest, rest_offset)?,
            context,
        })
    }

    /// Orders two identities by their serialized MO bytes.
    #[must_use]
    pub fn mo_cmp(&self, other: &Self) -> Ordering {
        self.to_mo_bytes().cmp(&other.to_mo_bytes())
    }
}

impl fmt::Display for MsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "[{context}] ")?;
        }
        write!(f, "{:?}", self.singular())?;
        if self.strings.len() > 1 {
            write!(f, " (+{} plural forms)", self.strings.len() - 1)?;
        }
        Ok(())
    }
}

/// Translated variants for one [`MsgId`], one per plural category of the
/// target language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MsgStr {
    variants: Vec<String>,
}

impl MsgStr {
    /// Creates a translation from its variants.
    ///
    /// # Errors
    ///
    /// [`CodecError::Value`] if `variants` is empty or a variant contains NUL.
    pub fn new<I, S>(variants: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variants: Vec<String> = variants.into_iter().map(Into::into).collect();
        if variants.is_empty() {
            return Err(CodecError::Value(
                "translated message needs at least one variant".to_string(),
            ));
        }
        if let Some(text) = variants.iter().find(|v| v.as_bytes().contains(&NUL)) {
            return Err(CodecError::Value(format!(
                "translated message {text:?} contains reserved byte 0x00"
            )));
        }
        Ok(Self { variants })
    }

    /// All variants in order.
    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Number of variants.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.variants.len()
    }

    /// Serialized MO form, variants joined by NUL.
    #[must_use]
    pub fn to_mo_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        join_nul(&mut out, &self.variants);
        out
    }

    pub(crate) fn from_mo_bytes(bytes: &[u8], offset: usize) -> CodecResult<Self> {
        Ok(Self {
            variants: split_utf8(bytes, offset)?,
        })
    }

    /// Whether the variants equal the identity's strings exactly.
    #[must_use]
    pub fn same_as(&self, id: &MsgId) -> bool {
        self.variants == id.strings
    }
}

fn join_nul(out: &mut Vec<u8>, parts: &[String]) {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(NUL);
        }
        out.extend_from_slice(part.as_bytes());
    }
}

fn reject_byte(bytes: &[u8], separator: u8, offset: usize, what: &str) -> CodecResult<()> {
    match bytes.iter().position(|b| *b == separator) {
        Some(at) => Err(CodecError::format(
            offset + at,
            format!("{what} contains separator byte 0x{separator:02x}"),
        )),
        None => Ok(()),
    }
}

fn split_utf8(bytes: &[u8], offset: usize) -> CodecResult<Vec<String>> {
    let mut at = offset;
    split_nul(bytes)
        .map(|part| {
            let text = utf8_at(part, at)?.to_string();
            at += part.len() + 1;
            Ok(text)
        })
        .collect()
}

/// Mapping from identities to translations.
///
/// Iteration order is unspecified; use [`Catalog::sorted_entries`] for the
/// deterministic MO order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: HashMap<MsgId, MsgStr>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the previous translation for that key.
    pub fn insert(&mut self, id: MsgId, message: MsgStr) -> Option<MsgStr> {
        self.entries.insert(id, message)
    }

    /// Looks up a translation.
    #[must_use]
    pub fn get(&self, id: &MsgId) -> Option<&MsgStr> {
        self.entries.get(id)
    }

    /// Removes an entry.
    pub fn remove(&mut self, id: &MsgId) -> Option<MsgStr> {
        self.entries.remove(id)
    }

    /// Whether `id` has an entry.
    #[must_use]
    pub fn contains_key(&self, id: &MsgId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of entries, metadata included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in unspecified order.
    pub fn iter(&self) -> hash_map::Iter<'_, MsgId, MsgStr> {
        self.entries.iter()
    }

    /// Iterates over keys in unspecified order.
    pub fn keys(&self) -> hash_map::Keys<'_, MsgId, MsgStr> {
        self.entries.keys()
    }

    /// Entries sorted by serialized identity bytes, paired with those bytes.
    #[must_use]
    pub fn sorted_entries(&self) -> Vec<(Vec<u8>, &MsgId, &MsgStr)> {
        let mut sorted: Vec<_> = self
            .entries
            .iter()
            .map(|(id, message)| (id.to_mo_bytes(), id, message))
            .collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        sorted
    }

    /// The reserved metadata translation, if present.
    #[must_use]
    pub fn metadata(&self) -> Option<&MsgStr> {
        self.entries.get(&MsgId::metadata())
    }

    /// Separates the reserved metadata entry from the rest of the catalog.
    #[must_use]
    pub fn split_metadata(mut self) -> (Self, Option<MsgStr>) {
        let metadata = self.entries.remove(&MsgId::metadata());
        (self, metadata)
    }

    /// Puts a metadata entry back, replacing any existing one.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Option<MsgStr>) -> Self {
        if let Some(metadata) = metadata {
            self.entries.insert(MsgId::metadata(), metadata);
        }
        self
    }

    /// The `charset=` value of the metadata `Content-Type` line.
    ///
    /// Informational only: the codecs always read and write UTF-8.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        let header = self.metadata()?.variants().first()?;
        header.lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if !name.trim().eq_ignore_ascii_case("content-type") {
                return None;
            }
            value.split(';').find_map(|param| {
                let (key, charset) = param.split_once('=')?;
                key.trim()
                    .eq_ignore_ascii_case("charset")
                    .then(|| charset.trim())
            })
        })
    }
}

impl FromIterator<(MsgId, MsgStr)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (MsgId, MsgStr)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(MsgId, MsgStr)> for Catalog {
    fn extend<T: IntoIterator<Item = (MsgId, MsgStr)>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for Catalog {
    type Item = (MsgId, MsgStr);
    type IntoIter = hash_map::IntoIter<MsgId, MsgStr>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = (&'a MsgId, &'a MsgStr);
    type IntoIter = hash_map::Iter<'a, MsgId, MsgStr>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<HashMap<MsgId, MsgStr>> for Catalog {
    fn from(entries: HashMap<MsgId, MsgStr>) -> Self {
        Self { entries }
    }
}

/// Lang decoding result for one language: every emitted key maps either to
/// a translation or to `None` ("key exists, no translation recorded").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialCatalog {
    entries: HashMap<MsgId, Option<MsgStr>>,
}

impl PartialCatalog {
    /// Creates an empty partial catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry.
    pub fn insert(&mut self, id: MsgId, message: Option<MsgStr>) -> Option<Option<MsgStr>> {
        self.entries.insert(id, message)
    }

    /// `None` if the key is absent, `Some(None)` if it is untranslated.
    #[must_use]
    pub fn get(&self, id: &MsgId) -> Option<Option<&MsgStr>> {
        self.entries.get(id).map(Option::as_ref)
    }

    /// Whether `id` has an entry, translated or not.
    #[must_use]
    pub fn contains_key(&self, id: &MsgId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in unspecified order.
    pub fn iter(&self) -> hash_map::Iter<'_, MsgId, Option<MsgStr>> {
        self.entries.iter()
    }

    /// Keys whose translation is missing.
    pub fn untranslated(&self) -> impl Iterator<Item = &MsgId> {
        self.entries
            .iter()
            .filter(|(_, message)| message.is_none())
            .map(|(id, _)| id)
    }

    /// Drops untranslated entries.
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        self.entries
            .into_iter()
            .filter_map(|(id, message)| message.map(|message| (id, message)))
            .collect()
    }
}

impl FromIterator<(MsgId, Option<MsgStr>)> for PartialCatalog {
    fn from_iter<T: IntoIterator<Item = (MsgId, Option<MsgStr>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<Catalog> for PartialCatalog {
    fn from(catalog: Catalog) -> Self {
        catalog
            .into_iter()
            .map(|(id, message)| (id, Some(message)))
            .collect()
    }
}

impl IntoIterator for PartialCatalog {
    type Item = (MsgId, Option<MsgStr>);
    type IntoIter = hash_map::IntoIter<MsgId, Option<MsgStr>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
