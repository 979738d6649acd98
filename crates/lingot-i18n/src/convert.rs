//! Lossless conversion between MO catalogs and Lang stream families.
//!
//! The reserved metadata entry never enters a Lang stream: it is split off
//! before writing, carried alongside the streams, and merged back when
//! catalogs are rebuilt.

use crate::lang::{
    decode_template, decode_translations, encode_template, encode_translations, read_lang_streams,
};
use crate::mo::{decode_mo, encode_mo};
use crate::model::{Catalog, MsgId, MsgStr, PartialCatalog};
use crate::options::CodecOptions;
use lingot_common::{CodecResult, Endianness};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Template order for a family of catalogs: every non-metadata key of every
/// catalog, once, sorted by serialized MO bytes.
pub fn template_order<'a, I>(catalogs: I) -> Vec<MsgId>
where
    I: IntoIterator<Item = &'a Catalog>,
{
    let mut seen = HashSet::new();
    let mut keyed: Vec<(Vec<u8>, MsgId)> = catalogs
        .into_iter()
        .flat_map(Catalog::keys)
        .filter(|id| !id.is_metadata() && seen.insert(*id))
        .map(|id| (id.to_mo_bytes(), id.clone()))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, id)| id).collect()
}

/// One catalog as a template stream plus its own translation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangConversion {
    /// Template stream.
    pub template: Vec<u8>,
    /// Translation stream aligned with `template`.
    pub translations: Vec<u8>,
    /// The metadata translation that was split off, if any.
    pub metadata: Option<MsgStr>,
}

/// Converts an MO file into a Lang template and translation stream.
pub fn mo_to_lang(mo_bytes: &[u8]) -> CodecResult<LangConversion> {
    let (catalog, metadata) = decode_mo(mo_bytes)?.split_metadata();
    let keys = template_order([&catalog]);
    Ok(LangConversion {
        template: encode_template(&keys)?,
        translations: encode_translations(&keys, &catalog)?,
        metadata,
    })
}

/// Converts a Lang template and translation stream back into an MO file.
///
/// Untranslated and absent positions are left out of the MO file.
pub fn lang_to_mo(conversion: &LangConversion, endianness: Endianness) -> CodecResult<Vec<u8>> {
    let keys = decode_template(&conversion.template)?;
    let slots = decode_translations(&conversion.translations, &keys)?;
    let partial: PartialCatalog = keys
        .into_iter()
        .zip(slots)
        .filter_map(|(id, slot)| slot.into_entry().map(|entry| (id, entry)))
        .collect();
    partial_to_mo(partial, conversion.metadata.clone(), endianness)
}

/// Merges `metadata` into `partial`, drops untranslated keys, and encodes MO.
pub fn partial_to_mo(
    partial: PartialCatalog,
    metadata: Option<MsgStr>,
    endianness: Endianness,
) -> CodecResult<Vec<u8>> {
    encode_mo(&partial.into_catalog().with_metadata(metadata), endianness)
}

/// A template stream and one translation stream per language, sharing one
/// key order, plus each language's metadata entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangFamily {
    /// Language whose strings the template holds.
    pub template_language: String,
    /// Template stream.
    pub template: Vec<u8>,
    /// Translation stream per language code.
    pub streams: BTreeMap<String, Vec<u8>>,
    /// Metadata translation per language code, for languages that had one.
    pub metadata: BTreeMap<String, MsgStr>,
}

impl LangFamily {
    /// Builds the family from decoded catalogs keyed by language code.
    pub fn from_catalogs(
        template_language: &str,
        catalogs: &BTreeMap<String, Catalog>,
    ) -> CodecResult<Self> {
        let keys = template_order(catalogs.values());
        let template = encode_template(&keys)?;

        let mut streams = BTreeMap::new();
        let mut metadata = BTreeMap::new();
        for (language, catalog) in catalogs {
            let stream = encode_translations(&keys, catalog)
                .map_err(|e| e.in_source(language))?;
            streams.insert(language.clone(), stream);
            if let Some(header) = catalog.metadata() {
                metadata.insert(language.clone(), header.clone());
            }
        }

        info!(
            "Built Lang family for {} languages over {} keys",
            streams.len(),
            keys.len()
        );
        Ok(Self {
            template_language: template_language.to_string(),
            template,
            streams,
            metadata,
        })
    }

    /// Builds the family from MO files keyed by language code.
    pub fn from_mo_files(
        options: &CodecOptions,
        mo_files: &BTreeMap<String, Vec<u8>>,
    ) -> CodecResult<Self> {
        options.validate()?;
        let catalogs = mo_files
            .iter()
            .map(|(language, bytes)| {
                let catalog = decode_mo(bytes).map_err(|e| e.in_source(language))?;
                debug!("Decoded {} with {} entries", language, catalog.len());
                Ok((language.clone(), catalog))
            })
            .collect::<CodecResult<BTreeMap<_, _>>>()?;
        Self::from_catalogs(&options.template_language, &catalogs)
    }

    /// Reads every stream back, metadata not included.
    pub fn read(&self) -> CodecResult<BTreeMap<String, PartialCatalog>> {
        read_lang_streams(
            &self.template_language,
            self.template.as_slice(),
            self.streams
                .iter()
                .map(|(language, stream)| (language.as_str(), stream.as_slice())),
        )
    }

    /// Rebuilds full catalogs with their metadata merged back in.
    pub fn to_catalogs(&self) -> CodecResult<BTreeMap<String, Catalog>> {
        Ok(self
            .read()?
            .into_iter()
            .map(|(language, partial)| {
                let metadata = self.metadata.get(&language).cloned();
                let catalog = partial.into_catalog().with_metadata(metadata);
                (language, catalog)
            })
            .collect())
    }

    /// Rebuilds MO files for every language.
    pub fn to_mo_files(&self, endianness: Endianness) -> CodecResult<BTreeMap<String, Vec<u8>>> {
        self.to_catalogs()?
            .into_iter()
            .map(|(language, catalog)| {
                let bytes = encode_mo(&catalog, endianness).map_err(|e| e.in_source(&language))?;
                Ok((language, bytes))
            })
            .collect()
    }
}
