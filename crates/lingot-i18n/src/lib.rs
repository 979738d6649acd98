//! # Lingot I18n
//!
//! Binary translation catalog codecs: the gettext MO format and the compact,
//! template-relative Lang format, plus a lossless converter between them.
//!
//! This crate provides:
//!
//! - [`MsgId`], [`MsgStr`], [`Catalog`] and [`PartialCatalog`], the
//!   in-memory model both formats serialize
//! - [`encode_mo`] / [`decode_mo`] for bit-exact MO files in either byte order
//! - [`write_lang_stream`] / [`read_lang_streams`] for Lang template and
//!   per-language streams
//! - [`LangFamily`], [`mo_to_lang`] and [`lang_to_mo`] for conversions
//!
//! # Example
//!
//! ```rust
//! use lingot_i18n::{decode_mo, encode_mo, Catalog, Endianness, MsgId, MsgStr};
//!
//! # fn example() -> Result<(), lingot_i18n::CodecError> {
//! let mut catalog = Catalog::new();
//! catalog.insert(
//!     MsgId::with_context(["file", "files"], "menu")?,
//!     MsgStr::new(["Datei", "Dateien"])?,
//! );
//!
//! let bytes = encode_mo(&catalog, Endianness::Big)?;
//! assert_eq!(decode_mo(&bytes)?, catalog);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod convert;
pub mod lang;
pub mod mo;
pub mod model;
pub mod options;

pub use convert::{
    lang_to_mo, mo_to_lang, partial_to_mo, template_order, LangConversion, LangFamily,
};
pub use lang::{
    decode_template, decode_translations, encode_template, encode_translations,
    read_lang_streams, write_lang_stream, LangSlot, TranslationSource, LANG_MAGIC,
};
pub use mo::{decode_mo, detect_endianness, encode_mo, read_mo, write_mo, MoHeader, MO_MAGIC};
pub use model::{Catalog, MsgId, MsgStr, PartialCatalog};
pub use options::CodecOptions;

// Re-export the shared error and byte order types
pub use lingot_common::{CodecError, CodecResult, Endianness, MAX_VARIANTS};
