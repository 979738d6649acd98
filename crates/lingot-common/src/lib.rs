//! # Lingot Common
//!
//! Shared byte-level helpers, error types, and logging setup for the lingot
//! catalog codecs.
//!
//! This crate provides the foundational pieces used by every codec in the
//! workspace: explicit byte order handling, a bounds-checked reader, the
//! separator splitting gettext catalogs rely on, and the [`CodecError`]
//! taxonomy.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bytes;
pub mod error;
pub mod logging;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use bytes::*;
pub use error::*;
