//! Error types shared by every catalog codec.

use thiserror::Error;

/// Largest number of variants a message identity or translation may carry.
///
/// The Lang format stores variant counts in a single byte and reserves
/// `0xFE` and `0xFF` as markers, which leaves 253 usable values.
pub const MAX_VARIANTS: usize = 253;

/// Errors raised while building, encoding, or decoding catalogs.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The input bytes do not follow the expected layout.
    #[error("Malformed input at byte offset {offset}: {message}")]
    Format {
        /// Byte offset into the buffer or stream where the problem was found.
        offset: usize,
        /// Human readable detail, usually "expected ..., found ...".
        message: String,
    },

    /// A message carries a variant count outside `1..=253`.
    #[error("{what} has {count} variants, allowed range is 1..={max}", max = MAX_VARIANTS)]
    Arity {
        /// Which kind of message was rejected.
        what: &'static str,
        /// The offending variant count.
        count: usize,
    },

    /// A value could not be constructed.
    #[error("Invalid value: {0}")]
    Value(String),

    /// The underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Builds a [`CodecError::Format`].
    pub fn format(offset: usize, message: impl Into<String>) -> Self {
        Self::Format {
            offset,
            message: message.into(),
        }
    }

    /// Prefixes a format error's message with the name of the stream or file
    /// it came from. Other variants are returned unchanged.
    #[must_use]
    pub fn in_source(self, source: &str) -> Self {
        match self {
            Self::Format { offset, message } => Self::Format {
                offset,
                message: format!("{source}: {message}"),
            },
            other => other,
        }
    }

    /// Whether this is a [`CodecError::Format`].
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    /// Whether this is a [`CodecError::Arity`].
    #[must_use]
    pub const fn is_arity(&self) -> bool {
        matches!(self, Self::Arity { .. })
    }

    /// Whether this is a [`CodecError::Value`].
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Fails with [`CodecError::Arity`] unless `count` lies in `1..=MAX_VARIANTS`.
pub fn check_arity(what: &'static str, count: usize) -> CodecResult<()> {
    if count == 0 || count > MAX_VARIANTS {
        return Err(CodecError::Arity { what, count });
    }
    Ok(())
}
