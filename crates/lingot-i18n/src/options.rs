//! Codec options that orchestration layers embed in their own configuration.

use lingot_common::{CodecError, CodecResult, Endianness};
use serde::{Deserialize, Serialize};

/// Per-call settings for encoding and conversion.
///
/// Missing fields fall back to [`CodecOptions::default`], so an empty table
/// in a TOML or YAML file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Byte order of written MO files.
    pub endianness: Endianness,
    /// Language whose strings form the Lang template.
    pub template_language: String,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            endianness: Endianness::Little,
            template_language: "en".to_string(),
        }
    }
}

impl CodecOptions {
    /// Checks that the template language can be used as a stream key.
    ///
    /// # Errors
    ///
    /// [`CodecError::Value`] if the language code is empty or contains
    /// whitespace or a path separator.
    pub fn validate(&self) -> CodecResult<()> {
        let code = &self.template_language;
        if code.is_empty() {
            return Err(CodecError::Value(
                "template language must not be empty".to_string(),
            ));
        }
        if code
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(CodecError::Value(format!(
                "template language {code:?} contains whitespace or a path separator"
            )));
        }
        Ok(())
    }
}
