//! Test utilities and shared fixtures for the lingot workspace.
//!
//! This module provides logging setup, Unicode sample strings, and proptest
//! strategies that the codec crates use in unit and integration tests.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Render bytes as space separated hex pairs, for assertion messages.
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Assert two byte buffers are equal, reporting the first differing offset.
pub fn assert_bytes_eq(left: &[u8], right: &[u8]) {
    if let Some(index) = left.iter().zip(right).position(|(a, b)| a != b) {
        let from = index.saturating_sub(4);
        panic!(
            "buffers differ at byte {index}: left [{}] right [{}]",
            hex(&left[from..(index + 4).min(left.len())]),
            hex(&right[from..(index + 4).min(right.len())])
        );
    }
    assert_eq!(
        left.len(),
        right.len(),
        "buffers share a prefix but differ in length"
    );
}

/// Strings that exercise multi-byte UTF-8 handling.
pub mod unicode_fixtures {
    /// Smiling face with heart eyes, outside the Basic Multilingual Plane.
    pub const HEART_EYES: &str = "\u{1F60D}";
    /// Latvian flag: two regional indicator symbols.
    pub const FLAG_LV: &str = "\u{1F1F1}\u{1F1FB}";
    /// Cat with tears of joy.
    pub const CAT_JOY: &str = "\u{1F639}";
    /// Superhero, dark skin tone, male sign: a ZWJ sequence with a variation selector.
    pub const SUPERHERO: &str = "\u{1F9B8}\u{1F3FF}\u{200D}\u{2642}\u{FE0F}";
    /// Rainbow flag ZWJ sequence.
    pub const RAINBOW_FLAG: &str = "\u{1F3F3}\u{FE0F}\u{200D}\u{1F308}";
    /// Precomposed German umlauts.
    pub const UMLAUTS: &str = "Umlaut äöüÄÖÜ";
    /// Capital and small sharp s.
    pub const SHARP_S: &str = "ẞß";
    /// "e" followed by a combining acute accent and a combining diaeresis.
    pub const COMBINING: &str = "e\u{0301}\u{0308} vs \u{00E9}";
}

/// Property-based testing utilities using proptest.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use proptest::prelude::*;

    /// Strategy for arbitrary text free of NUL and EOT, the MO separators.
    pub fn message_text_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(
            any::<char>().prop_filter("separator", |c| *c != '\0' && *c != '\u{4}'),
            0..24,
        )
        .prop_map(|chars| chars.into_iter().collect())
    }

    /// Strategy for a non-empty list of message texts.
    pub fn variants_strategy(max: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(message_text_strategy(), 1..=max)
    }
}
