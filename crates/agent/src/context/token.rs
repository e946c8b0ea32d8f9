//! Generation-length policy.
//!
//! Longer questions get a larger completion ceiling. Length is counted in
//! UTF-16 code units, matching what browser clients report for the same text.

/// Ceiling for messages longer than [`LONG_MESSAGE`].
pub const LONG_BUDGET: u32 = 2048;
/// Ceiling for messages longer than [`MEDIUM_MESSAGE`].
pub const MEDIUM_BUDGET: u32 = 1024;
/// Ceiling for everything else.
pub const SHORT_BUDGET: u32 = 512;

pub const LONG_MESSAGE: usize = 500;
pub const MEDIUM_MESSAGE: usize = 200;

/// Length of `text` in UTF-16 code units.
pub fn message_length(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Map a user message to a `max_tokens` ceiling.
pub fn token_limit(message: &str) -> u32 {
    budget_for_length(message_length(message))
}

/// Bucket a length into a ceiling: `> 500` → 2048, `> 200` → 1024, else 512.
pub fn budget_for_length(length: usize) -> u32 {
    if length > LONG_MESSAGE {
        LONG_BUDGET
    } else if length > MEDIUM_MESSAGE {
        MEDIUM_BUDGET
    } else {
        SHORT_BUDGET
    }
}
