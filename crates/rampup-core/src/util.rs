// SPDX-License-Identifier: Apache-2.0

//! Small shared helpers.

/// Truncates a string to at most `max` characters, on a char boundary.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
