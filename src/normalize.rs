//! Input normalization before text is sent to the generator.
//!
//! Collapses whitespace and truncates to a token budget. Only ever applied
//! to outbound text: generator responses keep their line structure, which
//! the mind-map parser depends on.

/// Characters per token, a rough estimate for English text.
pub const CHARS_PER_TOKEN: usize = 4;

/// Appended whenever text is truncated.
pub const ELLIPSIS: &str = "...";

/// Preferred cut points, tried in this order.
const BOUNDARIES: [&str; 5] = [". ", "\n\n", "; ", "? ", "! "];

/// A boundary is only used if it falls past this fraction of the window.
const BOUNDARY_WINDOW: f64 = 0.7;

/// Default budget for generator input.
pub const DEFAULT_MAX_TOKENS: usize = 8000;

/// Estimated token count of `text`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN
}

/// Collapse whitespace runs to single spaces and truncate to `max_tokens`.
///
/// Truncation prefers the first listed boundary whose last occurrence lies
/// in the final 30% of the window, keeping the boundary itself, and always
/// appends [`ELLIPSIS`]. Text longer than `max_tokens * 4` characters is
/// truncated. Re-normalizing normalized text is a no-op: a second pass sees
/// the same window and makes the same cut.
pub fn normalize(text: &str, max_tokens: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let max_chars = max_tokens.saturating_mul(CHARS_PER_TOKEN);
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let window_end = byte_offset(&collapsed, max_chars);
    let window = &collapsed[..window_end];
    let threshold = max_chars as f64 * BOUNDARY_WINDOW;

    for boundary in BOUNDARIES {
        if let Some(pos) = window.rfind(boundary) {
            let char_pos = window[..pos].chars().count();
            if char_pos as f64 > threshold {
                let cut = pos + boundary.len();
                tracing::debug!(max_tokens, boundary, "truncated input at boundary");
                return format!("{}{ELLIPSIS}", &collapsed[..cut]);
            }
        }
    }

    tracing::debug!(max_tokens, "hard-truncated input");
    format!("{window}{ELLIPSIS}")
}

/// Byte offset of the `n`th character, or the string length.
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(i, _)| i)
}
