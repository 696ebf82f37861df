//! Snippet extraction
//!
//! The first text block holding the query (as a phrase, or else word by
//! word in the forms the page actually uses) provides a window of context
//! around the match.

use crate::text::{text_blocks, Lemmatizer};

/// Builds the snippet of a page for a query
///
/// # Arguments
///
/// * `lemmatizer` - Used to find the in-page forms of the query words
/// * `content` - Stored HTML of the page
/// * `query` - The raw query text
/// * `window` - Characters of context kept on each side of the match
///
/// # Returns
///
/// `...before<b>match</b>after...`, HTML-escaped, or an empty string when
/// no block of the page holds any query word
pub fn build_snippet(lemmatizer: &Lemmatizer, content: &str, query: &str, window: usize) -> String {
    let blocks = text_blocks(content);
    let page_text = blocks.join(" ");

    let cognates: Vec<String> = lemmatizer
        .words(query)
        .iter()
        .map(|word| lemmatizer.cognate_form(&page_text, word))
        .collect();

    let mut needles = Vec::with_capacity(cognates.len() + 1);
    if cognates.len() > 1 {
        needles.push(cognates.join(" "));
    }
    needles.extend(cognates);

    for needle in &needles {
        for block in &blocks {
            if let Some(snippet) = window_around(block, needle, window) {
                return snippet;
            }
        }
    }

    String::new()
}

/// Cuts a window around the first whole-word occurrence of `needle` in `block`
fn window_around(block: &str, needle: &str, window: usize) -> Option<String> {
    if needle.is_empty() {
        return None;
    }

    let lower = block.to_lowercase();
    let byte_pos = find_word(&lower, needle)?;

    let lower_chars: Vec<char> = lower.chars().collect();
    let original_chars: Vec<char> = block.chars().collect();
    // Lowercasing can change the char count; fall back to the lowercase text then
    let chars = if lower_chars.len() == original_chars.len() {
        original_chars
    } else {
        lower_chars
    };

    let start = lower[..byte_pos].chars().count();
    let end = start + needle.chars().count();
    let from = start.saturating_sub(window);
    let to = (end + window).min(chars.len());

    let before: String = chars[from..start].iter().collect();
    let matched: String = chars[start..end].iter().collect();
    let after: String = chars[end..to].iter().collect();

    Some(format!(
        "...{}<b>{}</b>{}...",
        escape_html(&before),
        escape_html(&matched),
        escape_html(&after)
    ))
}

/// Returns the byte offset of the first occurrence of `needle` bounded by non-letters
fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(pos, _)| pos).find(|&pos| {
        let before_ok = haystack[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphabetic());
        let after_ok = haystack[pos + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphabetic());
        before_ok && after_ok
    })
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
