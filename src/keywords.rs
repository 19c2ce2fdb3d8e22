//! Keyword extraction from free text
//!
//! Shared tokenization used both for SERP titles/snippets and for scraped page
//! content. Tokens are lowercased ASCII-alphabetic runs longer than three
//! characters, with stop words removed.

use std::collections::HashMap;

/// Stop words dropped during keyword extraction
const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "this", "that", "your", "have", "will", "more", "about",
];

/// Checks whether a token is a stop word
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Splits text into candidate keyword tokens
///
/// Tokens are lowercased runs of ASCII letters. Anything of length three or
/// shorter is dropped, as are stop words.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|t| t.len() > 3)
        .map(|t| t.to_ascii_lowercase())
        .filter(|t| !is_stop_word(t))
}

/// Extracts keywords from text, de-duplicated in first-seen order
///
/// # Arguments
///
/// * `text` - The text to tokenize
/// * `cap` - Maximum number of keywords to return
pub fn extract_keywords(text: &str, cap: usize) -> Vec<String> {
    let mut seen = Vec::new();
    for token in tokenize(text) {
        if !seen.contains(&token) {
            seen.push(token);
            if seen.len() >= cap {
                break;
            }
        }
    }
    seen
}

/// Returns the most frequent tokens in the text
///
/// Ties are broken by first appearance, so the result is deterministic for a
/// given input.
pub fn top_frequent(text: &str, cap: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for token in tokenize(text) {
        match counts.get_mut(&token) {
            Some(count) => *count += 1,
            None => {
                counts.insert(token.clone(), 1);
                order.push(token);
            }
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = order
        .into_iter()
        .enumerate()
        .map(|(first_seen, token)| {
            let count = counts[&token];
            (token, count, first_seen)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(cap)
        .map(|(token, _, _)| token)
        .collect()
}
