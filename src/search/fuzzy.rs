//! Fuzzy Matching Engine
//!
//! Approximate string matching scored by normalized Levenshtein distance,
//! with a boosted score for plain substring hits.

use serde::Serialize;
use tracing::debug;

use crate::record::{field_value, value_to_string, Record};

/// Default minimum score for an item to be returned
pub const DEFAULT_THRESHOLD: f64 = 0.3;
/// Default maximum number of results
pub const DEFAULT_LIMIT: usize = 50;

/// A matched span inside the winning field, in character offsets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Search result with the item and how it matched
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The matched item
    pub item: Record,
    /// Relevance in [0, 1]
    pub score: f64,
    /// Field that produced the best score
    pub matched_field: String,
    /// Stringified value of that field
    pub matched_value: String,
    pub highlights: Vec<Highlight>,
}

impl SearchResult {
    /// Wrap an item that was returned without being scored against a query
    pub fn unscored(item: Record) -> Self {
        Self {
            item,
            score: 1.0,
            matched_field: String::new(),
            matched_value: String::new(),
            highlights: Vec::new(),
        }
    }
}

/// Options for [`FuzzySearch::search`]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Fields (dot paths) to match against
    pub keys: Vec<String>,
    pub threshold: f64,
    pub limit: usize,
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            threshold: DEFAULT_THRESHOLD,
            limit: DEFAULT_LIMIT,
            case_sensitive: false,
        }
    }
}

impl SearchOptions {
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Levenshtein-based fuzzy search
pub struct FuzzySearch;

impl FuzzySearch {
    /// Classic edit distance over characters (insert, delete, substitute all cost 1)
    pub fn levenshtein_distance(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[0] = i;
        }
        for j in 0..=b.len() {
            matrix[0][j] = j;
        }

        for i in 1..=a.len() {
            for j in 1..=b.len() {
                let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
                matrix[i][j] = (matrix[i - 1][j] + 1)
                    .min(matrix[i][j - 1] + 1)
                    .min(matrix[i - 1][j - 1] + cost);
            }
        }

        matrix[a.len()][b.len()]
    }

    /// Similarity in [0, 1]: `(longer - distance) / longer`, 1.0 for two empty strings
    pub fn similarity(a: &str, b: &str) -> f64 {
        let longer = a.chars().count().max(b.chars().count());
        if longer == 0 {
            return 1.0;
        }

        let distance = Self::levenshtein_distance(a, b);
        (longer - distance) as f64 / longer as f64
    }

    /// Search items by the configured keys
    ///
    /// Each item keeps only its single best-scoring field. Substring hits score
    /// `2 * query_len / value_len` (capped at 1), everything else scores by
    /// similarity. Results below the threshold are dropped; the rest are sorted
    /// by descending score and truncated to the limit.
    pub fn search(query: &str, items: &[Record], options: &SearchOptions) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return items
                .iter()
                .take(options.limit)
                .cloned()
                .map(SearchResult::unscored)
                .collect();
        }

        let needle = Self::normalize(query, options.case_sensitive);
        let mut results = Vec::new();

        for item in items {
            if let Some(result) = Self::match_item(item, &needle, options) {
                if result.score >= options.threshold {
                    results.push(result);
                }
            }
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let matched = results.len();
        results.truncate(options.limit);

        debug!(
            "Fuzzy search '{}' over {} items: {} matched, {} returned",
            query,
            items.len(),
            matched,
            results.len()
        );

        results
    }

    /// Score one item, keeping the best field
    fn match_item(item: &Record, needle: &str, options: &SearchOptions) -> Option<SearchResult> {
        let mut best: Option<(f64, &str, String)> = None;

        for key in &options.keys {
            let Some(value) = field_value(item, key) else {
                continue;
            };
            let raw = value_to_string(value);
            let haystack = Self::normalize(&raw, options.case_sensitive);
            let score = Self::score(needle, &haystack);

            if best.as_ref().is_none_or(|(existing, _, _)| score > *existing) {
                best = Some((score, key.as_str(), raw));
            }
        }

        let (score, field, raw) = best?;
        let highlights = Self::find_highlights(&raw, needle, options.case_sensitive);

        Some(SearchResult {
            item: item.clone(),
            score,
            matched_field: field.to_string(),
            matched_value: raw,
            highlights,
        })
    }

    fn score(needle: &str, haystack: &str) -> f64 {
        if haystack.contains(needle) {
            let ratio = needle.chars().count() as f64 / haystack.chars().count() as f64;
            (ratio * 2.0).min(1.0)
        } else {
            Self::similarity(needle, haystack)
        }
    }

    /// Every occurrence of the needle in the value, scanning again from one
    /// character past the previous match start.
    ///
    /// Offsets and text refer to `value` itself, even when lowercasing
    /// expands a character (`İ` lowercases to two characters).
    pub fn find_highlights(value: &str, needle: &str, case_sensitive: bool) -> Vec<Highlight> {
        let original: Vec<char> = value.chars().collect();
        let (haystack, origin) = fold_chars(&original, case_sensitive);
        let (needle, _) = fold_chars(&needle.chars().collect::<Vec<_>>(), case_sensitive);

        if needle.is_empty() || needle.len() > haystack.len() {
            return Vec::new();
        }

        let mut highlights = Vec::new();
        let mut from = 0;
        while let Some(found) = find_chars(&haystack, &needle, from) {
            let start = origin[found];
            let end = origin[found + needle.len() - 1] + 1;
            highlights.push(Highlight {
                start,
                end,
                text: original[start..end].iter().collect(),
            });
            from = found + 1;
        }

        highlights
    }

    /// Per-character lowercasing, the same folding the highlighter maps back from
    fn normalize(text: &str, case_sensitive: bool) -> String {
        if case_sensitive {
            text.to_string()
        } else {
            text.chars().flat_map(char::to_lowercase).collect()
        }
    }
}

/// Case-fold one character at a time, recording for every folded character
/// the index of the original character it came from.
fn fold_chars(chars: &[char], case_sensitive: bool) -> (Vec<char>, Vec<usize>) {
    let mut folded = Vec::with_capacity(chars.len());
    let mut origin = Vec::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        if case_sensitive {
            folded.push(c);
            origin.push(i);
        } else {
            for lower in c.to_lowercase() {
                folded.push(lower);
                origin.push(i);
            }
        }
    }
    (folded, origin)
}

fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}
