//! Autocomplete over a word-level inverted index
//!
//! The index maps each word (lowercased unless case-sensitive) to every place
//! it occurs. It is rebuilt from scratch whenever the item set changes.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use super::fuzzy::FuzzySearch;
use crate::record::{field_value, value_to_string, Record};

/// Minimum similarity for a fuzzy suggestion
const FUZZY_SUGGESTION_MIN: f64 = 0.6;
const EXACT_SCORE: f64 = 2.0;
const PREFIX_SCORE: f64 = 1.0;

/// One occurrence of a word in the indexed items
#[derive(Debug, Clone, PartialEq)]
struct Occurrence {
    item_index: usize,
    field: String,
    word: String,
}

/// A borrowed view of an index occurrence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry<'a> {
    pub item: &'a Record,
    pub item_index: usize,
    pub field: &'a str,
    pub word: &'a str,
}

/// Suggested completion, aggregated per (field, word)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub text: String,
    pub field: String,
    /// How many times the word occurs in this field across items
    pub count: usize,
    /// 2 for an exact hit, 1 for a prefix hit, similarity for fuzzy hits
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteOptions {
    /// Fields (dot paths) to index
    pub fields: Vec<String>,
    /// Queries shorter than this get no suggestions
    pub min_length: usize,
    pub max_suggestions: usize,
    pub case_sensitive: bool,
}

impl Default for AutocompleteOptions {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            min_length: 2,
            max_suggestions: 10,
            case_sensitive: false,
        }
    }
}

impl AutocompleteOptions {
    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

pub struct AutocompleteEngine {
    items: Vec<Record>,
    options: AutocompleteOptions,
    index: BTreeMap<String, Vec<Occurrence>>,
}

impl AutocompleteEngine {
    pub fn new(items: Vec<Record>, options: AutocompleteOptions) -> Self {
        let mut engine = Self {
            items: Vec::new(),
            options,
            index: BTreeMap::new(),
        };
        engine.update_items(items);
        engine
    }

    /// Replace the item set and rebuild the whole index
    pub fn update_items(&mut self, items: Vec<Record>) {
        self.items = items;
        self.index = Self::build_index(&self.items, &self.options);
        debug!(
            "Autocomplete index rebuilt: {} items, {} distinct words",
            self.items.len(),
            self.index.len()
        );
    }

    /// Append one item; the index is rebuilt in full
    pub fn add_item(&mut self, item: Record) {
        let mut items = std::mem::take(&mut self.items);
        items.push(item);
        self.update_items(items);
    }

    /// Drop every item matching the predicate, returning how many were removed
    pub fn remove_items<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Record) -> bool,
    {
        let mut items = std::mem::take(&mut self.items);
        let before = items.len();
        items.retain(|item| !predicate(item));
        let removed = before - items.len();
        self.update_items(items);
        removed
    }

    fn build_index(
        items: &[Record],
        options: &AutocompleteOptions,
    ) -> BTreeMap<String, Vec<Occurrence>> {
        let mut index: BTreeMap<String, Vec<Occurrence>> = BTreeMap::new();

        for (item_index, item) in items.iter().enumerate() {
            for field in &options.fields {
                let Some(value) = field_value(item, field) else {
                    continue;
                };
                let text = value_to_string(value);

                for word in text.split_whitespace() {
                    let key = if options.case_sensitive {
                        word.to_string()
                    } else {
                        word.to_lowercase()
                    };
                    index.entry(key).or_default().push(Occurrence {
                        item_index,
                        field: field.clone(),
                        word: word.to_string(),
                    });
                }
            }
        }

        index
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    /// Number of distinct words in the index
    pub fn word_count(&self) -> usize {
        self.index.len()
    }

    /// Every occurrence recorded under an index key
    pub fn lookup(&self, key: &str) -> Vec<IndexEntry<'_>> {
        self.index
            .get(key)
            .map(|occurrences| {
                occurrences
                    .iter()
                    .filter_map(|occ| {
                        Some(IndexEntry {
                            item: self.items.get(occ.item_index)?,
                            item_index: occ.item_index,
                            field: &occ.field,
                            word: &occ.word,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Prefix suggestions first, topped up with fuzzy ones when there are too few
    pub fn get_suggestions(&self, query: &str) -> Vec<Suggestion> {
        let query = query.trim();
        if query.chars().count() < self.options.min_length {
            return Vec::new();
        }

        let query = if self.options.case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };

        let mut collector = SuggestionCollector::default();

        for (key, occurrences) in &self.index {
            if key.starts_with(&query) {
                let score = if *key == query { EXACT_SCORE } else { PREFIX_SCORE };
                collector.add_all(occurrences, score);
            }
        }

        if collector.len() < self.options.max_suggestions {
            for (key, occurrences) in &self.index {
                if key.starts_with(&query) {
                    continue;
                }
                let similarity = FuzzySearch::similarity(&query, key);
                if similarity > FUZZY_SUGGESTION_MIN {
                    collector.add_all(occurrences, similarity);
                }
            }
        }

        let mut suggestions = collector.into_suggestions();
        suggestions.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.count.cmp(&a.count))
        });
        suggestions.truncate(self.options.max_suggestions);
        suggestions
    }
}

/// Deduplicates suggestions per `field:word`, counting occurrences
#[derive(Default)]
struct SuggestionCollector {
    suggestions: Vec<Suggestion>,
    positions: HashMap<String, usize>,
}

impl SuggestionCollector {
    fn add_all(&mut self, occurrences: &[Occurrence], score: f64) {
        for occ in occurrences {
            let key = format!("{}:{}", occ.field, occ.word);
            match self.positions.get(&key) {
                Some(&pos) => self.suggestions[pos].count += 1,
                None => {
                    self.positions.insert(key, self.suggestions.len());
                    self.suggestions.push(Suggestion {
                        text: occ.word.clone(),
                        field: occ.field.clone(),
                        count: 1,
                        score,
                    });
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.suggestions.len()
    }

    fn into_suggestions(self) -> Vec<Suggestion> {
        self.suggestions
    }
}
