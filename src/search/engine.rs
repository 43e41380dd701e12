//! Search Engine Integration
//!
//! Ties together filtering, fuzzy matching, sorting and autocomplete
//! behind one facade over a caller-supplied item set.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::autocomplete::{AutocompleteEngine, AutocompleteOptions, Suggestion};
use super::filter::{Filter, FilterEngine};
use super::fuzzy::{FuzzySearch, SearchOptions, SearchResult, DEFAULT_LIMIT, DEFAULT_THRESHOLD};
use super::sort::{sort_results, SortBy};
use crate::record::Record;

/// Configuration for [`SmartSearchEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmartSearchOptions {
    /// Fields used for fuzzy text search
    pub search_fields: Vec<String>,
    /// Fields offered for structured filtering
    pub filter_fields: Vec<String>,
    /// Fields indexed for autocomplete; the search fields when empty
    pub autocomplete_fields: Vec<String>,
    pub threshold: f64,
    /// Page size of [`SearchResponse::results`]
    pub max_results: usize,
    pub case_sensitive: bool,
    /// Shortest query that gets autocomplete suggestions
    pub min_query_length: usize,
    pub max_suggestions: usize,
}

impl Default for SmartSearchOptions {
    fn default() -> Self {
        let autocomplete = AutocompleteOptions::default();
        Self {
            search_fields: Vec::new(),
            filter_fields: Vec::new(),
            autocomplete_fields: Vec::new(),
            threshold: DEFAULT_THRESHOLD,
            max_results: DEFAULT_LIMIT,
            case_sensitive: false,
            min_query_length: autocomplete.min_length,
            max_suggestions: autocomplete.max_suggestions,
        }
    }
}

impl SmartSearchOptions {
    pub fn with_search_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn effective_autocomplete_fields(&self) -> Vec<String> {
        if self.autocomplete_fields.is_empty() {
            self.search_fields.clone()
        } else {
            self.autocomplete_fields.clone()
        }
    }

    fn autocomplete_options(&self) -> AutocompleteOptions {
        AutocompleteOptions {
            fields: self.effective_autocomplete_fields(),
            min_length: self.min_query_length,
            max_suggestions: self.max_suggestions,
            case_sensitive: self.case_sensitive,
        }
    }
}

/// One page of results plus the size of the full result set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// Count after filtering and searching, before pagination
    pub total: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub search_fields: Vec<String>,
    pub filter_fields: Vec<String>,
    pub autocomplete_fields: Vec<String>,
    pub total_items: usize,
}

/// Search facade: filter -> fuzzy search -> sort -> paginate
pub struct SmartSearchEngine {
    options: SmartSearchOptions,
    autocomplete: AutocompleteEngine,
}

impl SmartSearchEngine {
    pub fn new(items: Vec<Record>, options: SmartSearchOptions) -> Self {
        let autocomplete = AutocompleteEngine::new(items, options.autocomplete_options());
        Self {
            options,
            autocomplete,
        }
    }

    pub fn items(&self) -> &[Record] {
        self.autocomplete.items()
    }

    /// Run a query
    ///
    /// Filters narrow the item set first; a non-blank query then narrows it
    /// further by fuzzy score. `total` counts everything that survived both
    /// stages, `results` holds at most `max_results` of them.
    pub fn search(&self, query: &str, filters: &[Filter], sort_by: Option<&SortBy>) -> SearchResponse {
        let items = self.items();

        let filtered: Cow<'_, [Record]> = if filters.is_empty() {
            Cow::Borrowed(items)
        } else {
            Cow::Owned(FilterEngine::apply_filters(items, filters))
        };

        let mut results = if query.trim().is_empty() {
            filtered
                .iter()
                .cloned()
                .map(SearchResult::unscored)
                .collect::<Vec<_>>()
        } else {
            let options = SearchOptions {
                keys: self.options.search_fields.clone(),
                threshold: self.options.threshold,
                limit: filtered.len(),
                case_sensitive: self.options.case_sensitive,
            };
            FuzzySearch::search(query, &filtered, &options)
        };

        if let Some(sort) = sort_by {
            sort_results(&mut results, sort);
        }

        let total = results.len();
        results.truncate(self.options.max_results);

        debug!(
            "Search '{}' with {} filters: {} of {} items matched",
            query,
            filters.len(),
            total,
            items.len()
        );

        SearchResponse {
            results,
            total,
            has_more: total > self.options.max_results,
        }
    }

    pub fn get_suggestions(&self, query: &str) -> Vec<Suggestion> {
        self.autocomplete.get_suggestions(query)
    }

    /// Distinct values of a field across all items, for filter dropdowns
    pub fn get_filter_suggestions(&self, field: &str) -> Vec<String> {
        FilterEngine::generate_filter_suggestions(self.items(), field)
    }

    pub fn update_items(&mut self, items: Vec<Record>) {
        self.autocomplete.update_items(items);
    }

    pub fn add_item(&mut self, item: Record) {
        self.autocomplete.add_item(item);
    }

    /// Remove every item matching the predicate, returning how many were removed
    pub fn remove_item<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Record) -> bool,
    {
        self.autocomplete.remove_items(predicate)
    }

    pub fn get_stats(&self) -> EngineStats {
        EngineStats {
            search_fields: self.options.search_fields.clone(),
            filter_fields: self.options.filter_fields.clone(),
            autocomplete_fields: self.options.effective_autocomplete_fields(),
            total_items: self.items().len(),
        }
    }
}
