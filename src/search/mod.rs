//! Search subsystem
//!
//! Fuzzy matching, structured filters, autocomplete and the facade that
//! composes them.

pub mod autocomplete;
pub mod engine;
pub mod filter;
pub mod fuzzy;
pub mod parser;
pub mod sort;

#[cfg(test)]
mod property_tests;

pub use autocomplete::{AutocompleteEngine, AutocompleteOptions, Suggestion};
pub use engine::{EngineStats, SearchResponse, SmartSearchEngine, SmartSearchOptions};
pub use filter::{Filter, FilterEngine, Operator};
pub use fuzzy::{FuzzySearch, Highlight, SearchOptions, SearchResult};
pub use parser::FilterParser;
pub use sort::{SortBy, SortDirection};
