use proptest::prelude::*;
use serde_json::json;

use super::autocomplete::{AutocompleteEngine, AutocompleteOptions};
use super::filter::FilterEngine;
use super::fuzzy::{FuzzySearch, SearchOptions};

// Property test: similarity always lands in [0, 1] and is 1 for identical strings
proptest! {
    #[test]
    fn similarity_is_bounded(a in "\\PC{0,12}", b in "\\PC{0,12}") {
        let s = FuzzySearch::similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&s));
        prop_assert_eq!(FuzzySearch::similarity(&a, &a), 1.0);
    }
}

// Property test: distance is symmetric and bounded by the longer length
proptest! {
    #[test]
    fn levenshtein_is_symmetric(a in "[a-z]{0,10}", b in "[a-z]{0,10}") {
        let ab = FuzzySearch::levenshtein_distance(&a, &b);
        prop_assert_eq!(ab, FuzzySearch::levenshtein_distance(&b, &a));
        prop_assert!(ab <= a.len().max(b.len()));
    }
}

// Property test: nothing below the threshold is ever returned, and results are sorted
proptest! {
    #[test]
    fn threshold_excludes_low_scores(
        names in proptest::collection::vec("[a-z ]{1,15}", 0..20),
        query in "[a-z]{1,6}",
        threshold in 0.0f64..=1.0,
    ) {
        let items: Vec<_> = names.iter().map(|n| json!({"name": n})).collect();
        let options = SearchOptions { threshold, ..SearchOptions::with_keys(["name"]) };
        let results = FuzzySearch::search(&query, &items, &options);

        prop_assert!(results.iter().all(|r| r.score >= threshold));
        prop_assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

// Property test: an empty filter list is the identity
proptest! {
    #[test]
    fn empty_filters_are_identity(names in proptest::collection::vec("[A-Za-z]{0,8}", 0..10)) {
        let items: Vec<_> = names.iter().map(|n| json!({"name": n})).collect();
        prop_assert_eq!(FilterEngine::apply_filters(&items, &[]), items);
    }
}

// Property test: repeated suggestion calls without mutation agree
proptest! {
    #[test]
    fn suggestions_are_stable(
        names in proptest::collection::vec("[a-z]{2,6}( [a-z]{2,6})?", 1..15),
        query in "[a-z]{2,4}",
    ) {
        let items: Vec<_> = names.iter().map(|n| json!({"name": n})).collect();
        let engine = AutocompleteEngine::new(items, AutocompleteOptions::with_fields(["name"]));
        let first = engine.get_suggestions(&query);
        prop_assert!(first.len() <= 10);
        prop_assert_eq!(engine.get_suggestions(&query), first);
    }
}
