//! Search, suggest and facets commands

use tracing::debug;

use super::util::{load_records, to_json};
use crate::cli::{FacetsArgs, SearchArgs, SuggestArgs};
use crate::config::EngineConfig;
use crate::error::{normalize_text, validate_query, validate_threshold, AppError};
use crate::search::{
    FilterParser, Highlight, SearchResponse, SmartSearchEngine, SmartSearchOptions, Suggestion,
};

/// Wrap highlight spans of `text` in `**bold**`
///
/// Spans are character offsets and may overlap; overlapping or touching
/// spans are merged into one bold run.
pub fn bold_highlights(text: &str, highlights: &[Highlight]) -> String {
    let chars: Vec<char> = text.chars().collect();

    let mut ranges: Vec<(usize, usize)> = highlights
        .iter()
        .map(|h| (h.start.min(chars.len()), h.end.min(chars.len())))
        .filter(|(s, e)| s < e)
        .collect();
    if ranges.is_empty() {
        return text.to_string();
    }

    ranges.sort_by_key(|r| r.0);
    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (s, e) in ranges {
        match merged.last_mut() {
            Some(last) if s <= last.1 => last.1 = last.1.max(e),
            _ => merged.push((s, e)),
        }
    }

    let mut res = String::new();
    let mut last_idx = 0usize;
    for (s, e) in merged {
        res.extend(&chars[last_idx..s]);
        res.push_str("**");
        res.extend(&chars[s..e]);
        res.push_str("**");
        last_idx = e;
    }
    res.extend(&chars[last_idx..]);

    res
}

/// Format a search response as markdown
pub fn format_search_results(response: &SearchResponse, query: &str) -> String {
    let mut md = String::new();
    md.push_str(&format!(
        "# Search Results · {} of {} records\n\n",
        response.results.len(),
        response.total
    ));

    for (rank, result) in response.results.iter().enumerate() {
        if result.matched_field.is_empty() {
            md.push_str(&format!("{}. `{}`\n\n", rank + 1, result.item));
            continue;
        }

        md.push_str(&format!(
            "{}. {}\n\n",
            rank + 1,
            bold_highlights(&result.matched_value, &result.highlights)
        ));
        md.push_str(&format!(
            "   {} · score {:.2}\n\n",
            result.matched_field, result.score
        ));
    }

    if response.has_more {
        md.push_str(&format!(
            "_{} more results for '{}' not shown; raise --limit to see them_\n",
            response.total - response.results.len(),
            query
        ));
    }

    md
}

fn format_suggestions(suggestions: &[Suggestion], query: &str) -> String {
    let mut md = format!("# Suggestions for '{}'\n\n", query);
    for s in suggestions {
        md.push_str(&format!(
            "- **{}** ({}, {} {})\n",
            s.text,
            s.field,
            s.count,
            if s.count == 1 { "match" } else { "matches" }
        ));
    }
    md
}

/// Search options from config, with command-line overrides applied
fn search_options(args: &SearchArgs, config: &EngineConfig) -> Result<SmartSearchOptions, AppError> {
    let mut options = config.to_search_options();

    if !args.fields.is_empty() {
        options.search_fields = args.fields.clone();
    }
    if let Some(limit) = args.limit {
        options.max_results = limit;
    }
    if let Some(threshold) = args.threshold {
        validate_threshold(threshold)?;
        options.threshold = threshold;
    }
    if args.case_sensitive {
        options.case_sensitive = true;
    }

    Ok(options)
}

/// Shared implementation for search
pub fn execute_search(args: SearchArgs, config: &EngineConfig) -> Result<String, AppError> {
    validate_query(&args.query)?;
    let query = normalize_text(&args.query);
    let options = search_options(&args, config)?;

    if !query.is_empty() && options.search_fields.is_empty() {
        return Err(AppError::InvalidInput(
            "No fields to search; pass --field or set searchFields in the config".to_string(),
        ));
    }

    let filters = args
        .filters
        .iter()
        .map(|expr| FilterParser::parse_filter(expr))
        .collect::<Result<Vec<_>, _>>()?;
    let sort = args
        .sort
        .as_deref()
        .map(FilterParser::parse_sort)
        .transpose()?;

    let records = load_records(&args.input)?;
    debug!("Loaded {} records from {}", records.len(), args.input);

    let engine = SmartSearchEngine::new(records, options);
    let response = engine.search(&query, &filters, sort.as_ref());

    if args.json {
        return to_json(&response);
    }

    if response.results.is_empty() {
        return Err(AppError::NotFound(format!(
            "No records matched query '{}'",
            query
        )));
    }

    Ok(format_search_results(&response, &query))
}

/// Shared implementation for suggest
pub fn execute_suggest(args: SuggestArgs, config: &EngineConfig) -> Result<String, AppError> {
    validate_query(&args.query)?;
    let query = normalize_text(&args.query);

    let mut options = config.to_search_options();
    if !args.fields.is_empty() {
        options.autocomplete_fields = args.fields.clone();
    }
    if let Some(limit) = args.limit {
        options.max_suggestions = limit;
    }
    if options.autocomplete_fields.is_empty() && options.search_fields.is_empty() {
        return Err(AppError::InvalidInput(
            "No fields to index; pass --field or set autocompleteFields in the config".to_string(),
        ));
    }

    let engine = SmartSearchEngine::new(load_records(&args.input)?, options);
    let suggestions = engine.get_suggestions(&query);

    if args.json {
        return to_json(&suggestions);
    }
    if suggestions.is_empty() {
        return Ok(format!("No suggestions for '{}'", query));
    }

    Ok(format_suggestions(&suggestions, &query))
}

/// Shared implementation for facets
pub fn execute_facets(args: FacetsArgs, config: &EngineConfig) -> Result<String, AppError> {
    let field = args.field.trim();
    if field.is_empty() {
        return Err(AppError::InvalidInput("Field name is empty".to_string()));
    }

    let engine = SmartSearchEngine::new(load_records(&args.input)?, config.to_search_options());
    let values = engine.get_filter_suggestions(field);

    if args.json {
        return to_json(&values);
    }
    if values.is_empty() {
        return Err(AppError::NotFound(format!(
            "No values found for field '{}'",
            field
        )));
    }

    let mut md = format!("# Values of `{}` · {}\n\n", field, values.len());
    for value in &values {
        md.push_str(&format!("- {}\n", value));
    }
    Ok(md)
}
