//! Structured Filter Engine
//!
//! Evaluates a conjunction of typed predicates against each record.

use std::collections::BTreeSet;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::record::{field_value, value_to_number, value_to_string, Record};

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    Between,
    In,
    NotIn,
    IsEmpty,
    IsNotEmpty,
    Regex,
    /// Any operator name this engine does not know. Passes every record.
    #[serde(other)]
    Unknown,
}

impl Operator {
    pub const ALL: [Operator; 16] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::GreaterEqual,
        Operator::LessEqual,
        Operator::Between,
        Operator::In,
        Operator::NotIn,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::Regex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::GreaterEqual => "greater_equal",
            Operator::LessEqual => "less_equal",
            Operator::Between => "between",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::Regex => "regex",
            Operator::Unknown => "unknown",
        }
    }

    /// Look up an operator by name; unrecognized names map to `Unknown`
    pub fn from_name(name: &str) -> Operator {
        let name = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == name)
            .unwrap_or(Operator::Unknown)
    }

    /// Whether the operator ignores the filter value
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single predicate on one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Dot path into the record
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }
}

/// Predicate evaluation over records
pub struct FilterEngine;

impl FilterEngine {
    /// Items for which every filter holds. No filters means every item.
    pub fn apply_filters(items: &[Record], filters: &[Filter]) -> Vec<Record> {
        if filters.is_empty() {
            return items.to_vec();
        }

        let prepared: Vec<PreparedFilter> = filters.iter().map(PreparedFilter::new).collect();
        items
            .iter()
            .filter(|item| prepared.iter().all(|f| f.matches(item)))
            .cloned()
            .collect()
    }

    /// Evaluate a single filter against a record
    pub fn evaluate_filter(item: &Record, filter: &Filter) -> bool {
        PreparedFilter::new(filter).matches(item)
    }

    /// Distinct stringified values of a field, sorted, for filter dropdowns
    pub fn generate_filter_suggestions(items: &[Record], field: &str) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| field_value(item, field))
            .map(value_to_string)
            .filter(|s| !s.trim().is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// A filter ready to run over many records. Patterns are compiled once and
/// problems with the filter itself are logged once.
struct PreparedFilter<'a> {
    filter: &'a Filter,
    pattern: Option<Regex>,
}

impl<'a> PreparedFilter<'a> {
    fn new(filter: &'a Filter) -> Self {
        let mut pattern = None;
        match filter.operator {
            Operator::Regex => {
                let source = value_to_string(&filter.value);
                match RegexBuilder::new(&source)
                    .case_insensitive(!filter.case_sensitive)
                    .build()
                {
                    Ok(re) => pattern = Some(re),
                    Err(e) => warn!(
                        "Invalid regex '{}' on field '{}': {}",
                        source, filter.field, e
                    ),
                }
            }
            Operator::Unknown => warn!(
                "Unknown filter operator on field '{}', passing records through",
                filter.field
            ),
            _ => {}
        }
        Self { filter, pattern }
    }

    fn matches(&self, item: &Record) -> bool {
        let filter = self.filter;
        let Some(value) = field_value(item, &filter.field) else {
            return filter.operator == Operator::IsEmpty;
        };

        let cs = filter.case_sensitive;

        match filter.operator {
            Operator::Equals => text(value, cs) == text(&filter.value, cs),
            Operator::NotEquals => text(value, cs) != text(&filter.value, cs),
            Operator::Contains => text(value, cs).contains(&text(&filter.value, cs)),
            Operator::NotContains => !text(value, cs).contains(&text(&filter.value, cs)),
            Operator::StartsWith => text(value, cs).starts_with(&text(&filter.value, cs)),
            Operator::EndsWith => text(value, cs).ends_with(&text(&filter.value, cs)),
            Operator::GreaterThan => value_to_number(value) > value_to_number(&filter.value),
            Operator::LessThan => value_to_number(value) < value_to_number(&filter.value),
            Operator::GreaterEqual => value_to_number(value) >= value_to_number(&filter.value),
            Operator::LessEqual => value_to_number(value) <= value_to_number(&filter.value),
            Operator::Between => match between_bounds(&filter.value) {
                Some((min, max)) => {
                    let n = value_to_number(value);
                    n >= min && n <= max
                }
                None => false,
            },
            Operator::In => is_member(value, &filter.value, cs),
            Operator::NotIn => !is_member(value, &filter.value, cs),
            Operator::IsEmpty => is_blank(value),
            Operator::IsNotEmpty => !is_blank(value),
            // Invalid patterns fail closed
            Operator::Regex => self
                .pattern
                .as_ref()
                .is_some_and(|re| re.is_match(&value_to_string(value))),
            Operator::Unknown => true,
        }
    }
}

fn text(value: &Value, case_sensitive: bool) -> String {
    let s = value_to_string(value);
    if case_sensitive {
        s
    } else {
        s.to_lowercase()
    }
}

/// `[min, max]` or `{ "min": .., "max": .. }`
fn between_bounds(value: &Value) -> Option<(f64, f64)> {
    match value {
        Value::Array(bounds) if bounds.len() >= 2 => {
            Some((value_to_number(&bounds[0]), value_to_number(&bounds[1])))
        }
        Value::Object(map) => {
            let min = map.get("min")?;
            let max = map.get("max")?;
            Some((value_to_number(min), value_to_number(max)))
        }
        _ => None,
    }
}

fn is_member(value: &Value, list: &Value, case_sensitive: bool) -> bool {
    let needle = text(value, case_sensitive);
    match list {
        Value::Array(candidates) => candidates
            .iter()
            .any(|candidate| text(candidate, case_sensitive) == needle),
        single => text(single, case_sensitive) == needle,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
