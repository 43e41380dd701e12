//! Result ordering by a record field

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::fuzzy::SearchResult;
use crate::error::AppError;
use crate::record::{field_value, is_numeric, value_to_number, value_to_string, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(AppError::InvalidInput(format!(
                "Unknown sort direction '{}', expected asc or desc",
                other
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// Field to sort on and the direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Compare two records. Missing values go last in both directions.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match (field_value(a, &self.field), field_value(b, &self.field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = compare_values(x, y);
                match self.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
        }
    }
}

/// Stable sort of search results by a field of their items
pub fn sort_results(results: &mut [SearchResult], sort: &SortBy) {
    results.sort_by(|a, b| sort.compare(&a.item, &b.item));
}

/// Numbers compare numerically and sort ahead of text, which keeps the
/// ordering total when a column mixes the two.
fn compare_values(x: &serde_json::Value, y: &serde_json::Value) -> Ordering {
    match (is_numeric(x), is_numeric(y)) {
        (true, true) => value_to_number(x)
            .partial_cmp(&value_to_number(y))
            .unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => locale_compare(&value_to_string(x), &value_to_string(y)),
    }
}

/// Case-insensitive ordering; on a tie lowercase sorts before uppercase
fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
