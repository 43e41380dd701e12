//! Filter & Sort Expression Parser
//!
//! Parses the compact textual forms used on the command line:
//! - filters: `field:operator:value`, e.g. `score:greater_equal:40`,
//!   `name:contains:"Maths Advanced"`, `score:between:40..60`,
//!   `grade:in:form1,form2`, `house:is_empty`
//! - sorts: `field` or `field:desc`

use serde_json::Value;

use super::filter::{Filter, Operator};
use super::sort::{SortBy, SortDirection};
use crate::error::AppError;

/// Parser for filter and sort expressions
pub struct FilterParser;

impl FilterParser {
    /// Parse a `field:operator[:value]` expression
    pub fn parse_filter(expr: &str) -> Result<Filter, AppError> {
        let mut parts = expr.splitn(3, ':');
        let field = parts.next().unwrap_or_default().trim();
        let op_name = parts.next().map(str::trim).unwrap_or_default();
        let raw_value = parts.next();

        if field.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Filter '{}' is missing a field name",
                expr
            )));
        }
        if op_name.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Filter '{}' is missing an operator",
                expr
            )));
        }

        let operator = Operator::from_name(op_name);
        if operator.is_unary() {
            return Ok(Filter::new(field, operator, Value::Null));
        }

        let raw_value = raw_value.ok_or_else(|| {
            AppError::InvalidInput(format!("Filter '{}' needs a value", expr))
        })?;

        let value = match operator {
            Operator::Between => Self::parse_range(raw_value)?,
            Operator::In | Operator::NotIn => Value::Array(
                Self::split_list(raw_value)
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            ),
            _ => Value::String(Self::unquote(raw_value.trim())),
        };

        Ok(Filter::new(field, operator, value))
    }

    /// Parse a `field[:asc|desc]` sort expression
    pub fn parse_sort(expr: &str) -> Result<SortBy, AppError> {
        let (field, direction) = match expr.rsplit_once(':') {
            Some((field, dir)) => (field.trim(), dir.parse::<SortDirection>()?),
            None => (expr.trim(), SortDirection::Asc),
        };

        if field.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Sort '{}' is missing a field name",
                expr
            )));
        }

        Ok(SortBy {
            field: field.to_string(),
            direction,
        })
    }

    /// `min..max` or `min,max`
    fn parse_range(raw: &str) -> Result<Value, AppError> {
        let raw = raw.trim();
        let (min, max) = raw
            .split_once("..")
            .or_else(|| raw.split_once(','))
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Range '{}' must look like min..max or min,max",
                    raw
                ))
            })?;

        Ok(Value::Array(vec![
            Value::String(min.trim().to_string()),
            Value::String(max.trim().to_string()),
        ]))
    }

    /// Split a comma-separated list, keeping quoted items whole
    fn split_list(raw: &str) -> Vec<String> {
        let mut items = Vec::new();
        let mut current = String::new();
        let mut quote: Option<char> = None;
        let mut chars = raw.chars().peekable();

        while let Some(ch) = chars.next() {
            match quote {
                Some(q) if ch == q => quote = None,
                Some(_) if ch == '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                Some(_) => current.push(ch),
                None if ch == '"' || ch == '\'' => quote = Some(ch),
                None if ch == ',' => {
                    items.push(current.trim().to_string());
                    current.clear();
                }
                None => current.push(ch),
            }
        }
        items.push(current.trim().to_string());

        items.into_iter().filter(|s| !s.is_empty()).collect()
    }

    /// Strip one pair of matching quotes, honoring backslash escapes
    fn unquote(raw: &str) -> String {
        let chars: Vec<char> = raw.chars().collect();
        let quoted = chars.len() >= 2
            && chars[0] == chars[chars.len() - 1]
            && (chars[0] == '"' || chars[0] == '\'');
        if !quoted {
            return raw.to_string();
        }

        let mut out = String::new();
        let mut iter = chars[1..chars.len() - 1].iter().copied();
        while let Some(ch) = iter.next() {
            if ch == '\\' {
                if let Some(next) = iter.next() {
                    out.push(next);
                }
            } else {
                out.push(ch);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basic_filter() {
        let filter = FilterParser::parse_filter("score:greater_equal:40").unwrap();
        assert_eq!(filter.field, "score");
        assert_eq!(filter.operator, Operator::GreaterEqual);
        assert_eq!(filter.value, json!("40"));
        assert!(!filter.case_sensitive);
    }

    #[test]
    fn test_quoted_value() {
        let filter = FilterParser::parse_filter(r#"name:contains:"Maths Advanced""#).unwrap();
        assert_eq!(filter.value, json!("Maths Advanced"));

        let filter = FilterParser::parse_filter(r#"name:equals:'say \'hi\''"#).unwrap();
        assert_eq!(filter.value, json!("say 'hi'"));
    }

    #[test]
    fn test_value_may_contain_colons() {
        let filter = FilterParser::parse_filter("time:regex:^08:\\d\\d$").unwrap();
        assert_eq!(filter.operator, Operator::Regex);
        assert_eq!(filter.value, json!("^08:\\d\\d$"));
    }

    #[test]
    fn test_between_forms() {
        let dotted = FilterParser::parse_filter("score:between:40..60").unwrap();
        assert_eq!(dotted.value, json!(["40", "60"]));

        let comma = FilterParser::parse_filter("score:between:40, 60").unwrap();
        assert_eq!(comma.value, json!(["40", "60"]));

        assert!(FilterParser::parse_filter("score:between:40").is_err());
    }

    #[test]
    fn test_in_list() {
        let filter = FilterParser::parse_filter(r#"grade:in:form1, form2,"Form 3, East""#).unwrap();
        assert_eq!(filter.operator, Operator::In);
        assert_eq!(filter.value, json!(["form1", "form2", "Form 3, East"]));
    }

    #[test]
    fn test_unary_operators_take_no_value() {
        let filter = FilterParser::parse_filter("house:is_empty").unwrap();
        assert_eq!(filter.operator, Operator::IsEmpty);
        assert_eq!(filter.value, Value::Null);
    }

    #[test]
    fn test_unknown_operator_is_kept() {
        let filter = FilterParser::parse_filter("name:sounds_like:smith").unwrap();
        assert_eq!(filter.operator, Operator::Unknown);
    }

    #[test]
    fn test_malformed_filters() {
        assert!(FilterParser::parse_filter("").is_err());
        assert!(FilterParser::parse_filter(":equals:x").is_err());
        assert!(FilterParser::parse_filter("name").is_err());
        assert!(FilterParser::parse_filter("name:equals").is_err());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(FilterParser::parse_sort("name").unwrap(), SortBy::asc("name"));
        assert_eq!(
            FilterParser::parse_sort("teacher.name:desc").unwrap(),
            SortBy::desc("teacher.name")
        );
        assert!(FilterParser::parse_sort("name:up").is_err());
        assert!(FilterParser::parse_sort(":desc").is_err());
    }
}
