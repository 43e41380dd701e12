//! Grade calculation and derived risk signals
//!
//! Every function here is total: bad input produces a sentinel
//! classification, never an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::system::{get_grading_system, GradeBand};
use crate::record::{parse_number, value_to_number};

/// Pass mark used by the attention and insight rules
pub const PASS_MARK: f64 = 40.0;

/// A score as it arrives from a mark sheet: a number, a string (possibly the
/// absent marker `X`), or nothing at all.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "Value")]
pub enum RawScore {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

impl RawScore {
    /// Missing, or the literal absent marker `X`
    pub fn is_absent(&self) -> bool {
        match self {
            RawScore::Missing => true,
            RawScore::Text(s) => s.trim() == "X",
            RawScore::Number(_) => false,
        }
    }

    /// Numeric value with loose coercion; `NaN` when not numeric
    pub fn as_number(&self) -> f64 {
        match self {
            RawScore::Missing => f64::NAN,
            RawScore::Number(n) => *n,
            RawScore::Text(s) => parse_number(s),
        }
    }

    /// The numeric value when present and finite
    pub fn valid_number(&self) -> Option<f64> {
        if self.is_absent() {
            return None;
        }
        Some(self.as_number()).filter(|n| n.is_finite())
    }
}

impl From<Value> for RawScore {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawScore::Missing,
            Value::String(s) => RawScore::Text(s),
            other => RawScore::Number(value_to_number(&other)),
        }
    }
}

impl From<&Value> for RawScore {
    fn from(value: &Value) -> Self {
        RawScore::from(value.clone())
    }
}

impl From<f64> for RawScore {
    fn from(n: f64) -> Self {
        RawScore::Number(n)
    }
}

impl From<i32> for RawScore {
    fn from(n: i32) -> Self {
        RawScore::Number(f64::from(n))
    }
}

impl From<u32> for RawScore {
    fn from(n: u32) -> Self {
        RawScore::Number(f64::from(n))
    }
}

impl From<&str> for RawScore {
    fn from(s: &str) -> Self {
        RawScore::Text(s.to_string())
    }
}

impl From<String> for RawScore {
    fn from(s: String) -> Self {
        RawScore::Text(s)
    }
}

impl<T: Into<RawScore>> From<Option<T>> for RawScore {
    fn from(score: Option<T>) -> Self {
        score.map(Into::into).unwrap_or(RawScore::Missing)
    }
}

/// Result of grading one score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeClassification {
    pub grade: &'static str,
    pub status: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl GradeClassification {
    fn from_band(band: &GradeBand, score: Option<f64>) -> Self {
        Self {
            grade: band.grade,
            status: band.status,
            color: band.color,
            description: band.description,
            score,
        }
    }

    pub fn invalid() -> Self {
        Self {
            grade: "INVALID",
            status: "INVALID SCORE",
            color: "gray",
            description: "Score must be a number between 0 and 100",
            score: None,
        }
    }

    pub fn no_data() -> Self {
        Self {
            grade: "N/A",
            status: "NO DATA",
            color: "gray",
            description: "No valid scores recorded",
            score: None,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.status == "ABSENT"
    }
}

/// Grade a score against the table for its grade level
///
/// Bands are closed integer intervals. A fractional score is graded by its
/// integer part, so a band `min..=max` accepts `min <= score < max + 1` and
/// 74.5 grades as TWO in the junior table rather than falling through.
pub fn calculate_grade(score: impl Into<RawScore>, grade_level: &str) -> GradeClassification {
    let score = score.into();
    let system = get_grading_system(grade_level);

    if score.is_absent() {
        return GradeClassification::from_band(&system.absent, None);
    }

    let n = score.as_number();
    if !n.is_finite() || !(0.0..=100.0).contains(&n) {
        return GradeClassification::invalid();
    }

    GradeClassification::from_band(system.band_for(n), Some(n))
}

/// Below the pass mark. Non-numeric scores never need attention.
pub fn requires_attention(score: impl Into<RawScore>) -> bool {
    score.into().as_number() < PASS_MARK
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four-tier risk cascade; the most severe matching tier wins.
///
/// Attendance defaults to 100 when unknown.
pub fn calculate_risk_level(score: f64, attendance: Option<f64>) -> RiskLevel {
    let attendance = attendance.unwrap_or(100.0);

    if score < 30.0 || attendance < 60.0 {
        RiskLevel::Critical
    } else if score < 40.0 || attendance < 75.0 {
        RiskLevel::High
    } else if score < 50.0 || attendance < 85.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// One subject line of a report card
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SubjectScore {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: RawScore,
}

impl SubjectScore {
    pub fn new(name: impl Into<String>, score: impl Into<RawScore>) -> Self {
        Self {
            name: name.into(),
            score: score.into(),
        }
    }
}

/// Mean of the valid numeric scores, rounded to one decimal
pub fn average_score(subjects: &[SubjectScore]) -> Option<f64> {
    let scores: Vec<f64> = subjects
        .iter()
        .filter_map(|s| s.score.valid_number())
        .collect();

    if scores.is_empty() {
        return None;
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// Grade the average of all valid subject scores
pub fn calculate_overall_grade(subjects: &[SubjectScore], grade_level: &str) -> GradeClassification {
    match average_score(subjects) {
        Some(average) => calculate_grade(average, grade_level),
        None => GradeClassification::no_data(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_junior_boundaries() {
        let cases = [
            (74, "TWO", "MERIT"),
            (75, "ONE", "DISTINCTION"),
            (39, "F", "FAIL"),
            (40, "FOUR", "PASS"),
            (50, "THREE", "CREDIT"),
            (0, "F", "FAIL"),
            (100, "ONE", "DISTINCTION"),
        ];
        for (score, grade, status) in cases {
            let result = calculate_grade(score, "form1");
            assert_eq!(result.grade, grade, "score {}", score);
            assert_eq!(result.status, status, "score {}", score);
            assert_eq!(result.score, Some(f64::from(score)));
        }
    }

    #[test]
    fn test_senior_boundaries() {
        assert_eq!(calculate_grade(74, "form3").grade, "2");
        assert_eq!(calculate_grade(75, "form3").grade, "1");
        assert_eq!(calculate_grade(39, "grade12").grade, "9");
        assert_eq!(calculate_grade(40, "grade12").grade, "8");
        assert_eq!(calculate_grade(64, "Form 4").status, "MERIT");
    }

    #[test]
    fn test_fractional_score_graded_by_integer_part() {
        let junior = calculate_grade(74.5, "form1");
        assert_eq!(junior.grade, "TWO");
        assert_eq!(junior.score, Some(74.5));
        assert_eq!(calculate_grade(74.5, "form3").grade, "2");
        assert_eq!(calculate_grade("99.9", "form1").grade, "ONE");
    }

    #[test]
    fn test_absent_sentinel() {
        for level in ["form1", "form3", "unknown"] {
            let missing = calculate_grade(RawScore::Missing, level);
            assert_eq!(missing.grade, "X");
            assert_eq!(missing.status, "ABSENT");
            assert!(missing.is_absent());

            let marked = calculate_grade("X", level);
            assert_eq!(marked.grade, "X");
        }
        assert_eq!(calculate_grade(None::<f64>, "form1").status, "ABSENT");
    }

    #[test]
    fn test_invalid_scores() {
        for score in [RawScore::from(-1), RawScore::from(100.5), RawScore::from("abc")] {
            let result = calculate_grade(score, "form1");
            assert_eq!(result.grade, "INVALID");
            assert_eq!(result.status, "INVALID SCORE");
            assert_eq!(result.color, "gray");
        }
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        assert_eq!(calculate_grade("82", "form1").grade, "ONE");
        assert_eq!(calculate_grade(" 45 ", "form3").grade, "7");
    }

    #[test]
    fn test_requires_attention() {
        assert!(requires_attention(39));
        assert!(!requires_attention(40));
        assert!(requires_attention("12"));
        assert!(!requires_attention("X"));
        assert!(!requires_attention(RawScore::Missing));
    }

    #[test]
    fn test_risk_tiers() {
        assert_eq!(calculate_risk_level(29.0, Some(100.0)), RiskLevel::Critical);
        assert_eq!(calculate_risk_level(35.0, Some(100.0)), RiskLevel::High);
        assert_eq!(calculate_risk_level(45.0, Some(100.0)), RiskLevel::Medium);
        assert_eq!(calculate_risk_level(60.0, Some(100.0)), RiskLevel::Low);
        assert_eq!(calculate_risk_level(80.0, Some(55.0)), RiskLevel::Critical);
        assert_eq!(calculate_risk_level(80.0, Some(70.0)), RiskLevel::High);
        assert_eq!(calculate_risk_level(80.0, Some(80.0)), RiskLevel::Medium);
        assert_eq!(calculate_risk_level(60.0, None), RiskLevel::Low);
        assert_eq!(RiskLevel::Critical.to_string(), "critical");
    }

    #[test]
    fn test_overall_grade_averages_valid_scores() {
        let subjects = vec![
            SubjectScore::new("Mathematics", 80),
            SubjectScore::new("English", 71),
            SubjectScore::new("Biology", "X"),
            SubjectScore::new("History", RawScore::Missing),
            SubjectScore::new("Art", "n/a"),
        ];
        assert_eq!(average_score(&subjects), Some(75.5));

        let overall = calculate_overall_grade(&subjects, "form1");
        assert_eq!(overall.grade, "ONE");
        assert_eq!(overall.score, Some(75.5));
    }

    #[test]
    fn test_overall_grade_rounds_to_one_decimal() {
        let subjects = vec![
            SubjectScore::new("A", 70),
            SubjectScore::new("B", 70),
            SubjectScore::new("C", 71),
        ];
        assert_eq!(average_score(&subjects), Some(70.3));
    }

    #[test]
    fn test_overall_grade_without_data() {
        let none = calculate_overall_grade(&[], "form1");
        assert_eq!(none.grade, "N/A");
        assert_eq!(none.status, "NO DATA");

        let all_absent = vec![SubjectScore::new("Maths", "X")];
        assert_eq!(calculate_overall_grade(&all_absent, "form3").status, "NO DATA");
    }

    #[test]
    fn test_raw_score_deserialization() {
        let subjects: Vec<SubjectScore> = serde_json::from_value(json!([
            {"name": "Maths", "score": 55},
            {"name": "English", "score": "X"},
            {"name": "Art", "score": null},
            {"name": "Music"}
        ]))
        .unwrap();

        assert_eq!(subjects[0].score, RawScore::Number(55.0));
        assert_eq!(subjects[1].score, RawScore::Text("X".to_string()));
        assert_eq!(subjects[2].score, RawScore::Missing);
        assert_eq!(subjects[3].score, RawScore::Missing);
    }

    #[test]
    fn test_classification_serialization() {
        let value = serde_json::to_value(calculate_grade(82, "form1")).unwrap();
        assert_eq!(value["grade"], "ONE");
        assert_eq!(value["score"], 82.0);

        let absent = serde_json::to_value(calculate_grade("X", "form1")).unwrap();
        assert!(absent.get("score").is_none());
    }
}
