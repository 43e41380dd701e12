//! Rule-based performance insights and grade styling

use serde::{Deserialize, Serialize};

use super::calculator::{average_score, SubjectScore, PASS_MARK};
use crate::record::format_number;

const EXCELLENT_SCORE: f64 = 75.0;
const GOOD_SCORE: f64 = 60.0;
const REPETITION_AVERAGE: f64 = 30.0;
const LOW_ATTENDANCE: f64 = 75.0;
const WATCH_ATTENDANCE: f64 = 85.0;
const EXCELLENT_ATTENDANCE: f64 = 95.0;
const MANY_FAILURES: usize = 3;

/// A student's report card
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Student {
    pub name: String,
    pub subjects: Vec<SubjectScore>,
    /// Attendance percentage
    pub attendance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInsights {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
}

/// Classify a student's subjects into strengths and weaknesses and derive
/// recommendations from failures, attendance and the overall average.
pub fn get_performance_insights(student: &Student) -> PerformanceInsights {
    let mut insights = PerformanceInsights::default();

    let scored: Vec<(&str, f64)> = student
        .subjects
        .iter()
        .filter_map(|s| s.score.valid_number().map(|n| (s.name.as_str(), n)))
        .collect();
    let (passing, failing): (Vec<_>, Vec<_>) =
        scored.iter().partition(|(_, score)| *score >= PASS_MARK);

    for (name, score) in &passing {
        if *score >= EXCELLENT_SCORE {
            insights
                .strengths
                .push(format!("Excellent performance in {} ({}%)", name, format_number(*score)));
        } else if *score >= GOOD_SCORE {
            insights
                .strengths
                .push(format!("Good performance in {} ({}%)", name, format_number(*score)));
        }
    }
    if !passing.is_empty() && failing.is_empty() {
        insights
            .strengths
            .push(format!("Passing all {} assessed subjects", passing.len()));
    }

    for (name, score) in &failing {
        insights
            .weaknesses
            .push(format!("Below the pass mark in {} ({}%)", name, format_number(*score)));
        insights
            .recommendations
            .push(format!("Arrange remedial lessons in {}", name));
    }
    if failing.len() >= MANY_FAILURES {
        insights
            .risk_factors
            .push(format!("Failing {} subjects", failing.len()));
    }

    if let Some(attendance) = student.attendance {
        let shown = format_number(attendance);
        if attendance < LOW_ATTENDANCE {
            insights
                .risk_factors
                .push(format!("Low attendance ({}%)", shown));
            insights
                .recommendations
                .push("Follow up on attendance with the student and guardians".to_string());
        } else if attendance < WATCH_ATTENDANCE {
            insights
                .recommendations
                .push(format!("Monitor attendance, currently {}%", shown));
        } else if attendance >= EXCELLENT_ATTENDANCE {
            insights
                .strengths
                .push(format!("Excellent attendance ({}%)", shown));
        }
    }

    if let Some(average) = average_score(&student.subjects) {
        let shown = format_number(average);
        if average < REPETITION_AVERAGE {
            insights
                .risk_factors
                .push(format!("Overall average critically low ({}%)", shown));
            insights
                .recommendations
                .push("Consider repetition of the current grade".to_string());
        } else if average < PASS_MARK {
            insights
                .risk_factors
                .push(format!("Overall average below the pass mark ({}%)", shown));
            insights
                .recommendations
                .push("Enroll in an intensive remedial programme".to_string());
        } else if average >= EXCELLENT_SCORE && failing.is_empty() {
            insights
                .recommendations
                .push("Offer enrichment or advanced placement work".to_string());
        }
    }

    insights
}

/// Style tokens for a grade color, gray for anything unknown
pub fn get_grade_color_classes(color: &str) -> &'static str {
    match color {
        "green" => "bg-green-100 text-green-800 border-green-200",
        "blue" => "bg-blue-100 text-blue-800 border-blue-200",
        "yellow" => "bg-yellow-100 text-yellow-800 border-yellow-200",
        "orange" => "bg-orange-100 text-orange-800 border-orange-200",
        "red" => "bg-red-100 text-red-800 border-red-200",
        "purple" => "bg-purple-100 text-purple-800 border-purple-200",
        _ => "bg-gray-100 text-gray-800 border-gray-200",
    }
}
