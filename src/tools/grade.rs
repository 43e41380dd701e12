//! Grade, risk and report commands

use serde::Serialize;

use super::util::{read_input, to_json};
use crate::cli::{GradeArgs, ReportArgs, RiskArgs};
use crate::config::EngineConfig;
use crate::error::AppError;
use crate::grading::{
    average_score, calculate_grade, calculate_overall_grade, calculate_risk_level,
    get_grade_color_classes, get_performance_insights, requires_attention, school_phase,
    GradeClassification, PerformanceInsights, RawScore, RiskLevel, SchoolPhase, Student,
};
use crate::record::format_number;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    #[serde(flatten)]
    pub classification: GradeClassification,
    pub level: String,
    pub phase: SchoolPhase,
    pub classes: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    pub score: f64,
    pub attendance: Option<f64>,
    pub risk_level: RiskLevel,
    pub requires_attention: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectGrade {
    pub name: String,
    pub grade: GradeClassification,
    pub requires_attention: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub name: String,
    pub level: String,
    pub average: Option<f64>,
    pub overall: GradeClassification,
    pub risk_level: Option<RiskLevel>,
    pub subjects: Vec<SubjectGrade>,
    pub insights: PerformanceInsights,
}

fn level_or_default(level: Option<String>, config: &EngineConfig) -> String {
    level.unwrap_or_else(|| config.grade_level.clone())
}

fn score_text(score: Option<f64>) -> String {
    score.map(format_number).unwrap_or_else(|| "-".to_string())
}

pub fn grade_report(score: RawScore, level: &str) -> GradeReport {
    let classification = calculate_grade(score, level);
    let classes = get_grade_color_classes(classification.color);
    GradeReport {
        classification,
        level: level.to_string(),
        phase: school_phase(level),
        classes,
    }
}

/// Shared implementation for grade
pub fn execute_grade(args: GradeArgs, config: &EngineConfig) -> Result<String, AppError> {
    let level = level_or_default(args.level, config);
    let report = grade_report(RawScore::from(args.score), &level);

    if args.json {
        return to_json(&report);
    }

    let c = &report.classification;
    Ok(format!(
        "# Grade {} · {}\n\n{}\n\n- Score: {}\n- Level: {} ({})\n- Color: {} (`{}`)\n",
        c.grade,
        c.status,
        c.description,
        score_text(c.score),
        report.level,
        report.phase.as_str(),
        c.color,
        report.classes
    ))
}

/// Shared implementation for risk
pub fn execute_risk(args: RiskArgs) -> Result<String, AppError> {
    let report = RiskReport {
        score: args.score,
        attendance: args.attendance,
        risk_level: calculate_risk_level(args.score, args.attendance),
        requires_attention: requires_attention(args.score),
    };

    if args.json {
        return to_json(&report);
    }

    Ok(format!(
        "# Risk · {}\n\n- Score: {}\n- Attendance: {}\n- Requires attention: {}\n",
        report.risk_level,
        format_number(report.score),
        report
            .attendance
            .map(|a| format!("{}%", format_number(a)))
            .unwrap_or_else(|| "not recorded".to_string()),
        if report.requires_attention { "yes" } else { "no" }
    ))
}

pub fn student_report(student: &Student, level: &str) -> StudentReport {
    let average = average_score(&student.subjects);

    let subjects = student
        .subjects
        .iter()
        .map(|s| SubjectGrade {
            name: s.name.clone(),
            grade: calculate_grade(s.score.clone(), level),
            requires_attention: requires_attention(s.score.clone()),
        })
        .collect();

    StudentReport {
        name: student.name.clone(),
        level: level.to_string(),
        average,
        overall: calculate_overall_grade(&student.subjects, level),
        risk_level: average.map(|avg| calculate_risk_level(avg, student.attendance)),
        subjects,
        insights: get_performance_insights(student),
    }
}

fn push_section(md: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    md.push_str(&format!("## {}\n\n", title));
    for line in lines {
        md.push_str(&format!("- {}\n", line));
    }
    md.push('\n');
}

pub fn format_student_report(report: &StudentReport) -> String {
    let name = if report.name.is_empty() {
        "Student"
    } else {
        report.name.as_str()
    };

    let mut md = format!("# {} · {}\n\n", name, report.level);
    md.push_str(&format!(
        "Overall: **{}** {} (average {})\n",
        report.overall.grade,
        report.overall.status,
        score_text(report.average)
    ));
    if let Some(risk) = report.risk_level {
        md.push_str(&format!("Risk: {}\n", risk));
    }
    md.push('\n');

    if !report.subjects.is_empty() {
        md.push_str("| Subject | Score | Grade | Status |\n|---|---|---|---|\n");
        for subject in &report.subjects {
            md.push_str(&format!(
                "| {}{} | {} | {} | {} |\n",
                subject.name,
                if subject.requires_attention { " ⚠" } else { "" },
                score_text(subject.grade.score),
                subject.grade.grade,
                subject.grade.status
            ));
        }
        md.push('\n');
    }

    let insights = &report.insights;
    push_section(&mut md, "Strengths", &insights.strengths);
    push_section(&mut md, "Weaknesses", &insights.weaknesses);
    push_section(&mut md, "Risk factors", &insights.risk_factors);
    push_section(&mut md, "Recommendations", &insights.recommendations);

    md
}

/// Shared implementation for report
pub fn execute_report(args: ReportArgs, config: &EngineConfig) -> Result<String, AppError> {
    let student: Student = serde_json::from_str(&read_input(&args.input)?)?;
    let level = level_or_default(args.level, config);
    let report = student_report(&student, &level);

    if args.json {
        return to_json(&report);
    }
    Ok(format_student_report(&report))
}
