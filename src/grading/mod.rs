//! Grading subsystem
//!
//! Score classification against the junior and senior tables, risk tiers
//! and report-card insights.

pub mod calculator;
pub mod insights;
pub mod system;


pub use calculator::{
    average_score, calculate_grade, calculate_overall_grade, calculate_risk_level,
    requires_attention, GradeClassification, RawScore, RiskLevel, SubjectScore, PASS_MARK,
};
pub use insights::{get_grade_color_classes, get_performance_insights, PerformanceInsights, Student};
pub use system::{get_grading_system, school_phase, GradeBand, GradingSystem, SchoolPhase};
