//! Grading tables
//!
//! Two fixed, ordered tables: junior secondary (letters ONE..F) and senior
//! secondary (points 1..9). Band order matters: lookups take the first band
//! that contains the score.

use serde::Serialize;
use tracing::debug;

/// One closed score interval and its classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeBand {
    pub min: u8,
    pub max: u8,
    pub grade: &'static str,
    pub status: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

impl GradeBand {
    /// `min <= score <= max`, where a fractional score belongs to the band of
    /// its integer part (74.5 sits in the band ending at 74).
    pub fn contains(&self, score: f64) -> bool {
        score >= f64::from(self.min) && score < f64::from(self.max) + 1.0
    }
}

/// Which table a grade level uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchoolPhase {
    Junior,
    Senior,
}

impl SchoolPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolPhase::Junior => "junior",
            SchoolPhase::Senior => "senior",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct GradingSystem {
    pub phase: SchoolPhase,
    pub bands: &'static [GradeBand],
    /// Returned for absent candidates
    pub absent: GradeBand,
}

impl GradingSystem {
    /// First band containing the score, or the last band if none does
    pub fn band_for(&self, score: f64) -> &GradeBand {
        self.bands
            .iter()
            .find(|band| band.contains(score))
            .unwrap_or(&self.bands[self.bands.len() - 1])
    }
}

const ABSENT: GradeBand = GradeBand {
    min: 0,
    max: 0,
    grade: "X",
    status: "ABSENT",
    color: "gray",
    description: "Absent from assessment",
};

const JUNIOR_BANDS: [GradeBand; 5] = [
    GradeBand {
        min: 75,
        max: 100,
        grade: "ONE",
        status: "DISTINCTION",
        color: "green",
        description: "Excellent performance",
    },
    GradeBand {
        min: 60,
        max: 74,
        grade: "TWO",
        status: "MERIT",
        color: "blue",
        description: "Very good performance",
    },
    GradeBand {
        min: 50,
        max: 59,
        grade: "THREE",
        status: "CREDIT",
        color: "yellow",
        description: "Good performance",
    },
    GradeBand {
        min: 40,
        max: 49,
        grade: "FOUR",
        status: "PASS",
        color: "orange",
        description: "Satisfactory performance",
    },
    GradeBand {
        min: 0,
        max: 39,
        grade: "F",
        status: "FAIL",
        color: "red",
        description: "Below the pass mark",
    },
];

const SENIOR_BANDS: [GradeBand; 9] = [
    GradeBand {
        min: 75,
        max: 100,
        grade: "1",
        status: "DISTINCTION",
        color: "green",
        description: "Distinction",
    },
    GradeBand {
        min: 70,
        max: 74,
        grade: "2",
        status: "DISTINCTION",
        color: "green",
        description: "Distinction",
    },
    GradeBand {
        min: 65,
        max: 69,
        grade: "3",
        status: "MERIT",
        color: "blue",
        description: "Merit",
    },
    GradeBand {
        min: 60,
        max: 64,
        grade: "4",
        status: "MERIT",
        color: "blue",
        description: "Merit",
    },
    GradeBand {
        min: 55,
        max: 59,
        grade: "5",
        status: "CREDIT",
        color: "yellow",
        description: "Credit",
    },
    GradeBand {
        min: 50,
        max: 54,
        grade: "6",
        status: "CREDIT",
        color: "yellow",
        description: "Credit",
    },
    GradeBand {
        min: 45,
        max: 49,
        grade: "7",
        status: "SATISFACTORY",
        color: "orange",
        description: "Satisfactory",
    },
    GradeBand {
        min: 40,
        max: 44,
        grade: "8",
        status: "SATISFACTORY",
        color: "orange",
        description: "Satisfactory",
    },
    GradeBand {
        min: 0,
        max: 39,
        grade: "9",
        status: "UNSATISFACTORY",
        color: "red",
        description: "Fail",
    },
];

pub static JUNIOR_GRADING_SYSTEM: GradingSystem = GradingSystem {
    phase: SchoolPhase::Junior,
    bands: &JUNIOR_BANDS,
    absent: ABSENT,
};

pub static SENIOR_GRADING_SYSTEM: GradingSystem = GradingSystem {
    phase: SchoolPhase::Senior,
    bands: &SENIOR_BANDS,
    absent: ABSENT,
};

const JUNIOR_LEVELS: [&str; 3] = ["form1", "form2", "grade9"];
const SENIOR_LEVELS: [&str; 5] = ["form3", "form4", "grade10", "grade11", "grade12"];

fn normalize_level(grade_level: &str) -> String {
    grade_level
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Which phase a grade level belongs to; unknown levels count as junior
pub fn school_phase(grade_level: &str) -> SchoolPhase {
    if SENIOR_LEVELS.contains(&normalize_level(grade_level).as_str()) {
        return SchoolPhase::Senior;
    }
    if !is_known_level(grade_level) {
        debug!("Unknown grade level '{}', using junior grading", grade_level);
    }
    SchoolPhase::Junior
}

/// The grading table for a grade level (case-insensitive, defaults to junior)
pub fn get_grading_system(grade_level: &str) -> &'static GradingSystem {
    match school_phase(grade_level) {
        SchoolPhase::Junior => &JUNIOR_GRADING_SYSTEM,
        SchoolPhase::Senior => &SENIOR_GRADING_SYSTEM,
    }
}

/// True when the level is one of the known junior or senior levels
pub fn is_known_level(grade_level: &str) -> bool {
    let level = normalize_level(grade_level);
    JUNIOR_LEVELS.contains(&level.as_str()) || SENIOR_LEVELS.contains(&level.as_str())
}
