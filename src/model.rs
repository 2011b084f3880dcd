use chrono::NaiveDateTime;

use crate::grading::{self, Grade};

/// Courses offered in the form picker. The first entry is the form default.
pub const COURSE_NAMES: [&str; 7] = [
    "Analisa Berorientasi Objek",
    "Mobile Programming",
    "Machine Learning",
    "Pengantar Data Science",
    "Algoritma dan Struktur Data",
    "Basis Data",
    "Pemrograman Web",
];

pub fn default_course() -> &'static str {
    COURSE_NAMES[0]
}

pub fn is_known_course(name: &str) -> bool {
    COURSE_NAMES.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScores {
    pub component1: f64,
    pub component2: f64,
    pub final_exam: f64,
}

impl ComponentScores {
    pub fn final_score(&self) -> f64 {
        grading::compute_final_score(self.component1, self.component2, self.final_exam)
    }

    pub fn grade(&self) -> Grade {
        grading::compute_grade(self.final_score())
    }
}

/// Everything a caller supplies for a row. Final score and grade are derived
/// from `scores` at write time and never taken from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentInput {
    pub name: String,
    pub student_id: String,
    pub course_name: String,
    pub scores: ComponentScores,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub id: i64,
    pub name: String,
    pub student_id: String,
    pub course_name: String,
    pub scores: ComponentScores,
    pub score_final: f64,
    pub grade: Grade,
    pub created_at: NaiveDateTime,
}
