use crate::model::{self, ComponentScores};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    StudentId,
    CourseName,
    ScoreComponent1,
    ScoreComponent2,
    ScoreFinalExam,
}

impl Field {
    /// Param key used on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::StudentId => "studentId",
            Field::CourseName => "courseName",
            Field::ScoreComponent1 => "scoreComponent1",
            Field::ScoreComponent2 => "scoreComponent2",
            Field::ScoreFinalExam => "scoreFinalExam",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{} must not be empty", .field.key())]
    MissingField { field: Field },
    #[error("{} is not a number", .field.key())]
    NotANumber { field: Field },
    #[error("{} must be between 0 and 100 (got {value})", .field.key())]
    OutOfRange { field: Field, value: f64 },
    #[error("unknown course: {0}")]
    UnknownCourse(String),
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::NotANumber { field }
            | ValidationError::OutOfRange { field, .. } => *field,
            ValidationError::UnknownCourse(_) => Field::CourseName,
        }
    }
}

const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

/// Checks completeness, then parseability, then range, and returns the three
/// parsed component scores. Each step reports the first failing field.
pub fn validate(
    name: &str,
    student_id: &str,
    component1: &str,
    component2: &str,
    final_exam: &str,
) -> Result<ComponentScores, ValidationError> {
    for (field, text) in [(Field::Name, name), (Field::StudentId, student_id)] {
        if text.trim().is_empty() {
            return Err(ValidationError::MissingField { field });
        }
    }
    validate_scores(component1, component2, final_exam)
}

/// The score half of `validate`, used on its own for grade previews.
pub fn validate_scores(
    component1: &str,
    component2: &str,
    final_exam: &str,
) -> Result<ComponentScores, ValidationError> {
    let texts = [
        (Field::ScoreComponent1, component1),
        (Field::ScoreComponent2, component2),
        (Field::ScoreFinalExam, final_exam),
    ];
    if let Some((field, _)) = texts.iter().find(|(_, t)| t.trim().is_empty()) {
        return Err(ValidationError::MissingField { field: *field });
    }

    let mut values = [0.0_f64; 3];
    for (slot, (field, text)) in values.iter_mut().zip(texts) {
        *slot = parse_score(field, text)?;
    }

    for (field, value) in texts.iter().map(|(f, _)| *f).zip(values) {
        if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
            return Err(ValidationError::OutOfRange { field, value });
        }
    }

    let [c1, c2, exam] = values;
    Ok(ComponentScores {
        component1: c1,
        component2: c2,
        final_exam: exam,
    })
}

fn parse_score(field: Field, text: &str) -> Result<f64, ValidationError> {
    match text.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(ValidationError::NotANumber { field }),
    }
}

pub fn validate_course(course_name: &str) -> Result<(), ValidationError> {
    if course_name.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: Field::CourseName,
        });
    }
    if !model::is_known_course(course_name) {
        return Err(ValidationError::UnknownCourse(course_name.to_string()));
    }
    Ok(())
}
