use std::fmt;
use std::str::FromStr;

const WEIGHT_COMPONENT: f64 = 0.3;
const WEIGHT_FINAL_EXAM: f64 = 0.4;

/// Weighted final score: 30% per in-term component, 40% final exam.
/// Range checking happens in `validation` before this is called.
pub fn compute_final_score(component1: f64, component2: f64, final_exam: f64) -> f64 {
    (component1 * WEIGHT_COMPONENT)
        + (component2 * WEIGHT_COMPONENT)
        + (final_exam * WEIGHT_FINAL_EXAM)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    A,
    BPlus,
    B,
    CPlus,
    C,
    D,
}

/// Highest threshold first; a score exactly on a boundary takes the higher bucket.
const THRESHOLDS: [(f64, Grade); 5] = [
    (80.0, Grade::A),
    (75.0, Grade::BPlus),
    (69.0, Grade::B),
    (65.0, Grade::CPlus),
    (56.0, Grade::C),
];

pub fn compute_grade(final_score: f64) -> Grade {
    THRESHOLDS
        .iter()
        .find(|(min, _)| final_score >= *min)
        .map(|(_, g)| *g)
        .unwrap_or(Grade::D)
}

impl Grade {
    pub fn label(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
        }
    }

    /// Badge color the list view paints behind the letter.
    pub fn color(self) -> &'static str {
        match self {
            Grade::A => "#4CAF50",
            Grade::BPlus => "#8BC34A",
            Grade::B => "#CDDC39",
            Grade::CPlus => "#FF9800",
            Grade::C => "#FF5722",
            Grade::D => "#F44336",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown grade label: {0}")]
pub struct UnknownGrade(pub String);

impl FromStr for Grade {
    type Err = UnknownGrade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Grade::A),
            "B+" => Ok(Grade::BPlus),
            "B" => Ok(Grade::B),
            "C+" => Ok(Grade::CPlus),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            other => Err(UnknownGrade(other.to_string())),
        }
    }
}

pub fn format_final_score(final_score: f64) -> String {
    format!("{final_score:.2}")
}
