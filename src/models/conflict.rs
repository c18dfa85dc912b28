//! Conflict and swap suggestion models.
//!
//! These are derived from a timetable on demand and never cached across
//! grid mutations.

use serde::{Deserialize, Serialize};

use super::{TimeSlot, Weekday};

/// Week-wide count of why coordinates were unusable for a workload item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CauseBreakdown {
    /// Open class cells where the teacher teaches another class.
    pub teacher_busy: usize,
    /// Open class cells where the teacher is blocked.
    pub teacher_blocked: usize,
    /// Cells blocked for the class.
    pub class_blocked: usize,
    /// Open class cells where the teacher is free and unblocked.
    pub free: usize,
}

/// A workload item whose required lessons are not all placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Index of the workload item in the input list.
    pub item_index: usize,
    pub teacher: String,
    pub class: String,
    pub subject: String,
    /// Lessons required per week.
    pub required: u32,
    /// Lessons currently placed.
    pub placed: u32,
    /// `required - placed`.
    pub shortfall: u32,
    /// Numeric cause counts.
    pub breakdown: CauseBreakdown,
    /// Human-readable causes.
    pub causes: Vec<String>,
    /// Human-readable remediation hints.
    pub suggestions: Vec<String>,
}

/// Result of analysing a timetable against its workload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictAnalysis {
    pub conflicts: Vec<Conflict>,
    /// Number of conflicts.
    pub total_conflicts: usize,
    /// Sum of shortfalls.
    pub total_unplaced_lessons: u32,
}

impl ConflictAnalysis {
    /// Builds an analysis from its conflicts, computing the totals.
    pub fn from_conflicts(conflicts: Vec<Conflict>) -> Self {
        Self {
            total_conflicts: conflicts.len(),
            total_unplaced_lessons: conflicts.iter().map(|c| c.shortfall).sum(),
            conflicts,
        }
    }

    /// Whether every workload item is fully placed.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// A lesson at a concrete position in a class grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPosition {
    pub class: String,
    pub day: Weekday,
    pub period: u32,
    pub teacher: String,
    pub subject: String,
}

impl LessonPosition {
    /// Coordinate of the lesson.
    #[inline]
    pub fn time_slot(&self) -> TimeSlot {
        TimeSlot::new(self.day, self.period)
    }
}

/// A proposed single relocation that frees a coordinate for a conflict.
///
/// Moving `origin` to `destination` (same class) frees `origin`'s
/// coordinate for the conflicted teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSuggestion {
    /// Stable identifier derived from the conflict and both coordinates.
    pub id: String,
    /// The conflict this suggestion helps resolve.
    pub conflict: Conflict,
    /// Lesson to move.
    pub origin: LessonPosition,
    /// Where to move it (in `origin.class`).
    pub destination: TimeSlot,
    /// Description of the benefit.
    pub benefit: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(shortfall: u32) -> Conflict {
        Conflict {
            item_index: 0,
            teacher: "Ana".into(),
            class: "1A".into(),
            subject: "Math".into(),
            required: 4,
            placed: 4 - shortfall,
            shortfall,
            breakdown: CauseBreakdown::default(),
            causes: vec![],
            suggestions: vec![],
        }
    }

    #[test]
    fn test_analysis_totals() {
        let a = ConflictAnalysis::from_conflicts(vec![conflict(1), conflict(3)]);
        assert_eq!(a.total_conflicts, 2);
        assert_eq!(a.total_unplaced_lessons, 4);
        assert!(!a.is_clean());
        assert!(ConflictAnalysis::default().is_clean());
    }

    #[test]
    fn test_lesson_position_slot() {
        let p = LessonPosition {
            class: "1B".into(),
            day: Weekday::Thursday,
            period: 5,
            teacher: "Rui".into(),
            subject: "Art".into(),
        };
        assert_eq!(p.time_slot(), TimeSlot::new(Weekday::Thursday, 5));
    }
}
