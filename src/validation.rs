//! Input validation for timetabling problems.
//!
//! Checks structural integrity of the configuration and the workload
//! before generation. Detects:
//! - Empty or repeated weekdays
//! - Missing or badly numbered periods
//! - A blank elective marker
//! - Workload items with blank names or a non-positive lesson count
//!
//! Every problem is collected; validation never stops at the first one.

use crate::models::{TimetableConfig, WorkloadItem};
use std::collections::HashSet;
use std::fmt;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The configuration has no weekdays.
    EmptyWeekdays,
    /// A weekday appears more than once.
    DuplicateWeekday,
    /// The configuration has no periods.
    NoPeriods,
    /// Periods are not numbered `1..=N` in order.
    PeriodNumbering,
    /// The elective marker is blank.
    EmptyElectiveMarker,
    /// A workload item has a blank teacher, class or subject.
    MissingField,
    /// A workload item requires zero lessons.
    InvalidLessonCount,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates a timetable configuration.
///
/// Checks:
/// 1. At least one weekday
/// 2. No repeated weekday
/// 3. At least one period
/// 4. Periods numbered consecutively from 1
/// 5. Non-blank elective marker
pub fn validate_config(config: &TimetableConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.weekdays.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyWeekdays,
            "Configuration has no weekdays",
        ));
    }

    let mut seen = HashSet::new();
    for day in &config.weekdays {
        if !seen.insert(*day) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateWeekday,
                format!("Duplicate weekday: {day}"),
            ));
        }
    }

    if config.periods.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoPeriods,
            "Configuration has no periods",
        ));
    }

    for (i, period) in config.periods.iter().enumerate() {
        let expected = i as u32 + 1;
        if period.number != expected {
            errors.push(ValidationError::new(
                ValidationErrorKind::PeriodNumbering,
                format!(
                    "Period at position {expected} is numbered {} (expected {expected})",
                    period.number
                ),
            ));
        }
    }

    if config.elective_marker.trim().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyElectiveMarker,
            "Elective marker is blank",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates workload items.
///
/// Checks that teacher, class and subject are non-blank and that every
/// item requires at least one lesson. An empty workload is valid.
pub fn validate_workload(workload: &[WorkloadItem]) -> ValidationResult {
    let mut errors = Vec::new();

    for (i, item) in workload.iter().enumerate() {
        for (field, value) in [
            ("teacher", &item.teacher),
            ("class", &item.class),
            ("subject", &item.subject),
        ] {
            if value.trim().is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingField,
                    format!("Workload item {i} has a blank {field}"),
                ));
            }
        }

        if item.required_lessons == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidLessonCount,
                format!(
                    "Workload item {i} ({} / {} / {}) requires no lessons",
                    item.teacher, item.class, item.subject
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PeriodTime, Weekday};

    fn sample_workload() -> Vec<WorkloadItem> {
        vec![
            WorkloadItem::new("Ana", "1A", "Math", 4),
            WorkloadItem::new("Rui", "1A", "History", 2),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_config(&TimetableConfig::default()).is_ok());
        assert!(validate_workload(&sample_workload()).is_ok());
        assert!(validate_workload(&[]).is_ok());
    }

    #[test]
    fn test_empty_weekdays() {
        let config = TimetableConfig::new(vec![], 5);
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyWeekdays));
    }

    #[test]
    fn test_duplicate_weekday() {
        let config = TimetableConfig::new(vec![Weekday::Monday, Weekday::Monday], 5);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateWeekday);
    }

    #[test]
    fn test_period_numbering() {
        let config = TimetableConfig::default().with_periods(vec![
            PeriodTime::new(1, "07:00", "07:50"),
            PeriodTime::new(3, "07:50", "08:40"),
        ]);
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::PeriodNumbering));

        let none = TimetableConfig::default().with_periods(vec![]);
        let errors = validate_config(&none).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::NoPeriods));
    }

    #[test]
    fn test_blank_marker() {
        let config = TimetableConfig::default().with_elective_marker(" ");
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyElectiveMarker);
    }

    #[test]
    fn test_invalid_lesson_count() {
        let workload = vec![WorkloadItem::new("Ana", "1A", "Math", 0)];
        let errors = validate_workload(&workload).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidLessonCount);
        assert!(errors[0].to_string().contains("Ana / 1A / Math"));
    }

    #[test]
    fn test_multiple_errors() {
        let workload = vec![
            WorkloadItem::new("", "1A", "Math", 2),
            WorkloadItem::new("Ana", " ", "", 0),
        ];
        let errors = validate_workload(&workload).unwrap_err();
        // blank teacher, blank class, blank subject, zero lessons
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::MissingField)
                .count(),
            3
        );
    }
}
