//! Workload model.
//!
//! A workload item states how many lessons per week a teacher gives a
//! subject to a class. The (teacher, class, subject) triple is the natural
//! key used to count placed lessons.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Weekly lesson requirement for a (teacher, class, subject) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkloadItem {
    /// Teacher name.
    pub teacher: String,
    /// Class (group of students) name.
    pub class: String,
    /// Subject name.
    pub subject: String,
    /// Lessons required per week (positive).
    pub required_lessons: u32,
}

impl WorkloadItem {
    /// Creates a workload item.
    pub fn new(
        teacher: impl Into<String>,
        class: impl Into<String>,
        subject: impl Into<String>,
        required_lessons: u32,
    ) -> Self {
        Self {
            teacher: teacher.into(),
            class: class.into(),
            subject: subject.into(),
            required_lessons,
        }
    }

    /// Whether this item has the given natural key.
    #[inline]
    pub fn matches(&self, teacher: &str, class: &str, subject: &str) -> bool {
        self.teacher == teacher && self.class == class && self.subject == subject
    }
}

/// Sorted, de-duplicated class names appearing in a workload.
pub fn classes(workload: &[WorkloadItem]) -> Vec<String> {
    workload
        .iter()
        .map(|w| w.class.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted, de-duplicated teacher names appearing in a workload.
pub fn teachers(workload: &[WorkloadItem]) -> Vec<String> {
    workload
        .iter()
        .map(|w| w.teacher.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Total required lessons for a natural key (summed over duplicates).
///
/// Returns `None` when no item has that key.
pub fn required_for(
    workload: &[WorkloadItem],
    teacher: &str,
    class: &str,
    subject: &str,
) -> Option<u32> {
    workload
        .iter()
        .filter(|w| w.matches(teacher, class, subject))
        .map(|w| w.required_lessons)
        .reduce(|a, b| a + b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<WorkloadItem> {
        vec![
            WorkloadItem::new("Rui", "2B", "Physics", 3),
            WorkloadItem::new("Ana", "1A", "Math", 4),
            WorkloadItem::new("Ana", "2B", "Math", 4),
            WorkloadItem::new("Ana", "1A", "Math", 1),
        ]
    }

    #[test]
    fn test_classes_sorted_unique() {
        assert_eq!(classes(&sample()), vec!["1A".to_string(), "2B".to_string()]);
    }

    #[test]
    fn test_teachers_sorted_unique() {
        assert_eq!(teachers(&sample()), vec!["Ana".to_string(), "Rui".to_string()]);
    }

    #[test]
    fn test_required_for_sums_duplicates() {
        let w = sample();
        assert_eq!(required_for(&w, "Ana", "1A", "Math"), Some(5));
        assert_eq!(required_for(&w, "Rui", "2B", "Physics"), Some(3));
        assert_eq!(required_for(&w, "Rui", "1A", "Physics"), None);
    }

    #[test]
    fn test_workload_serde_roundtrip() {
        let item = WorkloadItem::new("Ana", "1A", "Math", 4);
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"required_lessons\":4"));
        let back: WorkloadItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
