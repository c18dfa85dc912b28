//! Conflict analysis.
//!
//! For every non-elective workload key, compares the lessons present in the
//! timetable with the weekly requirement and explains any shortfall by
//! counting the class's open cells by cause.

use std::collections::HashSet;

use crate::availability::BlockingSource;
use crate::models::{
    is_elective_subject, required_for, CauseBreakdown, Conflict, ConflictAnalysis, Timetable,
    TimetableConfig, WorkloadItem,
};

/// Explains unplaced lessons of a timetable.
///
/// # Example
///
/// ```
/// use u_timetable::analysis::ConflictAnalyzer;
/// use u_timetable::availability::AvailabilityResolver;
/// use u_timetable::models::{Timetable, TimetableConfig, Weekday, WorkloadItem};
///
/// let config = TimetableConfig::new(vec![Weekday::Monday], 3);
/// let resolver = AvailabilityResolver::default();
/// let timetable = Timetable::new(&config, ["1A"], &resolver);
/// let workload = vec![WorkloadItem::new("Ana", "1A", "Math", 2)];
///
/// let analysis = ConflictAnalyzer::new(&workload, &resolver).analyze(&timetable);
/// assert_eq!(analysis.total_conflicts, 1);
/// assert_eq!(analysis.conflicts[0].breakdown.free, 3);
/// ```
pub struct ConflictAnalyzer<'a> {
    workload: &'a [WorkloadItem],
    blocking: &'a dyn BlockingSource,
    elective_marker: String,
}

impl<'a> ConflictAnalyzer<'a> {
    /// Creates an analyzer using the default elective marker.
    pub fn new(workload: &'a [WorkloadItem], blocking: &'a dyn BlockingSource) -> Self {
        Self {
            workload,
            blocking,
            elective_marker: TimetableConfig::default().elective_marker,
        }
    }

    /// Sets the elective marker.
    pub fn with_elective_marker(mut self, marker: impl Into<String>) -> Self {
        self.elective_marker = marker.into();
        self
    }

    /// Analyzes a timetable.
    ///
    /// Items sharing a (teacher, class, subject) key are reported once, on
    /// the first occurrence, against their summed requirement. Electives and
    /// classes without a grid are skipped.
    pub fn analyze(&self, timetable: &Timetable) -> ConflictAnalysis {
        let mut seen = HashSet::new();
        let conflicts = self
            .workload
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                seen.insert((
                    item.teacher.as_str(),
                    item.class.as_str(),
                    item.subject.as_str(),
                ))
            })
            .filter_map(|(index, item)| self.conflict_for(timetable, index, item))
            .collect();
        ConflictAnalysis::from_conflicts(conflicts)
    }

    fn conflict_for(
        &self,
        timetable: &Timetable,
        index: usize,
        item: &WorkloadItem,
    ) -> Option<Conflict> {
        if is_elective_subject(&item.subject, &self.elective_marker) {
            return None;
        }
        let grid = timetable.grid(&item.class)?;

        let required = required_for(self.workload, &item.teacher, &item.class, &item.subject)
            .unwrap_or(item.required_lessons);
        let placed = grid.count_lessons(&item.teacher, &item.subject) as u32;
        if placed >= required {
            return None;
        }

        let mut breakdown = CauseBreakdown::default();
        for cell in &grid.slots {
            if cell.blocked {
                breakdown.class_blocked += 1;
                continue;
            }
            if cell.content.is_some() {
                continue;
            }
            let ts = cell.time_slot();
            if self.blocking.is_teacher_blocked(&item.teacher, ts) {
                breakdown.teacher_blocked += 1;
            } else if timetable
                .teacher_class_at(&item.teacher, ts, Some(&item.class))
                .is_some()
            {
                breakdown.teacher_busy += 1;
            } else {
                breakdown.free += 1;
            }
        }

        let (causes, suggestions) = explain(&breakdown);
        Some(Conflict {
            item_index: index,
            teacher: item.teacher.clone(),
            class: item.class.clone(),
            subject: item.subject.clone(),
            required,
            placed,
            shortfall: required - placed,
            breakdown,
            causes,
            suggestions,
        })
    }
}

fn explain(breakdown: &CauseBreakdown) -> (Vec<String>, Vec<String>) {
    let mut causes = Vec::new();
    let mut suggestions = Vec::new();

    if breakdown.teacher_busy > 0 {
        causes.push(format!(
            "Teacher busy in other class(es) at {} slot(s)",
            breakdown.teacher_busy
        ));
        suggestions.push("Check whether a lesson can be swapped with another teacher".to_string());
    }
    if breakdown.teacher_blocked > 0 {
        causes.push(format!(
            "{} slot(s) blocked for this teacher",
            breakdown.teacher_blocked
        ));
        suggestions.push("Review the teacher's blocks".to_string());
    }
    if breakdown.class_blocked > 0 {
        causes.push(format!(
            "{} slot(s) blocked for this class",
            breakdown.class_blocked
        ));
        suggestions.push("Review the class blocks".to_string());
    }
    if breakdown.free == 0 && causes.is_empty() {
        causes.push("No open slot left in the class grid".to_string());
        suggestions.push("The class may have more lessons than available periods".to_string());
    }
    if breakdown.free > 0 {
        suggestions.push(format!(
            "{} open slot(s) could take the missing lessons manually",
            breakdown.free
        ));
    }
    (causes, suggestions)
}
