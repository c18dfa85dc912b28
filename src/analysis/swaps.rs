//! Swap suggestions.
//!
//! # Algorithm
//!
//! For a conflict of teacher `T` in class `C`, every coordinate open in `C`
//! where `T` is unblocked but teaching another class `D` is a candidate
//! origin. The lesson in `D` is moved to any other coordinate of `D` that is
//! open, where `T` is free and unblocked, and where no run of three same
//! subject periods forms. Moving it frees the origin coordinate for the
//! conflict.
//!
//! Suggestions are proposals only; [`SwapAdvisor::apply_swap`] performs one
//! of them as a single relocation without re-running repair.

use super::creates_run;
use crate::availability::BlockingSource;
use crate::models::{
    is_elective_subject, Conflict, ConflictAnalysis, EditError, EditErrorKind, LessonPosition,
    SwapSuggestion, TimeSlot, Timetable, TimetableConfig,
};

/// Proposes and applies single-move resolutions for conflicts.
pub struct SwapAdvisor<'a> {
    blocking: &'a dyn BlockingSource,
    elective_marker: String,
}

impl<'a> SwapAdvisor<'a> {
    /// Maximum suggestions per conflict.
    pub const MAX_PER_CONFLICT: usize = 3;

    pub fn new(blocking: &'a dyn BlockingSource) -> Self {
        Self {
            blocking,
            elective_marker: TimetableConfig::default().elective_marker,
        }
    }

    /// Sets the elective marker. Elective lessons are never moved.
    pub fn with_elective_marker(mut self, marker: impl Into<String>) -> Self {
        self.elective_marker = marker.into();
        self
    }

    /// Suggestions for every conflict of an analysis, in conflict order.
    pub fn suggest(&self, timetable: &Timetable, analysis: &ConflictAnalysis) -> Vec<SwapSuggestion> {
        analysis
            .conflicts
            .iter()
            .flat_map(|c| self.suggest_for(timetable, c))
            .collect()
    }

    /// Up to [`Self::MAX_PER_CONFLICT`] suggestions for one conflict.
    pub fn suggest_for(&self, timetable: &Timetable, conflict: &Conflict) -> Vec<SwapSuggestion> {
        let mut found = Vec::new();
        let Some(grid) = timetable.grid(&conflict.class) else {
            return found;
        };

        for cell in grid.slots.iter().filter(|s| s.is_open()) {
            let origin_slot = cell.time_slot();
            if self.blocking.is_teacher_blocked(&conflict.teacher, origin_slot) {
                continue;
            }
            let Some(other_class) =
                timetable.teacher_class_at(&conflict.teacher, origin_slot, Some(&conflict.class))
            else {
                continue;
            };
            let Some(lesson) = timetable.lesson(other_class, origin_slot) else {
                continue;
            };
            if is_elective_subject(&lesson.subject, &self.elective_marker) {
                continue;
            }

            for destination in timetable.time_slots() {
                if destination == origin_slot
                    || !self.can_receive(
                        timetable,
                        other_class,
                        &lesson.subject,
                        &conflict.teacher,
                        origin_slot,
                        destination,
                    )
                {
                    continue;
                }
                found.push(SwapSuggestion {
                    id: suggestion_id(conflict, origin_slot, destination),
                    conflict: conflict.clone(),
                    origin: LessonPosition {
                        class: other_class.to_string(),
                        day: origin_slot.day,
                        period: origin_slot.period,
                        teacher: conflict.teacher.clone(),
                        subject: lesson.subject.clone(),
                    },
                    destination,
                    benefit: format!(
                        "Frees {origin_slot} for {} in class {}",
                        conflict.subject, conflict.class
                    ),
                });
                if found.len() >= Self::MAX_PER_CONFLICT {
                    return found;
                }
            }
        }
        found
    }

    /// Moves the suggested lesson from its origin to its destination.
    ///
    /// Fails with [`EditErrorKind::StaleSuggestion`] when the grid no longer
    /// matches the suggestion (origin lesson gone, destination taken, or the
    /// teacher now busy or blocked there). Repair is not re-run.
    pub fn apply_swap(&self, timetable: &mut Timetable, suggestion: &SwapSuggestion) -> Result<(), EditError> {
        let origin = &suggestion.origin;
        let origin_slot = origin.time_slot();
        if timetable.grid(&origin.class).is_none() {
            return Err(EditError::new(
                EditErrorKind::UnknownClass,
                format!("Class not found: {}", origin.class),
            ));
        }

        let lesson = timetable
            .lesson(&origin.class, origin_slot)
            .filter(|l| l.subject == origin.subject && l.has_teacher(&origin.teacher))
            .cloned()
            .ok_or_else(|| {
                EditError::new(
                    EditErrorKind::StaleSuggestion,
                    format!(
                        "{} of {} is no longer at {origin_slot} in class {}",
                        origin.subject, origin.teacher, origin.class
                    ),
                )
            })?;

        if !self.can_receive(
            timetable,
            &origin.class,
            &origin.subject,
            &origin.teacher,
            origin_slot,
            suggestion.destination,
        ) {
            return Err(EditError::new(
                EditErrorKind::StaleSuggestion,
                format!(
                    "{} is no longer available in class {}",
                    suggestion.destination, origin.class
                ),
            ));
        }

        timetable.clear_lesson(&origin.class, origin_slot)?;
        timetable.set_lesson(&origin.class, suggestion.destination, lesson)?;
        Ok(())
    }

    fn can_receive(
        &self,
        timetable: &Timetable,
        class: &str,
        subject: &str,
        teacher: &str,
        vacated: TimeSlot,
        destination: TimeSlot,
    ) -> bool {
        timetable.slot(class, destination).is_some_and(|s| s.is_open())
            && timetable.teacher_class_at(teacher, destination, None).is_none()
            && !self.blocking.is_teacher_blocked(teacher, destination)
            && !creates_run(timetable, class, destination, subject, Some(vacated))
    }
}

fn suggestion_id(conflict: &Conflict, origin: TimeSlot, destination: TimeSlot) -> String {
    format!(
        "{}-{}{}-{}{}",
        conflict.item_index, origin.day, origin.period, destination.day, destination.period
    )
}
