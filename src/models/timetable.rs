//! Timetable (solution) model.
//!
//! A timetable holds one grid per class. Each grid has one [`Slot`] per
//! weekly coordinate, in day-major order, holding a lesson, a block, or
//! nothing.
//!
//! The generator hands out a `Timetable` as a finished snapshot. Later
//! edits (manual placement, applying a swap) need `&mut Timetable`, so a
//! single writer is enforced by the borrow checker.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{TimeSlot, TimetableConfig, Weekday};
use crate::availability::BlockingSource;

/// A lesson placed in a class grid.
///
/// Regular lessons have exactly one teacher. Co-taught electives carry
/// every contributing teacher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lesson {
    /// Class the lesson belongs to.
    pub class: String,
    /// Subject taught.
    pub subject: String,
    /// Teachers giving the lesson (more than one only for electives).
    pub teachers: Vec<String>,
}

impl Lesson {
    /// Creates a single-teacher lesson.
    pub fn new(
        class: impl Into<String>,
        subject: impl Into<String>,
        teacher: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            subject: subject.into(),
            teachers: vec![teacher.into()],
        }
    }

    /// Adds a co-teacher (no-op if already present).
    pub fn with_co_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.add_teacher(teacher);
        self
    }

    /// Adds a co-teacher in place. Returns `false` if already present.
    pub fn add_teacher(&mut self, teacher: impl Into<String>) -> bool {
        let teacher = teacher.into();
        if self.has_teacher(&teacher) {
            return false;
        }
        self.teachers.push(teacher);
        true
    }

    /// Whether `teacher` gives this lesson.
    #[inline]
    pub fn has_teacher(&self, teacher: &str) -> bool {
        self.teachers.iter().any(|t| t == teacher)
    }

    /// Display form of the teacher set ("A / B").
    pub fn teacher_label(&self) -> String {
        self.teachers.join(" / ")
    }
}

/// One (day, period) cell of a class grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub day: Weekday,
    pub period: u32,
    /// Placed lesson, if any.
    pub content: Option<Lesson>,
    /// Whether the cell is blocked for the class (global or class block).
    pub blocked: bool,
    /// Reason of the block, if one was given.
    pub block_reason: Option<String>,
}

impl Slot {
    /// Coordinate of this cell.
    #[inline]
    pub fn time_slot(&self) -> TimeSlot {
        TimeSlot::new(self.day, self.period)
    }

    /// Whether the cell is unblocked and empty.
    #[inline]
    pub fn is_open(&self) -> bool {
        !self.blocked && self.content.is_none()
    }
}

/// The weekly grid of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassGrid {
    /// Class name.
    pub class: String,
    /// Cells in day-major order.
    pub slots: Vec<Slot>,
}

impl ClassGrid {
    /// Looks up a cell by coordinate.
    pub fn get(&self, slot: TimeSlot) -> Option<&Slot> {
        self.slots.iter().find(|s| s.time_slot() == slot)
    }

    /// Lessons of `subject` given by `teacher` in this grid.
    pub fn count_lessons(&self, teacher: &str, subject: &str) -> usize {
        self.slots
            .iter()
            .filter_map(|s| s.content.as_ref())
            .filter(|l| l.subject == subject && l.has_teacher(teacher))
            .count()
    }
}

/// A complete timetable: one grid per class over a shared week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    /// Ordered school days.
    pub weekdays: Vec<Weekday>,
    /// Periods per day.
    pub period_count: u32,
    /// Class grids.
    pub grids: Vec<ClassGrid>,
}

/// A failed direct edit of a timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditError {
    /// Error category.
    pub kind: EditErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of edit errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditErrorKind {
    /// The class has no grid.
    UnknownClass,
    /// The coordinate is outside the configured week.
    SlotOutOfRange,
    /// The cell is blocked for the class.
    SlotBlocked,
    /// The grid changed since a suggestion was computed.
    StaleSuggestion,
    /// A manual placement was rejected by the validator.
    Rejected,
}

impl EditError {
    pub(crate) fn new(kind: EditErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EditError {}

/// A teacher's week re-indexed across all classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherSchedule {
    pub teacher: String,
    pub slots: Vec<TeacherSlot>,
}

/// One coordinate of a teacher's week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherSlot {
    pub day: Weekday,
    pub period: u32,
    /// Class taught at this coordinate.
    pub class: Option<String>,
    /// Lesson taught at this coordinate.
    pub content: Option<Lesson>,
    /// Whether the teacher is blocked here.
    pub blocked: bool,
    pub block_reason: Option<String>,
}

impl Timetable {
    /// Creates empty grids for `classes`, marking cells blocked for each
    /// class by `blocking`.
    pub fn new<I, S>(config: &TimetableConfig, classes: I, blocking: &dyn BlockingSource) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let grids = classes
            .into_iter()
            .map(|class| {
                let class = class.into();
                let slots = config
                    .slots()
                    .map(|ts| {
                        let status = blocking.class_status(&class, ts);
                        Slot {
                            day: ts.day,
                            period: ts.period,
                            content: None,
                            blocked: status.blocked,
                            block_reason: status.reason,
                        }
                    })
                    .collect();
                ClassGrid { class, slots }
            })
            .collect();

        Self {
            weekdays: config.weekdays.clone(),
            period_count: config.period_count(),
            grids,
        }
    }

    /// Number of cells per class grid.
    #[inline]
    pub fn slots_per_class(&self) -> usize {
        self.weekdays.len() * self.period_count as usize
    }

    /// Day-major index of a coordinate, or `None` if out of range.
    pub fn slot_index(&self, slot: TimeSlot) -> Option<usize> {
        if slot.period == 0 || slot.period > self.period_count {
            return None;
        }
        let day = self.weekdays.iter().position(|&d| d == slot.day)?;
        Some(day * self.period_count as usize + (slot.period - 1) as usize)
    }

    /// Coordinate of a day-major index.
    pub fn time_slot(&self, index: usize) -> TimeSlot {
        let periods = self.period_count as usize;
        TimeSlot::new(self.weekdays[index / periods], (index % periods) as u32 + 1)
    }

    /// All coordinates in day-major order.
    pub fn time_slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        (0..self.slots_per_class()).map(move |i| self.time_slot(i))
    }

    /// Class names in grid order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.grids.iter().map(|g| g.class.as_str())
    }

    /// Position of a class grid.
    pub fn grid_index(&self, class: &str) -> Option<usize> {
        self.grids.iter().position(|g| g.class == class)
    }

    /// Grid of a class.
    pub fn grid(&self, class: &str) -> Option<&ClassGrid> {
        self.grids.iter().find(|g| g.class == class)
    }

    /// Cell of a class at a coordinate.
    pub fn slot(&self, class: &str, slot: TimeSlot) -> Option<&Slot> {
        let index = self.slot_index(slot)?;
        self.grid(class).and_then(|g| g.slots.get(index))
    }

    /// Lesson of a class at a coordinate.
    pub fn lesson(&self, class: &str, slot: TimeSlot) -> Option<&Lesson> {
        self.slot(class, slot).and_then(|s| s.content.as_ref())
    }

    /// Lessons of (teacher, class, subject) currently placed.
    pub fn count_lessons(&self, teacher: &str, class: &str, subject: &str) -> usize {
        self.grid(class)
            .map(|g| g.count_lessons(teacher, subject))
            .unwrap_or(0)
    }

    /// Total number of placed lessons (cells with content).
    pub fn lesson_count(&self) -> usize {
        self.grids
            .iter()
            .flat_map(|g| g.slots.iter())
            .filter(|s| s.content.is_some())
            .count()
    }

    /// Class where `teacher` teaches at a coordinate, skipping `except`.
    pub fn teacher_class_at(&self, teacher: &str, slot: TimeSlot, except: Option<&str>) -> Option<&str> {
        let index = self.slot_index(slot)?;
        self.grids
            .iter()
            .filter(|g| Some(g.class.as_str()) != except)
            .find(|g| {
                g.slots
                    .get(index)
                    .and_then(|s| s.content.as_ref())
                    .is_some_and(|l| l.has_teacher(teacher))
            })
            .map(|g| g.class.as_str())
    }

    fn cell_mut(&mut self, class: &str, slot: TimeSlot) -> Result<&mut Slot, EditError> {
        let out_of_range = || {
            EditError::new(
                EditErrorKind::SlotOutOfRange,
                format!("Slot {slot} is outside the configured week"),
            )
        };
        let index = self.slot_index(slot).ok_or_else(out_of_range)?;
        let grid = self
            .grids
            .iter_mut()
            .find(|g| g.class == class)
            .ok_or_else(|| {
                EditError::new(EditErrorKind::UnknownClass, format!("Class not found: {class}"))
            })?;
        grid.slots.get_mut(index).ok_or_else(out_of_range)
    }

    /// Writes a lesson directly, returning the previous content.
    ///
    /// Only structural checks are made (class exists, coordinate in range,
    /// cell not blocked). Use
    /// [`PlacementValidator`](crate::analysis::PlacementValidator) to gate
    /// user edits.
    pub fn set_lesson(
        &mut self,
        class: &str,
        slot: TimeSlot,
        lesson: Lesson,
    ) -> Result<Option<Lesson>, EditError> {
        let cell = self.cell_mut(class, slot)?;
        if cell.blocked {
            return Err(EditError::new(
                EditErrorKind::SlotBlocked,
                format!("Slot {slot} is blocked for class {class}"),
            ));
        }
        Ok(cell.content.replace(lesson))
    }

    /// Empties a cell, returning the removed lesson.
    pub fn clear_lesson(&mut self, class: &str, slot: TimeSlot) -> Result<Option<Lesson>, EditError> {
        Ok(self.cell_mut(class, slot)?.content.take())
    }

    /// A teacher's week across all classes.
    pub fn teacher_schedule(&self, teacher: &str, blocking: &dyn BlockingSource) -> TeacherSchedule {
        let slots = self
            .time_slots()
            .map(|ts| {
                let status = blocking.teacher_status(teacher, ts);
                let index = self.slot_index(ts);
                let found = self.grids.iter().find_map(|g| {
                    g.slots
                        .get(index?)?
                        .content
                        .as_ref()
                        .filter(|l| l.has_teacher(teacher))
                        .map(|l| (g.class.clone(), l.clone()))
                });
                let (class, content) = match found {
                    Some((class, lesson)) => (Some(class), Some(lesson)),
                    None => (None, None),
                };
                TeacherSlot {
                    day: ts.day,
                    period: ts.period,
                    class,
                    content,
                    blocked: status.blocked,
                    block_reason: status.reason,
                }
            })
            .collect();

        TeacherSchedule {
            teacher: teacher.to_string(),
            slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityResolver;
    use crate::models::Block;

    fn sample() -> Timetable {
        let config = TimetableConfig::new(vec![Weekday::Monday, Weekday::Tuesday], 3);
        let resolver = AvailabilityResolver::new(vec![
            Block::class("1A", Weekday::Tuesday, [3]).with_reason("Lab cleaning"),
            Block::teacher("Ana", Weekday::Monday, [3]),
        ]);
        let mut tt = Timetable::new(&config, ["1A", "1B"], &resolver);
        tt.set_lesson("1A", TimeSlot::new(Weekday::Monday, 1), Lesson::new("1A", "Math", "Ana"))
            .unwrap();
        tt.set_lesson("1B", TimeSlot::new(Weekday::Monday, 2), Lesson::new("1B", "Math", "Ana"))
            .unwrap();
        tt
    }

    #[test]
    fn test_new_marks_class_blocks() {
        let tt = sample();
        let cell = tt.slot("1A", TimeSlot::new(Weekday::Tuesday, 3)).unwrap();
        assert!(cell.blocked);
        assert_eq!(cell.block_reason.as_deref(), Some("Lab cleaning"));
        assert!(!tt.slot("1B", TimeSlot::new(Weekday::Tuesday, 3)).unwrap().blocked);
        assert_eq!(tt.slots_per_class(), 6);
    }

    #[test]
    fn test_slot_index_roundtrip() {
        let tt = sample();
        for (i, ts) in tt.time_slots().enumerate() {
            assert_eq!(tt.slot_index(ts), Some(i));
        }
        assert_eq!(tt.slot_index(TimeSlot::new(Weekday::Monday, 0)), None);
        assert_eq!(tt.slot_index(TimeSlot::new(Weekday::Monday, 4)), None);
        assert_eq!(tt.slot_index(TimeSlot::new(Weekday::Friday, 1)), None);
    }

    #[test]
    fn test_set_lesson_rejects_blocked_and_unknown() {
        let mut tt = sample();
        let err = tt
            .set_lesson("1A", TimeSlot::new(Weekday::Tuesday, 3), Lesson::new("1A", "Art", "Rui"))
            .unwrap_err();
        assert_eq!(err.kind, EditErrorKind::SlotBlocked);

        let err = tt
            .set_lesson("9Z", TimeSlot::new(Weekday::Monday, 1), Lesson::new("9Z", "Art", "Rui"))
            .unwrap_err();
        assert_eq!(err.kind, EditErrorKind::UnknownClass);

        let err = tt.clear_lesson("1A", TimeSlot::new(Weekday::Monday, 9)).unwrap_err();
        assert_eq!(err.kind, EditErrorKind::SlotOutOfRange);
    }

    #[test]
    fn test_clear_lesson_returns_previous() {
        let mut tt = sample();
        let removed = tt.clear_lesson("1A", TimeSlot::new(Weekday::Monday, 1)).unwrap();
        assert_eq!(removed.unwrap().subject, "Math");
        assert_eq!(tt.lesson_count(), 1);
    }

    #[test]
    fn test_teacher_class_at() {
        let tt = sample();
        let ts = TimeSlot::new(Weekday::Monday, 2);
        assert_eq!(tt.teacher_class_at("Ana", ts, None), Some("1B"));
        assert_eq!(tt.teacher_class_at("Ana", ts, Some("1B")), None);
        assert_eq!(tt.count_lessons("Ana", "1A", "Math"), 1);
    }

    #[test]
    fn test_teacher_schedule_view() {
        let tt = sample();
        let resolver = AvailabilityResolver::new(vec![Block::teacher("Ana", Weekday::Monday, [3])]);
        let view = tt.teacher_schedule("Ana", &resolver);
        assert_eq!(view.slots.len(), 6);
        assert_eq!(view.slots[0].class.as_deref(), Some("1A"));
        assert_eq!(view.slots[1].class.as_deref(), Some("1B"));
        assert!(view.slots[2].blocked);
        assert!(view.slots[3].content.is_none());
    }

    #[test]
    fn test_short_grid_reads_as_empty() {
        let mut tt = sample();
        let json = serde_json::to_string(&tt).unwrap();
        tt = serde_json::from_str(&json).unwrap();
        tt.grids[1].slots.truncate(1);

        let ts = TimeSlot::new(Weekday::Monday, 2);
        assert_eq!(tt.teacher_class_at("Ana", ts, None), None);
        let view = tt.teacher_schedule("Ana", &AvailabilityResolver::default());
        assert_eq!(view.slots.len(), 6);
        assert!(view.slots[1].class.is_none());

        let err = tt
            .set_lesson("1B", ts, Lesson::new("1B", "Art", "Rui"))
            .unwrap_err();
        assert_eq!(err.kind, EditErrorKind::SlotOutOfRange);
        assert!(tt.set_lesson("1A", ts, Lesson::new("1A", "Art", "Rui")).is_ok());
    }

    #[test]
    fn test_lesson_co_teachers() {
        let lesson = Lesson::new("1A", "ELECTIVE Robotics", "Ana")
            .with_co_teacher("Rui")
            .with_co_teacher("Ana");
        assert_eq!(lesson.teachers.len(), 2);
        assert_eq!(lesson.teacher_label(), "Ana / Rui");
        assert!(lesson.has_teacher("Rui"));
    }
}
