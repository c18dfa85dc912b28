//! Manual placement validation.
//!
//! Gates user edits made outside the generator. Checks run in a fixed order
//! and the first failing one is reported.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::availability::BlockingSource;
use crate::models::{
    required_for, EditError, EditErrorKind, Lesson, TimeSlot, Timetable, WorkloadItem,
};

/// Why a manual placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    UnknownClass,
    UnknownSlot,
    ClassBlocked,
    Occupied,
    TeacherBlocked,
    TeacherBusy,
    QuotaReached,
}

/// A refused manual placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub reason: String,
}

impl Rejection {
    fn new(kind: RejectionKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for Rejection {}

impl From<Rejection> for EditError {
    fn from(rejection: Rejection) -> Self {
        EditError::new(EditErrorKind::Rejected, rejection.reason)
    }
}

/// A coordinate where a teacher could take a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub slot: TimeSlot,
    /// Classes whose cell at `slot` is open.
    pub classes: Vec<String>,
}

/// Validates direct edits against blocks, occupancy and weekly quotas.
///
/// # Example
///
/// ```
/// use u_timetable::analysis::{PlacementValidator, RejectionKind};
/// use u_timetable::availability::AvailabilityResolver;
/// use u_timetable::models::{Block, TimeSlot, Timetable, TimetableConfig, Weekday, WorkloadItem};
///
/// let config = TimetableConfig::new(vec![Weekday::Monday], 3);
/// let resolver = AvailabilityResolver::new(vec![Block::teacher("Ana", Weekday::Monday, [2])]);
/// let mut timetable = Timetable::new(&config, ["1A"], &resolver);
/// let workload = vec![WorkloadItem::new("Ana", "1A", "Math", 1)];
/// let validator = PlacementValidator::new(&workload, &resolver);
///
/// let p2 = TimeSlot::new(Weekday::Monday, 2);
/// let err = validator.can_place(&timetable, "1A", p2, "Ana", "Math").unwrap_err();
/// assert_eq!(err.kind, RejectionKind::TeacherBlocked);
///
/// let p1 = TimeSlot::new(Weekday::Monday, 1);
/// validator.place(&mut timetable, "1A", p1, "Ana", "Math").unwrap();
/// let p3 = TimeSlot::new(Weekday::Monday, 3);
/// let err = validator.can_place(&timetable, "1A", p3, "Ana", "Math").unwrap_err();
/// assert_eq!(err.reason, "weekly limit reached: 1/1 lessons placed");
/// ```
pub struct PlacementValidator<'a> {
    workload: &'a [WorkloadItem],
    blocking: &'a dyn BlockingSource,
}

impl<'a> PlacementValidator<'a> {
    pub fn new(workload: &'a [WorkloadItem], blocking: &'a dyn BlockingSource) -> Self {
        Self { workload, blocking }
    }

    /// Checks whether `teacher` may teach `subject` to `class` at `slot`.
    ///
    /// Order: class exists, coordinate exists, cell not blocked, cell empty,
    /// teacher not blocked, teacher not teaching another class, weekly quota
    /// not reached. Combinations without a workload item have no quota.
    pub fn can_place(
        &self,
        timetable: &Timetable,
        class: &str,
        slot: TimeSlot,
        teacher: &str,
        subject: &str,
    ) -> Result<(), Rejection> {
        let grid = timetable
            .grid(class)
            .ok_or_else(|| Rejection::new(RejectionKind::UnknownClass, format!("class not found: {class}")))?;
        let cell = timetable
            .slot_index(slot)
            .and_then(|i| grid.slots.get(i))
            .ok_or_else(|| Rejection::new(RejectionKind::UnknownSlot, format!("slot not found: {slot}")))?;

        if cell.blocked {
            return Err(Rejection::new(
                RejectionKind::ClassBlocked,
                "slot blocked for the class",
            ));
        }
        if cell.content.is_some() {
            return Err(Rejection::new(RejectionKind::Occupied, "slot already occupied"));
        }

        let status = self.blocking.teacher_status(teacher, slot);
        if status.blocked {
            return Err(Rejection::new(
                RejectionKind::TeacherBlocked,
                format!(
                    "teacher blocked: {}",
                    status.reason.as_deref().unwrap_or("no reason")
                ),
            ));
        }
        if let Some(other) = timetable.teacher_class_at(teacher, slot, Some(class)) {
            return Err(Rejection::new(
                RejectionKind::TeacherBusy,
                format!("teacher already teaches class {other} at this time"),
            ));
        }

        if let Some(required) = required_for(self.workload, teacher, class, subject) {
            let placed = grid.count_lessons(teacher, subject) as u32;
            if placed >= required {
                return Err(Rejection::new(
                    RejectionKind::QuotaReached,
                    format!("weekly limit reached: {placed}/{required} lessons placed"),
                ));
            }
        }
        Ok(())
    }

    /// Writes the lesson if [`can_place`](Self::can_place) accepts it.
    pub fn place(
        &self,
        timetable: &mut Timetable,
        class: &str,
        slot: TimeSlot,
        teacher: &str,
        subject: &str,
    ) -> Result<(), EditError> {
        self.can_place(timetable, class, slot, teacher, subject)?;
        timetable.set_lesson(class, slot, Lesson::new(class, subject, teacher))?;
        Ok(())
    }

    /// Coordinates where `teacher` is free and unblocked, with the classes
    /// open there. Coordinates with no open class are omitted.
    pub fn openings(&self, timetable: &Timetable, teacher: &str) -> Vec<Opening> {
        timetable
            .time_slots()
            .filter(|&ts| {
                !self.blocking.is_teacher_blocked(teacher, ts)
                    && timetable.teacher_class_at(teacher, ts, None).is_none()
            })
            .filter_map(|ts| {
                let classes: Vec<String> = timetable
                    .grids
                    .iter()
                    .filter(|g| timetable.slot(&g.class, ts).is_some_and(|s| s.is_open()))
                    .map(|g| g.class.clone())
                    .collect();
                (!classes.is_empty()).then_some(Opening { slot: ts, classes })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::{AvailabilityResolver, FnAreaBlocking};
    use crate::models::{Block, TimetableConfig, Weekday};
    use crate::scheduler::TimetableGenerator;

    fn ts(day: Weekday, period: u32) -> TimeSlot {
        TimeSlot::new(day, period)
    }

    fn fixture() -> (Timetable, AvailabilityResolver) {
        let config = TimetableConfig::new(vec![Weekday::Monday, Weekday::Tuesday], 3);
        let resolver = AvailabilityResolver::new(vec![
            Block::class("1A", Weekday::Tuesday, [3]),
            Block::teacher("Ana", Weekday::Tuesday, [1]).with_reason("Training"),
        ]);
        let mut tt = Timetable::new(&config, ["1A", "1B"], &resolver);
        tt.set_lesson("1A", ts(Weekday::Monday, 1), Lesson::new("1A", "Art", "Rui"))
            .unwrap();
        tt.set_lesson("1B", ts(Weekday::Monday, 2), Lesson::new("1B", "Math", "Ana"))
            .unwrap();
        (tt, resolver)
    }

    // ======== Rejection order ========

    #[test]
    fn test_rejections() {
        let (tt, resolver) = fixture();
        let workload = vec![WorkloadItem::new("Ana", "1A", "Math", 2)];
        let v = PlacementValidator::new(&workload, &resolver);
        let kind = |class: &str, slot: TimeSlot| {
            v.can_place(&tt, class, slot, "Ana", "Math").unwrap_err().kind
        };

        assert_eq!(kind("9Z", ts(Weekday::Monday, 1)), RejectionKind::UnknownClass);
        assert_eq!(kind("1A", ts(Weekday::Friday, 1)), RejectionKind::UnknownSlot);
        assert_eq!(kind("1A", ts(Weekday::Tuesday, 3)), RejectionKind::ClassBlocked);
        assert_eq!(kind("1A", ts(Weekday::Monday, 1)), RejectionKind::Occupied);
        assert_eq!(kind("1A", ts(Weekday::Tuesday, 1)), RejectionKind::TeacherBlocked);
        assert_eq!(kind("1A", ts(Weekday::Monday, 2)), RejectionKind::TeacherBusy);
        assert!(v.can_place(&tt, "1A", ts(Weekday::Monday, 3), "Ana", "Math").is_ok());
    }

    #[test]
    fn test_teacher_blocked_reason() {
        let (tt, resolver) = fixture();
        let v = PlacementValidator::new(&[], &resolver);
        let err = v
            .can_place(&tt, "1A", ts(Weekday::Tuesday, 1), "Ana", "Math")
            .unwrap_err();
        assert_eq!(err.reason, "teacher blocked: Training");

        let area = AvailabilityResolver::default()
            .with_area_blocking(FnAreaBlocking::new(|t: &str, _| t == "Rui"));
        let v = PlacementValidator::new(&[], &area);
        let err = v
            .can_place(&tt, "1A", ts(Weekday::Monday, 3), "Rui", "Art")
            .unwrap_err();
        assert_eq!(err.reason, "teacher blocked: area ATPC");
    }

    #[test]
    fn test_place_writes_and_converts_rejection() {
        let (mut tt, resolver) = fixture();
        let workload = vec![WorkloadItem::new("Ana", "1A", "Math", 1)];
        let v = PlacementValidator::new(&workload, &resolver);

        v.place(&mut tt, "1A", ts(Weekday::Monday, 3), "Ana", "Math").unwrap();
        assert_eq!(tt.count_lessons("Ana", "1A", "Math"), 1);

        let err = v
            .place(&mut tt, "1A", ts(Weekday::Tuesday, 2), "Ana", "Math")
            .unwrap_err();
        assert_eq!(err.kind, EditErrorKind::Rejected);
        assert_eq!(err.message, "weekly limit reached: 1/1 lessons placed");
    }

    #[test]
    fn test_quota_rejected_after_generation() {
        let config = TimetableConfig::new(Weekday::school_week(), 2);
        let workload = vec![WorkloadItem::new("Ana", "1A", "Math", 2)];
        let resolver = AvailabilityResolver::default();
        let result = TimetableGenerator::new(config)
            .generate(&workload, &resolver)
            .unwrap();
        assert!(result.success);

        let tt = result.timetable;
        let free = tt
            .time_slots()
            .find(|&s| tt.slot("1A", s).is_some_and(|c| c.is_open()))
            .unwrap();
        let err = PlacementValidator::new(&workload, &resolver)
            .can_place(&tt, "1A", free, "Ana", "Math")
            .unwrap_err();
        assert_eq!(err.kind, RejectionKind::QuotaReached);
        assert!(err.reason.contains("2/2"));
    }

    // ======== Openings ========

    #[test]
    fn test_openings() {
        let (tt, resolver) = fixture();
        let v = PlacementValidator::new(&[], &resolver);
        let openings = v.openings(&tt, "Ana");

        let slots: Vec<TimeSlot> = openings.iter().map(|o| o.slot).collect();
        // Mon 2 busy, Tue 1 blocked.
        assert_eq!(
            slots,
            vec![
                ts(Weekday::Monday, 1),
                ts(Weekday::Monday, 3),
                ts(Weekday::Tuesday, 2),
                ts(Weekday::Tuesday, 3),
            ]
        );
        assert_eq!(openings[0].classes, vec!["1B".to_string()]);
        assert_eq!(openings[3].classes, vec!["1B".to_string()]);
        assert_eq!(openings[1].classes.len(), 2);
    }
}
