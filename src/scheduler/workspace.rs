//! Mutable generation workspace and transactional move overlays.
//!
//! The [`Workspace`] owns the timetable under construction, the teacher
//! [`Occupancy`] index, a teacher-block cache and the set of pinned
//! (elective) cells. Everything is addressed by dense indices: class index
//! (grid order), slot index (day-major) and teacher id.
//!
//! Multi-cell moves are staged on a [`MoveOverlay`] that records every slot
//! write. The overlay reads through to the workspace, so a chain can be
//! checked hop by hop against the state it would produce. Converting the
//! overlay into a [`SlotCommit`] and applying it writes every hop at once;
//! dropping the overlay discards the attempt.

use std::collections::HashMap;

use super::occupancy::Occupancy;
use crate::availability::BlockingSource;
use crate::models::{Lesson, Timetable, TimetableConfig};

/// Read access shared by the workspace and its overlays.
pub(crate) trait GridView {
    /// The workspace the view is based on.
    fn base(&self) -> &Workspace;

    /// Lesson in a class cell.
    fn lesson(&self, class: usize, slot: usize) -> Option<&Lesson>;

    /// Class where the teacher is busy at a slot.
    fn teacher_at(&self, teacher: usize, slot: usize) -> Option<usize>;

    /// Cell is unblocked for the class, not reserved, and empty.
    fn is_open(&self, class: usize, slot: usize) -> bool {
        !self.base().class_blocked(class, slot)
            && !self.base().is_pinned(class, slot)
            && self.lesson(class, slot).is_none()
    }

    /// Teacher is unblocked and not teaching at the slot.
    fn teacher_available(&self, teacher: usize, slot: usize) -> bool {
        !self.base().teacher_blocked(teacher, slot) && self.teacher_at(teacher, slot).is_none()
    }

    /// Whether putting `subject` at the slot would make three or more
    /// consecutive periods of it on that day.
    fn creates_run(&self, class: usize, slot: usize, subject: &str) -> bool {
        let periods = self.base().periods_per_day() as isize;
        let position = (slot as isize) % periods;
        let same = |offset: isize| -> bool {
            let p = position + offset;
            if p < 0 || p >= periods {
                return false;
            }
            let neighbour = (slot as isize + offset) as usize;
            self.lesson(class, neighbour)
                .is_some_and(|l| l.subject == subject)
        };
        (same(-1) && same(-2)) || (same(1) && same(2)) || (same(-1) && same(1))
    }

    /// Open cell, available teacher and no three-period run.
    fn can_host(&self, class: usize, slot: usize, teacher: usize, subject: &str) -> bool {
        self.is_open(class, slot)
            && self.teacher_available(teacher, slot)
            && !self.creates_run(class, slot, subject)
    }
}

/// One staged cell write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SlotWrite {
    pub class: usize,
    pub slot: usize,
    pub lesson: Option<Lesson>,
}

/// Ordered cell writes produced by a [`MoveOverlay`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SlotCommit {
    writes: Vec<SlotWrite>,
}

impl SlotCommit {
    /// The staged writes in application order.
    pub fn writes(&self) -> &[SlotWrite] {
        &self.writes
    }
}

/// Timetable under construction.
#[derive(Debug, Clone)]
pub(crate) struct Workspace {
    timetable: Timetable,
    periods_per_day: usize,
    slots_per_class: usize,
    class_ids: HashMap<String, usize>,
    occupancy: Occupancy,
    teacher_blocked: Vec<bool>,
    pinned: Vec<bool>,
}

impl Workspace {
    /// Creates empty grids for `classes` and caches teacher blocks.
    pub fn new(
        config: &TimetableConfig,
        classes: &[String],
        teachers: &[String],
        blocking: &dyn BlockingSource,
    ) -> Self {
        let timetable = Timetable::new(config, classes.iter().cloned(), blocking);
        let slots_per_class = timetable.slots_per_class();
        let occupancy = Occupancy::new(teachers.iter().cloned(), slots_per_class);

        let mut teacher_blocked = vec![false; occupancy.teacher_count() * slots_per_class];
        for name in teachers {
            let Some(teacher) = occupancy.teacher_id(name) else {
                continue;
            };
            for (slot, ts) in timetable.time_slots().enumerate() {
                teacher_blocked[teacher * slots_per_class + slot] =
                    blocking.is_teacher_blocked(name, ts);
            }
        }

        let class_ids = timetable
            .grids
            .iter()
            .enumerate()
            .map(|(i, g)| (g.class.clone(), i))
            .collect();

        Self {
            periods_per_day: config.period_count() as usize,
            slots_per_class,
            class_ids,
            occupancy,
            teacher_blocked,
            pinned: vec![false; classes.len() * slots_per_class],
            timetable,
        }
    }

    #[inline]
    pub fn periods_per_day(&self) -> usize {
        self.periods_per_day
    }

    #[inline]
    pub fn slots_per_class(&self) -> usize {
        self.slots_per_class
    }

    pub fn class_id(&self, class: &str) -> Option<usize> {
        self.class_ids.get(class).copied()
    }

    pub fn teacher_id(&self, teacher: &str) -> Option<usize> {
        self.occupancy.teacher_id(teacher)
    }

    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    pub fn into_timetable(self) -> Timetable {
        self.timetable
    }

    #[inline]
    pub fn class_blocked(&self, class: usize, slot: usize) -> bool {
        self.timetable.grids[class].slots[slot].blocked
    }

    #[inline]
    pub fn teacher_blocked(&self, teacher: usize, slot: usize) -> bool {
        self.teacher_blocked[teacher * self.slots_per_class + slot]
    }

    /// Blocked slots of a teacher over the week.
    pub fn teacher_blocked_count(&self, teacher: usize) -> usize {
        let start = teacher * self.slots_per_class;
        self.teacher_blocked[start..start + self.slots_per_class]
            .iter()
            .filter(|&&b| b)
            .count()
    }

    #[inline]
    pub fn is_pinned(&self, class: usize, slot: usize) -> bool {
        self.pinned[class * self.slots_per_class + slot]
    }

    pub fn pin(&mut self, class: usize, slot: usize) {
        self.pinned[class * self.slots_per_class + slot] = true;
    }

    /// Same-day slot indices of a day (`day` is the weekday position).
    pub fn day_slots(&self, day: usize) -> std::ops::Range<usize> {
        let start = day * self.periods_per_day;
        start..start + self.periods_per_day
    }

    /// Number of configured days.
    pub fn day_count(&self) -> usize {
        self.timetable.weekdays.len()
    }

    /// Writes a cell, keeping the occupancy index in step.
    pub fn write(&mut self, class: usize, slot: usize, lesson: Option<Lesson>) {
        let previous = self.timetable.grids[class].slots[slot].content.take();
        if let Some(old) = &previous {
            for name in &old.teachers {
                if let Some(teacher) = self.occupancy.teacher_id(name) {
                    self.occupancy.release(teacher, slot, class);
                }
            }
        }
        if let Some(new) = &lesson {
            for name in &new.teachers {
                if let Some(teacher) = self.occupancy.teacher_id(name) {
                    if self.occupancy.is_free(teacher, slot) {
                        self.occupancy.occupy(teacher, slot, class);
                    }
                }
            }
        }
        self.timetable.grids[class].slots[slot].content = lesson;
    }

    /// Replaces the lesson at a cell and records an extra teacher as busy.
    ///
    /// Used for co-taught electives, where a second teacher joins a lesson
    /// already in the cell.
    pub fn add_co_teacher(&mut self, class: usize, slot: usize, teacher: &str) -> bool {
        let Some(lesson) = self.timetable.grids[class].slots[slot].content.as_mut() else {
            return false;
        };
        if !lesson.add_teacher(teacher) {
            return false;
        }
        if let Some(id) = self.occupancy.teacher_id(teacher) {
            if self.occupancy.is_free(id, slot) {
                self.occupancy.occupy(id, slot, class);
            }
        }
        true
    }

    /// Starts a move transaction.
    pub fn overlay(&self) -> MoveOverlay<'_> {
        MoveOverlay {
            base: self,
            cells: HashMap::new(),
            occupancy: HashMap::new(),
            writes: Vec::new(),
        }
    }

    /// Applies a committed transaction.
    pub fn apply(&mut self, commit: SlotCommit) {
        for write in commit.writes {
            self.write(write.class, write.slot, write.lesson);
        }
    }
}

impl GridView for Workspace {
    fn base(&self) -> &Workspace {
        self
    }

    fn lesson(&self, class: usize, slot: usize) -> Option<&Lesson> {
        self.timetable.grids[class].slots[slot].content.as_ref()
    }

    fn teacher_at(&self, teacher: usize, slot: usize) -> Option<usize> {
        self.occupancy.get(teacher, slot)
    }
}

/// Staged writes over a borrowed [`Workspace`].
#[derive(Debug, Clone)]
pub(crate) struct MoveOverlay<'w> {
    base: &'w Workspace,
    cells: HashMap<(usize, usize), Option<Lesson>>,
    occupancy: HashMap<(usize, usize), Option<usize>>,
    writes: Vec<SlotWrite>,
}

impl<'w> MoveOverlay<'w> {
    /// Empties a cell, returning the lesson it held.
    pub fn clear(&mut self, class: usize, slot: usize) -> Option<Lesson> {
        self.set(class, slot, None)
    }

    /// Puts a lesson in a cell.
    pub fn place(&mut self, class: usize, slot: usize, lesson: Lesson) {
        self.set(class, slot, Some(lesson));
    }

    fn set(&mut self, class: usize, slot: usize, lesson: Option<Lesson>) -> Option<Lesson> {
        let previous = self.lesson(class, slot).cloned();
        if let Some(old) = &previous {
            for name in &old.teachers {
                if let Some(teacher) = self.base.teacher_id(name) {
                    if self.teacher_at(teacher, slot) == Some(class) {
                        self.occupancy.insert((teacher, slot), None);
                    }
                }
            }
        }
        if let Some(new) = &lesson {
            for name in &new.teachers {
                if let Some(teacher) = self.base.teacher_id(name) {
                    if self.teacher_at(teacher, slot).is_none() {
                        self.occupancy.insert((teacher, slot), Some(class));
                    }
                }
            }
        }
        self.cells.insert((class, slot), lesson.clone());
        self.writes.push(SlotWrite {
            class,
            slot,
            lesson,
        });
        previous
    }

    /// Finishes the transaction.
    pub fn into_commit(self) -> SlotCommit {
        SlotCommit {
            writes: self.writes,
        }
    }
}

impl GridView for MoveOverlay<'_> {
    fn base(&self) -> &Workspace {
        self.base
    }

    fn lesson(&self, class: usize, slot: usize) -> Option<&Lesson> {
        match self.cells.get(&(class, slot)) {
            Some(staged) => staged.as_ref(),
            None => self.base.lesson(class, slot),
        }
    }

    fn teacher_at(&self, teacher: usize, slot: usize) -> Option<usize> {
        match self.occupancy.get(&(teacher, slot)) {
            Some(staged) => *staged,
            None => self.base.teacher_at(teacher, slot),
        }
    }
}
