//! Teacher occupancy index.
//!
//! A flat array keyed by (teacher id, slot index) holding the index of the
//! class the teacher teaches there. Teacher ids are dense indices assigned
//! in sorted name order.

use std::collections::{BTreeSet, HashMap};

/// Who teaches where, indexed by teacher id and day-major slot index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Occupancy {
    teacher_ids: HashMap<String, usize>,
    slots_per_class: usize,
    cells: Vec<Option<u32>>,
}

impl Occupancy {
    /// Creates an empty index for the given teachers.
    pub fn new<I, S>(teachers: I, slots_per_class: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = teachers.into_iter().map(Into::into).collect();
        let teacher_ids: HashMap<String, usize> = names
            .into_iter()
            .enumerate()
            .map(|(id, name)| (name, id))
            .collect();
        let cells = vec![None; teacher_ids.len() * slots_per_class];
        Self {
            teacher_ids,
            slots_per_class,
            cells,
        }
    }

    /// Dense id of a teacher.
    #[inline]
    pub fn teacher_id(&self, teacher: &str) -> Option<usize> {
        self.teacher_ids.get(teacher).copied()
    }

    /// Number of indexed teachers.
    #[inline]
    pub fn teacher_count(&self) -> usize {
        self.teacher_ids.len()
    }

    #[inline]
    fn offset(&self, teacher: usize, slot: usize) -> usize {
        teacher * self.slots_per_class + slot
    }

    /// Class index where the teacher is busy at a slot.
    #[inline]
    pub fn get(&self, teacher: usize, slot: usize) -> Option<usize> {
        self.cells
            .get(self.offset(teacher, slot))
            .copied()
            .flatten()
            .map(|c| c as usize)
    }

    /// Whether the teacher has no lesson at a slot.
    #[inline]
    pub fn is_free(&self, teacher: usize, slot: usize) -> bool {
        self.get(teacher, slot).is_none()
    }

    /// Marks the teacher busy in `class` at a slot.
    pub fn occupy(&mut self, teacher: usize, slot: usize, class: usize) {
        let offset = self.offset(teacher, slot);
        if let Some(cell) = self.cells.get_mut(offset) {
            *cell = Some(class as u32);
        }
    }

    /// Frees the teacher at a slot if they are recorded in `class` there.
    pub fn release(&mut self, teacher: usize, slot: usize, class: usize) {
        let offset = self.offset(teacher, slot);
        if let Some(cell) = self.cells.get_mut(offset) {
            if *cell == Some(class as u32) {
                *cell = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_name_order() {
        let occ = Occupancy::new(["Rui", "Ana", "Bia", "Ana"], 10);
        assert_eq!(occ.teacher_count(), 3);
        assert_eq!(occ.teacher_id("Ana"), Some(0));
        assert_eq!(occ.teacher_id("Bia"), Some(1));
        assert_eq!(occ.teacher_id("Rui"), Some(2));
        assert_eq!(occ.teacher_id("Zed"), None);
    }

    #[test]
    fn test_occupy_and_release() {
        let mut occ = Occupancy::new(["Ana", "Rui"], 4);
        occ.occupy(0, 2, 5);
        assert_eq!(occ.get(0, 2), Some(5));
        assert!(occ.is_free(1, 2));

        // Release from a different class is ignored
        occ.release(0, 2, 4);
        assert_eq!(occ.get(0, 2), Some(5));

        occ.release(0, 2, 5);
        assert!(occ.is_free(0, 2));
    }
}
