//! Knowledge-area directory.
//!
//! Teachers are grouped into knowledge areas; an area block (e.g., the
//! weekly area planning meeting) blocks every member teacher. A teacher
//! belongs to at most one area.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::AreaBlocking;
use crate::models::{TimeSlot, Weekday};

/// A group of teachers sharing area meetings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeArea {
    pub id: String,
    pub name: String,
    /// Member teacher names.
    pub teachers: Vec<String>,
}

/// A block applying to every member of an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaBlock {
    pub id: String,
    pub area_id: String,
    pub day: Weekday,
    pub periods: BTreeSet<u32>,
    pub reason: Option<String>,
}

/// Areas and their blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeAreas {
    pub areas: Vec<KnowledgeArea>,
    pub blocks: Vec<AreaBlock>,
    #[serde(default)]
    next_id: u64,
}

impl KnowledgeAreas {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Adds an area and returns its identifier.
    pub fn add_area(&mut self, name: impl Into<String>) -> String {
        let id = self.fresh_id("area");
        self.areas.push(KnowledgeArea {
            id: id.clone(),
            name: name.into(),
            teachers: Vec::new(),
        });
        id
    }

    /// Removes an area together with its blocks.
    pub fn remove_area(&mut self, area_id: &str) -> Option<KnowledgeArea> {
        let pos = self.areas.iter().position(|a| a.id == area_id)?;
        self.blocks.retain(|b| b.area_id != area_id);
        Some(self.areas.remove(pos))
    }

    /// Assigns a teacher to an area, removing them from any other area.
    ///
    /// Returns `false` if the area does not exist.
    pub fn assign_teacher(&mut self, area_id: &str, teacher: &str) -> bool {
        if !self.areas.iter().any(|a| a.id == area_id) {
            return false;
        }
        for area in &mut self.areas {
            area.teachers.retain(|t| t != teacher);
            if area.id == area_id {
                area.teachers.push(teacher.to_string());
            }
        }
        true
    }

    /// Removes a teacher from an area.
    pub fn unassign_teacher(&mut self, area_id: &str, teacher: &str) {
        if let Some(area) = self.areas.iter_mut().find(|a| a.id == area_id) {
            area.teachers.retain(|t| t != teacher);
        }
    }

    /// Adds an area block and returns its identifier, or `None` if the
    /// area does not exist.
    pub fn add_block(
        &mut self,
        area_id: &str,
        day: Weekday,
        periods: impl IntoIterator<Item = u32>,
        reason: Option<String>,
    ) -> Option<String> {
        if !self.areas.iter().any(|a| a.id == area_id) {
            return None;
        }
        let id = self.fresh_id("area-block");
        self.blocks.push(AreaBlock {
            id: id.clone(),
            area_id: area_id.to_string(),
            day,
            periods: periods.into_iter().collect(),
            reason,
        });
        Some(id)
    }

    /// Removes an area block.
    pub fn remove_block(&mut self, block_id: &str) -> Option<AreaBlock> {
        let pos = self.blocks.iter().position(|b| b.id == block_id)?;
        Some(self.blocks.remove(pos))
    }

    /// Area of a teacher.
    pub fn area_of(&self, teacher: &str) -> Option<&KnowledgeArea> {
        self.areas
            .iter()
            .find(|a| a.teachers.iter().any(|t| t == teacher))
    }

    /// Blocks that apply to a teacher through their area.
    pub fn blocks_for(&self, teacher: &str) -> Vec<&AreaBlock> {
        match self.area_of(teacher) {
            Some(area) => self.blocks.iter().filter(|b| b.area_id == area.id).collect(),
            None => Vec::new(),
        }
    }

    /// Teachers from `teachers` without an area.
    pub fn unassigned<'t>(&self, teachers: &'t [String]) -> Vec<&'t str> {
        teachers
            .iter()
            .filter(|t| self.area_of(t).is_none())
            .map(String::as_str)
            .collect()
    }

    fn block_at(&self, teacher: &str, slot: TimeSlot) -> Option<(&KnowledgeArea, &AreaBlock)> {
        let area = self.area_of(teacher)?;
        self.blocks
            .iter()
            .find(|b| b.area_id == area.id && b.day == slot.day && b.periods.contains(&slot.period))
            .map(|b| (area, b))
    }
}

impl AreaBlocking for KnowledgeAreas {
    fn is_teacher_blocked(&self, teacher: &str, slot: TimeSlot) -> bool {
        self.block_at(teacher, slot).is_some()
    }

    fn reason(&self, teacher: &str, slot: TimeSlot) -> Option<String> {
        self.block_at(teacher, slot).map(|(area, block)| {
            block
                .reason
                .clone()
                .unwrap_or_else(|| format!("{} {}", super::DEFAULT_AREA_REASON, area.name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::{AvailabilityResolver, BlockingSource};

    fn sample() -> (KnowledgeAreas, String) {
        let mut areas = KnowledgeAreas::new();
        let sciences = areas.add_area("Sciences");
        areas.assign_teacher(&sciences, "Ana");
        areas.assign_teacher(&sciences, "Rui");
        areas.add_block(&sciences, Weekday::Wednesday, [4, 5], None);
        (areas, sciences)
    }

    #[test]
    fn test_area_blocks_members() {
        let (areas, _) = sample();
        let slot = TimeSlot::new(Weekday::Wednesday, 4);
        assert!(areas.is_teacher_blocked("Ana", slot));
        assert!(areas.is_teacher_blocked("Rui", slot));
        assert!(!areas.is_teacher_blocked("Bia", slot));
        assert!(!areas.is_teacher_blocked("Ana", TimeSlot::new(Weekday::Wednesday, 6)));
        assert_eq!(areas.reason("Ana", slot).as_deref(), Some("area ATPC Sciences"));
    }

    #[test]
    fn test_teacher_in_single_area() {
        let (mut areas, sciences) = sample();
        let languages = areas.add_area("Languages");
        assert!(areas.assign_teacher(&languages, "Ana"));
        assert_eq!(areas.area_of("Ana").unwrap().id, languages);
        assert!(!areas.areas.iter().any(|a| a.id == sciences && a.teachers.contains(&"Ana".to_string())));
        assert!(!areas.assign_teacher("missing", "Ana"));
    }

    #[test]
    fn test_remove_area_drops_blocks() {
        let (mut areas, sciences) = sample();
        assert_eq!(areas.blocks_for("Ana").len(), 1);
        areas.remove_area(&sciences);
        assert!(areas.blocks.is_empty());
        assert!(areas.blocks_for("Ana").is_empty());
    }

    #[test]
    fn test_unassigned_teachers() {
        let (mut areas, sciences) = sample();
        areas.unassign_teacher(&sciences, "Rui");
        let all = vec!["Ana".to_string(), "Rui".to_string(), "Bia".to_string()];
        assert_eq!(areas.unassigned(&all), vec!["Rui", "Bia"]);
    }

    #[test]
    fn test_resolver_uses_area_directory() {
        let (mut areas, sciences) = sample();
        areas.add_block(&sciences, Weekday::Monday, [1], Some("Lab planning".into()));
        let resolver = AvailabilityResolver::default().with_area_blocking(areas);

        let status = resolver.teacher_status("Rui", TimeSlot::new(Weekday::Monday, 1));
        assert!(status.blocked);
        assert_eq!(status.reason.as_deref(), Some("Lab planning"));
        assert!(!resolver.is_class_blocked("1A", TimeSlot::new(Weekday::Monday, 1)));
    }
}
