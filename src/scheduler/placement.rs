//! Difficulty-ranked initial placement.
//!
//! # Algorithm
//!
//! 1. Merge workload items sharing a (teacher, class, subject) key and drop
//!    electives.
//! 2. Score each demand by its teacher:
//!    `2 × blocked slots + 3 × distinct classes + weekly lesson load`.
//! 3. Stable sort, hardest first.
//! 4. Phase A: for each demand, place `required / 2` double lessons, at
//!    most one per day and only on days where the class has no lesson of
//!    the subject yet.
//! 5. Phase B: place the remaining lessons one by one in day × period
//!    order, never forming three consecutive periods of one subject.
//!
//! Hard-to-place demands go first because later demands see fewer free
//! cells.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use super::workspace::{GridView, Workspace};
use crate::models::{Lesson, TimetableConfig, WorkloadItem};

/// A merged, ranked workload requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Demand {
    /// Index of the first workload item with this key.
    pub item_index: usize,
    pub teacher: String,
    pub class: String,
    pub subject: String,
    pub teacher_id: usize,
    pub class_id: usize,
    /// Lessons required per week.
    pub required: u32,
    /// Lessons placed so far.
    pub placed: u32,
    /// Ranking score (higher is harder).
    pub difficulty: u32,
}

impl Demand {
    /// Lessons still missing.
    #[inline]
    pub fn shortfall(&self) -> u32 {
        self.required.saturating_sub(self.placed)
    }

    /// A lesson of this demand.
    pub fn lesson(&self) -> Lesson {
        Lesson::new(
            self.class.as_str(),
            self.subject.as_str(),
            self.teacher.as_str(),
        )
    }
}

/// Builds the ranked demand list.
pub(crate) fn rank_demands(
    workspace: &Workspace,
    workload: &[WorkloadItem],
    config: &TimetableConfig,
) -> Vec<Demand> {
    // Teacher load over the whole workload, electives included.
    let mut load: HashMap<&str, (BTreeSet<&str>, u32)> = HashMap::new();
    for item in workload {
        let entry = load.entry(item.teacher.as_str()).or_default();
        entry.0.insert(item.class.as_str());
        entry.1 += item.required_lessons;
    }

    let mut demands: Vec<Demand> = Vec::new();
    let mut index_of: HashMap<(&str, &str, &str), usize> = HashMap::new();
    for (i, item) in workload.iter().enumerate() {
        if config.is_elective(&item.subject) {
            continue;
        }
        let key = (
            item.teacher.as_str(),
            item.class.as_str(),
            item.subject.as_str(),
        );
        if let Some(&pos) = index_of.get(&key) {
            demands[pos].required += item.required_lessons;
            continue;
        }
        let (Some(teacher_id), Some(class_id)) = (
            workspace.teacher_id(&item.teacher),
            workspace.class_id(&item.class),
        ) else {
            continue;
        };

        let (classes, lessons) = load
            .get(item.teacher.as_str())
            .map(|(c, l)| (c.len() as u32, *l))
            .unwrap_or_default();
        let blocked = workspace.teacher_blocked_count(teacher_id) as u32;

        index_of.insert(key, demands.len());
        demands.push(Demand {
            item_index: i,
            teacher: item.teacher.clone(),
            class: item.class.clone(),
            subject: item.subject.clone(),
            teacher_id,
            class_id,
            required: item.required_lessons,
            placed: 0,
            difficulty: 2 * blocked + 3 * classes + lessons,
        });
    }

    // Stable: ties keep input order
    demands.sort_by(|a, b| b.difficulty.cmp(&a.difficulty));
    demands
}

/// Phase A: double lessons. Returns the number of pairs placed.
pub(crate) fn place_pairs(workspace: &mut Workspace, demands: &mut [Demand]) -> usize {
    let mut total = 0usize;
    for demand in demands.iter_mut() {
        let wanted = (demand.required / 2) as usize;
        let (class, teacher) = (demand.class_id, demand.teacher_id);
        let mut pairs = 0usize;

        for day in 0..workspace.day_count() {
            if pairs >= wanted {
                break;
            }
            let slots = workspace.day_slots(day);
            let has_subject = slots.clone().any(|s| {
                workspace
                    .lesson(class, s)
                    .is_some_and(|l| l.subject == demand.subject)
            });
            if has_subject {
                continue;
            }

            let view: &Workspace = workspace;
            let free = |s: usize| view.is_open(class, s) && view.teacher_available(teacher, s);
            let first = (slots.start..slots.end.saturating_sub(1)).find(|&s| free(s) && free(s + 1));
            if let Some(s) = first {
                workspace.write(class, s, Some(demand.lesson()));
                workspace.write(class, s + 1, Some(demand.lesson()));
                demand.placed += 2;
                pairs += 1;
            }
        }
        total += pairs;
    }
    debug!("Phase A: {total} double lesson(s) placed");
    total
}

/// Phase B: single lessons. Returns the number of lessons placed.
pub(crate) fn place_singles(workspace: &mut Workspace, demands: &mut [Demand]) -> usize {
    let mut total = 0;
    for demand in demands.iter_mut() {
        for slot in 0..workspace.slots_per_class() {
            if demand.shortfall() == 0 {
                break;
            }
            if workspace.can_host(demand.class_id, slot, demand.teacher_id, &demand.subject) {
                workspace.write(demand.class_id, slot, Some(demand.lesson()));
                demand.placed += 1;
                total += 1;
            }
        }
    }
    debug!("Phase B: {total} single lesson(s) placed");
    total
}
