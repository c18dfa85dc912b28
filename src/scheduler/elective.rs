//! Elective pre-allocation.
//!
//! Elective workload items bypass the ranked placement. Every class with
//! electives gets them in the reserved coordinates (the last two periods of
//! the last weekday); several electives of one class share the cells as a
//! single co-taught lesson. The reserved cells of such a class are pinned,
//! filled or not, so later phases never move, overwrite or fill them.

use std::collections::BTreeSet;

use log::{debug, warn};

use super::workspace::Workspace;
use crate::models::{Lesson, TimetableConfig, WorkloadItem};

/// What the elective phase did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ElectiveSummary {
    /// Elective workload items seen.
    pub items: usize,
    /// Distinct classes with electives.
    pub classes: usize,
    /// Cells filled or joined.
    pub placements: usize,
}

/// Places every elective item into the reserved coordinates of its class.
///
/// Classes are visited in workspace order, items in input order. A reserved
/// coordinate blocked for the class is skipped; a teacher blocked there is
/// not added to it. The cell stays pinned and may end up empty.
pub(crate) fn allocate_electives(
    workspace: &mut Workspace,
    workload: &[WorkloadItem],
    config: &TimetableConfig,
) -> ElectiveSummary {
    let electives: Vec<&WorkloadItem> = workload
        .iter()
        .filter(|w| config.is_elective(&w.subject))
        .collect();

    let mut summary = ElectiveSummary {
        items: electives.len(),
        classes: electives
            .iter()
            .map(|w| w.class.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
        placements: 0,
    };
    if electives.is_empty() {
        return summary;
    }

    let reserved: Vec<usize> = config
        .elective_slots()
        .into_iter()
        .filter_map(|ts| workspace.timetable().slot_index(ts))
        .collect();

    let class_names: Vec<String> = workspace
        .timetable()
        .classes()
        .map(String::from)
        .collect();
    for (class, name) in class_names.iter().enumerate() {
        if !electives.iter().any(|w| &w.class == name) {
            continue;
        }
        // Reserved cells stay elective-only even when no teacher can fill them
        for &slot in &reserved {
            workspace.pin(class, slot);
        }
        for item in electives.iter().filter(|w| &w.class == name) {
            let Some(teacher) = workspace.teacher_id(&item.teacher) else {
                continue;
            };
            for &slot in &reserved {
                if workspace.class_blocked(class, slot) {
                    debug!(
                        "Reserved elective slot {} is blocked for class {name}",
                        workspace.timetable().time_slot(slot)
                    );
                    continue;
                }
                if workspace.teacher_blocked(teacher, slot) {
                    warn!(
                        "Elective teacher {} is blocked at {}; not added to class {name}",
                        item.teacher,
                        workspace.timetable().time_slot(slot)
                    );
                    continue;
                }

                let empty = workspace.timetable().grids[class].slots[slot]
                    .content
                    .is_none();
                let joined = if empty {
                    let lesson = Lesson::new(name.as_str(), item.subject.as_str(), item.teacher.as_str());
                    workspace.write(class, slot, Some(lesson));
                    true
                } else {
                    workspace.add_co_teacher(class, slot, &item.teacher)
                };
                if joined {
                    summary.placements += 1;
                }
            }
        }
    }

    debug!(
        "Elective phase: {} item(s), {} class(es), {} placement(s)",
        summary.items, summary.classes, summary.placements
    );
    summary
}
