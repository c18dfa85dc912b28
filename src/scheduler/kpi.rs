//! Timetable quality metrics (KPIs).
//!
//! Computes summary indicators from a timetable and its workload.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Placed lessons | Lessons in the grids; each co-teacher of an elective counts once |
//! | Expected lessons | Sum of required lessons over the workload |
//! | Free slots | Unblocked, empty cells |
//! | Blocked slots | Cells blocked for their class |
//! | Elective lessons | Teacher-lessons in elective cells |
//! | Allocation percent | Placed / expected, rounded |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{is_elective_subject, Timetable, WorkloadItem};

/// Timetable performance indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableKpi {
    /// Lessons placed (elective co-teachers counted individually).
    pub placed_lessons: u32,
    /// Lessons required by the workload.
    pub expected_lessons: u32,
    /// Open cells across all grids.
    pub free_slots: u32,
    /// Blocked cells across all grids.
    pub blocked_slots: u32,
    /// Teacher-lessons in elective cells.
    pub elective_lessons: u32,
    /// Rounded `placed / expected` percentage (0 when nothing is expected).
    pub allocation_percent: u32,
    /// Lessons per teacher.
    pub lessons_by_teacher: BTreeMap<String, u32>,
}

impl TimetableKpi {
    /// Computes KPIs.
    ///
    /// # Arguments
    /// * `timetable` - The timetable to measure.
    /// * `workload` - The workload it was built from.
    /// * `elective_marker` - Marker identifying elective subjects.
    pub fn calculate(timetable: &Timetable, workload: &[WorkloadItem], elective_marker: &str) -> Self {
        let mut kpi = Self::default();

        for slot in timetable.grids.iter().flat_map(|g| g.slots.iter()) {
            if slot.blocked {
                kpi.blocked_slots += 1;
                continue;
            }
            let Some(lesson) = &slot.content else {
                kpi.free_slots += 1;
                continue;
            };
            let teachers = lesson.teachers.len() as u32;
            kpi.placed_lessons += teachers;
            if is_elective_subject(&lesson.subject, elective_marker) {
                kpi.elective_lessons += teachers;
            }
            for teacher in &lesson.teachers {
                *kpi.lessons_by_teacher.entry(teacher.clone()).or_default() += 1;
            }
        }

        kpi.expected_lessons = workload.iter().map(|w| w.required_lessons).sum();
        kpi.allocation_percent = if kpi.expected_lessons == 0 {
            0
        } else {
            (kpi.placed_lessons as f64 * 100.0 / kpi.expected_lessons as f64).round() as u32
        };
        kpi
    }

    /// Whether the allocation reaches `min_percent`.
    pub fn meets_target(&self, min_percent: u32) -> bool {
        self.allocation_percent >= min_percent
    }
}
