//! Post-generation analysis and editing support.
//!
//! Everything here is pure over a finished [`Timetable`] plus the current
//! blocks: conflicts and suggestions are derived on demand, never cached.
//!
//! - [`ConflictAnalyzer`]: which workload items are short, and why.
//! - [`SwapAdvisor`]: single relocations that would free a coordinate for a
//!   conflicted teacher, and their application.
//! - [`PlacementValidator`]: gatekeeper for manual edits, plus the open
//!   coordinates of a teacher.

mod conflicts;
mod manual;
mod swaps;

pub use conflicts::ConflictAnalyzer;
pub use manual::{Opening, PlacementValidator, Rejection, RejectionKind};
pub use swaps::SwapAdvisor;

use crate::models::{TimeSlot, Timetable};

/// Whether putting `subject` at `slot` of `class` would make three or more
/// consecutive periods of it, treating `vacated` as empty.
pub(crate) fn creates_run(
    timetable: &Timetable,
    class: &str,
    slot: TimeSlot,
    subject: &str,
    vacated: Option<TimeSlot>,
) -> bool {
    let same = |offset: i64| -> bool {
        let period = slot.period as i64 + offset;
        if period < 1 || period > timetable.period_count as i64 {
            return false;
        }
        let neighbour = TimeSlot::new(slot.day, period as u32);
        if Some(neighbour) == vacated {
            return false;
        }
        timetable
            .lesson(class, neighbour)
            .is_some_and(|l| l.subject == subject)
    };
    (same(-1) && same(-2)) || (same(1) && same(2)) || (same(-1) && same(1))
}
