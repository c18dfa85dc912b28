//! Timetabling domain models.
//!
//! Provides the data types describing a school timetabling problem and
//! its solution. All types are serializable; storage is the caller's
//! concern.
//!
//! # Domain Mappings
//!
//! | u-timetable | School | Generic scheduling |
//! |-------------|--------|--------------------|
//! | WorkloadItem | Teaching assignment | Demand |
//! | TimeSlot | Day × period | Time bucket |
//! | Block | Unavailability rule | Calendar exception |
//! | Timetable | Class timetables | Schedule |
//! | Conflict | Unplaced lessons | Violation |

mod block;
mod calendar;
mod conflict;
mod timetable;
mod workload;

pub use block::{Block, BlockScope};
pub use calendar::{is_elective_subject, PeriodTime, TimeSlot, TimetableConfig, Weekday};
pub use conflict::{CauseBreakdown, Conflict, ConflictAnalysis, LessonPosition, SwapSuggestion};
pub use timetable::{
    ClassGrid, EditError, EditErrorKind, Lesson, Slot, TeacherSchedule, TeacherSlot, Timetable,
};
pub use workload::{classes, required_for, teachers, WorkloadItem};
