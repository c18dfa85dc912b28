//! Timetable generation and KPI evaluation.
//!
//! # Algorithm
//!
//! `TimetableGenerator` is a greedy, difficulty-ranked constructive heuristic
//! followed by local repair:
//!
//! 1. Electives are pinned into the reserved coordinates.
//! 2. Demands are ranked hardest first and placed as double lessons, then
//!    single lessons.
//! 3. Bounded repair rounds relocate lessons (across classes, or as one- and
//!    two-hop chains inside a class) to free coordinates for short demands.
//! 4. A relaxation phase may break the three-consecutive-periods rule.
//!
//! It is not optimal; it always terminates and reports what it could not
//! place.
//!
//! # KPI
//!
//! `TimetableKpi` summarises a timetable: placed/expected lessons, free and
//! blocked cells, elective lessons and the allocation percentage.

mod elective;
mod generator;
mod kpi;
mod occupancy;
mod placement;
mod repair;
mod workspace;

pub use generator::{
    GenerationError, GenerationResult, GenerationStats, RelaxationPolicy, SolverSettings,
    TimetableGenerator,
};
pub use kpi::TimetableKpi;
