//! School timetable generation.
//!
//! Assigns weekly lessons of (teacher, class, subject) workload items to a
//! day × period grid per class, respecting global, class, teacher and area
//! blocks, never double-booking a teacher, preferring double lessons and
//! pinning electives into reserved coordinates. Lessons that cannot be placed
//! are reported as conflicts with their causes.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `WorkloadItem`, `Block`, `TimetableConfig`,
//!   `Timetable`, `Lesson`, `Conflict`, `SwapSuggestion`
//! - **`availability`**: Blocking queries (`BlockingSource`,
//!   `AvailabilityResolver`, knowledge areas)
//! - **`scheduler`**: `TimetableGenerator` and `TimetableKpi`
//! - **`analysis`**: Conflict analysis, swap suggestions, manual placement
//! - **`validation`**: Input integrity checks (week shape, workload fields)
//!
//! # Example
//!
//! ```
//! use u_timetable::analysis::ConflictAnalyzer;
//! use u_timetable::availability::AvailabilityResolver;
//! use u_timetable::models::{Block, TimetableConfig, Weekday, WorkloadItem};
//! use u_timetable::scheduler::TimetableGenerator;
//!
//! let config = TimetableConfig::new(Weekday::school_week(), 5);
//! let resolver = AvailabilityResolver::new(vec![Block::global(Weekday::Monday, [1])]);
//! let workload = vec![
//!     WorkloadItem::new("Ana", "1A", "Math", 4),
//!     WorkloadItem::new("Ana", "1B", "Math", 4),
//!     WorkloadItem::new("Rui", "1A", "History", 2),
//! ];
//!
//! let result = TimetableGenerator::new(config).generate(&workload, &resolver).unwrap();
//! assert!(result.success);
//! assert_eq!(result.timetable.count_lessons("Ana", "1B", "Math"), 4);
//!
//! let analysis = ConflictAnalyzer::new(&workload, &resolver).analyze(&result.timetable);
//! assert!(analysis.is_clean());
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod analysis;
pub mod availability;
pub mod models;
pub mod scheduler;
pub mod validation;
