//! Timetable generation facade.
//!
//! # Algorithm
//!
//! 1. Validate the configuration and the workload (malformed input is
//!    refused).
//! 2. Build empty grids for every class of the workload, marking class
//!    blocks.
//! 3. Elective pre-allocation into the reserved coordinates.
//! 4. Difficulty ranking, Phase A (double lessons), Phase B (singles).
//! 5. Repair rounds and relaxation.
//! 6. Report every demand that is still short.
//!
//! The result is deterministic for identical inputs. Unsatisfiable demand is
//! not an error; it is reported in [`GenerationResult::conflicts`].

use serde::{Deserialize, Serialize};
use std::fmt;

use log::{debug, info};

use super::elective::allocate_electives;
use super::placement::{place_pairs, place_singles, rank_demands, Demand};
use super::repair::{describe_shortfall, repair};
use super::workspace::Workspace;
use crate::availability::BlockingSource;
use crate::models::{classes, teachers, Timetable, TimetableConfig, WorkloadItem};
use crate::validation::{validate_config, validate_workload, ValidationError};

/// How far the last-resort phase may break the consecutive-period rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationPolicy {
    /// Never place a lesson forming three consecutive periods.
    Disabled,
    /// Fill every remaining open cell the teacher can take.
    #[default]
    Unbounded,
    /// At most this many relaxed placements per generation.
    Limited(u32),
}

/// Solver limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Upper bound on repair rounds.
    pub max_repair_rounds: u32,
    /// Upper bound on chain relocations over the whole run.
    pub max_chain_relocations: u32,
    /// Relaxation policy.
    pub relaxation: RelaxationPolicy,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_repair_rounds: 100,
            max_chain_relocations: 50,
            relaxation: RelaxationPolicy::default(),
        }
    }
}

impl SolverSettings {
    /// Sets the repair round cap.
    pub fn with_max_repair_rounds(mut self, rounds: u32) -> Self {
        self.max_repair_rounds = rounds;
        self
    }

    /// Sets the chain relocation cap.
    pub fn with_max_chain_relocations(mut self, chains: u32) -> Self {
        self.max_chain_relocations = chains;
        self
    }

    /// Sets the relaxation policy.
    pub fn with_relaxation(mut self, relaxation: RelaxationPolicy) -> Self {
        self.relaxation = relaxation;
        self
    }
}

/// Counters describing one generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Repair rounds executed.
    pub repair_rounds: u32,
    /// Lessons placed directly during repair.
    pub direct_fills: u32,
    /// Single relocations (other class) applied.
    pub single_relocations: u32,
    /// Chain relocations (same class) applied.
    pub chain_relocations: u32,
    /// Lessons placed by relaxation.
    pub relaxed_placements: u32,
    /// Non-elective lessons placed.
    pub placed_lessons: u32,
    /// Non-elective lessons required.
    pub expected_lessons: u32,
    /// `placed / expected` as a rounded percentage (100 when nothing is expected).
    pub allocation_percent: u32,
    /// Elective workload items.
    pub elective_items: usize,
    /// Classes with electives.
    pub elective_classes: usize,
}

/// Outcome of [`TimetableGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// `true` when every demand was fully placed.
    pub success: bool,
    /// Summary message.
    pub message: String,
    /// One line per demand still short.
    pub conflicts: Vec<String>,
    /// The generated timetable.
    pub timetable: Timetable,
    pub stats: GenerationStats,
}

/// Generation refused because of malformed input.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The configuration failed validation.
    InvalidConfig(Vec<ValidationError>),
    /// The workload failed validation.
    InvalidWorkload(Vec<ValidationError>),
}

impl GenerationError {
    /// The underlying validation errors.
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            GenerationError::InvalidConfig(errors) | GenerationError::InvalidWorkload(errors) => {
                errors
            }
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            GenerationError::InvalidConfig(_) => "configuration",
            GenerationError::InvalidWorkload(_) => "workload",
        };
        let messages: Vec<&str> = self.errors().iter().map(|e| e.message.as_str()).collect();
        write!(f, "invalid {what}: {}", messages.join("; "))
    }
}

impl std::error::Error for GenerationError {}

/// Builds weekly timetables from a workload.
///
/// # Example
///
/// ```
/// use u_timetable::availability::AvailabilityResolver;
/// use u_timetable::models::{TimetableConfig, WorkloadItem};
/// use u_timetable::scheduler::TimetableGenerator;
///
/// let workload = vec![
///     WorkloadItem::new("Ana", "1A", "Math", 4),
///     WorkloadItem::new("Rui", "1A", "History", 2),
/// ];
/// let generator = TimetableGenerator::new(TimetableConfig::default());
/// let result = generator
///     .generate(&workload, &AvailabilityResolver::default())
///     .unwrap();
///
/// assert!(result.success);
/// assert_eq!(result.timetable.count_lessons("Ana", "1A", "Math"), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimetableGenerator {
    config: TimetableConfig,
    settings: SolverSettings,
}

impl TimetableGenerator {
    /// Creates a generator with default solver settings.
    pub fn new(config: TimetableConfig) -> Self {
        Self {
            config,
            settings: SolverSettings::default(),
        }
    }

    /// Sets the solver settings.
    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn config(&self) -> &TimetableConfig {
        &self.config
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Generates a timetable.
    ///
    /// # Errors
    /// Returns [`GenerationError`] when the configuration or the workload is
    /// malformed. Demand that cannot be placed is reported in the result.
    pub fn generate(
        &self,
        workload: &[WorkloadItem],
        blocking: &dyn BlockingSource,
    ) -> Result<GenerationResult, GenerationError> {
        validate_config(&self.config).map_err(GenerationError::InvalidConfig)?;
        validate_workload(workload).map_err(GenerationError::InvalidWorkload)?;

        let class_names = classes(workload);
        let teacher_names = teachers(workload);
        info!(
            "Generating timetable: {} class(es), {} teacher(s), {} workload item(s), {} slot(s) per class",
            class_names.len(),
            teacher_names.len(),
            workload.len(),
            self.config.slots_per_class()
        );

        let mut workspace = Workspace::new(&self.config, &class_names, &teacher_names, blocking);

        let electives = allocate_electives(&mut workspace, workload, &self.config);

        let mut demands = rank_demands(&workspace, workload, &self.config);
        debug!("Ranked {} demand(s)", demands.len());
        place_pairs(&mut workspace, &mut demands);
        place_singles(&mut workspace, &mut demands);

        let repaired = repair(&mut workspace, &mut demands, &self.settings);

        // Reported in workload order, not ranking order
        let mut short: Vec<&Demand> = demands.iter().filter(|d| d.shortfall() > 0).collect();
        short.sort_by_key(|d| d.item_index);
        let conflicts: Vec<String> = short
            .into_iter()
            .map(|d| describe_shortfall(&workspace, d))
            .collect();

        let placed: u32 = demands.iter().map(|d| d.placed).sum();
        let expected: u32 = demands.iter().map(|d| d.required).sum();
        let stats = GenerationStats {
            repair_rounds: repaired.rounds,
            direct_fills: repaired.direct_fills,
            single_relocations: repaired.single_relocations,
            chain_relocations: repaired.chain_relocations,
            relaxed_placements: repaired.relaxed_placements,
            placed_lessons: placed,
            expected_lessons: expected,
            allocation_percent: percent(placed, expected),
            elective_items: electives.items,
            elective_classes: electives.classes,
        };

        let success = conflicts.is_empty();
        let message = summary_message(&stats, conflicts.len());
        info!(
            "Generation finished: {}/{} lesson(s) placed, {} conflict(s)",
            placed,
            expected,
            conflicts.len()
        );

        Ok(GenerationResult {
            success,
            message,
            conflicts,
            timetable: workspace.into_timetable(),
            stats,
        })
    }
}

fn percent(placed: u32, expected: u32) -> u32 {
    if expected == 0 {
        return 100;
    }
    (placed as f64 * 100.0 / expected as f64).round() as u32
}

fn summary_message(stats: &GenerationStats, conflicts: usize) -> String {
    let mut lines = Vec::new();
    if conflicts == 0 {
        lines.push("Timetable generated successfully.".to_string());
    } else {
        lines.push(format!("Timetable generated with {conflicts} conflict(s)."));
    }
    lines.push(format!(
        "Allocation: {}% ({}/{} lessons)",
        stats.allocation_percent, stats.placed_lessons, stats.expected_lessons
    ));
    if stats.elective_items > 0 {
        lines.push(format!(
            "{} elective item(s) placed in the reserved slots ({} class(es))",
            stats.elective_items, stats.elective_classes
        ));
    }
    lines.push(format!(
        "Repair: {} round(s), {} relocation(s), {} chain relocation(s), {} relaxed placement(s)",
        stats.repair_rounds,
        stats.single_relocations,
        stats.chain_relocations,
        stats.relaxed_placements
    ));
    lines.join("\n")
}
