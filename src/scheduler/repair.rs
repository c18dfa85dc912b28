//! Conflict repair.
//!
//! Runs after the initial placement for demands that are still short.
//!
//! # Algorithm
//!
//! Bounded rounds; each round walks every short demand over every slot of
//! its class (day × period order) and tries, in order:
//!
//! 1. **Direct fill**: empty cell, teacher free.
//! 2. **Single relocation**: empty cell, but the teacher teaches another
//!    class there. Move that lesson to another open slot of its class.
//! 3. **Chain relocation**: the cell holds another subject and the teacher
//!    is free. Move the occupant to an open slot of the same class (one
//!    hop), or move the occupant of that destination first (two hops).
//!
//! Rounds stop when one makes no progress or the round cap is hit. Every
//! multi-cell move is staged on a move overlay and applied as a single
//! commit. Pinned elective cells never move. All moves
//! keep the three-in-a-row rule; only the final relaxation may break it.

use log::{debug, trace};

use super::generator::{RelaxationPolicy, SolverSettings};
use super::placement::Demand;
use super::workspace::{GridView, MoveOverlay, SlotCommit, Workspace};

/// Counters reported by the repair phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RepairStats {
    pub rounds: u32,
    pub direct_fills: u32,
    pub single_relocations: u32,
    pub chain_relocations: u32,
    pub relaxed_placements: u32,
}

/// Runs the repair rounds and the relaxation phase.
pub(crate) fn repair(
    workspace: &mut Workspace,
    demands: &mut [Demand],
    settings: &SolverSettings,
) -> RepairStats {
    let mut stats = RepairStats::default();

    while stats.rounds < settings.max_repair_rounds {
        if demands.iter().all(|d| d.shortfall() == 0) {
            break;
        }
        stats.rounds += 1;
        let progress = repair_round(workspace, demands, settings, &mut stats);
        debug!(
            "Repair round {}: {} short demand(s) left",
            stats.rounds,
            demands.iter().filter(|d| d.shortfall() > 0).count()
        );
        if !progress {
            break;
        }
    }

    relax(workspace, demands, settings.relaxation, &mut stats);
    stats
}

fn repair_round(
    workspace: &mut Workspace,
    demands: &mut [Demand],
    settings: &SolverSettings,
    stats: &mut RepairStats,
) -> bool {
    let mut progress = false;

    for demand in demands.iter_mut() {
        let (class, teacher) = (demand.class_id, demand.teacher_id);
        for slot in 0..workspace.slots_per_class() {
            if demand.shortfall() == 0 {
                break;
            }
            if workspace.class_blocked(class, slot)
                || workspace.teacher_blocked(teacher, slot)
                || workspace.is_pinned(class, slot)
            {
                continue;
            }

            let other_subject = workspace
                .lesson(class, slot)
                .map(|l| l.subject != demand.subject);
            let commit = match (other_subject, workspace.teacher_at(teacher, slot)) {
                (None, None) => {
                    if workspace.creates_run(class, slot, &demand.subject) {
                        continue;
                    }
                    workspace.write(class, slot, Some(demand.lesson()));
                    stats.direct_fills += 1;
                    None
                }
                (None, Some(busy_in)) if busy_in != class => {
                    let Some(commit) = single_relocation(workspace, demand, slot, busy_in) else {
                        continue;
                    };
                    stats.single_relocations += 1;
                    Some(commit)
                }
                (Some(true), None) => {
                    if stats.chain_relocations >= settings.max_chain_relocations {
                        continue;
                    }
                    let Some((commit, hops)) = chain_relocation(workspace, demand, slot) else {
                        continue;
                    };
                    trace!(
                        "Chain relocation ({hops} hop(s), {} write(s)) frees {} in class {} for {}",
                        commit.writes().len(),
                        workspace.timetable().time_slot(slot),
                        demand.class,
                        demand.subject
                    );
                    stats.chain_relocations += 1;
                    Some(commit)
                }
                _ => continue,
            };

            if let Some(commit) = commit {
                workspace.apply(commit);
            }
            demand.placed += 1;
            progress = true;
        }
    }
    progress
}

/// Moves the teacher's lesson out of `busy_in` at `slot`, then places the
/// demand's lesson there.
fn single_relocation(
    workspace: &Workspace,
    demand: &Demand,
    slot: usize,
    busy_in: usize,
) -> Option<SlotCommit> {
    if workspace.is_pinned(busy_in, slot) {
        return None;
    }
    let mut overlay = workspace.overlay();
    let moved = overlay.clear(busy_in, slot)?;
    if !moved.has_teacher(&demand.teacher) {
        return None;
    }

    let subject = moved.subject.clone();
    let destination = (0..workspace.slots_per_class())
        .find(|&s| s != slot && overlay.can_host(busy_in, s, demand.teacher_id, &subject))?;
    overlay.place(busy_in, destination, moved);

    finish(overlay, demand, slot)
}

/// Frees `slot` in the demand's class by moving its occupant, directly or
/// through a second hop. Returns the commit and the hop count.
fn chain_relocation(
    workspace: &Workspace,
    demand: &Demand,
    slot: usize,
) -> Option<(SlotCommit, u32)> {
    let class = demand.class_id;
    let slots = workspace.slots_per_class();

    let mut overlay = workspace.overlay();
    let first = overlay.clear(class, slot)?;
    let first_teacher = first
        .teachers
        .first()
        .and_then(|name| workspace.teacher_id(name))?;

    // One hop
    for s2 in (0..slots).filter(|&s| s != slot) {
        if !overlay.can_host(class, s2, first_teacher, &first.subject) {
            continue;
        }
        let mut attempt = overlay.clone();
        attempt.place(class, s2, first.clone());
        if let Some(commit) = finish(attempt, demand, slot) {
            return Some((commit, 1));
        }
    }

    // Two hops
    for s2 in (0..slots).filter(|&s| s != slot) {
        if workspace.is_pinned(class, s2) || workspace.class_blocked(class, s2) {
            continue;
        }
        let Some(second) = overlay.lesson(class, s2).cloned() else {
            continue;
        };
        let Some(second_teacher) = second
            .teachers
            .first()
            .and_then(|name| workspace.teacher_id(name))
        else {
            continue;
        };

        let mut cleared = overlay.clone();
        cleared.clear(class, s2);
        if !cleared.teacher_available(first_teacher, s2) {
            continue;
        }

        for s3 in (0..slots).filter(|&s| s != slot && s != s2) {
            if !cleared.can_host(class, s3, second_teacher, &second.subject) {
                continue;
            }
            let mut attempt = cleared.clone();
            attempt.place(class, s3, second.clone());
            if !attempt.can_host(class, s2, first_teacher, &first.subject) {
                continue;
            }
            attempt.place(class, s2, first.clone());
            if let Some(commit) = finish(attempt, demand, slot) {
                return Some((commit, 2));
            }
        }
    }
    None
}

/// Places the demand's lesson at `slot` if the staged state allows it.
fn finish(mut overlay: MoveOverlay<'_>, demand: &Demand, slot: usize) -> Option<SlotCommit> {
    if !overlay.can_host(demand.class_id, slot, demand.teacher_id, &demand.subject) {
        return None;
    }
    overlay.place(demand.class_id, slot, demand.lesson());
    Some(overlay.into_commit())
}

/// Last resort: fill any open, teacher-available cell even if it makes
/// three consecutive periods of the subject.
fn relax(
    workspace: &mut Workspace,
    demands: &mut [Demand],
    policy: RelaxationPolicy,
    stats: &mut RepairStats,
) {
    let mut budget = match policy {
        RelaxationPolicy::Disabled => return,
        RelaxationPolicy::Unbounded => u32::MAX,
        RelaxationPolicy::Limited(n) => n,
    };

    for demand in demands.iter_mut() {
        for slot in 0..workspace.slots_per_class() {
            if demand.shortfall() == 0 {
                break;
            }
            if budget == 0 {
                return;
            }
            if workspace.is_open(demand.class_id, slot)
                && workspace.teacher_available(demand.teacher_id, slot)
            {
                workspace.write(demand.class_id, slot, Some(demand.lesson()));
                demand.placed += 1;
                stats.relaxed_placements += 1;
                budget -= 1;
            }
        }
    }
    if stats.relaxed_placements > 0 {
        debug!(
            "Relaxation placed {} lesson(s) breaking the consecutive-period rule",
            stats.relaxed_placements
        );
    }
}

/// Human-readable conflict line for a demand that is still short.
///
/// Counts every slot of the class once, in this order: blocked for the
/// class, blocked for the teacher, teacher busy in another class, free.
pub(crate) fn describe_shortfall(workspace: &Workspace, demand: &Demand) -> String {
    let (class, teacher) = (demand.class_id, demand.teacher_id);
    let (mut class_blocked, mut teacher_blocked, mut busy, mut free) = (0, 0, 0, 0);

    for slot in 0..workspace.slots_per_class() {
        if workspace.class_blocked(class, slot) {
            class_blocked += 1;
        } else if workspace.teacher_blocked(teacher, slot) {
            teacher_blocked += 1;
        } else if workspace
            .teacher_at(teacher, slot)
            .is_some_and(|c| c != class)
        {
            busy += 1;
        } else if workspace.is_open(class, slot) {
            free += 1;
        }
    }

    let mut causes = Vec::new();
    if teacher_blocked > 0 {
        causes.push(format!("{teacher_blocked} slot(s) blocked for the teacher (ATPC/area)"));
    }
    if busy > 0 {
        causes.push(format!("teacher busy in {busy} slot(s) in other classes"));
    }
    if class_blocked > 0 {
        causes.push(format!("{class_blocked} class slot(s) blocked"));
    }
    if free == 0 {
        causes.push("impossible: no free slot left".to_string());
    }

    let detail = if causes.is_empty() {
        String::new()
    } else {
        format!(" [{}]", causes.join("; "))
    };
    format!(
        "{} ({}) - {}: {} lesson(s) missing{}",
        demand.subject,
        demand.teacher,
        demand.class,
        demand.shortfall(),
        detail
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityResolver;
    use crate::models::{Block, Lesson, TimeSlot, TimetableConfig, Weekday, WorkloadItem};
    use crate::scheduler::placement::rank_demands;

    fn setup(
        config: &TimetableConfig,
        blocks: Vec<Block>,
        workload: &[WorkloadItem],
    ) -> (Workspace, Vec<Demand>) {
        let resolver = AvailabilityResolver::new(blocks);
        let ws = Workspace::new(
            config,
            &crate::models::classes(workload),
            &crate::models::teachers(workload),
            &resolver,
        );
        let demands = rank_demands(&ws, workload, config);
        (ws, demands)
    }

    fn demand_for<'d>(demands: &'d mut [Demand], subject: &str) -> &'d mut Demand {
        demands.iter_mut().find(|d| d.subject == subject).unwrap()
    }

    #[test]
    fn test_direct_fill() {
        let config = TimetableConfig::new(vec![Weekday::Monday], 3);
        let workload = vec![WorkloadItem::new("Ana", "1A", "Math", 2)];
        let (mut ws, mut demands) = setup(&config, vec![], &workload);

        let stats = repair(&mut ws, &mut demands, &SolverSettings::default());
        assert_eq!(stats.direct_fills, 2);
        assert_eq!(stats.rounds, 1);
        assert_eq!(demands[0].shortfall(), 0);
    }

    #[test]
    fn test_single_relocation_moves_other_class_lesson() {
        // One day, two periods. Ana teaches 1B at period 1, 1A needs her
        // and only has period 1 open.
        let config = TimetableConfig::new(vec![Weekday::Monday], 2);
        let workload = vec![
            WorkloadItem::new("Ana", "1A", "Math", 1),
            WorkloadItem::new("Ana", "1B", "Math", 1),
            WorkloadItem::new("Rui", "1A", "Art", 1),
        ];
        let (mut ws, mut demands) = setup(&config, vec![], &workload);
        let b = ws.class_id("1B").unwrap();
        let a = ws.class_id("1A").unwrap();
        ws.write(b, 0, Some(Lesson::new("1B", "Math", "Ana")));
        ws.write(a, 1, Some(Lesson::new("1A", "Art", "Rui")));
        demand_for(&mut demands, "Art").placed = 1;
        demands
            .iter_mut()
            .find(|d| d.class == "1B")
            .unwrap()
            .placed = 1;

        let stats = repair(&mut ws, &mut demands, &SolverSettings::default());
        assert_eq!(stats.single_relocations, 1);
        let tt = ws.timetable();
        assert_eq!(tt.lesson("1A", TimeSlot::new(Weekday::Monday, 1)).unwrap().subject, "Math");
        assert_eq!(tt.lesson("1B", TimeSlot::new(Weekday::Monday, 2)).unwrap().subject, "Math");
        assert!(tt.lesson("1B", TimeSlot::new(Weekday::Monday, 1)).is_none());
    }

    #[test]
    fn test_chain_relocation_one_hop() {
        // Rui (Art) sits at period 1; Ana is blocked at period 2, so the
        // only way in is to push Art to period 2.
        let config = TimetableConfig::new(vec![Weekday::Monday], 2);
        let workload = vec![
            WorkloadItem::new("Ana", "1A", "Math", 1),
            WorkloadItem::new("Rui", "1A", "Art", 1),
        ];
        let (mut ws, mut demands) = setup(
            &config,
            vec![Block::teacher("Ana", Weekday::Monday, [2])],
            &workload,
        );
        let a = ws.class_id("1A").unwrap();
        ws.write(a, 0, Some(Lesson::new("1A", "Art", "Rui")));
        demand_for(&mut demands, "Art").placed = 1;

        let stats = repair(&mut ws, &mut demands, &SolverSettings::default());
        assert_eq!(stats.chain_relocations, 1);
        let tt = ws.timetable();
        assert_eq!(tt.lesson("1A", TimeSlot::new(Weekday::Monday, 1)).unwrap().subject, "Math");
        assert_eq!(tt.lesson("1A", TimeSlot::new(Weekday::Monday, 2)).unwrap().subject, "Art");
    }

    #[test]
    fn test_chain_relocation_two_hops() {
        // Three periods. Art at 1, History at 2, period 3 open.
        // Ana blocked at 2 and 3; Rui (Art) blocked at 3; Bia (History) free.
        // Math needs period 1: History 2 -> 3, Art 1 -> 2, Math -> 1.
        let config = TimetableConfig::new(vec![Weekday::Monday], 3);
        let workload = vec![
            WorkloadItem::new("Ana", "1A", "Math", 1),
            WorkloadItem::new("Rui", "1A", "Art", 1),
            WorkloadItem::new("Bia", "1A", "History", 1),
        ];
        let (mut ws, mut demands) = setup(
            &config,
            vec![
                Block::teacher("Ana", Weekday::Monday, [2, 3]),
                Block::teacher("Rui", Weekday::Monday, [3]),
            ],
            &workload,
        );
        let a = ws.class_id("1A").unwrap();
        ws.write(a, 0, Some(Lesson::new("1A", "Art", "Rui")));
        ws.write(a, 1, Some(Lesson::new("1A", "History", "Bia")));
        demand_for(&mut demands, "Art").placed = 1;
        demand_for(&mut demands, "History").placed = 1;

        let stats = repair(&mut ws, &mut demands, &SolverSettings::default());
        assert_eq!(stats.chain_relocations, 1);
        let tt = ws.timetable();
        let subject = |p| tt.lesson("1A", TimeSlot::new(Weekday::Monday, p)).unwrap().subject.clone();
        assert_eq!(subject(1), "Math");
        assert_eq!(subject(2), "Art");
        assert_eq!(subject(3), "History");
    }

    #[test]
    fn test_pinned_cells_never_move() {
        let config = TimetableConfig::new(vec![Weekday::Monday], 1);
        let workload = vec![
            WorkloadItem::new("Ana", "1A", "Math", 1),
            WorkloadItem::new("Rui", "1A", "ELECTIVE Chess", 1),
        ];
        let (mut ws, mut demands) = setup(&config, vec![], &workload);
        let a = ws.class_id("1A").unwrap();
        ws.write(a, 0, Some(Lesson::new("1A", "ELECTIVE Chess", "Rui")));
        ws.pin(a, 0);

        let stats = repair(&mut ws, &mut demands, &SolverSettings::default());
        assert_eq!(stats.chain_relocations, 0);
        assert_eq!(demands[0].shortfall(), 1);
        assert_eq!(ws.lesson(a, 0).unwrap().subject, "ELECTIVE Chess");
    }

    #[test]
    fn test_relaxation_policy() {
        // Four periods, Math needs all four: the rule allows only three.
        let config = TimetableConfig::new(vec![Weekday::Monday], 4);
        let workload = vec![WorkloadItem::new("Ana", "1A", "Math", 4)];

        let (mut ws, mut demands) = setup(&config, vec![], &workload);
        let settings = SolverSettings::default().with_relaxation(RelaxationPolicy::Disabled);
        let stats = repair(&mut ws, &mut demands, &settings);
        assert_eq!(stats.relaxed_placements, 0);
        assert_eq!(demands[0].shortfall(), 1);

        let (mut ws, mut demands) = setup(&config, vec![], &workload);
        let stats = repair(&mut ws, &mut demands, &SolverSettings::default());
        assert_eq!(stats.relaxed_placements, 1);
        assert_eq!(demands[0].shortfall(), 0);
    }

    #[test]
    fn test_describe_shortfall() {
        let config = TimetableConfig::new(vec![Weekday::Monday], 3);
        let workload = vec![WorkloadItem::new("Ana", "1A", "Math", 4)];
        let (mut ws, mut demands) = setup(
            &config,
            vec![
                Block::teacher("Ana", Weekday::Monday, [1]),
                Block::class("1A", Weekday::Monday, [2]),
            ],
            &workload,
        );
        repair(&mut ws, &mut demands, &SolverSettings::default());

        let line = describe_shortfall(&ws, &demands[0]);
        assert_eq!(
            line,
            "Math (Ana) - 1A: 3 lesson(s) missing \
             [1 slot(s) blocked for the teacher (ATPC/area); 1 class slot(s) blocked; \
             impossible: no free slot left]"
        );
    }
}
