//! Availability resolution.
//!
//! Answers "is coordinate S blocked for class C / teacher T?" by combining
//! global, class-scoped and teacher-scoped [`Block`]s with an injected
//! area predicate.
//!
//! # Precedence
//! - Global blocks are checked first and win.
//! - Class queries: global, then class blocks.
//! - Teacher queries: global, then teacher blocks, then the area predicate
//!   (lowest precedence).
//!
//! The engine and the analyzers only see the [`BlockingSource`] trait, so
//! how areas or blocks are stored stays outside the core.

mod areas;

pub use areas::{AreaBlock, KnowledgeArea, KnowledgeAreas};

use std::fmt;

use crate::models::{Block, BlockScope, TimeSlot, TimetableConfig};

/// Reason reported for area blocks when the predicate gives none.
pub const DEFAULT_AREA_REASON: &str = "area ATPC";

/// Outcome of a blocking query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockStatus {
    pub blocked: bool,
    pub reason: Option<String>,
}

impl BlockStatus {
    /// Not blocked.
    pub fn open() -> Self {
        Self::default()
    }

    /// Blocked with an optional reason.
    pub fn blocked(reason: Option<String>) -> Self {
        Self {
            blocked: true,
            reason,
        }
    }
}

/// Capability interface for blocking queries.
///
/// Implemented by [`AvailabilityResolver`]; callers with their own block
/// storage can implement it directly.
pub trait BlockingSource {
    /// Blocking status of a class cell (global and class blocks).
    fn class_status(&self, class: &str, slot: TimeSlot) -> BlockStatus;

    /// Blocking status of a teacher (global, teacher and area blocks).
    fn teacher_status(&self, teacher: &str, slot: TimeSlot) -> BlockStatus;

    /// Area-derived status of a teacher alone.
    fn area_status(&self, _teacher: &str, _slot: TimeSlot) -> BlockStatus {
        BlockStatus::open()
    }

    /// Shorthand for `class_status(..).blocked`.
    fn is_class_blocked(&self, class: &str, slot: TimeSlot) -> bool {
        self.class_status(class, slot).blocked
    }

    /// Shorthand for `teacher_status(..).blocked`.
    fn is_teacher_blocked(&self, teacher: &str, slot: TimeSlot) -> bool {
        self.teacher_status(teacher, slot).blocked
    }
}

/// Injected area predicate pair.
pub trait AreaBlocking {
    /// Whether the teacher's area blocks the coordinate.
    fn is_teacher_blocked(&self, teacher: &str, slot: TimeSlot) -> bool;

    /// Reason for the area block, if the source has one.
    fn reason(&self, _teacher: &str, _slot: TimeSlot) -> Option<String> {
        None
    }
}

/// Area source that never blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAreaBlocking;

impl AreaBlocking for NoAreaBlocking {
    fn is_teacher_blocked(&self, _teacher: &str, _slot: TimeSlot) -> bool {
        false
    }
}

fn no_reason(_teacher: &str, _slot: TimeSlot) -> Option<String> {
    None
}

/// Area source built from two closures.
///
/// # Example
/// ```
/// use u_timetable::availability::{AreaBlocking, FnAreaBlocking};
/// use u_timetable::models::{TimeSlot, Weekday};
///
/// let area = FnAreaBlocking::new(|teacher, slot| teacher == "Ana" && slot.period == 1)
///     .with_reason(|_, _| Some("Sciences meeting".to_string()));
/// let slot = TimeSlot::new(Weekday::Monday, 1);
/// assert!(area.is_teacher_blocked("Ana", slot));
/// assert_eq!(area.reason("Ana", slot).as_deref(), Some("Sciences meeting"));
/// ```
pub struct FnAreaBlocking<F, R> {
    blocked: F,
    reason: R,
}

impl<F> FnAreaBlocking<F, fn(&str, TimeSlot) -> Option<String>>
where
    F: Fn(&str, TimeSlot) -> bool,
{
    /// Creates an area source from a blocking predicate.
    pub fn new(blocked: F) -> Self {
        Self {
            blocked,
            reason: no_reason,
        }
    }
}

impl<F, R> FnAreaBlocking<F, R> {
    /// Sets the reason function.
    pub fn with_reason<R2>(self, reason: R2) -> FnAreaBlocking<F, R2>
    where
        R2: Fn(&str, TimeSlot) -> Option<String>,
    {
        FnAreaBlocking {
            blocked: self.blocked,
            reason,
        }
    }
}

impl<F, R> AreaBlocking for FnAreaBlocking<F, R>
where
    F: Fn(&str, TimeSlot) -> bool,
    R: Fn(&str, TimeSlot) -> Option<String>,
{
    fn is_teacher_blocked(&self, teacher: &str, slot: TimeSlot) -> bool {
        (self.blocked)(teacher, slot)
    }

    fn reason(&self, teacher: &str, slot: TimeSlot) -> Option<String> {
        (self.reason)(teacher, slot)
    }
}

/// Standard [`BlockingSource`]: a block list plus an area source.
///
/// # Example
/// ```
/// use u_timetable::availability::{AvailabilityResolver, BlockingSource};
/// use u_timetable::models::{Block, TimeSlot, Weekday};
///
/// let resolver = AvailabilityResolver::new(vec![
///     Block::global(Weekday::Monday, [1]).with_reason("Assembly"),
///     Block::teacher("Ana", Weekday::Tuesday, [2, 3]),
/// ]);
/// let status = resolver.class_status("1A", TimeSlot::new(Weekday::Monday, 1));
/// assert!(status.blocked);
/// assert_eq!(status.reason.as_deref(), Some("Assembly"));
/// assert!(resolver.is_teacher_blocked("Ana", TimeSlot::new(Weekday::Tuesday, 3)));
/// ```
pub struct AvailabilityResolver {
    blocks: Vec<Block>,
    area: Box<dyn AreaBlocking>,
    next_id: u64,
}

impl AvailabilityResolver {
    /// Creates a resolver without area blocking.
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut resolver = Self {
            blocks: Vec::with_capacity(blocks.len()),
            area: Box::new(NoAreaBlocking),
            next_id: 1,
        };
        for block in blocks {
            resolver.add_block(block);
        }
        resolver
    }

    /// Sets the area source.
    pub fn with_area_blocking(mut self, area: impl AreaBlocking + 'static) -> Self {
        self.area = Box::new(area);
        self
    }

    /// Current blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Adds a block, assigning an identifier when it has none.
    ///
    /// Returns the block identifier.
    pub fn add_block(&mut self, mut block: Block) -> String {
        if block.id.is_empty() {
            block.id = format!("block-{}", self.next_id);
            self.next_id += 1;
        }
        let id = block.id.clone();
        self.blocks.push(block);
        id
    }

    /// Removes a block by identifier.
    pub fn remove_block(&mut self, id: &str) -> Option<Block> {
        let pos = self.blocks.iter().position(|b| b.id == id)?;
        Some(self.blocks.remove(pos))
    }

    /// Generic query: `scope` selects the rule set, `id` names the teacher
    /// or class (ignored for global).
    pub fn is_blocked(&self, scope: BlockScope, id: &str, slot: TimeSlot) -> BlockStatus {
        match scope {
            BlockScope::Global => self.scoped(BlockScope::Global, "", slot),
            BlockScope::Class => self.class_status(id, slot),
            BlockScope::Teacher => self.teacher_status(id, slot),
        }
    }

    /// Number of coordinates of the configured week where `teacher` is blocked.
    pub fn teacher_blocked_count(&self, teacher: &str, config: &TimetableConfig) -> usize {
        config
            .slots()
            .filter(|&slot| self.is_teacher_blocked(teacher, slot))
            .count()
    }

    fn scoped(&self, scope: BlockScope, target: &str, slot: TimeSlot) -> BlockStatus {
        self.blocks
            .iter()
            .find(|b| b.applies_to(scope, target, slot))
            .map(|b| BlockStatus::blocked(b.reason.clone()))
            .unwrap_or_default()
    }
}

impl BlockingSource for AvailabilityResolver {
    fn class_status(&self, class: &str, slot: TimeSlot) -> BlockStatus {
        let global = self.scoped(BlockScope::Global, "", slot);
        if global.blocked {
            return global;
        }
        self.scoped(BlockScope::Class, class, slot)
    }

    fn teacher_status(&self, teacher: &str, slot: TimeSlot) -> BlockStatus {
        let global = self.scoped(BlockScope::Global, "", slot);
        if global.blocked {
            return global;
        }
        let own = self.scoped(BlockScope::Teacher, teacher, slot);
        if own.blocked {
            return own;
        }
        self.area_status(teacher, slot)
    }

    fn area_status(&self, teacher: &str, slot: TimeSlot) -> BlockStatus {
        if !self.area.is_teacher_blocked(teacher, slot) {
            return BlockStatus::open();
        }
        let reason = self
            .area
            .reason(teacher, slot)
            .unwrap_or_else(|| DEFAULT_AREA_REASON.to_string());
        BlockStatus::blocked(Some(reason))
    }
}

impl fmt::Debug for AvailabilityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvailabilityResolver")
            .field("blocks", &self.blocks)
            .finish_non_exhaustive()
    }
}

impl Default for AvailabilityResolver {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday;

    fn slot(day: Weekday, period: u32) -> TimeSlot {
        TimeSlot::new(day, period)
    }

    #[test]
    fn test_global_wins_over_specific() {
        let resolver = AvailabilityResolver::new(vec![
            Block::class("1A", Weekday::Monday, [1]).with_reason("class"),
            Block::global(Weekday::Monday, [1]).with_reason("global"),
        ]);
        let status = resolver.class_status("1A", slot(Weekday::Monday, 1));
        assert_eq!(status.reason.as_deref(), Some("global"));
    }

    #[test]
    fn test_class_and_teacher_scopes_are_separate() {
        let resolver = AvailabilityResolver::new(vec![
            Block::class("1A", Weekday::Monday, [2]),
            Block::teacher("Ana", Weekday::Monday, [3]),
        ]);
        assert!(resolver.is_class_blocked("1A", slot(Weekday::Monday, 2)));
        assert!(!resolver.is_class_blocked("1B", slot(Weekday::Monday, 2)));
        assert!(!resolver.is_teacher_blocked("Ana", slot(Weekday::Monday, 2)));
        assert!(resolver.is_teacher_blocked("Ana", slot(Weekday::Monday, 3)));
        assert!(!resolver.is_class_blocked("1A", slot(Weekday::Monday, 3)));
    }

    #[test]
    fn test_area_has_lowest_precedence() {
        let resolver = AvailabilityResolver::new(vec![
            Block::teacher("Ana", Weekday::Friday, [1]).with_reason("personal"),
        ])
        .with_area_blocking(FnAreaBlocking::new(|t, s| t == "Ana" && s.day == Weekday::Friday));

        let own = resolver.teacher_status("Ana", slot(Weekday::Friday, 1));
        assert_eq!(own.reason.as_deref(), Some("personal"));

        let area = resolver.teacher_status("Ana", slot(Weekday::Friday, 2));
        assert!(area.blocked);
        assert_eq!(area.reason.as_deref(), Some(DEFAULT_AREA_REASON));

        // Area blocks never affect classes
        assert!(!resolver.is_class_blocked("1A", slot(Weekday::Friday, 2)));
    }

    #[test]
    fn test_area_reason_from_predicate() {
        let resolver = AvailabilityResolver::default().with_area_blocking(
            FnAreaBlocking::new(|_, s| s.period == 4).with_reason(|_, _| Some("ATPC".into())),
        );
        let status = resolver.teacher_status("Rui", slot(Weekday::Monday, 4));
        assert_eq!(status.reason.as_deref(), Some("ATPC"));
    }

    #[test]
    fn test_is_blocked_generic_query() {
        let resolver = AvailabilityResolver::new(vec![
            Block::global(Weekday::Tuesday, [5]),
            Block::teacher("Ana", Weekday::Tuesday, [6]),
        ]);
        let s5 = slot(Weekday::Tuesday, 5);
        let s6 = slot(Weekday::Tuesday, 6);
        assert!(resolver.is_blocked(BlockScope::Global, "", s5).blocked);
        assert!(!resolver.is_blocked(BlockScope::Global, "", s6).blocked);
        assert!(resolver.is_blocked(BlockScope::Teacher, "Ana", s6).blocked);
        assert!(resolver.is_blocked(BlockScope::Class, "1A", s5).blocked);
    }

    #[test]
    fn test_add_and_remove_blocks() {
        let mut resolver = AvailabilityResolver::default();
        let id = resolver.add_block(Block::global(Weekday::Monday, [1]));
        let named = resolver.add_block(Block::global(Weekday::Monday, [2]).with_id("custom"));
        assert_eq!(id, "block-1");
        assert_eq!(named, "custom");
        assert_eq!(resolver.blocks().len(), 2);

        assert!(resolver.remove_block("block-1").is_some());
        assert!(resolver.remove_block("block-1").is_none());
        assert!(!resolver.is_class_blocked("1A", slot(Weekday::Monday, 1)));
        assert!(resolver.is_class_blocked("1A", slot(Weekday::Monday, 2)));
    }

    #[test]
    fn test_teacher_blocked_count() {
        let config = TimetableConfig::new(Weekday::school_week(), 4);
        let resolver = AvailabilityResolver::new(vec![
            Block::global(Weekday::Monday, [1]),
            Block::teacher("Ana", Weekday::Monday, [1, 2]),
            Block::teacher("Ana", Weekday::Friday, [4]),
        ]);
        assert_eq!(resolver.teacher_blocked_count("Ana", &config), 3);
        assert_eq!(resolver.teacher_blocked_count("Rui", &config), 1);
    }
}
