//! Blocking rules.
//!
//! A block forbids placement at some periods of one day, either for
//! everybody (global), for one teacher, or for one class. Area blocks are
//! not stored here; they reach the engine through
//! [`AreaBlocking`](crate::availability::AreaBlocking).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{TimeSlot, Weekday};

/// Who a block applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockScope {
    /// Every class and every teacher.
    Global,
    /// A single teacher (`target` = teacher name).
    Teacher,
    /// A single class (`target` = class name).
    Class,
}

/// A rule preventing placement at given periods of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block identifier (assigned by the resolver when empty).
    #[serde(default)]
    pub id: String,
    /// Scope of the block.
    pub scope: BlockScope,
    /// Teacher or class name; empty for global blocks.
    #[serde(default)]
    pub target: String,
    /// Blocked day.
    pub day: Weekday,
    /// Blocked period numbers.
    pub periods: BTreeSet<u32>,
    /// Optional human-readable reason (e.g., "Staff meeting").
    #[serde(default)]
    pub reason: Option<String>,
}

impl Block {
    fn new(
        scope: BlockScope,
        target: impl Into<String>,
        day: Weekday,
        periods: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            id: String::new(),
            scope,
            target: target.into(),
            day,
            periods: periods.into_iter().collect(),
            reason: None,
        }
    }

    /// Creates a global block.
    pub fn global(day: Weekday, periods: impl IntoIterator<Item = u32>) -> Self {
        Self::new(BlockScope::Global, "", day, periods)
    }

    /// Creates a teacher block.
    pub fn teacher(
        teacher: impl Into<String>,
        day: Weekday,
        periods: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self::new(BlockScope::Teacher, teacher, day, periods)
    }

    /// Creates a class block.
    pub fn class(
        class: impl Into<String>,
        day: Weekday,
        periods: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self::new(BlockScope::Class, class, day, periods)
    }

    /// Sets the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Whether this block covers a coordinate (ignoring scope).
    #[inline]
    pub fn covers(&self, slot: TimeSlot) -> bool {
        self.day == slot.day && self.periods.contains(&slot.period)
    }

    /// Whether this block applies to `scope`/`target` at a coordinate.
    #[inline]
    pub fn applies_to(&self, scope: BlockScope, target: &str, slot: TimeSlot) -> bool {
        self.scope == scope
            && (scope == BlockScope::Global || self.target == target)
            && self.covers(slot)
    }
}
