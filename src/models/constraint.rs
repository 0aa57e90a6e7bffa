//! Time-availability constraints.
//!
//! Each record marks one `(day, period)` cell of one teacher, class, or
//! subject as unavailable (hard block), restricted (soft penalty), or
//! preferred. Cells without a record are implicitly preferred.
//!
//! Constraint records are owned by an external store and outlive any
//! generation run; the core only reads them through a [`ConstraintIndex`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::{Day, SlotKey};

/// Kind of entity a constraint applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Teacher,
    Class,
    Subject,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Teacher => "teacher",
            EntityKind::Class => "class",
            EntityKind::Subject => "subject",
        })
    }
}

/// A typed reference to a teacher, class, or subject.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn teacher(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Teacher, id)
    }

    pub fn class(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Class, id)
    }

    pub fn subject(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Subject, id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Constraint severity.
///
/// Ordered from weakest to strictest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Default for any cell without a record.
    #[default]
    Preferred,
    /// Allowed, but placement is penalized.
    Restricted,
    /// Never placed.
    Unavailable,
}

/// A stored availability record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConstraint {
    pub id: String,
    pub entity: EntityRef,
    pub day: Day,
    pub period: u8,
    pub constraint_type: ConstraintKind,
    pub reason: String,
}

impl TimeConstraint {
    pub fn new(
        id: impl Into<String>,
        entity: EntityRef,
        day: Day,
        period: u8,
        constraint_type: ConstraintKind,
    ) -> Self {
        Self {
            id: id.into(),
            entity,
            day,
            period,
            constraint_type,
            reason: String::new(),
        }
    }

    /// Creates an `unavailable` record.
    pub fn unavailable(id: impl Into<String>, entity: EntityRef, day: Day, period: u8) -> Self {
        Self::new(id, entity, day, period, ConstraintKind::Unavailable)
    }

    /// Creates a `restricted` record.
    pub fn restricted(id: impl Into<String>, entity: EntityRef, day: Day, period: u8) -> Self {
        Self::new(id, entity, day, period, ConstraintKind::Restricted)
    }

    /// Sets the human-readable reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Cell this record applies to.
    pub fn slot(&self) -> SlotKey {
        SlotKey::new(self.day, self.period)
    }
}

/// Lookup of constraint kinds by `(entity, slot)`.
///
/// When several records target the same cell, the strictest wins.
#[derive(Debug, Clone, Default)]
pub struct ConstraintIndex {
    entries: HashMap<EntityRef, HashMap<SlotKey, ConstraintKind>>,
}

impl ConstraintIndex {
    /// Indexes a list of records.
    pub fn new(constraints: &[TimeConstraint]) -> Self {
        let mut entries: HashMap<EntityRef, HashMap<SlotKey, ConstraintKind>> = HashMap::new();
        for c in constraints {
            let kind = entries
                .entry(c.entity.clone())
                .or_default()
                .entry(c.slot())
                .or_insert(c.constraint_type);
            *kind = (*kind).max(c.constraint_type);
        }
        Self { entries }
    }

    /// Effective kind for a cell; `Preferred` when no record exists.
    pub fn kind(&self, entity: &EntityRef, slot: SlotKey) -> ConstraintKind {
        self.entries
            .get(entity)
            .and_then(|cells| cells.get(&slot))
            .copied()
            .unwrap_or_default()
    }

    /// Whether the cell is hard-blocked for the entity.
    pub fn is_unavailable(&self, entity: &EntityRef, slot: SlotKey) -> bool {
        self.kind(entity, slot) == ConstraintKind::Unavailable
    }

    /// Number of indexed cells.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Whether no records were indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
