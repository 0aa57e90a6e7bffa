//! Teacher model.
//!
//! A teacher is the resource that performs lessons. Each teacher holds
//! one weekly grid; its education levels decide which classes it may
//! teach and which daily period template its grid follows.

use serde::{Deserialize, Serialize};

/// School education level.
///
/// Selects the daily period template and gates teacher/class pairings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    Primary,
    Middle,
    High,
}

/// A teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Branch tags (e.g. "Mathematics").
    pub branches: Vec<String>,
    /// Levels this teacher may teach. The first entry selects the
    /// teacher's period template.
    pub levels: Vec<EducationLevel>,
}

impl Teacher {
    /// Creates a teacher with no branches or levels.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            branches: Vec::new(),
            levels: Vec::new(),
        }
    }

    /// Sets the teacher name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a branch tag.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branches.push(branch.into());
        self
    }

    /// Adds an education level.
    pub fn with_level(mut self, level: EducationLevel) -> Self {
        if !self.levels.contains(&level) {
            self.levels.push(level);
        }
        self
    }

    /// Level whose period template the teacher's grid follows.
    pub fn primary_level(&self) -> Option<EducationLevel> {
        self.levels.first().copied()
    }

    /// Whether the teacher shares at least one level with `levels`.
    pub fn teaches_any_level(&self, levels: &[EducationLevel]) -> bool {
        self.levels.iter().any(|l| levels.contains(l))
    }

    /// Whether the teacher carries a branch tag.
    pub fn has_branch(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b == branch)
    }
}
