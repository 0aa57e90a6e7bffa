//! Class (student group) model.
//!
//! A class lists which teacher teaches which subjects to it. These
//! assignments are the authoritative source for building placement tasks.

use serde::{Deserialize, Serialize};

use super::EducationLevel;

/// A teacher → subjects assignment within a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAssignment {
    pub teacher_id: String,
    pub subject_ids: Vec<String>,
}

impl ClassAssignment {
    pub fn new(teacher_id: impl Into<String>, subject_ids: Vec<String>) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            subject_ids,
        }
    }
}

/// A class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolClass {
    /// Unique class identifier.
    pub id: String,
    /// Human-readable name (e.g. "9-A").
    pub name: String,
    /// Levels of the class. The first entry selects its period template.
    pub levels: Vec<EducationLevel>,
    /// Teacher/subject assignments.
    pub assignments: Vec<ClassAssignment>,
}

impl SchoolClass {
    /// Creates a class with no levels or assignments.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            levels: Vec::new(),
            assignments: Vec::new(),
        }
    }

    /// Sets the class name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an education level.
    pub fn with_level(mut self, level: EducationLevel) -> Self {
        if !self.levels.contains(&level) {
            self.levels.push(level);
        }
        self
    }

    /// Assigns subjects to a teacher.
    pub fn with_assignment<I, S>(mut self, teacher_id: impl Into<String>, subject_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assignments.push(ClassAssignment::new(
            teacher_id,
            subject_ids.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Level whose period template the class follows.
    pub fn primary_level(&self) -> Option<EducationLevel> {
        self.levels.first().copied()
    }

    /// Teacher assigned to `subject_id`, first match wins.
    pub fn teacher_for(&self, subject_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.subject_ids.iter().any(|s| s == subject_id))
            .map(|a| a.teacher_id.as_str())
    }
}
