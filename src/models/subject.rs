//! Subject model and weekly distribution patterns.
//!
//! A subject carries a weekly hour quota and, optionally, a distribution
//! pattern describing how those hours are split into contiguous blocks
//! across the week (e.g. `"2+2+1"` for a 5-hour subject).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::EducationLevel;

/// A subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Branch (e.g. "Mathematics").
    pub branch: String,
    /// Levels at which the subject is taught.
    pub levels: Vec<EducationLevel>,
    /// Required lesson hours per week.
    pub weekly_hours: u8,
    /// Block pattern such as `"2+2+1"`.
    pub distribution_pattern: Option<String>,
}

impl Subject {
    /// Creates a subject with the given weekly quota.
    pub fn new(id: impl Into<String>, weekly_hours: u8) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            branch: String::new(),
            levels: Vec::new(),
            weekly_hours,
            distribution_pattern: None,
        }
    }

    /// Sets the subject name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Adds an education level.
    pub fn with_level(mut self, level: EducationLevel) -> Self {
        if !self.levels.contains(&level) {
            self.levels.push(level);
        }
        self
    }

    /// Sets the distribution pattern.
    pub fn with_distribution(mut self, pattern: impl Into<String>) -> Self {
        self.distribution_pattern = Some(pattern.into());
        self
    }
}

/// Ordered block sizes (in periods) of a weekly distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    blocks: Vec<u8>,
}

/// Why a distribution pattern could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributionError {
    /// Pattern contained no blocks.
    #[error("pattern has no blocks")]
    Empty,
    /// A block was not a positive integer.
    #[error("'{0}' is not a positive block size")]
    InvalidBlock(String),
}

impl Distribution {
    /// Block separator used in stored patterns.
    pub const SEPARATOR: char = '+';

    /// Creates a distribution from block sizes.
    ///
    /// Returns `None` if empty or any block is zero.
    pub fn new(blocks: Vec<u8>) -> Option<Self> {
        if blocks.is_empty() || blocks.contains(&0) {
            None
        } else {
            Some(Self { blocks })
        }
    }

    /// Parses a pattern such as `"2+2+1"`. Commas and whitespace are
    /// accepted as separators too.
    pub fn parse(pattern: &str) -> Result<Self, DistributionError> {
        let mut blocks = Vec::new();
        for part in pattern
            .split(|c: char| c == Self::SEPARATOR || c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
        {
            match part.parse::<u8>() {
                Ok(n) if n > 0 => blocks.push(n),
                _ => return Err(DistributionError::InvalidBlock(part.to_string())),
            }
        }
        if blocks.is_empty() {
            return Err(DistributionError::Empty);
        }
        Ok(Self { blocks })
    }

    /// Block sizes in order.
    pub fn blocks(&self) -> &[u8] {
        &self.blocks
    }

    /// Total hours covered by the pattern.
    pub fn total_hours(&self) -> u32 {
        self.blocks.iter().map(|&b| b as u32).sum()
    }

    /// Largest block.
    pub fn largest_block(&self) -> u8 {
        self.blocks.iter().copied().max().unwrap_or(0)
    }

    /// Whether the blocks sum exactly to `weekly_hours`.
    pub fn matches(&self, weekly_hours: u8) -> bool {
        self.total_hours() == weekly_hours as u32
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.blocks.iter().map(|b| b.to_string()).collect();
        f.write_str(&parts.join("+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_builder() {
        let s = Subject::new("MATH", 5)
            .with_name("Mathematics")
            .with_branch("Mathematics")
            .with_level(EducationLevel::High)
            .with_distribution("2+2+1");
        assert_eq!(s.weekly_hours, 5);
        assert_eq!(s.levels, vec![EducationLevel::High]);
        assert_eq!(s.distribution_pattern.as_deref(), Some("2+2+1"));
    }

    #[test]
    fn test_parse_pattern() {
        let d = Distribution::parse("2+2+1").unwrap();
        assert_eq!(d.blocks(), &[2, 2, 1]);
        assert_eq!(d.total_hours(), 5);
        assert_eq!(d.largest_block(), 2);
        assert!(d.matches(5));
        assert!(!d.matches(4));
        assert_eq!(d.to_string(), "2+2+1");
    }

    #[test]
    fn test_parse_alternate_separators() {
        assert_eq!(Distribution::parse(" 1, 1 ,2").unwrap().blocks(), &[1, 1, 2]);
        assert_eq!(Distribution::parse("3 2").unwrap().blocks(), &[3, 2]);
    }

    #[test]
    fn test_parse_rejects_bad_blocks() {
        assert_eq!(Distribution::parse(""), Err(DistributionError::Empty));
        assert_eq!(
            Distribution::parse("2+0"),
            Err(DistributionError::InvalidBlock("0".into()))
        );
        assert!(Distribution::parse("2+x").is_err());
        assert!(Distribution::parse("-1").is_err());
    }

    #[test]
    fn test_new_rejects_zero() {
        assert!(Distribution::new(vec![]).is_none());
        assert!(Distribution::new(vec![1, 0]).is_none());
        assert!(Distribution::new(vec![1, 1]).is_some());
    }
}
