//! Global scheduling rules.
//!
//! Rules are loaded from TOML (every field optional, missing fields take
//! their defaults) or built in code with `with_*` setters.
//!
//! ```
//! use u_timetable::config::SchedulingRules;
//!
//! let rules = SchedulingRules::from_toml_str(r#"
//!     max_daily_hours_teacher = 6
//!     prefer_block_scheduling = true
//!     lunch_break_required = true
//!     lunch_break_start = "12:15"
//! "#).unwrap();
//!
//! assert_eq!(rules.max_daily_hours_teacher, 6);
//! assert_eq!(rules.default_block_size(), 2);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ClockTime, PeriodTemplateSource, RuleAdjustedTemplates};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Global rules applied to every placement of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SchedulingRules {
    /// Lesson hours a teacher may teach per day.
    pub max_daily_hours_teacher: u8,
    /// Lesson hours a class may have per day.
    pub max_daily_hours_class: u8,
    /// Longest contiguous run of lessons for a teacher or class.
    pub max_consecutive_hours: u8,
    /// Forbid separate units of one subject back-to-back for a class.
    pub avoid_consecutive_same_subject: bool,
    pub prefer_morning_hours: bool,
    pub avoid_first_last_period: bool,
    pub lunch_break_required: bool,
    pub lunch_break_start: ClockTime,
    /// Lunch length in minutes.
    pub lunch_break_duration: u16,
    pub use_distribution_patterns: bool,
    /// Place default units as 2-period blocks.
    pub prefer_block_scheduling: bool,
    /// Blocks of one distribution must fall on distinct days.
    pub enforce_distribution_patterns: bool,
    pub maximum_block_size: u8,
    /// Cooperative time limit for one run.
    pub time_limit_seconds: Option<u64>,
}

impl Default for SchedulingRules {
    fn default() -> Self {
        Self {
            max_daily_hours_teacher: 8,
            max_daily_hours_class: 8,
            max_consecutive_hours: 4,
            avoid_consecutive_same_subject: false,
            prefer_morning_hours: false,
            avoid_first_last_period: false,
            lunch_break_required: false,
            lunch_break_start: ClockTime::hm(12, 0),
            lunch_break_duration: 45,
            use_distribution_patterns: true,
            prefer_block_scheduling: false,
            enforce_distribution_patterns: false,
            maximum_block_size: 3,
            time_limit_seconds: None,
        }
    }
}

impl SchedulingRules {
    /// Creates the default rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads rules from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML, or
    /// fails [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads rules from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses rules from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let rules: Self = toml::from_str(s)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Rejects rule sets under which nothing could ever be placed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_daily_hours_teacher == 0 {
            return Err(ConfigError::Invalid(
                "max_daily_hours_teacher must be positive".into(),
            ));
        }
        if self.max_daily_hours_class == 0 {
            return Err(ConfigError::Invalid(
                "max_daily_hours_class must be positive".into(),
            ));
        }
        if self.max_consecutive_hours == 0 {
            return Err(ConfigError::Invalid(
                "max_consecutive_hours must be positive".into(),
            ));
        }
        if self.maximum_block_size == 0 {
            return Err(ConfigError::Invalid(
                "maximum_block_size must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn with_max_daily_hours_teacher(mut self, hours: u8) -> Self {
        self.max_daily_hours_teacher = hours;
        self
    }

    pub fn with_max_daily_hours_class(mut self, hours: u8) -> Self {
        self.max_daily_hours_class = hours;
        self
    }

    pub fn with_max_consecutive_hours(mut self, hours: u8) -> Self {
        self.max_consecutive_hours = hours;
        self
    }

    pub fn with_avoid_consecutive_same_subject(mut self, on: bool) -> Self {
        self.avoid_consecutive_same_subject = on;
        self
    }

    pub fn with_prefer_morning_hours(mut self, on: bool) -> Self {
        self.prefer_morning_hours = on;
        self
    }

    pub fn with_avoid_first_last_period(mut self, on: bool) -> Self {
        self.avoid_first_last_period = on;
        self
    }

    /// Requires a lunch break of `minutes` starting at `start`.
    pub fn with_lunch_break(mut self, start: ClockTime, minutes: u16) -> Self {
        self.lunch_break_required = true;
        self.lunch_break_start = start;
        self.lunch_break_duration = minutes;
        self
    }

    pub fn with_distribution_patterns(mut self, use_patterns: bool, enforce: bool) -> Self {
        self.use_distribution_patterns = use_patterns;
        self.enforce_distribution_patterns = enforce;
        self
    }

    pub fn with_block_scheduling(mut self, prefer: bool) -> Self {
        self.prefer_block_scheduling = prefer;
        self
    }

    pub fn with_maximum_block_size(mut self, size: u8) -> Self {
        self.maximum_block_size = size;
        self
    }

    /// Sets the cooperative time limit.
    pub fn with_time_limit_seconds(mut self, seconds: u64) -> Self {
        self.time_limit_seconds = Some(seconds);
        self
    }

    /// Returns the time limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_seconds.map(Duration::from_secs)
    }

    /// Unit size used when a task has no usable distribution.
    pub fn default_block_size(&self) -> u8 {
        if self.prefer_block_scheduling {
            self.maximum_block_size.min(2)
        } else {
            1
        }
    }

    /// Wraps a template source so the lunch-break rule applies to it.
    pub fn adjust_templates<'a>(
        &self,
        source: &'a dyn PeriodTemplateSource,
    ) -> RuleAdjustedTemplates<'a> {
        let lunch = self
            .lunch_break_required
            .then_some((self.lunch_break_start, self.lunch_break_duration));
        RuleAdjustedTemplates::new(source, lunch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EducationLevel, StandardTemplates};

    #[test]
    fn test_toml_parsing() {
        let toml = r#"
            max_daily_hours_teacher = 6
            max_daily_hours_class = 7
            max_consecutive_hours = 3
            avoid_consecutive_same_subject = true
            prefer_morning_hours = true
            lunch_break_required = true
            lunch_break_start = "12:30"
            lunch_break_duration = 60
            enforce_distribution_patterns = true
            maximum_block_size = 2
            time_limit_seconds = 30
        "#;

        let rules = SchedulingRules::from_toml_str(toml).unwrap();
        assert_eq!(rules.max_daily_hours_teacher, 6);
        assert_eq!(rules.max_daily_hours_class, 7);
        assert_eq!(rules.max_consecutive_hours, 3);
        assert!(rules.avoid_consecutive_same_subject);
        assert!(rules.prefer_morning_hours);
        assert_eq!(rules.lunch_break_start, ClockTime::hm(12, 30));
        assert_eq!(rules.lunch_break_duration, 60);
        assert!(rules.use_distribution_patterns);
        assert!(rules.enforce_distribution_patterns);
        assert_eq!(rules.time_limit(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let rules = SchedulingRules::from_toml_str("").unwrap();
        assert_eq!(rules, SchedulingRules::default());
        assert_eq!(rules.time_limit(), None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SchedulingRules::from_toml_str("maximum_block_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(SchedulingRules::from_toml_str("max_consecutive_hours = 0").is_err());
        assert!(matches!(
            SchedulingRules::from_toml_str("lunch_break_start = \"noon\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SchedulingRules::load("/nonexistent/rules.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_default_block_size() {
        let rules = SchedulingRules::new();
        assert_eq!(rules.default_block_size(), 1);
        assert_eq!(rules.clone().with_block_scheduling(true).default_block_size(), 2);
        assert_eq!(
            rules
                .with_block_scheduling(true)
                .with_maximum_block_size(1)
                .default_block_size(),
            1
        );
    }

    #[test]
    fn test_adjust_templates_applies_lunch() {
        let rules = SchedulingRules::new().with_lunch_break(ClockTime::hm(12, 0), 30);
        let source = rules.adjust_templates(&StandardTemplates);
        assert!(source.periods_for(EducationLevel::High).is_break(5));

        let plain = SchedulingRules::new();
        let source = plain.adjust_templates(&StandardTemplates);
        assert!(!source.periods_for(EducationLevel::High).is_break(5));
    }
}
