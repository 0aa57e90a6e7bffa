//! Candidate window scoring.
//!
//! Every valid window for a placement unit gets a score; the generator
//! keeps the highest, breaking ties by earliest day then earliest period.
//! **Higher score = better.**
//!
//! # Terms
//!
//! | Term | Active when | Effect |
//! |------|-------------|--------|
//! | Softness | always | `-restricted_penalty` per restricted cell |
//! | Morning | `prefer_morning_hours` | earlier start scores higher |
//! | Edge | `avoid_first_last_period` | `-edge_penalty` if the window touches the first or last lesson period |
//! | Block | `prefer_block_scheduling` | `+block_bonus` per period beyond the first |
//! | Load | always | `-load_penalty` per hour the teacher and class already have that day |
//! | Spread | always | `-same_day_penalty` per unit of the same task already on that day |
//!
//! Only the orderings matter; the weights are tunable.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", Sec. 3

use serde::{Deserialize, Serialize};

use crate::config::SchedulingRules;

/// Weights of the scoring terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub restricted_penalty: i64,
    pub morning_bonus: i64,
    pub edge_penalty: i64,
    pub block_bonus: i64,
    pub load_penalty: i64,
    pub same_day_penalty: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            restricted_penalty: 100,
            morning_bonus: 4,
            edge_penalty: 12,
            block_bonus: 10,
            load_penalty: 6,
            same_day_penalty: 40,
        }
    }
}

/// Facts about one candidate window, gathered by the generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowFacts {
    /// First period of the window.
    pub start: u8,
    /// Window length in periods.
    pub len: u8,
    /// Periods per day spanned by the teacher's and the class's templates.
    pub period_count: u8,
    /// Cells with a `restricted` record for teacher, class, or subject.
    pub restricted_cells: u8,
    /// Whether the window covers the first or last lesson period.
    pub touches_edge: bool,
    /// Lesson hours the teacher already has that day.
    pub teacher_day_hours: u8,
    /// Lesson hours the class already has that day.
    pub class_day_hours: u8,
    /// Units of the same task already placed that day.
    pub same_task_units: u8,
}

/// Scores candidate windows under a rule set.
#[derive(Debug, Clone)]
pub struct CandidateScorer<'a> {
    rules: &'a SchedulingRules,
    weights: ScoreWeights,
}

impl<'a> CandidateScorer<'a> {
    pub fn new(rules: &'a SchedulingRules, weights: ScoreWeights) -> Self {
        Self { rules, weights }
    }

    /// Score of a window. Higher is better.
    pub fn score(&self, w: &WindowFacts) -> i64 {
        let weights = &self.weights;
        let mut score = 0i64;

        score -= weights.restricted_penalty * w.restricted_cells as i64;

        if self.rules.prefer_morning_hours {
            let later = w.period_count.saturating_sub(w.start) as i64;
            score += weights.morning_bonus * later;
        }

        if self.rules.avoid_first_last_period && w.touches_edge {
            score -= weights.edge_penalty;
        }

        if self.rules.prefer_block_scheduling {
            score += weights.block_bonus * w.len.saturating_sub(1) as i64;
        }

        let load = w.teacher_day_hours as i64 + w.class_day_hours as i64;
        score -= weights.load_penalty * load;
        score -= weights.same_day_penalty * w.same_task_units as i64;

        score
    }
}
