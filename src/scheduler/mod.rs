//! Lesson placement engine and generation statistics.
//!
//! # Algorithm
//!
//! `ScheduleGenerator` is a constructive, single-pass heuristic: tasks are
//! ordered by priority and weekly hours, split into placement units, and
//! each unit is committed to the best-scoring valid window. It is not
//! optimal, but it is fast and deterministic.
//!
//! # Scoring
//!
//! `CandidateScorer` ranks valid windows by constraint softness, morning
//! preference, block size, and daily load. Only the orderings are
//! contractual; `ScoreWeights` tunes the magnitudes.
//!
//! # Statistics
//!
//! `GenerationStatistics` reports required versus placed hours, one
//! `UnassignedLesson` per shortfall, and per-teacher load and gaps.

mod generator;
mod scoring;
mod state;
mod statistics;

pub use generator::{GenerationOutcome, GenerationReport, GenerationWarning, ScheduleGenerator};
pub use scoring::{CandidateScorer, ScoreWeights, WindowFacts};
pub use statistics::{GenerationStatistics, UnassignedLesson};
