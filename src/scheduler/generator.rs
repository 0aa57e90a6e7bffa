//! Constructive lesson placement.
//!
//! # Algorithm
//!
//! 1. Validate the input; malformed input is the only error path.
//! 2. Seed one grid per teacher (breaks fixed) and one template per class.
//! 3. Order tasks by priority descending, then weekly hours descending.
//!    The sort is stable, so equal tasks keep their input order.
//! 4. Split each task into placement units: its distribution blocks when
//!    the distribution is usable, otherwise default-size blocks with a
//!    final remainder.
//! 5. For every unit, scan each (day, start period) window, keep the valid
//!    ones, and commit the highest-scoring one. Ties go to the earliest day,
//!    then the earliest period.
//!    Blocks of one distribution never touch, so each stays visible as its
//!    own block in the grid.
//! 6. A unit with no valid window stays unplaced; the run continues.
//!
//! Single pass, no backtracking. Not optimal, but deterministic: identical
//! input gives identical schedules.
//!
//! # Complexity
//! O(u * d * p * l) where u=units, d=days, p=periods per day, l=unit length.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::scoring::{CandidateScorer, ScoreWeights, WindowFacts};
use super::state::PlacementState;
use super::statistics::GenerationStatistics;
use crate::config::SchedulingRules;
use crate::error::{Result, TimetableError};
use crate::models::{
    Catalog, ConstraintIndex, ConstraintKind, Day, Distribution, EntityRef, PeriodTemplateSource,
    PlacementTask, SchoolClass, Schedule, SlotKey, StandardTemplates, Teacher, TimeConstraint,
};
use crate::validation::validate_input;

/// Non-fatal event of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationWarning {
    /// A task's distribution was not used; default units were placed instead.
    DistributionDiscarded { task_id: String, reason: String },
    /// The time limit expired before every task was attempted.
    TimeLimitReached {
        limit_seconds: u64,
        skipped_tasks: usize,
    },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::DistributionDiscarded { task_id, reason } => {
                write!(f, "Distribution of task '{task_id}' discarded: {reason}")
            }
            GenerationWarning::TimeLimitReached {
                limit_seconds,
                skipped_tasks,
            } => write!(
                f,
                "Time limit of {limit_seconds}s reached; {skipped_tasks} task(s) not attempted"
            ),
        }
    }
}

/// Result of a successful generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// One grid per teacher with at least one lesson, in teacher id order.
    pub schedules: Vec<Schedule>,
    pub statistics: GenerationStatistics,
    pub warnings: Vec<GenerationWarning>,
    /// Tasks in placement order with their final `assigned_hours`.
    pub tasks: Vec<PlacementTask>,
    /// Every teacher referenced by the run. Stored schedules of these
    /// teachers are replaced by `schedules`.
    pub touched_teacher_ids: Vec<String>,
}

impl GenerationOutcome {
    /// Tasks with unplaced hours.
    pub fn unplaced_tasks(&self) -> impl Iterator<Item = &PlacementTask> {
        self.tasks.iter().filter(|t| !t.is_complete())
    }
}

/// Flat report of a run, successful or not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub success: bool,
    pub schedules: Vec<Schedule>,
    pub statistics: GenerationStatistics,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl From<Result<GenerationOutcome>> for GenerationReport {
    fn from(result: Result<GenerationOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: true,
                schedules: outcome.schedules,
                statistics: outcome.statistics,
                warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
                errors: Vec::new(),
            },
            Err(TimetableError::InvalidInput(errors)) => Self {
                errors: errors.into_iter().map(|e| e.message).collect(),
                ..Self::default()
            },
            Err(other) => Self {
                errors: vec![other.to_string()],
                ..Self::default()
            },
        }
    }
}

/// Constructive timetable generator.
///
/// # Example
///
/// ```
/// use u_timetable::builder::{build_tasks, Selection};
/// use u_timetable::config::SchedulingRules;
/// use u_timetable::models::{Catalog, EducationLevel, SchoolClass, Subject, Teacher};
/// use u_timetable::scheduler::ScheduleGenerator;
///
/// let catalog = Catalog::new(
///     vec![Teacher::new("T1").with_level(EducationLevel::High)],
///     vec![SchoolClass::new("9A")
///         .with_level(EducationLevel::High)
///         .with_assignment("T1", ["MATH"])],
///     vec![Subject::new("MATH", 4).with_level(EducationLevel::High)],
/// );
/// let built = build_tasks(&Selection::all(&catalog), &catalog);
///
/// let generator = ScheduleGenerator::new(SchedulingRules::default());
/// let outcome = generator.generate(&built.tasks, &catalog, &[]).unwrap();
/// assert_eq!(outcome.statistics.placed_lessons, 4);
/// assert!(outcome.statistics.unassigned_lessons.is_empty());
/// ```
#[derive(Clone)]
pub struct ScheduleGenerator {
    rules: SchedulingRules,
    templates: Arc<dyn PeriodTemplateSource>,
    weights: ScoreWeights,
}

impl fmt::Debug for ScheduleGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleGenerator")
            .field("rules", &self.rules)
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}

impl Default for ScheduleGenerator {
    fn default() -> Self {
        Self::new(SchedulingRules::default())
    }
}

impl ScheduleGenerator {
    /// Creates a generator using [`StandardTemplates`].
    pub fn new(rules: SchedulingRules) -> Self {
        Self {
            rules,
            templates: Arc::new(StandardTemplates),
            weights: ScoreWeights::default(),
        }
    }

    /// Sets the period-template source.
    pub fn with_templates(mut self, templates: impl PeriodTemplateSource + 'static) -> Self {
        self.templates = Arc::new(templates);
        self
    }

    /// Sets the scoring weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn rules(&self) -> &SchedulingRules {
        &self.rules
    }

    /// Template source with the rules' lunch break applied.
    ///
    /// Pass this to the analyzer so it sees the same grid shape.
    pub fn templates(&self) -> impl PeriodTemplateSource + '_ {
        self.rules.adjust_templates(self.templates.as_ref())
    }

    /// Places every task's weekly hours.
    ///
    /// # Errors
    ///
    /// [`TimetableError::InvalidInput`] when the tasks cannot be interpreted
    /// against the catalog, [`TimetableError::Config`] for unusable rules.
    /// Hours that cannot be placed are reported in the statistics.
    pub fn generate(
        &self,
        tasks: &[PlacementTask],
        catalog: &Catalog,
        constraints: &[TimeConstraint],
    ) -> Result<GenerationOutcome> {
        validate_input(tasks, catalog)?;
        self.rules.validate()?;

        let deadline = self.rules.time_limit().map(|limit| Instant::now() + limit);
        let templates = self.templates();

        let mut run = Run {
            rules: &self.rules,
            index: ConstraintIndex::new(constraints),
            scorer: CandidateScorer::new(&self.rules, self.weights),
            state: PlacementState::default(),
            warnings: Vec::new(),
        };

        for task in tasks {
            if let Some(level) = catalog.teacher(&task.teacher_id).and_then(Teacher::primary_level) {
                run.state
                    .seed_teacher(&task.teacher_id, &templates.periods_for(level));
            }
            if let Some(level) = catalog.class(&task.class_id).and_then(SchoolClass::primary_level) {
                run.state
                    .seed_class(&task.class_id, templates.periods_for(level));
            }
        }

        let mut tasks = tasks.to_vec();
        tasks.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.weekly_hours.cmp(&a.weekly_hours))
        });

        info!(
            event = "generation_start",
            task_count = tasks.len(),
            constraint_cells = run.index.len(),
        );

        let total = tasks.len();
        for (i, task) in tasks.iter_mut().enumerate() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                let skipped_tasks = total - i;
                warn!(event = "time_limit_reached", skipped_tasks);
                run.warnings.push(GenerationWarning::TimeLimitReached {
                    limit_seconds: self.rules.time_limit_seconds.unwrap_or(0),
                    skipped_tasks,
                });
                break;
            }
            run.place_task(task);
        }

        let touched_teacher_ids = run.state.teacher_ids();
        let schedules = run.state.into_schedules();
        let statistics = GenerationStatistics::calculate(&tasks, &schedules);

        info!(
            event = "generation_end",
            placed = statistics.placed_lessons,
            total = statistics.total_lessons_to_place,
            unassigned_tasks = statistics.unassigned_lessons.len(),
            schedules = schedules.len(),
        );

        Ok(GenerationOutcome {
            schedules,
            statistics,
            warnings: run.warnings,
            tasks,
            touched_teacher_ids,
        })
    }
}

/// Best window found for one unit.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    day: Day,
    start: u8,
    score: i64,
}

/// How the units of one task may sit relative to each other.
#[derive(Debug, Clone, Copy, Default)]
struct BlockLayout {
    /// Every unit on its own day.
    distinct_days: bool,
    /// Units never touch, so each stays a separate block in the grid.
    separate_blocks: bool,
}

/// Working state of one `generate` call.
struct Run<'a> {
    rules: &'a SchedulingRules,
    index: ConstraintIndex,
    scorer: CandidateScorer<'a>,
    state: PlacementState,
    warnings: Vec<GenerationWarning>,
}

impl Run<'_> {
    fn place_task(&mut self, task: &mut PlacementTask) {
        let default_size = self.rules.default_block_size();
        let (units, layout) = match usable_distribution(self.rules, task) {
            Ok(Some(d)) => (
                d.blocks().to_vec(),
                BlockLayout {
                    distinct_days: self.rules.enforce_distribution_patterns,
                    separate_blocks: true,
                },
            ),
            Ok(None) => (
                default_units(task.missing_hours(), default_size),
                BlockLayout::default(),
            ),
            Err(reason) => {
                warn!(event = "distribution_discarded", task_id = %task.id, %reason);
                self.warnings.push(GenerationWarning::DistributionDiscarded {
                    task_id: task.id.clone(),
                    reason,
                });
                (
                    default_units(task.missing_hours(), default_size),
                    BlockLayout::default(),
                )
            }
        };

        let mut used_days = Vec::with_capacity(units.len());
        for len in units {
            match self.best_window(task, len, &used_days, layout) {
                Some(c) => {
                    self.state.commit(
                        &task.teacher_id,
                        &task.class_id,
                        &task.subject_id,
                        c.day,
                        c.start,
                        len,
                    );
                    task.record_placed(len);
                    used_days.push(c.day);
                    debug!(
                        event = "unit_placed",
                        task_id = %task.id,
                        day = %c.day,
                        start = c.start,
                        len,
                        score = c.score,
                    );
                }
                None => debug!(event = "unit_unplaced", task_id = %task.id, len),
            }
        }
    }

    /// Highest-scoring valid window; earliest day, then period, on ties.
    fn best_window(
        &self,
        task: &PlacementTask,
        len: u8,
        used_days: &[Day],
        layout: BlockLayout,
    ) -> Option<Candidate> {
        let entities = [
            EntityRef::teacher(&task.teacher_id),
            EntityRef::class(&task.class_id),
            EntityRef::subject(&task.subject_id),
        ];
        let span = self.state.period_span(&task.teacher_id, &task.class_id);
        let last_start = span.checked_sub(len.saturating_sub(1))?;

        let mut best: Option<Candidate> = None;
        for day in Day::WEEK {
            if layout.distinct_days && used_days.contains(&day) {
                continue;
            }
            for start in 1..=last_start {
                let Some(facts) =
                    self.window_facts(task, &entities, day, start, len, used_days, layout)
                else {
                    continue;
                };
                let score = self.scorer.score(&facts);
                if best.map_or(true, |b| score > b.score) {
                    best = Some(Candidate { day, start, score });
                }
            }
        }
        best
    }

    /// Checks the hard rules for a window; `None` if any fails.
    #[allow(clippy::too_many_arguments)]
    fn window_facts(
        &self,
        task: &PlacementTask,
        entities: &[EntityRef; 3],
        day: Day,
        start: u8,
        len: u8,
        used_days: &[Day],
        layout: BlockLayout,
    ) -> Option<WindowFacts> {
        let rules = self.rules;
        let state = &self.state;

        let mut restricted_cells = 0u8;
        for period in start..start.saturating_add(len) {
            let key = SlotKey::new(day, period);
            if !state.teacher_free(&task.teacher_id, key) || !state.class_free(&task.class_id, key)
            {
                return None;
            }
            let strictest = entities
                .iter()
                .map(|e| self.index.kind(e, key))
                .max()
                .unwrap_or_default();
            match strictest {
                ConstraintKind::Unavailable => return None,
                ConstraintKind::Restricted => restricted_cells += 1,
                ConstraintKind::Preferred => {}
            }
        }

        let teacher_day_hours = state.teacher_day_hours(&task.teacher_id, day);
        let class_day_hours = state.class_day_hours(&task.class_id, day);
        if teacher_day_hours.saturating_add(len) > rules.max_daily_hours_teacher
            || class_day_hours.saturating_add(len) > rules.max_daily_hours_class
        {
            return None;
        }

        if state.teacher_run(&task.teacher_id, day, start, len) > rules.max_consecutive_hours
            || state.class_run(&task.class_id, day, start, len) > rules.max_consecutive_hours
        {
            return None;
        }

        if (rules.avoid_consecutive_same_subject || layout.separate_blocks)
            && state.subject_adjacent(&task.class_id, &task.subject_id, day, start, len)
        {
            return None;
        }

        let end = start + len - 1;
        let touches_edge = state
            .class_lesson_bounds(&task.class_id)
            .is_some_and(|(first, last)| start == first || end == last);

        Some(WindowFacts {
            start,
            len,
            period_count: state.period_span(&task.teacher_id, &task.class_id),
            restricted_cells,
            touches_edge,
            teacher_day_hours,
            class_day_hours,
            same_task_units: used_days.iter().filter(|&&d| d == day).count() as u8,
        })
    }
}

/// The task's distribution if the rules allow using it.
///
/// `Err(reason)` means the task had a distribution that must be discarded.
fn usable_distribution<'t>(
    rules: &SchedulingRules,
    task: &'t PlacementTask,
) -> std::result::Result<Option<&'t Distribution>, String> {
    let Some(distribution) = task.distribution.as_ref() else {
        return Ok(None);
    };
    if !rules.use_distribution_patterns {
        return Err("distribution patterns are disabled".into());
    }
    if task.assigned_hours > 0 {
        return Err(format!(
            "{} of {} hours are already placed",
            task.assigned_hours, task.weekly_hours
        ));
    }
    if !distribution.matches(task.weekly_hours) {
        return Err(format!(
            "pattern {distribution} totals {} hours but {} are required",
            distribution.total_hours(),
            task.weekly_hours
        ));
    }
    if distribution.largest_block() > rules.maximum_block_size {
        return Err(format!(
            "block of {} exceeds the maximum block size of {}",
            distribution.largest_block(),
            rules.maximum_block_size
        ));
    }
    Ok(Some(distribution))
}

/// `hours` split into blocks of `size` plus a final remainder.
fn default_units(hours: u8, size: u8) -> Vec<u8> {
    let size = size.max(1);
    let mut units = vec![size; (hours / size) as usize];
    if hours % size > 0 {
        units.push(hours % size);
    }
    units
}
