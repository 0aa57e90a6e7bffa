//! Diagnosis and manual resolution of unplaced lessons.
//!
//! After a run with a shortfall, each unplaced lesson can be analyzed:
//!
//! - [`analyze`] classifies every slot of the class's template as
//!   available or conflicting, with ordered reasons.
//! - [`suggest_swaps`] finds up to three existing lessons of the same
//!   teacher whose relocation would free a class slot.
//! - [`diagnose`] runs both, calling the swap engine only when nothing is
//!   available.
//! - [`place_lesson`] and [`relocate_lesson`] apply the user's decision.

mod analyzer;
mod resolution;
mod swap;

pub use analyzer::{analyze, ConflictReason, PendingLesson, SlotAnalysis};
pub use resolution::{diagnose, place_lesson, relocate_lesson, Diagnosis};
pub use swap::{suggest_swaps, SwapSuggestion, MAX_SUGGESTIONS};
