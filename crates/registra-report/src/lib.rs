//! registra-report — Markdown and JSON period reports.
//!
//! Pure over engine data: callers assemble a [`PeriodReport`] from the
//! registry, then render or save it. Nothing here touches storage.

pub mod json;
pub mod markdown;
pub mod model;

pub use json::save_json;
pub use markdown::render_markdown;
pub use model::{build_period_report, CourseOutcome, PeriodReport};
