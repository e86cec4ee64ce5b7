//! Core data model types for registra.
//!
//! These are the persisted entity shapes that the engine reads and writes
//! through the [`crate::traits::Registry`] boundary. The shapes are
//! storage-engine-neutral; only the engine mutates them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Highest cycle a student can reach; the promotion sweep never exceeds it.
pub const MAX_CYCLE: u8 = 10;

/// A student enrolled at the institution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier.
    pub id: Uuid,
    /// Full display name.
    pub full_name: String,
    /// Current academic cycle (1..=10). Mutated only by the promotion
    /// sweep in the period lifecycle.
    pub current_cycle: u8,
    /// Credits accumulated across closed periods.
    #[serde(default)]
    pub cumulative_credits: u32,
    /// Running grade-point average on the 0-20 scale.
    #[serde(default)]
    pub cumulative_gpa: f64,
}

/// A course offered by the institution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier.
    pub id: Uuid,
    /// Short registrar code (e.g. "MATH-201").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Credit value.
    pub credits: u32,
}

/// Lifecycle state of an academic period.
///
/// `Planned → Active → Closed`, no skips, `Closed` is terminal. At most
/// one period is `Active` system-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodState {
    Planned,
    Active,
    Closed,
}

impl fmt::Display for PeriodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodState::Planned => write!(f, "planned"),
            PeriodState::Active => write!(f, "active"),
            PeriodState::Closed => write!(f, "closed"),
        }
    }
}

/// An academic period (term).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicPeriod {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name (e.g. "2026-I").
    pub name: String,
    /// Calendar year.
    pub year: i32,
    /// Cycle label within the year (e.g. "I", "II").
    pub cycle_label: String,
    /// First day of classes.
    pub start_date: NaiveDate,
    /// Last day of classes.
    pub end_date: NaiveDate,
    /// Lifecycle state.
    pub state: PeriodState,
}

impl AcademicPeriod {
    pub fn is_active(&self) -> bool {
        self.state == PeriodState::Active
    }
}

/// Status of a student's enrollment in a course for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    /// Normal enrollment; counts toward grading and promotion.
    Enrolled,
    /// Withdrawn by the student or an administrator; excluded from
    /// grade and promotion computation.
    Withdrawn,
    /// Enrolled under a directed-study authorization.
    Authorized,
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrollmentStatus::Enrolled => write!(f, "enrolled"),
            EnrollmentStatus::Withdrawn => write!(f, "withdrawn"),
            EnrollmentStatus::Authorized => write!(f, "authorized"),
        }
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enrolled" => Ok(EnrollmentStatus::Enrolled),
            "withdrawn" => Ok(EnrollmentStatus::Withdrawn),
            "authorized" | "directed" => Ok(EnrollmentStatus::Authorized),
            other => Err(format!("unknown enrollment status: {other}")),
        }
    }
}

/// A student's enrollment in one course for one period.
///
/// Owns its grade entries; `final_grade` stays `None` until the period
/// close freezes the rounded ledger value for historical reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    /// Unique identifier.
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub period_id: Uuid,
    /// Enrollment status.
    pub status: EnrollmentStatus,
    /// Rounded final grade, frozen at period close.
    #[serde(default)]
    pub final_grade: Option<i32>,
    /// Whether a directed-study authorization backs this enrollment.
    #[serde(default)]
    pub directed_authorization: bool,
}

impl Enrollment {
    /// Whether this enrollment participates in grading and promotion.
    pub fn counts_for_grading(&self) -> bool {
        self.status != EnrollmentStatus::Withdrawn
    }
}

/// One evaluation slot in a course's weighted scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationType {
    /// Unique identifier.
    pub id: Uuid,
    pub course_id: Uuid,
    /// Label, unique within the course. Grade entries join on this label
    /// rather than on the id, so historical scheme edits migrate entries
    /// instead of orphaning them.
    pub label: String,
    /// Weight toward the final grade, percent with 2-decimal precision.
    /// Active weights for a course must total 100.
    pub weight_percent: f64,
    /// Position in the configured ordering.
    pub display_order: u32,
    /// Inactive types keep their history but drop out of the weight
    /// total and the completeness check.
    pub active: bool,
}

/// A recorded score for one evaluation label of one enrollment.
///
/// Unique per (enrollment, label); resubmission overwrites in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeEntry {
    pub enrollment_id: Uuid,
    /// Evaluation label this score belongs to (join key, see
    /// [`EvaluationType::label`]).
    pub label: String,
    /// Score on the 0-20 scale.
    pub value: f64,
    /// Weight snapshot taken at recording time, refreshed by scheme
    /// migrations.
    pub weight_percent: f64,
    /// When the score was last written.
    pub recorded_at: DateTime<Utc>,
    /// Free-text instructor note.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A sub-item score for a split evaluation.
///
/// An evaluation type split into `of` parts gets one `PartScore` per
/// part; the parent [`GradeEntry`] only materializes once every part is
/// present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartScore {
    pub enrollment_id: Uuid,
    /// Parent evaluation label.
    pub label: String,
    /// 1-based part index.
    pub part: u32,
    /// Total number of parts the label is split into.
    pub of: u32,
    /// Score on the 0-20 scale.
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Attendance totals for one student in one course, as reported by the
/// attendance-statistics collaborator. The collaborator owns the
/// threshold; a populated `blocking_message` means the final exam is
/// gated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub total_sessions: u32,
    pub present_sessions: u32,
    /// Present when accumulated absence blocks the final exam.
    #[serde(default)]
    pub blocking_message: Option<String>,
}
