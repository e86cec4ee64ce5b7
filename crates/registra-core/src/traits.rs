//! Boundary traits for persistence and external collaborators.
//!
//! These async traits are implemented by the `registra-store` crate (and
//! by whatever real attendance/notification systems surround the engine).
//! Storage methods return `anyhow::Result`; the engine wraps failures as
//! [`crate::error::EngineError::Storage`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{
    AcademicPeriod, AttendanceSummary, Course, Enrollment, EvaluationType, GradeEntry, PartScore,
    Student,
};
use crate::period::{CyclePromotion, FrozenGrade};
use crate::scheme::{MigrationPlan, SchemeChangeStats};

// ---------------------------------------------------------------------------
// Persistence boundary
// ---------------------------------------------------------------------------

/// Repository-style access to every persisted aggregate.
///
/// Single-row operations must be atomic per aggregate. The three
/// multi-row operations (`apply_scheme`, `apply_promotions`,
/// `freeze_final_grades`) must each apply as one all-or-nothing unit;
/// the engine computes their inputs as closed sets before calling.
#[async_trait]
pub trait Registry: Send + Sync {
    // -- students -----------------------------------------------------------

    async fn student(&self, id: Uuid) -> anyhow::Result<Option<Student>>;
    async fn upsert_student(&self, student: Student) -> anyhow::Result<()>;
    async fn students(&self) -> anyhow::Result<Vec<Student>>;
    /// Apply a promotion sweep in one unit.
    async fn apply_promotions(&self, promotions: &[CyclePromotion]) -> anyhow::Result<()>;

    // -- courses ------------------------------------------------------------

    async fn course(&self, id: Uuid) -> anyhow::Result<Option<Course>>;
    async fn upsert_course(&self, course: Course) -> anyhow::Result<()>;
    async fn courses(&self) -> anyhow::Result<Vec<Course>>;

    // -- periods ------------------------------------------------------------

    async fn period(&self, id: Uuid) -> anyhow::Result<Option<AcademicPeriod>>;
    async fn upsert_period(&self, period: AcademicPeriod) -> anyhow::Result<()>;
    async fn periods(&self) -> anyhow::Result<Vec<AcademicPeriod>>;
    /// The single active period, if any.
    async fn active_period(&self) -> anyhow::Result<Option<AcademicPeriod>>;

    // -- enrollments --------------------------------------------------------

    async fn enrollment(&self, id: Uuid) -> anyhow::Result<Option<Enrollment>>;
    async fn upsert_enrollment(&self, enrollment: Enrollment) -> anyhow::Result<()>;
    async fn enrollments_by_period(&self, period_id: Uuid) -> anyhow::Result<Vec<Enrollment>>;
    async fn enrollments_by_student(&self, student_id: Uuid) -> anyhow::Result<Vec<Enrollment>>;
    /// Freeze computed final grades for a period and mark the period
    /// `Closed`, all in one unit.
    async fn freeze_final_grades(
        &self,
        period_id: Uuid,
        grades: &[FrozenGrade],
    ) -> anyhow::Result<()>;

    // -- evaluation types ---------------------------------------------------

    /// All evaluation types configured for a course, active or not.
    async fn evaluation_types(&self, course_id: Uuid) -> anyhow::Result<Vec<EvaluationType>>;
    /// Apply a scheme migration plan (creates, renames with grade-entry
    /// migration, weight refreshes, removals with purge) in one unit.
    async fn apply_scheme(&self, plan: &MigrationPlan) -> anyhow::Result<SchemeChangeStats>;

    // -- grade entries ------------------------------------------------------

    async fn grade_entries(&self, enrollment_id: Uuid) -> anyhow::Result<Vec<GradeEntry>>;
    async fn upsert_grade_entry(&self, entry: GradeEntry) -> anyhow::Result<()>;

    // -- part scores --------------------------------------------------------

    /// Record one sub-item score and return every part recorded so far
    /// for that (enrollment, label), the new one included.
    async fn record_part_score(&self, part: PartScore) -> anyhow::Result<Vec<PartScore>>;
    /// Drop the sub-item scores once the aggregate entry is written.
    async fn clear_part_scores(&self, enrollment_id: Uuid, label: &str) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Attendance statistics collaborator
// ---------------------------------------------------------------------------

/// External attendance-statistics system consumed by the eligibility
/// gate. The collaborator owns the threshold and formula; the engine only
/// reads the verdict.
#[async_trait]
pub trait AttendanceStatistics: Send + Sync {
    /// Attendance totals for a student in a course. `None` means the
    /// collaborator has no record, which blocks nothing.
    async fn summary(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> anyhow::Result<Option<AttendanceSummary>>;
}

// ---------------------------------------------------------------------------
// Notification emission
// ---------------------------------------------------------------------------

/// Kinds of user-facing events the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SchemeConfigured,
    PeriodOpened,
    PeriodClosed,
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    Student(Uuid),
    Broadcast,
}

/// A fire-and-forget message handed to the delivery collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub recipient: Recipient,
    pub payload: String,
}

/// External delivery/event-bus collaborator. Delivery failures must never
/// fail the engine operation that emitted the notification.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: Notification) -> anyhow::Result<()>;
}

/// Sink that drops every notification.
pub struct NoopSink;

#[async_trait]
impl NotificationSink for NoopSink {
    async fn deliver(&self, _notification: Notification) -> anyhow::Result<()> {
        Ok(())
    }
}
