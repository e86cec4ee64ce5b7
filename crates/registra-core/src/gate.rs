//! Attendance eligibility gate for final-exam scores.
//!
//! The attendance-statistics collaborator owns the threshold and the
//! formula; this module only enforces the yes/no verdict at the point a
//! gated score is written.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::scheme::final_exam_slot;
use crate::traits::AttendanceStatistics;

/// Whether a label is gated on attendance (matches the Final Exam slot's
/// alias table, so historical spellings gate too).
pub fn is_gated_label(label: &str) -> bool {
    final_exam_slot().matches(label)
}

/// Decides whether a student may receive a gated evaluation entry.
pub struct EligibilityGate {
    attendance: Arc<dyn AttendanceStatistics>,
}

impl EligibilityGate {
    pub fn new(attendance: Arc<dyn AttendanceStatistics>) -> Self {
        Self { attendance }
    }

    /// `true` when nothing blocks recording a gated score.
    pub async fn can_record(&self, student_id: Uuid, course_id: Uuid) -> EngineResult<bool> {
        Ok(self.blocking_reason(student_id, course_id).await?.is_none())
    }

    /// The collaborator's blocking message, if the gate denies.
    pub async fn blocking_reason(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> EngineResult<Option<String>> {
        let summary = self.attendance.summary(student_id, course_id).await?;
        Ok(summary.and_then(|s| s.blocking_message))
    }

    /// Gate check run before a gated score is written.
    pub(crate) async fn check(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        label: &str,
    ) -> EngineResult<()> {
        if let Some(reason) = self.blocking_reason(student_id, course_id).await? {
            return Err(EngineError::AttendanceGateViolation {
                label: label.to_string(),
                reason,
            });
        }
        Ok(())
    }
}
