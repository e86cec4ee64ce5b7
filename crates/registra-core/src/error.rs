//! Engine error taxonomy.
//!
//! Every variant except [`EngineError::Storage`] is an expected,
//! caller-correctable condition and is returned as a structured result.
//! Storage failures are infrastructure faults and propagate unmodified
//! for the transport layer to map to a 5xx-equivalent.

use thiserror::Error;
use uuid::Uuid;

use crate::model::PeriodState;

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// An enrollment that blocks a period close, with the evaluation labels
/// it is missing.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MissingGrades {
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    /// Active evaluation labels with no recorded entry.
    pub missing_labels: Vec<String>,
}

/// Errors produced by the evaluation and grade computation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input (bad label, out-of-range score or weight, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Active evaluation weights do not total 100 within tolerance.
    #[error("active weights total {total:.3}, expected 100.00")]
    InvalidWeightTotal { total: f64 },

    /// The attendance gate rejected a score for the gated label.
    #[error("attendance gate rejected '{label}': {reason}")]
    AttendanceGateViolation { label: String, reason: String },

    /// A period open/close violated the lifecycle state machine.
    #[error("cannot {action} period in state {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: PeriodState,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// A scheme edit referenced evaluation types that no longer exist,
    /// which indicates a concurrent reconfiguration.
    #[error("conflicting scheme configuration: {0}")]
    ConflictingConfiguration(String),

    /// A close was attempted while enrollments still miss required
    /// evaluation entries.
    #[error("cannot close period: {} enrollment(s) missing required grades", .0.len())]
    IncompleteGrading(Vec<MissingGrades>),

    /// Storage-layer failure (I/O, connectivity).
    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl EngineError {
    /// Returns `true` for conditions the caller can correct and resubmit,
    /// as opposed to infrastructure faults.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EngineError::Storage(_))
    }

    /// Convenience constructor for [`EngineError::NotFound`].
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        EngineError::NotFound { entity, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_is_not_a_client_error() {
        let err = EngineError::Storage(anyhow::anyhow!("disk on fire"));
        assert!(!err.is_client_error());
        let err = EngineError::InvalidWeightTotal { total: 99.0 };
        assert!(err.is_client_error());
    }

    #[test]
    fn incomplete_grading_message_counts_enrollments() {
        let err = EngineError::IncompleteGrading(vec![MissingGrades {
            enrollment_id: Uuid::nil(),
            student_id: Uuid::nil(),
            course_id: Uuid::nil(),
            missing_labels: vec!["Final Exam".into()],
        }]);
        assert!(err.to_string().contains("1 enrollment(s)"));
    }
}
