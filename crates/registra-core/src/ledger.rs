//! Grade ledger: score recording and read-time grade computation.
//!
//! Entries are upserted by (enrollment, label) — resubmission overwrites,
//! grading stays correctable until the period closes. The final grade is
//! computed lazily at read time; only the period close freezes it onto
//! the enrollment.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::AcademicEngine;
use crate::error::{EngineError, EngineResult};
use crate::gate::is_gated_label;
use crate::model::{Enrollment, GradeEntry, PartScore, PeriodState};
use crate::score::{GradeSummary, ScoreEntry, WeightedScoreSet};

/// One score in a submission batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub label: String,
    /// Score on the 0-20 scale.
    pub value: f64,
    /// Weight snapshot to record, percent.
    pub weight_percent: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A submission entry the ledger rejected, with the reason.
#[derive(Debug)]
pub struct RejectedScore {
    pub label: String,
    pub error: EngineError,
}

/// Per-label outcome of a batch submission. Labels are independent: a
/// gate denial on one label does not stop the others.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub recorded: Vec<String>,
    pub rejected: Vec<RejectedScore>,
}

/// Active evaluation labels an enrollment still lacks an entry for.
///
/// A course with no configured types operates under the implicit default
/// scheme, so completeness is judged against the seven default slots
/// (matched through their alias tables) instead.
pub(crate) fn missing_labels(
    types: &[crate::model::EvaluationType],
    entries: &[GradeEntry],
) -> Vec<String> {
    let active: Vec<_> = types.iter().filter(|t| t.active).collect();
    if active.is_empty() {
        return crate::scheme::DEFAULT_SCHEME
            .iter()
            .filter(|slot| !entries.iter().any(|e| slot.matches(&e.label)))
            .map(|slot| slot.label.to_string())
            .collect();
    }
    active
        .iter()
        .filter(|t| !entries.iter().any(|e| e.label.eq_ignore_ascii_case(&t.label)))
        .map(|t| t.label.clone())
        .collect()
}

fn validate_value(value: f64) -> EngineResult<()> {
    if !(0.0..=20.0).contains(&value) {
        return Err(EngineError::Validation(format!(
            "score {value} is outside the 0..=20 scale"
        )));
    }
    Ok(())
}

fn validate_weight(weight: f64) -> EngineResult<()> {
    if !(0.0..=100.0).contains(&weight) {
        return Err(EngineError::Validation(format!(
            "weight {weight} is outside 0..=100"
        )));
    }
    Ok(())
}

impl AcademicEngine {
    /// Upsert one score for an enrollment. For the gated label the
    /// attendance check runs first and a denial leaves state untouched.
    /// A closed period's ledger is frozen and rejects further writes.
    pub async fn record_score(
        &self,
        enrollment_id: Uuid,
        submission: ScoreSubmission,
    ) -> EngineResult<GradeEntry> {
        let enrollment = self.fetch_enrollment(enrollment_id).await?;
        self.ensure_period_open(&enrollment).await?;
        let _guard = self.lock_course(enrollment.course_id).await;
        self.record_one(&enrollment, submission).await
    }

    /// Record a batch of scores for one enrollment. Each label succeeds
    /// or fails on its own; the outcome lists both sides.
    pub async fn record_batch(
        &self,
        enrollment_id: Uuid,
        submissions: Vec<ScoreSubmission>,
    ) -> EngineResult<BatchOutcome> {
        let enrollment = self.fetch_enrollment(enrollment_id).await?;
        self.ensure_period_open(&enrollment).await?;
        let _guard = self.lock_course(enrollment.course_id).await;

        let mut outcome = BatchOutcome::default();
        for submission in submissions {
            let label = submission.label.clone();
            match self.record_one(&enrollment, submission).await {
                Ok(_) => outcome.recorded.push(label),
                Err(e) if e.is_client_error() => {
                    outcome.rejected.push(RejectedScore { label, error: e });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcome)
    }

    /// Grading stays correctable only while the enrollment's period is
    /// open; after the close the frozen final grade is authoritative.
    async fn ensure_period_open(&self, enrollment: &Enrollment) -> EngineResult<()> {
        let period = self.fetch_period(enrollment.period_id).await?;
        if period.state == PeriodState::Closed {
            return Err(EngineError::Validation(format!(
                "period '{}' is closed and its grades are frozen",
                period.name
            )));
        }
        Ok(())
    }

    async fn record_one(
        &self,
        enrollment: &Enrollment,
        submission: ScoreSubmission,
    ) -> EngineResult<GradeEntry> {
        let label = submission.label.trim().to_string();
        if label.is_empty() {
            return Err(EngineError::Validation("empty evaluation label".into()));
        }
        validate_value(submission.value)?;
        validate_weight(submission.weight_percent)?;
        if !enrollment.counts_for_grading() {
            return Err(EngineError::Validation(
                "enrollment is withdrawn and cannot receive scores".into(),
            ));
        }

        if is_gated_label(&label) {
            self.gate
                .check(enrollment.student_id, enrollment.course_id, &label)
                .await?;
        }

        let entry = GradeEntry {
            enrollment_id: enrollment.id,
            label,
            value: submission.value,
            weight_percent: submission.weight_percent,
            recorded_at: Utc::now(),
            notes: submission.notes,
        };
        self.registry.upsert_grade_entry(entry.clone()).await?;
        tracing::debug!(
            enrollment = %enrollment.id,
            label = %entry.label,
            value = entry.value,
            "score recorded"
        );
        Ok(entry)
    }

    /// Record one sub-item of a split evaluation. Returns the aggregate
    /// ledger entry once all `of` parts are present, `None` before then.
    pub async fn record_part_score(
        &self,
        enrollment_id: Uuid,
        label: &str,
        part: u32,
        of: u32,
        value: f64,
    ) -> EngineResult<Option<GradeEntry>> {
        if of < 2 {
            return Err(EngineError::Validation(
                "a split evaluation needs at least 2 parts".into(),
            ));
        }
        if part == 0 || part > of {
            return Err(EngineError::Validation(format!(
                "part {part} is outside 1..={of}"
            )));
        }
        validate_value(value)?;

        let enrollment = self.fetch_enrollment(enrollment_id).await?;
        self.ensure_period_open(&enrollment).await?;
        if !enrollment.counts_for_grading() {
            return Err(EngineError::Validation(
                "enrollment is withdrawn and cannot receive scores".into(),
            ));
        }
        let _guard = self.lock_course(enrollment.course_id).await;

        // A blocked student must not accumulate hidden sub-scores that
        // would later materialize a gated entry.
        if is_gated_label(label) {
            self.gate
                .check(enrollment.student_id, enrollment.course_id, label)
                .await?;
        }

        let parent = self
            .registry
            .evaluation_types(enrollment.course_id)
            .await?
            .into_iter()
            .find(|t| t.active && t.label.eq_ignore_ascii_case(label.trim()))
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "no active evaluation type matches label '{label}'"
                ))
            })?;

        let parts = self
            .registry
            .record_part_score(PartScore {
                enrollment_id,
                label: parent.label.clone(),
                part,
                of,
                value,
                recorded_at: Utc::now(),
            })
            .await?;

        if parts.iter().any(|p| p.of != of) {
            return Err(EngineError::Validation(format!(
                "label '{label}' already has parts recorded with a different split"
            )));
        }
        let complete = (1..=of).all(|i| parts.iter().any(|p| p.part == i));
        if !complete {
            return Ok(None);
        }

        // All parts present: each contributes weight/N, so the aggregate
        // entry carries the plain mean under the parent's full weight.
        let mean = parts.iter().map(|p| p.value).sum::<f64>() / of as f64;
        let entry = GradeEntry {
            enrollment_id,
            label: parent.label.clone(),
            value: mean,
            weight_percent: parent.weight_percent,
            recorded_at: Utc::now(),
            notes: Some(format!("aggregated from {of} sub-items")),
        };
        self.registry.upsert_grade_entry(entry.clone()).await?;
        self.registry
            .clear_part_scores(enrollment_id, &parent.label)
            .await?;
        Ok(Some(entry))
    }

    /// Lazy read-time grade computation for one enrollment.
    pub async fn grade_summary(&self, enrollment_id: Uuid) -> EngineResult<GradeSummary> {
        let enrollment = self.fetch_enrollment(enrollment_id).await?;
        let entries = self.registry.grade_entries(enrollment_id).await?;
        let types = self
            .registry
            .evaluation_types(enrollment.course_id)
            .await?;

        let complete = missing_labels(&types, &entries).is_empty();

        let set = WeightedScoreSet::new(
            entries
                .into_iter()
                .map(|e| ScoreEntry {
                    label: e.label,
                    weight_percent: e.weight_percent,
                    value: e.value,
                })
                .collect(),
        );
        Ok(GradeSummary::from_set(&set, complete))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_and_weight_ranges() {
        assert!(validate_value(0.0).is_ok());
        assert!(validate_value(20.0).is_ok());
        assert!(validate_value(20.01).is_err());
        assert!(validate_value(-0.5).is_err());
        assert!(validate_weight(100.0).is_ok());
        assert!(validate_weight(100.5).is_err());
    }

    #[test]
    fn unconfigured_courses_judge_completeness_against_default_slots() {
        let entry = |label: &str| GradeEntry {
            enrollment_id: Uuid::new_v4(),
            label: label.into(),
            value: 15.0,
            weight_percent: 10.0,
            recorded_at: Utc::now(),
            notes: None,
        };
        // Two of seven default slots recorded, under historical spellings.
        let entries = vec![entry("parcial 1"), entry("Laboratorio")];
        let missing = missing_labels(&[], &entries);
        assert_eq!(missing.len(), 5);
        assert!(missing.contains(&"Final Exam".to_string()));
        assert!(!missing.contains(&"Midterm 1".to_string()));
        assert!(!missing.contains(&"Labs".to_string()));
    }
}
