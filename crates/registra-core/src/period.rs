//! Academic period lifecycle: the Planned → Active → Closed machine.
//!
//! Open and close are serialized under one engine-wide lock; that lock is
//! what upholds the at-most-one-active-period invariant. Both the
//! promotion sweep and the grade freeze are computed as closed sets
//! before a single storage write applies them, so a partial failure never
//! leaves half the rows updated.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::AcademicEngine;
use crate::error::{EngineError, EngineResult, MissingGrades};
use crate::ledger::missing_labels;
use crate::model::{AcademicPeriod, Enrollment, EvaluationType, PeriodState, Student};
use crate::score::{ScoreEntry, WeightedScoreSet};
use crate::traits::{NotificationKind, Recipient};

/// One student's cycle advancement, part of a promotion sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CyclePromotion {
    pub student_id: Uuid,
    pub new_cycle: u8,
}

/// One enrollment's grade freeze, part of a period close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrozenGrade {
    pub enrollment_id: Uuid,
    pub final_grade: Option<i32>,
}

/// How a close treats enrollments with missing required entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePolicy {
    /// Any missing entry aborts the close (the default).
    RequireComplete,
    /// The caller explicitly accepts freezing incomplete ledgers.
    AcceptIncomplete,
}

/// Outcome of a successful period close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodCloseSummary {
    pub period_id: Uuid,
    pub period_name: String,
    pub closed_at: DateTime<Utc>,
    /// Total enrollments in the period.
    pub enrollments: usize,
    pub withdrawn: usize,
    /// Enrollments whose final grade was frozen with a value.
    pub graded: usize,
    /// Pass tally on the raw weighted sum (≥ 10.5).
    pub passed_raw: usize,
    /// Pass tally on the rounded grade (≥ 11).
    pub passed_rounded: usize,
    pub failed_rounded: usize,
}

/// Outcome of a successful period open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodOpenSummary {
    pub period_id: Uuid,
    pub period_name: String,
    /// Students advanced by the promotion sweep.
    pub promoted: usize,
    /// A previously active period that had to be force-closed.
    pub forced_closed: Option<Uuid>,
}

/// Compute the promotion sweep for the enrollments of the prior period.
///
/// A student advances one cycle (capped) when at least one non-withdrawn
/// enrollment carries a frozen final grade. Pure; returns the closed set
/// applied in one storage unit.
pub fn plan_promotions(
    enrollments: &[Enrollment],
    students: &[Student],
    cycle_cap: u8,
) -> Vec<CyclePromotion> {
    let mut eligible: Vec<Uuid> = enrollments
        .iter()
        .filter(|e| e.counts_for_grading() && e.final_grade.is_some())
        .map(|e| e.student_id)
        .collect();
    eligible.sort();
    eligible.dedup();

    let by_id: HashMap<Uuid, &Student> = students.iter().map(|s| (s.id, s)).collect();
    eligible
        .into_iter()
        .filter_map(|student_id| {
            let student = by_id.get(&student_id)?;
            let new_cycle = (student.current_cycle + 1).min(cycle_cap);
            (new_cycle != student.current_cycle).then_some(CyclePromotion {
                student_id,
                new_cycle,
            })
        })
        .collect()
}

impl AcademicEngine {
    /// Check whether a period can close cleanly: every non-withdrawn
    /// enrollment must have an entry for every required evaluation label
    /// of its course. Returns the offenders (empty means closable).
    pub async fn validate_closable(&self, period_id: Uuid) -> EngineResult<Vec<MissingGrades>> {
        let enrollments = self.registry.enrollments_by_period(period_id).await?;
        let mut types_by_course: HashMap<Uuid, Vec<EvaluationType>> = HashMap::new();
        let mut offenders = Vec::new();

        for enrollment in enrollments.iter().filter(|e| e.counts_for_grading()) {
            if !types_by_course.contains_key(&enrollment.course_id) {
                let types = self.registry.evaluation_types(enrollment.course_id).await?;
                types_by_course.insert(enrollment.course_id, types);
            }
            let types = &types_by_course[&enrollment.course_id];
            let entries = self.registry.grade_entries(enrollment.id).await?;
            let missing = missing_labels(types, &entries);
            if !missing.is_empty() {
                offenders.push(MissingGrades {
                    enrollment_id: enrollment.id,
                    student_id: enrollment.student_id,
                    course_id: enrollment.course_id,
                    missing_labels: missing,
                });
            }
        }
        Ok(offenders)
    }

    /// Close an active period: freeze every ledger's rounded grade onto
    /// its enrollment, tally outcomes, and mark the period terminal.
    pub async fn close_period(
        &self,
        period_id: Uuid,
        policy: ClosePolicy,
    ) -> EngineResult<PeriodCloseSummary> {
        let _guard = self.period_lock.lock().await;

        let period = self.fetch_period(period_id).await?;
        if period.state != PeriodState::Active {
            return Err(EngineError::InvalidStateTransition {
                action: "close",
                state: period.state,
            });
        }

        let offenders = self.validate_closable(period_id).await?;
        if !offenders.is_empty() {
            match policy {
                ClosePolicy::RequireComplete => {
                    return Err(EngineError::IncompleteGrading(offenders))
                }
                ClosePolicy::AcceptIncomplete => warn!(
                    period = %period.name,
                    incomplete = offenders.len(),
                    "closing with incomplete ledgers at the caller's request"
                ),
            }
        }

        let enrollments = self.registry.enrollments_by_period(period_id).await?;
        let mut frozen = Vec::with_capacity(enrollments.len());
        let mut summary = PeriodCloseSummary {
            period_id,
            period_name: period.name.clone(),
            closed_at: Utc::now(),
            enrollments: enrollments.len(),
            withdrawn: 0,
            graded: 0,
            passed_raw: 0,
            passed_rounded: 0,
            failed_rounded: 0,
        };

        for enrollment in &enrollments {
            if !enrollment.counts_for_grading() {
                summary.withdrawn += 1;
                frozen.push(FrozenGrade {
                    enrollment_id: enrollment.id,
                    final_grade: None,
                });
                continue;
            }
            let entries = self.registry.grade_entries(enrollment.id).await?;
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
            if set.passes_raw() {
                summary.passed_raw += 1;
            }
            if set.passes_rounded() {
                summary.passed_rounded += 1;
            } else {
                summary.failed_rounded += 1;
            }
            let rounded = set.rounded();
            if rounded.is_some() {
                summary.graded += 1;
            }
            frozen.push(FrozenGrade {
                enrollment_id: enrollment.id,
                final_grade: rounded,
            });
        }

        // The registry commits the grade freeze and the Closed
        // transition as one unit.
        self.registry.freeze_final_grades(period_id, &frozen).await?;

        info!(
            period = %period.name,
            graded = summary.graded,
            passed = summary.passed_rounded,
            "period closed"
        );
        self.notify(
            NotificationKind::PeriodClosed,
            Recipient::Broadcast,
            format!("Academic period {} closed", period.name),
        )
        .await;

        Ok(summary)
    }

    /// Open a planned period: deactivate any currently active period,
    /// run the promotion sweep off the prior period's frozen grades, and
    /// activate the target.
    pub async fn open_period(&self, period_id: Uuid) -> EngineResult<PeriodOpenSummary> {
        let _guard = self.period_lock.lock().await;

        let mut target = self.fetch_period(period_id).await?;
        if target.state != PeriodState::Planned {
            return Err(EngineError::InvalidStateTransition {
                action: "open",
                state: target.state,
            });
        }

        let prior_active = self.registry.active_period().await?;
        let prior = match &prior_active {
            Some(p) => Some(p.clone()),
            // With nothing active, promote off the most recently closed
            // period instead.
            None => self.latest_closed_period().await?,
        };

        let mut forced_closed = None;
        if let Some(mut active) = prior_active {
            // Closed is the only legal successor of Active; the skipped
            // close validation is deliberate and visible in the log.
            warn!(period = %active.name, "force-closing still-active period");
            active.state = PeriodState::Closed;
            forced_closed = Some(active.id);
            self.registry.upsert_period(active).await?;
        }

        let promotions = match prior {
            Some(prior) => {
                let enrollments = self.registry.enrollments_by_period(prior.id).await?;
                let students = self.registry.students().await?;
                plan_promotions(&enrollments, &students, self.config.cycle_cap)
            }
            None => Vec::new(),
        };
        self.registry.apply_promotions(&promotions).await?;

        target.state = PeriodState::Active;
        self.registry.upsert_period(target.clone()).await?;

        info!(
            period = %target.name,
            promoted = promotions.len(),
            "period opened"
        );
        self.notify(
            NotificationKind::PeriodOpened,
            Recipient::Broadcast,
            format!("Academic period {} is now active", target.name),
        )
        .await;

        Ok(PeriodOpenSummary {
            period_id,
            period_name: target.name,
            promoted: promotions.len(),
            forced_closed,
        })
    }

    async fn latest_closed_period(&self) -> EngineResult<Option<AcademicPeriod>> {
        let periods = self.registry.periods().await?;
        Ok(periods
            .into_iter()
            .filter(|p| p.state == PeriodState::Closed)
            .max_by_key(|p| p.end_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EnrollmentStatus;

    fn student(cycle: u8) -> Student {
        Student {
            id: Uuid::new_v4(),
            full_name: "Avery Lee".into(),
            current_cycle: cycle,
            cumulative_credits: 0,
            cumulative_gpa: 0.0,
        }
    }

    fn enrollment(student_id: Uuid, status: EnrollmentStatus, grade: Option<i32>) -> Enrollment {
        Enrollment {
            id: Uuid::new_v4(),
            student_id,
            course_id: Uuid::new_v4(),
            period_id: Uuid::new_v4(),
            status,
            final_grade: grade,
            directed_authorization: false,
        }
    }

    #[test]
    fn graded_students_advance_one_cycle() {
        let s = student(3);
        let enrollments = vec![enrollment(s.id, EnrollmentStatus::Enrolled, Some(14))];
        let sweep = plan_promotions(&enrollments, &[s.clone()], 10);
        assert_eq!(sweep.len(), 1);
        assert_eq!(sweep[0].student_id, s.id);
        assert_eq!(sweep[0].new_cycle, 4);
    }

    #[test]
    fn withdrawn_or_ungraded_students_stay_put() {
        let withdrawn = student(2);
        let ungraded = student(5);
        let enrollments = vec![
            enrollment(withdrawn.id, EnrollmentStatus::Withdrawn, Some(12)),
            enrollment(ungraded.id, EnrollmentStatus::Enrolled, None),
        ];
        let sweep = plan_promotions(&enrollments, &[withdrawn, ungraded], 10);
        assert!(sweep.is_empty());
    }

    #[test]
    fn promotion_caps_at_the_final_cycle() {
        let s = student(10);
        let enrollments = vec![enrollment(s.id, EnrollmentStatus::Enrolled, Some(16))];
        let sweep = plan_promotions(&enrollments, &[s], 10);
        assert!(sweep.is_empty());
    }

    #[test]
    fn multiple_graded_enrollments_promote_once() {
        let s = student(1);
        let enrollments = vec![
            enrollment(s.id, EnrollmentStatus::Enrolled, Some(11)),
            enrollment(s.id, EnrollmentStatus::Enrolled, Some(9)),
        ];
        let sweep = plan_promotions(&enrollments, &[s], 10);
        assert_eq!(sweep.len(), 1);
        assert_eq!(sweep[0].new_cycle, 2);
    }
}
