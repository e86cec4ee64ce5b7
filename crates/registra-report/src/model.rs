//! Report data model, assembled from registry rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use registra_core::model::{AcademicPeriod, Course, Enrollment, EnrollmentStatus, Student};
use registra_core::ranking::{rank_standings, MeritStanding};
use registra_core::score::ROUNDED_PASS_THRESHOLD;

/// Per-course outcome tallies for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOutcome {
    pub course_id: Uuid,
    pub code: String,
    pub name: String,
    pub enrolled: usize,
    pub withdrawn: usize,
    pub graded: usize,
    pub passed: usize,
    /// Mean frozen grade over graded enrollments, if any.
    pub average: Option<f64>,
}

/// Everything a period report renders, serializable as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodReport {
    pub period: AcademicPeriod,
    pub generated_at: DateTime<Utc>,
    pub courses: Vec<CourseOutcome>,
    pub standings: Vec<MeritStanding>,
}

/// Assemble a report for one period from registry rows. `enrollments`
/// should already be scoped to the period.
pub fn build_period_report(
    period: AcademicPeriod,
    courses: &[Course],
    enrollments: &[Enrollment],
    students: &[Student],
) -> PeriodReport {
    let mut outcomes: Vec<CourseOutcome> = Vec::new();
    for course in courses {
        let rows: Vec<&Enrollment> = enrollments
            .iter()
            .filter(|e| e.course_id == course.id)
            .collect();
        if rows.is_empty() {
            continue;
        }
        let withdrawn = rows
            .iter()
            .filter(|e| e.status == EnrollmentStatus::Withdrawn)
            .count();
        let graded: Vec<i32> = rows.iter().filter_map(|e| e.final_grade).collect();
        let passed = graded
            .iter()
            .filter(|g| **g >= ROUNDED_PASS_THRESHOLD)
            .count();
        let average = if graded.is_empty() {
            None
        } else {
            Some(graded.iter().map(|g| f64::from(*g)).sum::<f64>() / graded.len() as f64)
        };
        outcomes.push(CourseOutcome {
            course_id: course.id,
            code: course.code.clone(),
            name: course.name.clone(),
            enrolled: rows.len(),
            withdrawn,
            graded: graded.len(),
            passed,
            average,
        });
    }
    outcomes.sort_by(|a, b| a.code.cmp(&b.code));

    PeriodReport {
        period,
        generated_at: Utc::now(),
        courses: outcomes,
        standings: rank_standings(enrollments, students),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use registra_core::model::PeriodState;

    fn period() -> AcademicPeriod {
        AcademicPeriod {
            id: Uuid::new_v4(),
            name: "2025-II".into(),
            year: 2025,
            cycle_label: "II".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 8, 18).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 19).unwrap(),
            state: PeriodState::Closed,
        }
    }

    fn course(code: &str) -> Course {
        Course {
            id: Uuid::new_v4(),
            code: code.into(),
            name: format!("{code} course"),
            credits: 3,
        }
    }

    fn enrollment(course_id: Uuid, period_id: Uuid, grade: Option<i32>) -> Enrollment {
        Enrollment {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            course_id,
            period_id,
            status: EnrollmentStatus::Enrolled,
            final_grade: grade,
            directed_authorization: false,
        }
    }

    #[test]
    fn tallies_pass_counts_against_the_rounded_threshold() {
        let period = period();
        let math = course("MATH-201");
        let enrollments = vec![
            enrollment(math.id, period.id, Some(11)),
            enrollment(math.id, period.id, Some(10)),
            enrollment(math.id, period.id, None),
        ];
        let report = build_period_report(period, &[math], &enrollments, &[]);
        assert_eq!(report.courses.len(), 1);
        let outcome = &report.courses[0];
        assert_eq!(outcome.enrolled, 3);
        assert_eq!(outcome.graded, 2);
        assert_eq!(outcome.passed, 1);
        assert!((outcome.average.unwrap() - 10.5).abs() < 1e-9);
    }

    #[test]
    fn courses_without_enrollments_are_omitted() {
        let period = period();
        let math = course("MATH-201");
        let empty = course("PHYS-110");
        let enrollments = vec![enrollment(math.id, period.id, Some(14))];
        let report = build_period_report(period, &[empty, math], &enrollments, &[]);
        assert_eq!(report.courses.len(), 1);
        assert_eq!(report.courses[0].code, "MATH-201");
    }
}
