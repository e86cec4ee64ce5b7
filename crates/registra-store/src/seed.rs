//! Deterministic demo data set.
//!
//! Small but realistic: one closed period with frozen grades (so the next
//! open has something to promote from), one planned period, two courses,
//! three students, and one attendance record that blocks a final exam.

use chrono::NaiveDate;
use uuid::Uuid;

use registra_core::model::{
    AcademicPeriod, AttendanceSummary, Course, Enrollment, EnrollmentStatus, PeriodState, Student,
};

use crate::memory::{AttendanceRecord, Snapshot};

fn id(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("valid seed uuid")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid seed date")
}

/// Build the demo snapshot. Identifiers are fixed so repeated seeds and
/// documentation stay stable.
pub fn demo_snapshot() -> Snapshot {
    let avery = id("3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2");
    let jules = id("0c22f1f1-9184-4fd4-9b21-28c68a6a89dc");
    let kiara = id("d5a0a1a2-2a3c-44c2-8f73-60b7897a9dd2");

    let calculus = id("7a1f2b3c-4d5e-4f60-8192-a3b4c5d6e7f8");
    let physics = id("8b2e3c4d-5e6f-4071-92a3-b4c5d6e7f809");

    let term_prev = id("11111111-2222-4333-8444-555566667777");
    let term_next = id("99999999-8888-4777-8666-555544443333");

    Snapshot {
        students: vec![
            Student {
                id: avery,
                full_name: "Avery Lee".into(),
                current_cycle: 3,
                cumulative_credits: 48,
                cumulative_gpa: 15.2,
            },
            Student {
                id: jules,
                full_name: "Jules Moreno".into(),
                current_cycle: 3,
                cumulative_credits: 44,
                cumulative_gpa: 12.8,
            },
            Student {
                id: kiara,
                full_name: "Kiara Patel".into(),
                current_cycle: 5,
                cumulative_credits: 80,
                cumulative_gpa: 17.1,
            },
        ],
        courses: vec![
            Course {
                id: calculus,
                code: "MATH-201".into(),
                name: "Calculus II".into(),
                credits: 4,
            },
            Course {
                id: physics,
                code: "PHYS-110".into(),
                name: "Mechanics".into(),
                credits: 3,
            },
        ],
        periods: vec![
            AcademicPeriod {
                id: term_prev,
                name: "2025-II".into(),
                year: 2025,
                cycle_label: "II".into(),
                start_date: date(2025, 8, 18),
                end_date: date(2025, 12, 19),
                state: PeriodState::Closed,
            },
            AcademicPeriod {
                id: term_next,
                name: "2026-I".into(),
                year: 2026,
                cycle_label: "I".into(),
                start_date: date(2026, 3, 16),
                end_date: date(2026, 7, 17),
                state: PeriodState::Planned,
            },
        ],
        enrollments: vec![
            // Prior-period outcomes: Avery passed, Jules withdrew.
            Enrollment {
                id: id("aaaa1111-bbbb-4ccc-8ddd-eeee2222ffff"),
                student_id: avery,
                course_id: calculus,
                period_id: term_prev,
                status: EnrollmentStatus::Enrolled,
                final_grade: Some(15),
                directed_authorization: false,
            },
            Enrollment {
                id: id("bbbb2222-cccc-4ddd-8eee-ffff3333aaaa"),
                student_id: jules,
                course_id: physics,
                period_id: term_prev,
                status: EnrollmentStatus::Withdrawn,
                final_grade: None,
                directed_authorization: false,
            },
            Enrollment {
                id: id("cccc3333-dddd-4eee-8fff-aaaa4444bbbb"),
                student_id: kiara,
                course_id: physics,
                period_id: term_prev,
                status: EnrollmentStatus::Enrolled,
                final_grade: Some(18),
                directed_authorization: false,
            },
            // Upcoming-period enrollments, ungraded.
            Enrollment {
                id: id("dddd4444-eeee-4fff-8aaa-bbbb5555cccc"),
                student_id: avery,
                course_id: physics,
                period_id: term_next,
                status: EnrollmentStatus::Enrolled,
                final_grade: None,
                directed_authorization: false,
            },
            Enrollment {
                id: id("eeee5555-ffff-4aaa-8bbb-cccc6666dddd"),
                student_id: jules,
                course_id: calculus,
                period_id: term_next,
                status: EnrollmentStatus::Enrolled,
                final_grade: None,
                directed_authorization: true,
            },
        ],
        evaluation_types: vec![],
        grade_entries: vec![],
        part_scores: vec![],
        attendance: vec![AttendanceRecord {
            student_id: jules,
            course_id: calculus,
            summary: AttendanceSummary {
                total_sessions: 30,
                present_sessions: 19,
                blocking_message: Some(
                    "Absences above 30% block the final exam for this course".into(),
                ),
            },
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_snapshot_is_internally_consistent() {
        let snapshot = demo_snapshot();
        assert_eq!(snapshot.students.len(), 3);
        for enrollment in &snapshot.enrollments {
            assert!(snapshot.students.iter().any(|s| s.id == enrollment.student_id));
            assert!(snapshot.courses.iter().any(|c| c.id == enrollment.course_id));
            assert!(snapshot.periods.iter().any(|p| p.id == enrollment.period_id));
        }
        // Nothing active until the CLI opens a period.
        assert!(snapshot
            .periods
            .iter()
            .all(|p| p.state != PeriodState::Active));
    }
}
