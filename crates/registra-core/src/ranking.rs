//! Merit ranking read model.
//!
//! Derives ranked standings from the frozen final grades of a closed
//! period. Pure; consumers feed it whatever slice of enrollments and
//! students they care about.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Enrollment, Student};

/// One student's standing in a period's merit ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeritStanding {
    pub student_id: Uuid,
    pub student_name: String,
    /// Mean of frozen final grades over graded, non-withdrawn
    /// enrollments.
    pub average: f64,
    pub graded_courses: usize,
    /// 1-based standard competition rank (ties share a rank).
    pub rank: u32,
}

/// Rank students by average frozen grade, descending. Withdrawn and
/// ungraded enrollments are excluded; students with nothing graded do
/// not appear.
pub fn rank_standings(enrollments: &[Enrollment], students: &[Student]) -> Vec<MeritStanding> {
    let names: HashMap<Uuid, &str> = students
        .iter()
        .map(|s| (s.id, s.full_name.as_str()))
        .collect();

    let mut totals: HashMap<Uuid, (i64, usize)> = HashMap::new();
    for enrollment in enrollments {
        if !enrollment.counts_for_grading() {
            continue;
        }
        let Some(grade) = enrollment.final_grade else {
            continue;
        };
        let entry = totals.entry(enrollment.student_id).or_insert((0, 0));
        entry.0 += i64::from(grade);
        entry.1 += 1;
    }

    let mut standings: Vec<MeritStanding> = totals
        .into_iter()
        .map(|(student_id, (sum, count))| MeritStanding {
            student_id,
            student_name: names.get(&student_id).unwrap_or(&"(unknown)").to_string(),
            average: sum as f64 / count as f64,
            graded_courses: count,
            rank: 0,
        })
        .collect();

    standings.sort_by(|a, b| {
        b.average
            .partial_cmp(&a.average)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.student_name.cmp(&b.student_name))
    });

    let mut last_average = 0.0;
    let mut last_rank = 0u32;
    for (index, standing) in standings.iter_mut().enumerate() {
        if index == 0 || (standing.average - last_average).abs() > 1e-9 {
            last_rank = index as u32 + 1;
            last_average = standing.average;
        }
        standing.rank = last_rank;
    }
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EnrollmentStatus;

    fn student(name: &str) -> Student {
        Student {
            id: Uuid::new_v4(),
            full_name: name.into(),
            current_cycle: 1,
            cumulative_credits: 0,
            cumulative_gpa: 0.0,
        }
    }

    fn graded(student_id: Uuid, grade: i32) -> Enrollment {
        Enrollment {
            id: Uuid::new_v4(),
            student_id,
            course_id: Uuid::new_v4(),
            period_id: Uuid::new_v4(),
            status: EnrollmentStatus::Enrolled,
            final_grade: Some(grade),
            directed_authorization: false,
        }
    }

    #[test]
    fn ranks_by_average_descending() {
        let a = student("Avery");
        let b = student("Jules");
        let enrollments = vec![graded(a.id, 18), graded(a.id, 16), graded(b.id, 12)];
        let standings = rank_standings(&enrollments, &[a.clone(), b.clone()]);
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].student_id, a.id);
        assert!((standings[0].average - 17.0).abs() < 1e-9);
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[1].rank, 2);
    }

    #[test]
    fn a_lone_standing_is_ranked_first() {
        let a = student("Avery");
        let standings = rank_standings(&[graded(a.id, 14)], &[a]);
        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].rank, 1);
    }

    #[test]
    fn ties_share_a_rank_and_skip_the_next() {
        let a = student("Avery");
        let b = student("Jules");
        let c = student("Kiara");
        let enrollments = vec![graded(a.id, 15), graded(b.id, 15), graded(c.id, 12)];
        let standings = rank_standings(&enrollments, &[a, b, c]);
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[1].rank, 1);
        assert_eq!(standings[2].rank, 3);
    }

    #[test]
    fn withdrawn_and_ungraded_are_excluded() {
        let a = student("Avery");
        let mut withdrawn = graded(a.id, 19);
        withdrawn.status = EnrollmentStatus::Withdrawn;
        let mut ungraded = graded(a.id, 0);
        ungraded.final_grade = None;
        let standings = rank_standings(&[withdrawn, ungraded], &[a]);
        assert!(standings.is_empty());
    }
}
