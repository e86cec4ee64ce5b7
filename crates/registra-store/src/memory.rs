//! In-memory registry.
//!
//! All state lives in one [`Snapshot`] behind a `std::sync::RwLock`; the
//! guard is never held across an await point. Each trait call is one
//! critical section, which is what makes `apply_scheme`,
//! `apply_promotions` and `freeze_final_grades` all-or-nothing.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use registra_core::model::{
    AcademicPeriod, AttendanceSummary, Course, Enrollment, EvaluationType, GradeEntry, PartScore,
    PeriodState, Student,
};
use registra_core::period::{CyclePromotion, FrozenGrade};
use registra_core::scheme::{MigrationPlan, SchemeChangeStats};
use registra_core::traits::{AttendanceStatistics, Registry};

/// Attendance totals for one (student, course) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub summary: AttendanceSummary,
}

/// The full persisted state, JSON-serializable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub periods: Vec<AcademicPeriod>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub evaluation_types: Vec<EvaluationType>,
    #[serde(default)]
    pub grade_entries: Vec<GradeEntry>,
    #[serde(default)]
    pub part_scores: Vec<PartScore>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
}

impl Snapshot {
    fn course_of_enrollment(&self) -> HashMap<Uuid, Uuid> {
        self.enrollments.iter().map(|e| (e.id, e.course_id)).collect()
    }
}

/// In-memory implementation of the persistence boundary.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    inner: RwLock<Snapshot>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    /// Clone out the current state.
    pub fn snapshot(&self) -> Snapshot {
        self.read().clone()
    }

    /// Record or replace the attendance summary for a (student, course).
    pub fn set_attendance(&self, student_id: Uuid, course_id: Uuid, summary: AttendanceSummary) {
        let mut state = self.write();
        state
            .attendance
            .retain(|r| !(r.student_id == student_id && r.course_id == course_id));
        state.attendance.push(AttendanceRecord {
            student_id,
            course_id,
            summary,
        });
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Snapshot> {
        self.inner.read().expect("registry lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Snapshot> {
        self.inner.write().expect("registry lock poisoned")
    }
}

fn upsert_by_id<T, F>(rows: &mut Vec<T>, row: T, same: F)
where
    F: Fn(&T) -> bool,
{
    match rows.iter_mut().find(|r| same(r)) {
        Some(existing) => *existing = row,
        None => rows.push(row),
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    // -- students -----------------------------------------------------------

    async fn student(&self, id: Uuid) -> anyhow::Result<Option<Student>> {
        Ok(self.read().students.iter().find(|s| s.id == id).cloned())
    }

    async fn upsert_student(&self, student: Student) -> anyhow::Result<()> {
        let id = student.id;
        upsert_by_id(&mut self.write().students, student, |s| s.id == id);
        Ok(())
    }

    async fn students(&self) -> anyhow::Result<Vec<Student>> {
        Ok(self.read().students.clone())
    }

    async fn apply_promotions(&self, promotions: &[CyclePromotion]) -> anyhow::Result<()> {
        let mut state = self.write();
        for promotion in promotions {
            if let Some(student) = state
                .students
                .iter_mut()
                .find(|s| s.id == promotion.student_id)
            {
                student.current_cycle = promotion.new_cycle;
            }
        }
        Ok(())
    }

    // -- courses ------------------------------------------------------------

    async fn course(&self, id: Uuid) -> anyhow::Result<Option<Course>> {
        Ok(self.read().courses.iter().find(|c| c.id == id).cloned())
    }

    async fn upsert_course(&self, course: Course) -> anyhow::Result<()> {
        let id = course.id;
        upsert_by_id(&mut self.write().courses, course, |c| c.id == id);
        Ok(())
    }

    async fn courses(&self) -> anyhow::Result<Vec<Course>> {
        Ok(self.read().courses.clone())
    }

    // -- periods ------------------------------------------------------------

    async fn period(&self, id: Uuid) -> anyhow::Result<Option<AcademicPeriod>> {
        Ok(self.read().periods.iter().find(|p| p.id == id).cloned())
    }

    async fn upsert_period(&self, period: AcademicPeriod) -> anyhow::Result<()> {
        let id = period.id;
        upsert_by_id(&mut self.write().periods, period, |p| p.id == id);
        Ok(())
    }

    async fn periods(&self) -> anyhow::Result<Vec<AcademicPeriod>> {
        Ok(self.read().periods.clone())
    }

    async fn active_period(&self) -> anyhow::Result<Option<AcademicPeriod>> {
        Ok(self
            .read()
            .periods
            .iter()
            .find(|p| p.state == PeriodState::Active)
            .cloned())
    }

    // -- enrollments --------------------------------------------------------

    async fn enrollment(&self, id: Uuid) -> anyhow::Result<Option<Enrollment>> {
        Ok(self.read().enrollments.iter().find(|e| e.id == id).cloned())
    }

    async fn upsert_enrollment(&self, enrollment: Enrollment) -> anyhow::Result<()> {
        let id = enrollment.id;
        upsert_by_id(&mut self.write().enrollments, enrollment, |e| e.id == id);
        Ok(())
    }

    async fn enrollments_by_period(&self, period_id: Uuid) -> anyhow::Result<Vec<Enrollment>> {
        Ok(self
            .read()
            .enrollments
            .iter()
            .filter(|e| e.period_id == period_id)
            .cloned()
            .collect())
    }

    async fn enrollments_by_student(&self, student_id: Uuid) -> anyhow::Result<Vec<Enrollment>> {
        Ok(self
            .read()
            .enrollments
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn freeze_final_grades(
        &self,
        period_id: Uuid,
        grades: &[FrozenGrade],
    ) -> anyhow::Result<()> {
        let mut state = self.write();
        for frozen in grades {
            if let Some(enrollment) = state
                .enrollments
                .iter_mut()
                .find(|e| e.id == frozen.enrollment_id && e.period_id == period_id)
            {
                enrollment.final_grade = frozen.final_grade;
            }
        }
        // The grade freeze and the state transition are one unit: a
        // fault can never leave grades frozen in a still-active period.
        if let Some(period) = state.periods.iter_mut().find(|p| p.id == period_id) {
            period.state = PeriodState::Closed;
        }
        Ok(())
    }

    // -- evaluation types ---------------------------------------------------

    async fn evaluation_types(&self, course_id: Uuid) -> anyhow::Result<Vec<EvaluationType>> {
        let mut types: Vec<EvaluationType> = self
            .read()
            .evaluation_types
            .iter()
            .filter(|t| t.course_id == course_id)
            .cloned()
            .collect();
        types.sort_by_key(|t| t.display_order);
        Ok(types)
    }

    async fn apply_scheme(&self, plan: &MigrationPlan) -> anyhow::Result<SchemeChangeStats> {
        let mut state = self.write();
        let mut stats = SchemeChangeStats::default();
        let course_of = state.course_of_enrollment();
        let in_course =
            |entry_enrollment: Uuid| course_of.get(&entry_enrollment) == Some(&plan.course_id);

        // Purge entries of removed types, then the type rows themselves.
        for removal in &plan.removals {
            let before = state.grade_entries.len();
            state.grade_entries.retain(|e| {
                !(in_course(e.enrollment_id) && e.label.eq_ignore_ascii_case(&removal.label))
            });
            stats.purged_entries += before - state.grade_entries.len();
            state
                .part_scores
                .retain(|p| !(in_course(p.enrollment_id) && p.label.eq_ignore_ascii_case(&removal.label)));
            state.evaluation_types.retain(|t| t.id != removal.id);
            stats.removed += 1;
        }

        // Relabel and reweight historical entries.
        for migration in &plan.label_migrations {
            for entry in state.grade_entries.iter_mut() {
                if in_course(entry.enrollment_id)
                    && migration.from_labels.contains(&entry.label.to_lowercase())
                {
                    if entry.label != migration.to_label {
                        entry.label = migration.to_label.clone();
                    }
                    entry.weight_percent = migration.weight_percent;
                    stats.migrated_entries += 1;
                }
            }
        }
        for refresh in &plan.weight_refreshes {
            for entry in state.grade_entries.iter_mut() {
                if in_course(entry.enrollment_id)
                    && entry.label.eq_ignore_ascii_case(&refresh.label)
                {
                    entry.weight_percent = refresh.weight_percent;
                    stats.migrated_entries += 1;
                }
            }
        }

        // Alias adoption can fold several historical labels onto one new
        // label for the same enrollment; keep the most recent entry.
        state
            .grade_entries
            .sort_by_key(|e| (e.enrollment_id, e.label.to_lowercase(), e.recorded_at));
        let mut deduped: Vec<GradeEntry> = Vec::with_capacity(state.grade_entries.len());
        for entry in state.grade_entries.drain(..) {
            match deduped.last() {
                Some(last)
                    if last.enrollment_id == entry.enrollment_id
                        && last.label.eq_ignore_ascii_case(&entry.label) =>
                {
                    *deduped.last_mut().expect("non-empty") = entry;
                }
                _ => deduped.push(entry),
            }
        }
        state.grade_entries = deduped;

        for update in &plan.updates {
            let id = update.id;
            upsert_by_id(&mut state.evaluation_types, update.clone(), |t| t.id == id);
            stats.updated += 1;
        }
        for create in &plan.creates {
            state.evaluation_types.push(create.clone());
            stats.created += 1;
        }

        Ok(stats)
    }

    // -- grade entries ------------------------------------------------------

    async fn grade_entries(&self, enrollment_id: Uuid) -> anyhow::Result<Vec<GradeEntry>> {
        Ok(self
            .read()
            .grade_entries
            .iter()
            .filter(|e| e.enrollment_id == enrollment_id)
            .cloned()
            .collect())
    }

    async fn upsert_grade_entry(&self, entry: GradeEntry) -> anyhow::Result<()> {
        let mut state = self.write();
        match state.grade_entries.iter_mut().find(|e| {
            e.enrollment_id == entry.enrollment_id && e.label.eq_ignore_ascii_case(&entry.label)
        }) {
            Some(existing) => *existing = entry,
            None => state.grade_entries.push(entry),
        }
        Ok(())
    }

    // -- part scores --------------------------------------------------------

    async fn record_part_score(&self, part: PartScore) -> anyhow::Result<Vec<PartScore>> {
        let mut state = self.write();
        state.part_scores.retain(|p| {
            !(p.enrollment_id == part.enrollment_id
                && p.label.eq_ignore_ascii_case(&part.label)
                && p.part == part.part)
        });
        state.part_scores.push(part.clone());
        Ok(state
            .part_scores
            .iter()
            .filter(|p| {
                p.enrollment_id == part.enrollment_id && p.label.eq_ignore_ascii_case(&part.label)
            })
            .cloned()
            .collect())
    }

    async fn clear_part_scores(&self, enrollment_id: Uuid, label: &str) -> anyhow::Result<()> {
        self.write().part_scores.retain(|p| {
            !(p.enrollment_id == enrollment_id && p.label.eq_ignore_ascii_case(label))
        });
        Ok(())
    }
}

#[async_trait]
impl AttendanceStatistics for InMemoryRegistry {
    async fn summary(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> anyhow::Result<Option<AttendanceSummary>> {
        Ok(self
            .read()
            .attendance
            .iter()
            .find(|r| r.student_id == student_id && r.course_id == course_id)
            .map(|r| r.summary.clone()))
    }
}
