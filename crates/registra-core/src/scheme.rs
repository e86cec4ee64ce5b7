//! Per-course evaluation schemes and their reconfiguration.
//!
//! A configuration edit is planned as a pure [`MigrationPlan`] first and
//! then applied through a single atomic storage operation, so grade-entry
//! migrations and the scheme swap commit together or not at all. Grade
//! entries join evaluation types by label, which is what lets a rename
//! carry years of historical scores along instead of orphaning them.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::engine::AcademicEngine;
use crate::error::{EngineError, EngineResult};
use crate::model::EvaluationType;
use crate::traits::{NotificationKind, Recipient};

/// Absolute tolerance on the active-weight total. Strict: a total of
/// exactly 99.99 is out.
pub const WEIGHT_TOLERANCE: f64 = 0.01;

/// One entry of a submitted scheme configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeEntry {
    /// Existing evaluation-type id, or `None` to create a new one.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub label: String,
    pub weight_percent: f64,
    pub display_order: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Default seven-slot scheme
// ---------------------------------------------------------------------------

/// One slot of the implicit default scheme, with the historical label
/// spellings that free-text grade entries were recorded under.
#[derive(Debug, Clone, Copy)]
pub struct DefaultSlot {
    pub label: &'static str,
    pub weight_percent: f64,
    /// Lowercase historical variants, canonical label included.
    pub aliases: &'static [&'static str],
}

impl DefaultSlot {
    /// Case-insensitive match against the alias table.
    pub fn matches(&self, label: &str) -> bool {
        let needle = label.trim().to_lowercase();
        self.aliases.iter().any(|a| *a == needle)
    }
}

/// The scheme a course operates under before it is first configured.
/// First-time configurations are matched positionally against these
/// slots to migrate historical free-text grade labels.
pub const DEFAULT_SCHEME: [DefaultSlot; 7] = [
    DefaultSlot {
        label: "Midterm 1",
        weight_percent: 10.0,
        aliases: &["midterm 1", "midterm1", "midterm i", "mid-term 1", "parcial 1", "p1"],
    },
    DefaultSlot {
        label: "Midterm 2",
        weight_percent: 10.0,
        aliases: &["midterm 2", "midterm2", "midterm ii", "mid-term 2", "parcial 2", "p2"],
    },
    DefaultSlot {
        label: "Labs",
        weight_percent: 20.0,
        aliases: &["labs", "lab", "laboratory", "laboratorio", "practicas", "prácticas"],
    },
    DefaultSlot {
        label: "Midpoint Exam",
        weight_percent: 20.0,
        aliases: &["midpoint exam", "midpoint", "mid-point", "examen parcial", "medio curso"],
    },
    DefaultSlot {
        label: "Final Exam",
        weight_percent: 20.0,
        aliases: &["final exam", "final", "finals", "examen final", "ef"],
    },
    DefaultSlot {
        label: "Attitude",
        weight_percent: 5.0,
        aliases: &["attitude", "actitud", "participation", "participación"],
    },
    DefaultSlot {
        label: "Assignments",
        weight_percent: 15.0,
        aliases: &["assignments", "assignment", "homework", "tareas", "trabajos"],
    },
];

/// The slot whose scores are gated on attendance.
pub fn final_exam_slot() -> &'static DefaultSlot {
    &DEFAULT_SCHEME[4]
}

// ---------------------------------------------------------------------------
// Migration planning
// ---------------------------------------------------------------------------

/// Rewrite every grade entry in the course whose label matches one of
/// `from_labels` (lowercase) to `to_label`, refreshing the weight
/// snapshot. Covers both renames (one source) and first-time alias
/// adoption (several sources).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelMigration {
    pub from_labels: Vec<String>,
    pub to_label: String,
    pub weight_percent: f64,
}

/// Refresh the weight snapshot on entries whose label is unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightRefresh {
    pub label: String,
    pub weight_percent: f64,
}

/// Everything a configuration edit changes, computed up front and applied
/// as one unit by [`crate::traits::Registry::apply_scheme`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub course_id: Uuid,
    /// New evaluation-type rows.
    pub creates: Vec<EvaluationType>,
    /// Full new state for existing rows.
    pub updates: Vec<EvaluationType>,
    /// Grade-entry label/weight migrations.
    pub label_migrations: Vec<LabelMigration>,
    /// Grade-entry weight-snapshot refreshes.
    pub weight_refreshes: Vec<WeightRefresh>,
    /// Rows to delete; their grade entries are purged first.
    pub removals: Vec<EvaluationType>,
}

/// Counts reported back from applying a [`MigrationPlan`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemeChangeStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    /// Grade entries rewritten to a new label or weight.
    pub migrated_entries: usize,
    /// Grade entries deleted because their type was dropped.
    pub purged_entries: usize,
}

fn validate_entries(entries: &[SchemeEntry]) -> EngineResult<()> {
    if entries.is_empty() {
        return Err(EngineError::Validation(
            "a scheme needs at least one entry".into(),
        ));
    }
    let mut seen = Vec::new();
    for entry in entries {
        let label = entry.label.trim();
        if label.is_empty() {
            return Err(EngineError::Validation("empty evaluation label".into()));
        }
        if !(0.0..=100.0).contains(&entry.weight_percent) {
            return Err(EngineError::Validation(format!(
                "weight {} for '{label}' is outside 0..=100",
                entry.weight_percent
            )));
        }
        let lower = label.to_lowercase();
        if seen.contains(&lower) {
            return Err(EngineError::Validation(format!(
                "duplicate evaluation label '{label}'"
            )));
        }
        seen.push(lower);
    }

    let total: f64 = entries
        .iter()
        .filter(|e| e.active)
        .map(|e| e.weight_percent)
        .sum();
    // Weights carry 2-decimal precision, so the total is compared at that
    // precision; a float artifact must not pull 99.99 inside tolerance.
    let total = (total * 100.0).round() / 100.0;
    if (total - 100.0).abs() >= WEIGHT_TOLERANCE {
        return Err(EngineError::InvalidWeightTotal { total });
    }
    Ok(())
}

/// Compute the migration plan for a submitted configuration against the
/// course's existing evaluation types. Pure; storage is untouched.
pub fn plan_configuration(
    course_id: Uuid,
    existing: &[EvaluationType],
    entries: &[SchemeEntry],
) -> EngineResult<MigrationPlan> {
    validate_entries(entries)?;

    let mut plan = MigrationPlan {
        course_id,
        creates: Vec::new(),
        updates: Vec::new(),
        label_migrations: Vec::new(),
        weight_refreshes: Vec::new(),
        removals: Vec::new(),
    };

    if existing.is_empty() {
        // First-time configuration: the course was operating under the
        // implicit default scheme. Match entries positionally against
        // the default slots so historical free-text grade labels migrate
        // onto the new structured labels.
        for (entry, slot) in entries.iter().zip(DEFAULT_SCHEME.iter()) {
            if entry.id.is_some() {
                return Err(EngineError::ConflictingConfiguration(format!(
                    "entry '{}' references an evaluation type, but the course has none",
                    entry.label
                )));
            }
            plan.label_migrations.push(LabelMigration {
                from_labels: slot.aliases.iter().map(|a| a.to_string()).collect(),
                to_label: entry.label.trim().to_string(),
                weight_percent: entry.weight_percent,
            });
        }
        for entry in entries {
            plan.creates.push(new_type(course_id, entry));
        }
        return Ok(plan);
    }

    for entry in entries {
        match entry.id {
            None => plan.creates.push(new_type(course_id, entry)),
            Some(id) => {
                let Some(current) = existing.iter().find(|t| t.id == id) else {
                    return Err(EngineError::ConflictingConfiguration(format!(
                        "evaluation type {id} no longer exists for this course"
                    )));
                };
                let new_label = entry.label.trim();
                let renamed = current.label != new_label;
                let reweighted = (current.weight_percent - entry.weight_percent).abs() > 1e-9;
                if renamed {
                    plan.label_migrations.push(LabelMigration {
                        from_labels: vec![current.label.to_lowercase()],
                        to_label: new_label.to_string(),
                        weight_percent: entry.weight_percent,
                    });
                } else if reweighted {
                    plan.weight_refreshes.push(WeightRefresh {
                        label: current.label.clone(),
                        weight_percent: entry.weight_percent,
                    });
                }
                plan.updates.push(EvaluationType {
                    id,
                    course_id,
                    label: new_label.to_string(),
                    weight_percent: entry.weight_percent,
                    display_order: entry.display_order,
                    active: entry.active,
                });
            }
        }
    }

    // Types dropped from the configuration are removed; their recorded
    // scores are purged first. The purge count comes back in the stats
    // so the data loss is visible.
    for current in existing {
        let kept = entries.iter().any(|e| e.id == Some(current.id));
        if !kept {
            plan.removals.push(current.clone());
        }
    }

    Ok(plan)
}

fn new_type(course_id: Uuid, entry: &SchemeEntry) -> EvaluationType {
    EvaluationType {
        id: Uuid::new_v4(),
        course_id,
        label: entry.label.trim().to_string(),
        weight_percent: entry.weight_percent,
        display_order: entry.display_order,
        active: entry.active,
    }
}

// ---------------------------------------------------------------------------
// Engine operation
// ---------------------------------------------------------------------------

impl AcademicEngine {
    /// Replace a course's evaluation scheme, migrating recorded scores.
    ///
    /// Serialized per course; the plan is applied by the registry as one
    /// all-or-nothing unit.
    pub async fn configure_scheme(
        &self,
        course_id: Uuid,
        entries: Vec<SchemeEntry>,
    ) -> EngineResult<SchemeChangeStats> {
        let course = self
            .registry
            .course(course_id)
            .await?
            .ok_or_else(|| EngineError::not_found("course", course_id))?;

        let _guard = self.lock_course(course_id).await;

        let existing = self.registry.evaluation_types(course_id).await?;
        let plan = plan_configuration(course_id, &existing, &entries)?;
        let stats = self.registry.apply_scheme(&plan).await?;

        if stats.purged_entries > 0 {
            warn!(
                course = %course.code,
                purged = stats.purged_entries,
                "scheme edit dropped evaluation types with recorded scores"
            );
        }
        tracing::info!(
            course = %course.code,
            created = stats.created,
            updated = stats.updated,
            removed = stats.removed,
            migrated = stats.migrated_entries,
            "evaluation scheme configured"
        );

        self.notify(
            NotificationKind::SchemeConfigured,
            Recipient::Broadcast,
            format!("New evaluation scheme configured for {}", course.name),
        )
        .await;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str, weight: f64) -> SchemeEntry {
        SchemeEntry {
            id: None,
            label: label.into(),
            weight_percent: weight,
            display_order: 0,
            active: true,
        }
    }

    fn existing_type(course: Uuid, label: &str, weight: f64) -> EvaluationType {
        EvaluationType {
            id: Uuid::new_v4(),
            course_id: course,
            label: label.into(),
            weight_percent: weight,
            display_order: 0,
            active: true,
        }
    }

    #[test]
    fn default_scheme_weights_total_100() {
        let total: f64 = DEFAULT_SCHEME.iter().map(|s| s.weight_percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn weight_total_tolerance_edges() {
        let course = Uuid::new_v4();
        // 99.99 and 100.02 are out; 100.00 and 99.995 are in.
        let fail = plan_configuration(course, &[], &[entry("A", 49.99), entry("B", 50.0)]);
        assert!(matches!(
            fail,
            Err(EngineError::InvalidWeightTotal { .. })
        ));
        let fail = plan_configuration(course, &[], &[entry("A", 50.01), entry("B", 50.01)]);
        assert!(matches!(
            fail,
            Err(EngineError::InvalidWeightTotal { .. })
        ));
        assert!(plan_configuration(course, &[], &[entry("A", 50.0), entry("B", 50.0)]).is_ok());
        assert!(plan_configuration(course, &[], &[entry("A", 49.995), entry("B", 50.0)]).is_ok());
    }

    #[test]
    fn inactive_entries_do_not_count_toward_total() {
        let course = Uuid::new_v4();
        let mut inactive = entry("Old", 40.0);
        inactive.active = false;
        let plan =
            plan_configuration(course, &[], &[entry("A", 60.0), entry("B", 40.0), inactive]);
        assert!(plan.is_ok());
    }

    #[test]
    fn duplicate_and_empty_labels_are_rejected() {
        let course = Uuid::new_v4();
        let err = plan_configuration(course, &[], &[entry("A", 50.0), entry("a ", 50.0)]);
        assert!(matches!(err, Err(EngineError::Validation(_))));
        let err = plan_configuration(course, &[], &[entry("  ", 100.0)]);
        assert!(matches!(err, Err(EngineError::Validation(_))));
    }

    #[test]
    fn rename_migrates_grade_entries() {
        let course = Uuid::new_v4();
        let current = existing_type(course, "Parcial 1", 10.0);
        let submitted = vec![SchemeEntry {
            id: Some(current.id),
            label: "P1".into(),
            weight_percent: 100.0,
            display_order: 1,
            active: true,
        }];
        let plan = plan_configuration(course, &[current], &submitted).unwrap();
        assert_eq!(plan.label_migrations.len(), 1);
        assert_eq!(plan.label_migrations[0].from_labels, vec!["parcial 1"]);
        assert_eq!(plan.label_migrations[0].to_label, "P1");
        assert!((plan.label_migrations[0].weight_percent - 100.0).abs() < 1e-9);
        assert!(plan.weight_refreshes.is_empty());
        assert_eq!(plan.updates.len(), 1);
    }

    #[test]
    fn weight_only_change_refreshes_snapshots() {
        let course = Uuid::new_v4();
        let a = existing_type(course, "A", 40.0);
        let b = existing_type(course, "B", 60.0);
        let submitted = vec![
            SchemeEntry {
                id: Some(a.id),
                label: "A".into(),
                weight_percent: 50.0,
                display_order: 1,
                active: true,
            },
            SchemeEntry {
                id: Some(b.id),
                label: "B".into(),
                weight_percent: 50.0,
                display_order: 2,
                active: true,
            },
        ];
        let plan = plan_configuration(course, &[a, b], &submitted).unwrap();
        assert!(plan.label_migrations.is_empty());
        assert_eq!(plan.weight_refreshes.len(), 2);
    }

    #[test]
    fn dropped_types_are_removed() {
        let course = Uuid::new_v4();
        let keep = existing_type(course, "Keep", 50.0);
        let drop = existing_type(course, "Drop", 50.0);
        let submitted = vec![SchemeEntry {
            id: Some(keep.id),
            label: "Keep".into(),
            weight_percent: 100.0,
            display_order: 1,
            active: true,
        }];
        let plan = plan_configuration(course, &[keep, drop.clone()], &submitted).unwrap();
        assert_eq!(plan.removals.len(), 1);
        assert_eq!(plan.removals[0].id, drop.id);
    }

    #[test]
    fn unknown_id_is_a_conflict() {
        let course = Uuid::new_v4();
        let current = existing_type(course, "A", 100.0);
        let submitted = vec![SchemeEntry {
            id: Some(Uuid::new_v4()),
            label: "A".into(),
            weight_percent: 100.0,
            display_order: 1,
            active: true,
        }];
        let err = plan_configuration(course, &[current], &submitted);
        assert!(matches!(
            err,
            Err(EngineError::ConflictingConfiguration(_))
        ));
    }

    #[test]
    fn first_time_configuration_matches_default_slots_positionally() {
        let course = Uuid::new_v4();
        let submitted = vec![
            entry("First Partial", 30.0),
            entry("Second Partial", 30.0),
            entry("Lab Work", 40.0),
        ];
        let plan = plan_configuration(course, &[], &submitted).unwrap();
        assert_eq!(plan.creates.len(), 3);
        assert_eq!(plan.label_migrations.len(), 3);
        // 1st entry adopts the Midterm 1 slot's historical labels.
        assert!(plan.label_migrations[0]
            .from_labels
            .contains(&"parcial 1".to_string()));
        assert_eq!(plan.label_migrations[0].to_label, "First Partial");
        // 3rd entry adopts the Labs slot.
        assert!(plan.label_migrations[2]
            .from_labels
            .contains(&"laboratorio".to_string()));
    }

    #[test]
    fn default_slot_alias_matching_is_case_insensitive() {
        let slot = final_exam_slot();
        assert!(slot.matches("Final Exam"));
        assert!(slot.matches("  EXAMEN FINAL "));
        assert!(slot.matches("final"));
        assert!(!slot.matches("Midterm 1"));
    }
}
