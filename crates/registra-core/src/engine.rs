//! The engine facade that the surrounding system talks to.
//!
//! [`AcademicEngine`] owns the persistence boundary, the eligibility
//! gate, and the notification sink, plus the locks that serialize scheme
//! edits per course and period transitions globally. The operations
//! themselves live in the [`crate::scheme`], [`crate::ledger`] and
//! [`crate::period`] modules.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::gate::EligibilityGate;
use crate::model::{AcademicPeriod, Enrollment, MAX_CYCLE};
use crate::traits::{
    AttendanceStatistics, Notification, NotificationKind, NotificationSink, Recipient, Registry,
};

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cap applied by the promotion sweep.
    pub cycle_cap: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cycle_cap: MAX_CYCLE,
        }
    }
}

/// Lazily-created per-course locks serializing scheme edits and ledger
/// writes for one course.
#[derive(Default)]
pub(crate) struct CourseLocks {
    inner: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl CourseLocks {
    fn handle(&self, course_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().expect("course lock map poisoned");
        Arc::clone(
            map.entry(course_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }
}

/// The evaluation and grade computation engine.
pub struct AcademicEngine {
    pub(crate) registry: Arc<dyn Registry>,
    pub(crate) gate: EligibilityGate,
    pub(crate) notifier: Arc<dyn NotificationSink>,
    pub(crate) config: EngineConfig,
    course_locks: CourseLocks,
    /// Serializes period open/close system-wide; this is what upholds
    /// the single-active-period invariant under concurrency.
    pub(crate) period_lock: tokio::sync::Mutex<()>,
}

impl AcademicEngine {
    pub fn new(
        registry: Arc<dyn Registry>,
        attendance: Arc<dyn AttendanceStatistics>,
        notifier: Arc<dyn NotificationSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            gate: EligibilityGate::new(attendance),
            notifier,
            config,
            course_locks: CourseLocks::default(),
            period_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The eligibility gate, for callers that want to pre-check before
    /// submitting scores.
    pub fn gate(&self) -> &EligibilityGate {
        &self.gate
    }

    pub(crate) async fn lock_course(&self, course_id: Uuid) -> OwnedMutexGuard<()> {
        self.course_locks.handle(course_id).lock_owned().await
    }

    pub(crate) async fn fetch_enrollment(&self, id: Uuid) -> EngineResult<Enrollment> {
        self.registry
            .enrollment(id)
            .await?
            .ok_or_else(|| EngineError::not_found("enrollment", id))
    }

    pub(crate) async fn fetch_period(&self, id: Uuid) -> EngineResult<AcademicPeriod> {
        self.registry
            .period(id)
            .await?
            .ok_or_else(|| EngineError::not_found("period", id))
    }

    /// Fire-and-forget notification emission. Delivery failure is logged
    /// and never fails the calling operation.
    pub(crate) async fn notify(
        &self,
        kind: NotificationKind,
        recipient: Recipient,
        payload: impl Into<String>,
    ) {
        let notification = Notification {
            kind,
            recipient,
            payload: payload.into(),
        };
        if let Err(e) = self.notifier.deliver(notification).await {
            tracing::warn!("notification delivery failed: {e:#}");
        }
    }
}
