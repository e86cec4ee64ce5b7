//! Command implementations, plus the shared data-file plumbing.

pub mod configure;
pub mod grades;
pub mod import;
pub mod init;
pub mod period;
pub mod ranking;
pub mod record;
pub mod report;
pub mod seed;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use uuid::Uuid;

use registra_core::engine::{AcademicEngine, EngineConfig};
use registra_core::model::{AcademicPeriod, Course};
use registra_core::traits::{Notification, NotificationSink, Registry};
use registra_store::{persist, InMemoryRegistry};

/// Notification sink that writes to the log; the CLI has no delivery
/// channel beyond its own output.
struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notification: Notification) -> anyhow::Result<()> {
        tracing::info!(
            kind = ?notification.kind,
            recipient = ?notification.recipient,
            "{}",
            notification.payload
        );
        Ok(())
    }
}

/// The loaded data file plus an engine over it. Mutating commands call
/// [`Workspace::save`] before returning.
pub(crate) struct Workspace {
    pub store: Arc<InMemoryRegistry>,
    pub engine: AcademicEngine,
    path: PathBuf,
}

impl Workspace {
    pub fn save(&self) -> Result<()> {
        persist::save_snapshot(&self.store, &self.path)
    }

    /// Resolve a `--period` argument: an id, or a period name.
    pub async fn resolve_period(&self, reference: &str) -> Result<AcademicPeriod> {
        let periods = self.store.periods().await?;
        if let Ok(id) = Uuid::parse_str(reference) {
            if let Some(period) = periods.iter().find(|p| p.id == id) {
                return Ok(period.clone());
            }
        }
        match periods.iter().find(|p| p.name == reference) {
            Some(period) => Ok(period.clone()),
            None => bail!("no period named '{reference}' in the data file"),
        }
    }

    /// Resolve a course by its registrar code.
    pub async fn resolve_course(&self, code: &str) -> Result<Course> {
        let courses = self.store.courses().await?;
        match courses.iter().find(|c| c.code.eq_ignore_ascii_case(code)) {
            Some(course) => Ok(course.clone()),
            None => bail!("no course with code '{code}' in the data file"),
        }
    }
}

/// Load the data file (or start empty) and build an engine over it. The
/// store doubles as the attendance-statistics collaborator.
pub(crate) fn open_workspace(path: &Path) -> Result<Workspace> {
    let store = if path.exists() {
        persist::load_snapshot(path)
            .with_context(|| format!("failed to load data file {}", path.display()))?
    } else {
        InMemoryRegistry::new()
    };
    let store = Arc::new(store);
    let engine = AcademicEngine::new(
        store.clone(),
        store.clone(),
        Arc::new(LogSink),
        EngineConfig::default(),
    );
    Ok(Workspace {
        store,
        engine,
        path: path.to_path_buf(),
    })
}
