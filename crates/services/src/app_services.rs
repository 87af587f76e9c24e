use std::sync::Arc;

use fraction_core::settings::CurriculumSettings;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::metrics_service::MetricsService;
use crate::progress_service::ProgressService;
use crate::sessions::SessionLoopService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    session_loop: Arc<SessionLoopService>,
    metrics: Arc<MetricsService>,
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: CurriculumSettings,
        seed: Option<u64>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, settings, seed))
    }

    /// Build services over a fresh in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock, settings: CurriculumSettings, seed: Option<u64>) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, settings, seed)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        settings: CurriculumSettings,
        seed: Option<u64>,
    ) -> Self {
        let repo = storage.curriculum();
        let session_loop = Arc::new(
            SessionLoopService::new(clock, settings, repo.clone()).with_seed(seed),
        );
        let metrics = Arc::new(MetricsService::new(repo.clone()));
        let progress = Arc::new(ProgressService::new(repo));
        Self {
            session_loop,
            metrics,
            progress,
        }
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    #[must_use]
    pub fn metrics(&self) -> Arc<MetricsService> {
        Arc::clone(&self.metrics)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}
