use tracing::{info, warn};

use fraction_core::model::{Progress, SessionNumber, SessionStatus};
use storage::curriculum::CurriculumRepository;

use crate::error::ProgressServiceError;

/// Curriculum overview and data reset.
#[derive(Clone)]
pub struct ProgressService {
    repo: CurriculumRepository,
}

impl ProgressService {
    #[must_use]
    pub fn new(repo: CurriculumRepository) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if progress cannot be read.
    pub async fn progress(&self) -> Result<Progress, ProgressServiceError> {
        Ok(self.repo.load_progress().await?)
    }

    /// Status of every session, in order.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if progress cannot be read.
    pub async fn curriculum(
        &self,
    ) -> Result<Vec<(SessionNumber, SessionStatus)>, ProgressServiceError> {
        Ok(self.repo.load_progress().await?.curriculum())
    }

    /// Delete all progress, sessions and error logs.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if a key cannot be removed.
    pub async fn reset_all(&self) -> Result<(), ProgressServiceError> {
        warn!("resetting all curriculum data");
        self.repo.reset_all().await?;
        info!("curriculum data cleared");
        Ok(())
    }
}
