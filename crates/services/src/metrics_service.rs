use serde::Serialize;
use tracing::debug;

use fraction_core::metrics::{MetricStatus, Metrics, SessionRow};
use storage::curriculum::CurriculumRepository;

use crate::error::MetricsServiceError;

/// One headline figure with its dashboard status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricLine {
    pub value: f64,
    pub status: MetricStatus,
}

/// Everything the dashboard shows, computed from stored history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub mastery_rate: MetricLine,
    pub error_reduction: MetricLine,
    pub engagement_efficiency: MetricLine,
    pub sessions: Vec<SessionRow>,
    pub error_count: usize,
}

impl MetricsReport {
    #[must_use]
    pub fn from_parts(metrics: Metrics, sessions: Vec<SessionRow>, error_count: usize) -> Self {
        Self {
            mastery_rate: MetricLine {
                value: metrics.mastery_rate,
                status: metrics.mastery_status(),
            },
            error_reduction: MetricLine {
                value: metrics.error_reduction,
                status: metrics.error_reduction_status(),
            },
            engagement_efficiency: MetricLine {
                value: metrics.engagement_efficiency,
                status: metrics.engagement_status(),
            },
            sessions,
            error_count,
        }
    }
}

/// Read-only aggregation over the persisted session history.
#[derive(Clone)]
pub struct MetricsService {
    repo: CurriculumRepository,
}

impl MetricsService {
    #[must_use]
    pub fn new(repo: CurriculumRepository) -> Self {
        Self { repo }
    }

    /// Recompute the dashboard from every stored session and error log.
    ///
    /// # Errors
    ///
    /// Returns `MetricsServiceError::Storage` if history cannot be read.
    pub async fn report(&self) -> Result<MetricsReport, MetricsServiceError> {
        let sessions = self.repo.load_sessions().await?;
        let error_count = self.repo.load_error_logs().await?.len();

        let metrics = Metrics::from_sessions(&sessions);
        let rows = sessions.iter().map(SessionRow::from_session).collect();
        debug!(sessions = sessions.len(), error_count, "metrics computed");
        Ok(MetricsReport::from_parts(metrics, rows, error_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::Storage;

    #[tokio::test]
    async fn empty_history_reports_zero_and_failure() {
        let service = MetricsService::new(Storage::in_memory().curriculum());
        let report = service.report().await.unwrap();

        assert!(report.mastery_rate.value.abs() < f64::EPSILON);
        assert_eq!(report.mastery_rate.status, MetricStatus::Failure);
        assert_eq!(report.engagement_efficiency.status, MetricStatus::Failure);
        assert!(report.sessions.is_empty());
        assert_eq!(report.error_count, 0);
    }

    #[test]
    fn report_serializes_statuses_in_lowercase() {
        let report = MetricsReport::from_parts(
            Metrics {
                mastery_rate: 80.0,
                error_reduction: 30.0,
                engagement_efficiency: 10.0,
            },
            Vec::new(),
            3,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mastery_rate"]["status"], "success");
        assert_eq!(json["error_reduction"]["status"], "warning");
        assert_eq!(json["engagement_efficiency"]["status"], "failure");
        assert_eq!(json["error_count"], 3);
    }
}
