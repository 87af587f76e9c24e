#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod metrics_service;
pub mod progress_service;
pub mod sessions;

pub use fraction_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, MetricsServiceError, ProgressServiceError, SessionError};
pub use metrics_service::{MetricsReport, MetricsService};
pub use progress_service::ProgressService;

pub use sessions::{
    CurriculumSession, NextStep, SessionAnswerResult, SessionLoopService, SessionProgress,
};
