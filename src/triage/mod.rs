pub mod config;
pub mod models;
pub mod processor;
pub mod workers;

use thiserror::Error;

pub use config::TriageConfig;
pub use models::{EmailRequest, EmailResponse, ErrorResponse, MaskResponse};
pub use processor::EmailTriage;
pub use workers::process_batch;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriageError {
    /// No model was loaded at startup
    #[error("Classifier not loaded")]
    ClassifierUnavailable,

    #[error("Invalid batch configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Job queue closed before request {index} was accepted")]
    QueueClosed { index: usize },

    #[error("Worker dropped request {index}")]
    WorkerDropped { index: usize },

    #[error("Worker failed on request {index}: {message}")]
    WorkerFailed { index: usize, message: String },
}
