use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::pii::{MaskedEntity, MaskedText};
use crate::triage::TriageError;

/// Email submitted for triage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    /// Raw email body, possibly containing PII
    pub email_body: String,
}

/// Result of triaging one email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailResponse {
    /// Body as submitted
    pub input_email_body: String,

    /// What was masked, ascending by position
    pub list_of_masked_entities: Vec<MaskedEntity>,

    /// Body with PII replaced by tags
    pub masked_email: String,

    /// Category assigned to the masked body
    pub category_of_the_email: String,
}

/// Masked body plus the records needed to reverse it.
///
/// This is what `mask` emits and what `demask` consumes, possibly in another
/// process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskResponse {
    pub masked_email: String,
    pub list_of_masked_entities: Vec<MaskedEntity>,
}

impl From<MaskedText> for MaskResponse {
    fn from(masked: MaskedText) -> Self {
        Self {
            masked_email: masked.masked_text,
            list_of_masked_entities: masked.entities,
        }
    }
}

/// Error line emitted for a failed batch entry
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always "error"
    pub status: String,

    /// Error message details
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Internal job structure for the batch queue
#[derive(Debug)]
pub struct TriageJob {
    /// Position of the request in its batch
    pub index: usize,

    pub request: EmailRequest,

    /// Sender for the response channel
    pub response_tx: oneshot::Sender<Result<EmailResponse, TriageError>>,
}
