use thiserror::Error;

/// Failures of the local staged-order slot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StagingError {
    #[error("staging I/O error: {message}")]
    Io { message: String },

    #[error("staged order could not be decoded: {message}")]
    Corrupt { message: String },
}

/// Failures of the backing record store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordStoreError {
    #[error("record store unavailable: {message}")]
    Unavailable { message: String },

    #[error("record store rejected {collection} operation: {message}")]
    Rejected { collection: String, message: String },
}

/// Order creation failed after the payment was already captured. Recoverable
/// by contract: callers must keep the staged order and payment reference so a
/// later attempt can still reconcile.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("order submission failed: {message}")]
    SubmissionFailed { message: String },
}

impl From<RecordStoreError> for SubmissionError {
    fn from(error: RecordStoreError) -> Self {
        SubmissionError::SubmissionFailed {
            message: error.to_string(),
        }
    }
}
