use thiserror::Error;

pub type PaymentResult<T> = Result<T, PaymentError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Gateway rejected request: {message}")]
    GatewayRejected { message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },
}

impl PaymentError {
    /// Whether the caller may retry the same operation without changing its
    /// inputs. An expired credential is retryable once refreshed; an explicit
    /// gateway refusal is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::ValidationError { .. } => false,
            PaymentError::Unauthenticated { .. } => true,
            PaymentError::GatewayRejected { .. } => false,
            PaymentError::NetworkError { .. } => true,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            PaymentError::ValidationError { message, .. } => message.clone(),
            PaymentError::Unauthenticated { .. } => {
                "Your session has expired. Please sign in and try again".to_string()
            }
            // Gateway refusals carry an operator-facing explanation that must
            // reach the customer verbatim.
            PaymentError::GatewayRejected { message } => message.clone(),
            PaymentError::NetworkError { .. } => {
                "Payment service is temporarily unavailable. Please retry shortly".to_string()
            }
        }
    }
}
