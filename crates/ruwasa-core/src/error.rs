use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuwasaError {
    #[error("Invalid configuration: {field} — {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RuwasaError {
    fn from(e: serde_json::Error) -> Self {
        RuwasaError::SerializationError(e.to_string())
    }
}
