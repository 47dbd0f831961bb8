//! Generative model errors

use thiserror::Error;

/// Failure talking to the model or reading its reply
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Parse(err.to_string())
    }
}
