//! Error types for stylemate-ui

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Outfit generation needs at least two wardrobe items
    #[error("Add at least 2 items to your wardrobe first (have {0})")]
    NotEnoughItems(usize),

    /// No Gemini API key was configured
    #[error("AI features need a Gemini API key (set GEMINI_API_KEY)")]
    GatewayUnavailable,

    /// File is not an image type we can send to the model
    #[error("Not a supported image: {0}")]
    UnsupportedImage(String),

    #[error("Store error: {0}")]
    Store(#[from] stylemate_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
