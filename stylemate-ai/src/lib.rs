//! # StyleMate AI Inference Gateway
//!
//! Stateless calls that forward structured prompts (image + text) to a
//! generative model and turn its JSON replies into entity values.
//!
//! - [`GenerativeModel`] is the seam to the external model; [`GeminiClient`]
//!   is the production implementation.
//! - [`StyleGateway`] owns prompt construction and validate-or-fallback
//!   parsing. Its operations never fail: any model or parse error yields a
//!   fixed fallback value.

pub mod error;
pub mod gateway;
pub mod gemini_client;
pub mod model;
mod prompts;

pub use error::ModelError;
pub use gateway::{OutfitRequest, StyleGateway};
pub use gemini_client::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use model::{GenerationRequest, GenerativeModel, Part};
