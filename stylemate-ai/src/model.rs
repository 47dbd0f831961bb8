//! Generative model abstraction

use async_trait::async_trait;
use stylemate_common::ImageData;

use crate::ModelError;

/// One piece of a multimodal prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Image(ImageData),
    Text(String),
}

/// Prompt plus the JSON schema the reply must follow
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub parts: Vec<Part>,
    pub response_schema: serde_json::Value,
}

impl GenerationRequest {
    pub fn new(response_schema: serde_json::Value) -> Self {
        Self {
            parts: Vec::new(),
            response_schema,
        }
    }

    pub fn image(mut self, image: ImageData) -> Self {
        self.parts.push(Part::Image(image));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text(text.into()));
        self
    }

    /// Concatenated text parts (used for logging and tests)
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn image_count(&self) -> usize {
        self.parts.iter().filter(|p| matches!(p, Part::Image(_))).count()
    }
}

/// A model that answers a structured prompt with JSON text
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Returns the raw reply text, expected to be JSON
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError>;
}
