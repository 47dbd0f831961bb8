//! Style gateway: prompts in, validated entity values out
//!
//! Every public operation wraps its model call in a validate-or-fallback
//! boundary. Failures are logged and replaced by a fixed fallback value, so
//! callers never see an error from here.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use stylemate_common::models::{Category, UNKNOWN_TRAIT};
use stylemate_common::{ClassifiedItem, GeneratedOutfit, ImageData, UserTraits, WardrobeEntry};
use tracing::{debug, info, warn};

use crate::model::{GenerationRequest, GenerativeModel};
use crate::{prompts, ModelError};

/// Maximum number of outfits kept from one generation
pub const MAX_OUTFITS: usize = 3;

/// Inputs to outfit generation beyond the wardrobe itself
#[derive(Debug, Clone, Default)]
pub struct OutfitRequest<'a> {
    pub profile_image: Option<&'a ImageData>,
    pub traits: Option<&'a UserTraits>,
    /// Free-text occasion / style request
    pub user_request: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RawClassified {
    category: String,
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTraits {
    skin_tone: Option<String>,
    hair_color: Option<String>,
    body_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOutfit {
    name: String,
    #[serde(default)]
    style_tags: Vec<String>,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    item_ids: Vec<String>,
}

/// Gateway to the generative model
#[derive(Clone)]
pub struct StyleGateway {
    model: Arc<dyn GenerativeModel>,
}

impl std::fmt::Debug for StyleGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleGateway").finish_non_exhaustive()
    }
}

impl StyleGateway {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Detect every clothing item in a photo
    ///
    /// Returns `[Unknown, "Unidentified Item"]` on any failure. An empty array
    /// from the model is a valid "nothing detected" answer.
    pub async fn classify(&self, image: &ImageData) -> Vec<ClassifiedItem> {
        match self.try_classify(image).await {
            Ok(items) => {
                info!("Classified {} item(s) in image", items.len());
                items
            }
            Err(e) => {
                warn!("Image classification failed, using fallback: {}", e);
                vec![ClassifiedItem::fallback()]
            }
        }
    }

    async fn try_classify(&self, image: &ImageData) -> Result<Vec<ClassifiedItem>, ModelError> {
        let request = GenerationRequest::new(prompts::classify_schema())
            .image(image.clone())
            .text(prompts::CLASSIFY_PROMPT);

        let text = self.model.generate(&request).await?;
        let raw: Vec<RawClassified> = serde_json::from_str(strip_code_fences(&text))?;

        Ok(raw
            .into_iter()
            .map(|r| ClassifiedItem {
                category: Category::parse_lenient(&r.category),
                description: r.description,
            })
            .collect())
    }

    /// Extract physical traits from a profile photo
    ///
    /// Returns all three traits as "Unknown" on any failure.
    pub async fn extract_traits(&self, image: &ImageData) -> UserTraits {
        match self.try_extract_traits(image).await {
            Ok(traits) => traits,
            Err(e) => {
                warn!("Trait extraction failed, using fallback: {}", e);
                UserTraits::unknown()
            }
        }
    }

    async fn try_extract_traits(&self, image: &ImageData) -> Result<UserTraits, ModelError> {
        let request = GenerationRequest::new(prompts::traits_schema())
            .image(image.clone())
            .text(prompts::TRAITS_PROMPT);

        let text = self.model.generate(&request).await?;
        let raw: RawTraits = serde_json::from_str(strip_code_fences(&text))?;

        Ok(UserTraits {
            skin_tone: Some(or_unknown(raw.skin_tone)),
            hair_color: Some(or_unknown(raw.hair_color)),
            body_type: Some(or_unknown(raw.body_type)),
        })
    }

    /// Suggest up to three outfits built from `wardrobe`
    ///
    /// An empty wardrobe returns an empty list without calling the model.
    /// Any failure also yields an empty list.
    pub async fn generate_outfits(
        &self,
        wardrobe: &[WardrobeEntry],
        request: OutfitRequest<'_>,
    ) -> Vec<GeneratedOutfit> {
        if wardrobe.is_empty() {
            debug!("Empty wardrobe, skipping outfit generation");
            return Vec::new();
        }

        match self.try_generate_outfits(wardrobe, &request).await {
            Ok(outfits) => {
                info!("Generated {} outfit(s)", outfits.len());
                outfits
            }
            Err(e) => {
                warn!("Outfit generation failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_generate_outfits(
        &self,
        wardrobe: &[WardrobeEntry],
        request: &OutfitRequest<'_>,
    ) -> Result<Vec<GeneratedOutfit>, ModelError> {
        let prompt = prompts::outfits_prompt(
            wardrobe,
            request.traits,
            request.profile_image.is_some(),
            request.user_request,
        )?;

        let mut generation = GenerationRequest::new(prompts::outfits_schema());
        if let Some(image) = request.profile_image {
            generation = generation.image(image.clone());
        }
        let generation = generation.text(prompt);

        let text = self.model.generate(&generation).await?;
        let value: Value = serde_json::from_str(strip_code_fences(&text))?;

        let known: HashSet<&str> = wardrobe.iter().map(|e| e.id.as_str()).collect();
        validate_outfits(value, &known)
    }
}

/// Keep well-formed outfits whose ids resolve against the wardrobe
fn validate_outfits(
    value: Value,
    known: &HashSet<&str>,
) -> Result<Vec<GeneratedOutfit>, ModelError> {
    let Value::Array(entries) = value else {
        return Err(ModelError::Parse("expected a JSON array of outfits".to_string()));
    };

    let mut outfits = Vec::new();
    for entry in entries {
        let raw: RawOutfit = match serde_json::from_value(entry) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Skipping malformed outfit: {}", e);
                continue;
            }
        };

        let item_ids: Vec<String> = raw
            .item_ids
            .into_iter()
            .filter(|id| known.contains(id.as_str()))
            .collect();

        if item_ids.is_empty() {
            debug!("Dropping outfit '{}' with no known items", raw.name);
            continue;
        }

        outfits.push(GeneratedOutfit {
            name: raw.name,
            style_tags: raw.style_tags,
            reasoning: raw.reasoning,
            item_ids,
        });

        if outfits.len() == MAX_OUTFITS {
            break;
        }
    }

    Ok(outfits)
}

fn or_unknown(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_TRAIT.to_string())
}

/// Remove a surrounding Markdown code fence (```json ... ```), if any
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the optional language tag on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("[1]"), "[1]");
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  ```\n{\"a\":1}\n```  "), "{\"a\":1}");
        // Unterminated fence still yields the body
        assert_eq!(strip_code_fences("```json\n[2]"), "[2]");
    }

    #[test]
    fn test_validate_outfits_strips_unknown_ids_and_caps() {
        let known: HashSet<&str> = ["a", "b"].into_iter().collect();
        let value = serde_json::json!([
            {"name": "One", "styleTags": ["x"], "reasoning": "r", "itemIds": ["a", "zzz"]},
            {"name": "Ghost", "styleTags": [], "reasoning": "r", "itemIds": ["zzz"]},
            {"bogus": true},
            {"name": "Two", "styleTags": [], "reasoning": "r", "itemIds": ["b"]},
            {"name": "Three", "styleTags": [], "reasoning": "r", "itemIds": ["a", "b"]},
            {"name": "Four", "styleTags": [], "reasoning": "r", "itemIds": ["a"]}
        ]);

        let outfits = validate_outfits(value, &known).unwrap();
        let names: Vec<&str> = outfits.iter().map(|o| o.name.as_str()).collect();

        assert_eq!(names, vec!["One", "Two", "Three"]);
        assert_eq!(outfits[0].item_ids, vec!["a".to_string()]);
    }

    #[test]
    fn test_validate_outfits_rejects_non_array() {
        let known = HashSet::new();
        assert!(validate_outfits(serde_json::json!({"name": "x"}), &known).is_err());
    }

    #[test]
    fn test_or_unknown() {
        assert_eq!(or_unknown(Some("Fair".to_string())), "Fair");
        assert_eq!(or_unknown(Some("  ".to_string())), "Unknown");
        assert_eq!(or_unknown(None), "Unknown");
    }
}
