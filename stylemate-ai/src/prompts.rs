//! Prompt text and response schemas

use serde_json::{json, Value};
use stylemate_common::models::Category;
use stylemate_common::{UserTraits, WardrobeEntry};

pub(crate) const CLASSIFY_PROMPT: &str = "\
TASK:
Detect ALL distinct clothing items in the input image.
Multiple items may appear in a single photo (e.g., a pile or a full outfit).

For each item:
- Categorize into one of: [\"Tops\", \"Bottoms\", \"Outerwear\", \"Footwear\", \"Accessories\"]
- Generate a short human-readable description (e.g., \"Blue denim jacket\", \"White sneakers\").

Return strictly valid JSON array.";

pub(crate) const TRAITS_PROMPT: &str = "\
Analyze the person in this photo to assist with personal styling.
Extract the following physical traits:
1. Skin Tone (e.g., Fair, Medium, Deep, Olive)
2. Hair Color
3. Body Type (approximate, e.g., Athletic, Curvy, Slim, Tall)

Return strictly valid JSON.";

pub(crate) fn classify_schema() -> Value {
    let categories: Vec<&str> = Category::CLASSIFIABLE.iter().map(Category::as_str).collect();
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "category": {"type": "STRING", "enum": categories},
                "description": {"type": "STRING"}
            },
            "required": ["category", "description"]
        }
    })
}

pub(crate) fn traits_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "skinTone": {"type": "STRING"},
            "hairColor": {"type": "STRING"},
            "bodyType": {"type": "STRING"}
        },
        "required": ["skinTone", "hairColor", "bodyType"]
    })
}

pub(crate) fn outfits_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": {"type": "STRING"},
                "styleTags": {"type": "ARRAY", "items": {"type": "STRING"}},
                "reasoning": {"type": "STRING"},
                "itemIds": {"type": "ARRAY", "items": {"type": "STRING"}}
            },
            "required": ["name", "styleTags", "reasoning", "itemIds"]
        }
    })
}

fn trait_or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(stylemate_common::models::UNKNOWN_TRAIT)
}

/// Stylist prompt; optional sections are omitted when their input is absent
pub(crate) fn outfits_prompt(
    wardrobe: &[WardrobeEntry],
    traits: Option<&UserTraits>,
    has_photo: bool,
    user_request: Option<&str>,
) -> serde_json::Result<String> {
    let mut prompt = String::from("You are StyleMate, an AI personal stylist.\n\nINPUT DATA:\n");
    prompt.push_str(&format!(
        "1. Wardrobe (JSON): {}\n",
        serde_json::to_string(wardrobe)?
    ));

    if let Some(traits) = traits.filter(|t| !t.is_empty()) {
        prompt.push_str(&format!(
            "2. User Profile Traits: Skin Tone: {}, Hair: {}, Body Type: {}\n",
            trait_or_unknown(&traits.skin_tone),
            trait_or_unknown(&traits.hair_color),
            trait_or_unknown(&traits.body_type),
        ));
    }
    if has_photo {
        prompt.push_str("3. User Photo: Provided.\n");
    }
    if let Some(request) = user_request.map(str::trim).filter(|r| !r.is_empty()) {
        prompt.push_str(&format!("4. User Request: {}\n", request));
    }

    prompt.push_str(
        "
TASK:
Generate EXACTLY 3 distinct, complete outfit combinations using ONLY the itemIds provided in the wardrobe.

GUIDELINES:
- Ensure color coordination matches the user's skin tone and hair color if provided.
- Suggest outfits that flatter the user's body type if provided.
- Create valid combinations (e.g. Top + Bottom + Shoes).
- Strongly follow the user's request if provided (occasion, style, color, budget, weather).

For each outfit return:
- Name (e.g., \"Urban Casual Layers\")
- Style Tags (e.g., [\"casual\", \"warm weather\"])
- Reasoning (Why this works for this specific user)
- ItemIds (Array of IDs used)

Return strictly valid JSON.",
    );

    Ok(prompt)
}
