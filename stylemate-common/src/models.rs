//! Entity model
//!
//! The three persisted entities (ClothingItem, UserProfile, Outfit) plus the
//! value types exchanged with the AI gateway. All types serialize to JSON with
//! camelCase field names.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{time, uuid_utils};

/// Fixed id of the singleton profile record
pub const PROFILE_ID: &str = "user-profile";

/// Placeholder used when a trait cannot be extracted
pub const UNKNOWN_TRAIT: &str = "Unknown";

/// Description used for the classification fallback record
pub const UNIDENTIFIED_ITEM: &str = "Unidentified Item";

// ============================================================================
// Category
// ============================================================================

/// Clothing category (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Tops,
    Bottoms,
    Outerwear,
    Footwear,
    Accessories,
    Unknown,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 6] = [
        Category::Tops,
        Category::Bottoms,
        Category::Outerwear,
        Category::Footwear,
        Category::Accessories,
        Category::Unknown,
    ];

    /// Categories the model may assign (everything except `Unknown`)
    pub const CLASSIFIABLE: [Category; 5] = [
        Category::Tops,
        Category::Bottoms,
        Category::Outerwear,
        Category::Footwear,
        Category::Accessories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tops => "Tops",
            Category::Bottoms => "Bottoms",
            Category::Outerwear => "Outerwear",
            Category::Footwear => "Footwear",
            Category::Accessories => "Accessories",
            Category::Unknown => "Unknown",
        }
    }

    /// Parse a category, coercing anything unrecognised to `Unknown`
    pub fn parse_lenient(s: &str) -> Category {
        s.parse().unwrap_or(Category::Unknown)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when text does not name a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive match against the display names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// ============================================================================
// ClothingItem
// ============================================================================

/// One piece of clothing in the wardrobe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingItem {
    pub id: String,
    /// `data:` URL with the encoded photo, or a remote reference
    pub image_url: String,
    pub category: Category,
    pub description: String,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Unique tags in display order
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ClothingItem {
    /// New item with a fresh id, the current timestamp and no tags
    pub fn new(
        image_url: impl Into<String>,
        category: Category,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid_utils::generate(),
            image_url: image_url.into(),
            category,
            description: description.into(),
            created_at: time::now_millis(),
            tags: Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Append `tag` unless it is empty or already present.
    ///
    /// Returns true if the tag list changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove every occurrence of `tag`. Returns true if the tag list changed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }
}

/// Trim every tag and drop empty and repeated ones, keeping first occurrences
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

// ============================================================================
// UserProfile
// ============================================================================

/// Physical traits extracted from the profile photo
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTraits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin_tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hair_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
}

impl UserTraits {
    /// All three traits set to the "Unknown" placeholder
    pub fn unknown() -> Self {
        Self {
            skin_tone: Some(UNKNOWN_TRAIT.to_string()),
            hair_color: Some(UNKNOWN_TRAIT.to_string()),
            body_type: Some(UNKNOWN_TRAIT.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.skin_tone.is_none() && self.hair_color.is_none() && self.body_type.is_none()
    }
}

/// The singleton user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub traits: UserTraits,
}

impl UserProfile {
    pub fn with_photo(image_url: impl Into<String>, traits: UserTraits) -> Self {
        Self {
            id: PROFILE_ID.to_string(),
            image_url: Some(image_url.into()),
            traits,
        }
    }

    /// The record written by "clear": no photo, no traits
    pub fn cleared() -> Self {
        Self {
            id: PROFILE_ID.to_string(),
            image_url: None,
            traits: UserTraits::default(),
        }
    }

    pub fn has_photo(&self) -> bool {
        self.image_url.is_some()
    }

    /// Force the fixed id and drop traits when there is no photo
    pub fn normalized(mut self) -> Self {
        self.id = PROFILE_ID.to_string();
        if self.image_url.as_deref().map_or(true, str::is_empty) {
            self.image_url = None;
            self.traits = UserTraits::default();
        }
        self
    }
}

// ============================================================================
// Outfit
// ============================================================================

/// A stored outfit suggestion. `item_ids` are weak references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outfit {
    pub id: String,
    pub name: String,
    /// Style tags joined for display
    pub style: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Model-provided reasoning
    pub description: String,
    #[serde(default)]
    pub item_ids: Vec<String>,
}

impl Outfit {
    /// Build a stored outfit from a gateway result, assigning a fresh id
    pub fn from_generated(raw: GeneratedOutfit) -> Self {
        Self {
            id: uuid_utils::generate(),
            style: raw.style_tags.join(", "),
            name: raw.name,
            tags: raw.style_tags,
            description: raw.reasoning,
            item_ids: raw.item_ids,
        }
    }
}

// ============================================================================
// Gateway value types
// ============================================================================

/// Outfit as returned by the generative model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedOutfit {
    pub name: String,
    pub style_tags: Vec<String>,
    pub reasoning: String,
    pub item_ids: Vec<String>,
}

/// Wardrobe summary sent to the model (never includes the image)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeEntry {
    pub id: String,
    pub category: Category,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&ClothingItem> for WardrobeEntry {
    fn from(item: &ClothingItem) -> Self {
        Self {
            id: item.id.clone(),
            category: item.category,
            description: item.description.clone(),
            tags: item.tags.clone(),
        }
    }
}

/// One clothing item detected in a photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    pub category: Category,
    pub description: String,
}

impl ClassifiedItem {
    /// Record returned when classification fails
    pub fn fallback() -> Self {
        Self {
            category: Category::Unknown,
            description: UNIDENTIFIED_ITEM.to_string(),
        }
    }
}

/// Base64-encoded image with its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    /// Standard base64, no `data:` prefix
    pub data: String,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encode raw bytes
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, STANDARD.encode(bytes))
    }

    /// Parse `data:<mime>;base64,<payload>`
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        if mime_type.is_empty() || payload.is_empty() {
            return None;
        }
        Some(Self::new(mime_type, payload))
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.data.as_bytes())
    }
}
