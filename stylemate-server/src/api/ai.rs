//! AI gateway endpoints
//!
//! Thin HTTP wrappers over [`StyleGateway`]. The gateway never fails, so
//! these only reject malformed requests and a missing API key.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use stylemate_ai::OutfitRequest;
use stylemate_common::{
    Category, ClassifiedItem, GeneratedOutfit, ImageData, UserTraits, WardrobeEntry,
};

use crate::error::{json_body, non_blank};
use crate::{ApiError, ApiResult, AppState};

/// MIME type assumed when the client sends a bare base64 payload
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Wardrobe entry as sent by clients; category text is coerced, not rejected
#[derive(Debug, Deserialize)]
pub struct WardrobeInput {
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<WardrobeInput> for WardrobeEntry {
    fn from(input: WardrobeInput) -> Self {
        WardrobeEntry {
            id: input.id,
            category: Category::parse_lenient(&input.category),
            description: input.description,
            tags: input.tags,
        }
    }
}

/// Body of POST /api/generate-outfits
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutfitsRequest {
    pub wardrobe: Option<Vec<WardrobeInput>>,
    pub user_photo: Option<String>,
    pub user_traits: Option<UserTraits>,
    pub user_criteria: Option<String>,
}

/// Body of POST /api/classify and POST /api/extract-traits
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    pub base64: Option<String>,
    pub mime_type: Option<String>,
}

/// Build image data from a data URL or a bare base64 payload
fn to_image(data: String, mime_type: Option<String>) -> ImageData {
    match ImageData::from_data_url(&data) {
        Some(image) => image,
        None => ImageData::new(
            non_blank(mime_type).unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string()),
            data,
        ),
    }
}

impl ImageRequest {
    fn into_image(self) -> ApiResult<ImageData> {
        let data = non_blank(self.base64)
            .ok_or_else(|| ApiError::BadRequest("base64 is required".to_string()))?;
        Ok(to_image(data, self.mime_type))
    }
}

/// POST /api/generate-outfits
///
/// **Errors:**
/// - 500: no API key configured
/// - 400: `wardrobe` absent or empty
pub async fn generate_outfits(
    State(state): State<AppState>,
    payload: Result<Json<GenerateOutfitsRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<GeneratedOutfit>>> {
    let gateway = state.require_gateway()?;
    let body = json_body(payload)?;

    let wardrobe: Vec<WardrobeEntry> = match body.wardrobe {
        Some(entries) if !entries.is_empty() => {
            entries.into_iter().map(WardrobeEntry::from).collect()
        }
        _ => return Err(ApiError::BadRequest("wardrobe array required".to_string())),
    };

    let photo = non_blank(body.user_photo).map(|data| to_image(data, None));
    let request = OutfitRequest {
        profile_image: photo.as_ref(),
        traits: body.user_traits.as_ref(),
        user_request: body.user_criteria.as_deref(),
    };

    Ok(Json(gateway.generate_outfits(&wardrobe, request).await))
}

/// POST /api/classify
pub async fn classify(
    State(state): State<AppState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<ClassifiedItem>>> {
    let gateway = state.require_gateway()?;
    let image = json_body(payload)?.into_image()?;

    Ok(Json(gateway.classify(&image).await))
}

/// POST /api/extract-traits
pub async fn extract_traits(
    State(state): State<AppState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> ApiResult<Json<UserTraits>> {
    let gateway = state.require_gateway()?;
    let image = json_body(payload)?.into_image()?;

    Ok(Json(gateway.extract_traits(&image).await))
}
