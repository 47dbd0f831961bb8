//! Outfit endpoints

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use stylemate_common::auth::Identity;
use stylemate_common::{time, uuid_utils};

use super::IdQuery;
use crate::db::{self, RemoteOutfit};
use crate::error::{json_body, non_blank};
use crate::{ApiError, ApiResult, AppState};

/// Body of POST /api/outfits
///
/// Accepts the gateway's shape (`styleTags`, `reasoning`) or the stored shape
/// (`tags`, `description`, `style`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutfitRequest {
    pub name: Option<String>,
    pub style_tags: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub style: Option<String>,
    pub reasoning: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub item_ids: Vec<String>,
}

/// GET /api/outfits
pub async fn list_outfits(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<RemoteOutfit>>> {
    let outfits = db::outfits::list_outfits(&state.db, &identity.user_id).await?;
    Ok(Json(outfits))
}

/// POST /api/outfits
pub async fn create_outfit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateOutfitRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RemoteOutfit>)> {
    let body = json_body(payload)?;

    let name = non_blank(body.name)
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
    let tags = body.style_tags.or(body.tags).unwrap_or_default();
    let style = non_blank(body.style).unwrap_or_else(|| tags.join(", "));

    let outfit = RemoteOutfit {
        id: uuid_utils::generate(),
        user_id: identity.user_id,
        name,
        style,
        tags,
        description: body.reasoning.or(body.description).unwrap_or_default(),
        item_ids: body.item_ids,
        created_at: time::now_millis(),
    };

    db::outfits::insert_outfit(&state.db, &outfit).await?;
    Ok((StatusCode::CREATED, Json(outfit)))
}

/// DELETE /api/outfits?id=
pub async fn delete_outfit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = query.require()?;
    db::outfits::delete_outfit(&state.db, &identity.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
