//! Profile endpoints (one profile per user)

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use stylemate_common::auth::Identity;
use stylemate_common::{UserProfile, UserTraits, PROFILE_ID};

use crate::db;
use crate::error::{json_body, non_blank};
use crate::{ApiError, ApiResult, AppState};

/// Body of PUT /api/profile
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutProfileRequest {
    pub image_url: Option<String>,
    #[serde(default)]
    pub traits: UserTraits,
}

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<UserProfile>> {
    db::profiles::get_profile(&state.db, &identity.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No profile".to_string()))
}

/// PUT /api/profile
///
/// Traits are dropped when no photo is given.
pub async fn put_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<PutProfileRequest>, JsonRejection>,
) -> ApiResult<Json<UserProfile>> {
    let body = json_body(payload)?;
    let profile = UserProfile {
        id: PROFILE_ID.to_string(),
        image_url: non_blank(body.image_url),
        traits: body.traits,
    };

    let saved = db::profiles::save_profile(&state.db, &identity.user_id, profile).await?;
    Ok(Json(saved))
}

/// DELETE /api/profile
///
/// Writes the cleared record (no photo, no traits).
pub async fn clear_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<StatusCode> {
    db::profiles::save_profile(&state.db, &identity.user_id, UserProfile::cleared()).await?;
    Ok(StatusCode::NO_CONTENT)
}
