//! Image blob endpoints
//!
//! Uploads and deletes require authentication; downloads are public so image
//! URLs can be used directly by clients and caches.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use stylemate_common::auth::Identity;
use stylemate_common::{time, uuid_utils, ImageData};
use tracing::info;

use crate::db::{self, StoredImage};
use crate::error::{json_body, non_blank};
use crate::{ApiError, ApiResult, AppState};

/// Content is addressed by a fresh id and never changes
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// `type/subtype` with RFC 6838 name characters, optionally followed by
/// parameters, and usable verbatim as a `Content-Type` header
fn is_valid_mime_type(value: &str) -> bool {
    let is_name = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    let essence = value.split(';').next().unwrap_or_default().trim();

    HeaderValue::from_str(value).is_ok()
        && matches!(
            essence.split_once('/'),
            Some((kind, subtype)) if is_name(kind) && is_name(subtype)
        )
}

/// Body of POST /api/images
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageRequest {
    pub base64: Option<String>,
    pub mime_type: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub file_id: String,
    pub mime_type: String,
}

/// POST /api/images
///
/// **Errors:**
/// - 400 Bad Request: missing `base64` / `mimeType`, a malformed `mimeType`,
///   or an undecodable payload
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<UploadImageRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UploadImageResponse>)> {
    let body = json_body(payload)?;

    let (data, mime_type) = match (non_blank(body.base64), non_blank(body.mime_type)) {
        (Some(data), Some(mime_type)) => (data, mime_type.trim().to_string()),
        _ => {
            return Err(ApiError::BadRequest(
                "base64 and mimeType are required".to_string(),
            ))
        }
    };

    if !is_valid_mime_type(&mime_type) {
        return Err(ApiError::BadRequest(format!("Invalid mimeType: {:?}", mime_type)));
    }

    // Accept a full data URL as well as a bare payload
    let data = match ImageData::from_data_url(&data) {
        Some(image) => image.data,
        None => data,
    };
    // Payloads may arrive line-wrapped
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| ApiError::BadRequest(format!("Invalid base64: {}", e)))?;

    let now = time::now_millis();
    let image = StoredImage {
        id: uuid_utils::generate(),
        owner_user_id: identity.user_id,
        content_type: mime_type,
        filename: non_blank(body.filename).unwrap_or_else(|| format!("image-{}", now)),
        bytes,
        created_at: now,
    };

    db::images::insert_image(&state.db, &image).await?;
    info!(file_id = %image.id, size = image.bytes.len(), "Stored image");

    Ok((
        StatusCode::CREATED,
        Json(UploadImageResponse {
            file_id: image.id,
            mime_type: image.content_type,
        }),
    ))
}

/// GET /images/:id
///
/// Does not require authentication.
pub async fn download_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let image = db::images::get_image(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Image {}", id)))?;

    Ok((
        [
            (header::CONTENT_TYPE, image.content_type),
            (header::CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL.to_string()),
        ],
        image.bytes,
    )
        .into_response())
}

/// DELETE /api/images/:id
///
/// 204 for the owner, 403 for anyone else, 404 if absent.
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let owner = db::images::get_owner(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Image {}", id)))?;

    if owner != identity.user_id {
        return Err(ApiError::Forbidden("Image belongs to another user".to_string()));
    }

    db::images::delete_image(&state.db, &id).await?;
    info!(file_id = %id, "Deleted image");
    Ok(StatusCode::NO_CONTENT)
}
