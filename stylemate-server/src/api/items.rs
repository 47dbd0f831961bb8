//! Clothing item endpoints
//!
//! Every query is scoped to the authenticated caller.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use stylemate_common::auth::Identity;
use stylemate_common::models::normalize_tags;
use stylemate_common::{time, uuid_utils, Category};
use tracing::info;

use super::IdQuery;
use crate::db::{self, RemoteItem};
use crate::error::{json_body, non_blank};
use crate::{ApiError, ApiResult, AppState};

/// Body of POST /api/items
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub file_url: Option<String>,
    pub file_id: Option<String>,
    pub mime_type: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of PUT /api/items/:id/tags
#[derive(Debug, Deserialize)]
pub struct SetTagsRequest {
    pub tags: Vec<String>,
}

/// GET /api/items
///
/// Caller's items, newest first.
pub async fn list_items(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<RemoteItem>>> {
    let items = db::items::list_items(&state.db, &identity.user_id).await?;
    Ok(Json(items))
}

/// POST /api/items
///
/// **Errors:**
/// - 400 Bad Request: neither `fileUrl` nor `fileId`, missing `category` or
///   `description`, or an unrecognised category. Nothing is written.
pub async fn create_item(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RemoteItem>)> {
    let body = json_body(payload)?;

    let file_url = non_blank(body.file_url);
    let file_id = non_blank(body.file_id);
    let (category, description) = match (non_blank(body.category), non_blank(body.description)) {
        (Some(category), Some(description)) if file_url.is_some() || file_id.is_some() => {
            (category, description)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "fileUrl or fileId, plus category and description are required".to_string(),
            ))
        }
    };

    let category: Category = category
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("{}", e)))?;

    let item = RemoteItem {
        id: uuid_utils::generate(),
        user_id: identity.user_id,
        file_url,
        file_id,
        mime_type: non_blank(body.mime_type),
        category,
        description,
        tags: normalize_tags(&body.tags),
        created_at: time::now_millis(),
    };

    db::items::insert_item(&state.db, &item).await?;
    info!(item_id = %item.id, category = %item.category, "Created item");

    Ok((StatusCode::CREATED, Json(item)))
}

/// DELETE /api/items?id=
///
/// 204 whether or not anything matched; other users' items are never touched.
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = query.require()?;
    if db::items::delete_item(&state.db, &identity.user_id, &id).await? {
        info!(item_id = %id, "Deleted item");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/items/:id/tags
///
/// Replaces the whole tag list (trimmed, de-duplicated).
pub async fn set_item_tags(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<SetTagsRequest>, JsonRejection>,
) -> ApiResult<Json<RemoteItem>> {
    let body = json_body(payload)?;
    let tags = normalize_tags(&body.tags);

    if !db::items::set_item_tags(&state.db, &identity.user_id, &id, &tags).await? {
        return Err(ApiError::NotFound(format!("Item {}", id)));
    }

    let item = db::items::get_item(&state.db, &identity.user_id, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Item {}", id)))?;

    Ok(Json(item))
}
