//! Per-user clothing items

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use stylemate_common::{Category, Result};

/// Item record as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteItem {
    pub id: String,
    pub user_id: String,
    pub file_url: Option<String>,
    pub file_id: Option<String>,
    pub mime_type: Option<String>,
    pub category: Category,
    pub description: String,
    pub tags: Vec<String>,
    pub created_at: i64,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: String,
    user_id: String,
    file_url: Option<String>,
    file_id: Option<String>,
    mime_type: Option<String>,
    category: String,
    description: String,
    tags: String,
    created_at: i64,
}

impl TryFrom<ItemRow> for RemoteItem {
    type Error = stylemate_common::Error;

    fn try_from(row: ItemRow) -> Result<Self> {
        Ok(RemoteItem {
            id: row.id,
            user_id: row.user_id,
            file_url: row.file_url,
            file_id: row.file_id,
            mime_type: row.mime_type,
            category: Category::parse_lenient(&row.category),
            description: row.description,
            tags: serde_json::from_str(&row.tags)?,
            created_at: row.created_at,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, file_url, file_id, mime_type, category, description, tags, created_at FROM items";

/// Caller's items, newest first
pub async fn list_items(pool: &SqlitePool, user_id: &str) -> Result<Vec<RemoteItem>> {
    let sql = format!("{} WHERE user_id = ? ORDER BY created_at DESC", SELECT_COLUMNS);
    let rows: Vec<ItemRow> = sqlx::query_as(&sql).bind(user_id).fetch_all(pool).await?;
    rows.into_iter().map(RemoteItem::try_from).collect()
}

pub async fn get_item(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<RemoteItem>> {
    let sql = format!("{} WHERE user_id = ? AND id = ?", SELECT_COLUMNS);
    let row: Option<ItemRow> = sqlx::query_as(&sql)
        .bind(user_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(RemoteItem::try_from).transpose()
}

pub async fn insert_item(pool: &SqlitePool, item: &RemoteItem) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO items (id, user_id, file_url, file_id, mime_type, category, description, tags, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.user_id)
    .bind(&item.file_url)
    .bind(&item.file_id)
    .bind(&item.mime_type)
    .bind(item.category.as_str())
    .bind(&item.description)
    .bind(serde_json::to_string(&item.tags)?)
    .bind(item.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete one of the caller's items. Returns true if a row was removed.
pub async fn delete_item(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM items WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Replace the tag list of one of the caller's items
pub async fn set_item_tags(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    tags: &[String],
) -> Result<bool> {
    let result = sqlx::query("UPDATE items SET tags = ? WHERE id = ? AND user_id = ?")
        .bind(serde_json::to_string(tags)?)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
