//! Per-user outfits

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use stylemate_common::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOutfit {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub style: String,
    pub tags: Vec<String>,
    pub description: String,
    pub item_ids: Vec<String>,
    pub created_at: i64,
}

#[derive(Debug, FromRow)]
struct OutfitRow {
    id: String,
    user_id: String,
    name: String,
    style: String,
    tags: String,
    description: String,
    item_ids: String,
    created_at: i64,
}

impl TryFrom<OutfitRow> for RemoteOutfit {
    type Error = stylemate_common::Error;

    fn try_from(row: OutfitRow) -> Result<Self> {
        Ok(RemoteOutfit {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            style: row.style,
            tags: serde_json::from_str(&row.tags)?,
            description: row.description,
            item_ids: serde_json::from_str(&row.item_ids)?,
            created_at: row.created_at,
        })
    }
}

pub async fn list_outfits(pool: &SqlitePool, user_id: &str) -> Result<Vec<RemoteOutfit>> {
    let rows: Vec<OutfitRow> = sqlx::query_as(
        r#"
        SELECT id, user_id, name, style, tags, description, item_ids, created_at
        FROM outfits
        WHERE user_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(RemoteOutfit::try_from).collect()
}

pub async fn insert_outfit(pool: &SqlitePool, outfit: &RemoteOutfit) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO outfits (id, user_id, name, style, tags, description, item_ids, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&outfit.id)
    .bind(&outfit.user_id)
    .bind(&outfit.name)
    .bind(&outfit.style)
    .bind(serde_json::to_string(&outfit.tags)?)
    .bind(&outfit.description)
    .bind(serde_json::to_string(&outfit.item_ids)?)
    .bind(outfit.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_outfit(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM outfits WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
