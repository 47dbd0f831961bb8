//! Image blob store

use sqlx::{FromRow, SqlitePool};
use stylemate_common::Result;

#[derive(Debug, Clone, FromRow)]
pub struct StoredImage {
    pub id: String,
    pub owner_user_id: String,
    pub content_type: String,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub created_at: i64,
}

pub async fn insert_image(pool: &SqlitePool, image: &StoredImage) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO images (id, owner_user_id, content_type, filename, bytes, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&image.id)
    .bind(&image.owner_user_id)
    .bind(&image.content_type)
    .bind(&image.filename)
    .bind(&image.bytes)
    .bind(image.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_image(pool: &SqlitePool, id: &str) -> Result<Option<StoredImage>> {
    let image = sqlx::query_as(
        "SELECT id, owner_user_id, content_type, filename, bytes, created_at FROM images WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(image)
}

/// Owner of a blob, without loading its bytes
pub async fn get_owner(pool: &SqlitePool, id: &str) -> Result<Option<String>> {
    let owner = sqlx::query_scalar("SELECT owner_user_id FROM images WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(owner)
}

pub async fn delete_image(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM images WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
