//! Clothing item collection

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use super::Collection;
use crate::models::{Category, ClothingItem};
use crate::Result;

#[derive(Debug, FromRow)]
struct ItemRow {
    id: String,
    image_url: String,
    category: String,
    description: String,
    created_at: i64,
    tags: String,
}

impl TryFrom<ItemRow> for ClothingItem {
    type Error = crate::Error;

    fn try_from(row: ItemRow) -> Result<Self> {
        Ok(ClothingItem {
            id: row.id,
            image_url: row.image_url,
            // Unrecognised text from older or foreign writers reads as Unknown
            category: Category::parse_lenient(&row.category),
            description: row.description,
            created_at: row.created_at,
            tags: serde_json::from_str(&row.tags)?,
        })
    }
}

#[async_trait]
impl Collection for ClothingItem {
    const NAME: &'static str = "items";

    fn key(&self) -> &str {
        &self.id
    }

    async fn fetch_all(pool: &SqlitePool) -> Result<Vec<Self>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, image_url, category, description, created_at, tags FROM items",
        )
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(ClothingItem::try_from).collect()
    }

    async fn fetch(pool: &SqlitePool, id: &str) -> Result<Option<Self>> {
        let row: Option<ItemRow> = sqlx::query_as(
            "SELECT id, image_url, category, description, created_at, tags FROM items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(ClothingItem::try_from).transpose()
    }

    async fn upsert(&self, pool: &SqlitePool) -> Result<()> {
        let tags = serde_json::to_string(&self.tags)?;
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO items (id, image_url, category, description, created_at, tags)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.id)
        .bind(&self.image_url)
        .bind(self.category.as_str())
        .bind(&self.description)
        .bind(self.created_at)
        .bind(tags)
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    #[tokio::test]
    async fn test_unknown_category_text_reads_as_unknown() {
        let store = LocalStore::in_memory();
        let pool = store.pool().await.unwrap();

        sqlx::query(
            "INSERT INTO items (id, image_url, category, description, created_at, tags) \
             VALUES ('x', 'u', 'Hats', 'Cap', 1, '[]')",
        )
        .execute(pool)
        .await
        .unwrap();

        let item: ClothingItem = store.get("x").await.unwrap().unwrap();
        assert_eq!(item.category, Category::Unknown);
    }
}
