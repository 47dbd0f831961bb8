//! Outfit collection

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use super::Collection;
use crate::models::Outfit;
use crate::Result;

#[derive(Debug, FromRow)]
struct OutfitRow {
    id: String,
    name: String,
    style: String,
    tags: String,
    description: String,
    item_ids: String,
}

impl TryFrom<OutfitRow> for Outfit {
    type Error = crate::Error;

    fn try_from(row: OutfitRow) -> Result<Self> {
        Ok(Outfit {
            id: row.id,
            name: row.name,
            style: row.style,
            tags: serde_json::from_str(&row.tags)?,
            description: row.description,
            item_ids: serde_json::from_str(&row.item_ids)?,
        })
    }
}

#[async_trait]
impl Collection for Outfit {
    const NAME: &'static str = "outfits";

    fn key(&self) -> &str {
        &self.id
    }

    async fn fetch_all(pool: &SqlitePool) -> Result<Vec<Self>> {
        let rows: Vec<OutfitRow> =
            sqlx::query_as("SELECT id, name, style, tags, description, item_ids FROM outfits")
                .fetch_all(pool)
                .await?;

        rows.into_iter().map(Outfit::try_from).collect()
    }

    async fn fetch(pool: &SqlitePool, id: &str) -> Result<Option<Self>> {
        let row: Option<OutfitRow> = sqlx::query_as(
            "SELECT id, name, style, tags, description, item_ids FROM outfits WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(Outfit::try_from).transpose()
    }

    async fn upsert(&self, pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO outfits (id, name, style, tags, description, item_ids)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.id)
        .bind(&self.name)
        .bind(&self.style)
        .bind(serde_json::to_string(&self.tags)?)
        .bind(&self.description)
        .bind(serde_json::to_string(&self.item_ids)?)
        .execute(pool)
        .await?;

        Ok(())
    }
}
