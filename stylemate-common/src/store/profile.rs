//! Singleton profile record

use sqlx::{FromRow, SqlitePool};

use crate::models::{UserProfile, UserTraits, PROFILE_ID};
use crate::Result;

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: String,
    image_url: Option<String>,
    skin_tone: Option<String>,
    hair_color: Option<String>,
    body_type: Option<String>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile {
            id: row.id,
            image_url: row.image_url,
            traits: UserTraits {
                skin_tone: row.skin_tone,
                hair_color: row.hair_color,
                body_type: row.body_type,
            },
        }
    }
}

pub(super) async fn fetch(pool: &SqlitePool) -> Result<Option<UserProfile>> {
    let row: Option<ProfileRow> = sqlx::query_as(
        "SELECT id, image_url, skin_tone, hair_color, body_type FROM profile WHERE id = ?",
    )
    .bind(PROFILE_ID)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(UserProfile::from))
}

pub(super) async fn upsert(pool: &SqlitePool, profile: &UserProfile) -> Result<()> {
    let profile = profile.clone().normalized();

    sqlx::query(
        r#"
        INSERT OR REPLACE INTO profile (id, image_url, skin_tone, hair_color, body_type)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.image_url)
    .bind(&profile.traits.skin_tone)
    .bind(&profile.traits.hair_color)
    .bind(&profile.traits.body_type)
    .execute(pool)
    .await?;

    Ok(())
}
