//! Per-user singleton profile

use sqlx::{FromRow, SqlitePool};
use stylemate_common::{time, Result, UserProfile, UserTraits, PROFILE_ID};

#[derive(Debug, FromRow)]
struct ProfileRow {
    image_url: Option<String>,
    skin_tone: Option<String>,
    hair_color: Option<String>,
    body_type: Option<String>,
}

pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> Result<Option<UserProfile>> {
    let row: Option<ProfileRow> = sqlx::query_as(
        "SELECT image_url, skin_tone, hair_color, body_type FROM profiles WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| UserProfile {
        id: PROFILE_ID.to_string(),
        image_url: row.image_url,
        traits: UserTraits {
            skin_tone: row.skin_tone,
            hair_color: row.hair_color,
            body_type: row.body_type,
        },
    }))
}

/// Upsert the caller's profile; returns the normalized record that was written
pub async fn save_profile(
    pool: &SqlitePool,
    user_id: &str,
    profile: UserProfile,
) -> Result<UserProfile> {
    let profile = profile.normalized();

    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, image_url, skin_tone, hair_color, body_type, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            image_url = excluded.image_url,
            skin_tone = excluded.skin_tone,
            hair_color = excluded.hair_color,
            body_type = excluded.body_type,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(&profile.image_url)
    .bind(&profile.traits.skin_tone)
    .bind(&profile.traits.hair_color)
    .bind(&profile.traits.body_type)
    .bind(time::now_millis())
    .execute(pool)
    .await?;

    Ok(profile)
}
