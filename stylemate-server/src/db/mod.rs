//! Server database
//!
//! One SQLite file shared by every user. Each user-scoped table carries a
//! `user_id` column and every statement filters on it. Image bytes live in
//! the `images` table with their owner recorded alongside.

use sqlx::SqlitePool;
use std::path::Path;
use stylemate_common::db::{self, Migration};
use stylemate_common::Result;

pub mod images;
pub mod items;
pub mod outfits;
pub mod profiles;

pub use images::StoredImage;
pub use items::RemoteItem;
pub use outfits::RemoteOutfit;

/// Server schema history
pub const SERVER_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Create user-scoped collections and image blob store",
    statements: &[
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            file_url TEXT,
            file_id TEXT,
            mime_type TEXT,
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '[]',
            created_at INTEGER NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_items_user ON items(user_id, created_at)",
        r#"
        CREATE TABLE IF NOT EXISTS outfits (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            style TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '[]',
            description TEXT NOT NULL DEFAULT '',
            item_ids TEXT NOT NULL DEFAULT '[]',
            created_at INTEGER NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_outfits_user ON outfits(user_id, created_at)",
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            user_id TEXT PRIMARY KEY,
            image_url TEXT,
            skin_tone TEXT,
            hair_color TEXT,
            body_type TEXT,
            updated_at INTEGER NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS images (
            id TEXT PRIMARY KEY,
            owner_user_id TEXT NOT NULL,
            content_type TEXT NOT NULL,
            filename TEXT NOT NULL,
            bytes BLOB NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    ],
}];

/// Open the server database and apply migrations
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let pool = db::connect(db_path, 5).await?;
    db::run_migrations(&pool, SERVER_MIGRATIONS).await?;
    Ok(pool)
}

/// Migrated in-memory database for tests
pub async fn init_in_memory() -> Result<SqlitePool> {
    let pool = db::connect_in_memory().await?;
    db::run_migrations(&pool, SERVER_MIGRATIONS).await?;
    Ok(pool)
}
