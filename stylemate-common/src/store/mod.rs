//! Local Store
//!
//! Per-device record store with three collections: clothing items, outfits
//! and the singleton profile. Backed by one SQLite file that is opened lazily
//! on first use. Every write is a single upsert or delete statement.
//!
//! Items and outfits implement [`Collection`] and share the generic
//! `get_all` / `get` / `save` / `delete` accessors. The profile is not a
//! general collection and has dedicated accessors.

mod items;
mod outfits;
mod profile;

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::LOCAL_DB_FILE;
use crate::db::{self, Migration};
use crate::models::UserProfile;
use crate::Result;

/// Local Store schema history
///
/// v1 shipped with the items collection only; v2 added outfits and the profile.
pub const LOCAL_MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Create items collection",
        statements: &[r#"
            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                image_url TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]'
            )
        "#],
    },
    Migration {
        version: 2,
        description: "Create outfits and profile collections",
        statements: &[
            r#"
            CREATE TABLE IF NOT EXISTS outfits (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                style TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '[]',
                description TEXT NOT NULL DEFAULT '',
                item_ids TEXT NOT NULL DEFAULT '[]'
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS profile (
                id TEXT PRIMARY KEY CHECK (id = 'user-profile'),
                image_url TEXT,
                skin_tone TEXT,
                hair_color TEXT,
                body_type TEXT
            )
            "#,
        ],
    },
];

/// A named set of records of one kind, keyed by id
#[async_trait]
pub trait Collection: Sized + Send + Sync {
    /// Table backing the collection
    const NAME: &'static str;

    fn key(&self) -> &str;

    async fn fetch_all(pool: &SqlitePool) -> Result<Vec<Self>>;

    async fn fetch(pool: &SqlitePool, id: &str) -> Result<Option<Self>>;

    /// Insert, or replace the record with the same key entirely
    async fn upsert(&self, pool: &SqlitePool) -> Result<()>;

    async fn remove(pool: &SqlitePool, id: &str) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", Self::NAME);
        sqlx::query(&sql).bind(id).execute(pool).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Handle to the per-device store
#[derive(Debug)]
pub struct LocalStore {
    location: Location,
    pool: OnceCell<SqlitePool>,
}

impl LocalStore {
    /// Store backed by the database file at `db_path`
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(db_path.into()),
            pool: OnceCell::new(),
        }
    }

    /// Store at `<root_folder>/stylemate.db`
    pub fn in_root_folder(root_folder: &Path) -> Self {
        Self::new(root_folder.join(LOCAL_DB_FILE))
    }

    /// Throwaway store living only as long as this handle
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            pool: OnceCell::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    /// Open the database and bring its schema up to date on first call
    async fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .get_or_try_init(|| async {
                let pool = match &self.location {
                    Location::File(path) => db::connect(path, 1).await?,
                    Location::Memory => db::connect_in_memory().await?,
                };
                db::run_migrations(&pool, LOCAL_MIGRATIONS).await?;
                Ok::<_, crate::Error>(pool)
            })
            .await
    }

    /// Every record of collection `C`, unordered
    pub async fn get_all<C: Collection>(&self) -> Result<Vec<C>> {
        let pool = self.pool().await?;
        let records = C::fetch_all(pool).await?;
        debug!("Loaded {} records from {}", records.len(), C::NAME);
        Ok(records)
    }

    pub async fn get<C: Collection>(&self, id: &str) -> Result<Option<C>> {
        C::fetch(self.pool().await?, id).await
    }

    /// Upsert by key
    pub async fn save<C: Collection>(&self, record: &C) -> Result<()> {
        record.upsert(self.pool().await?).await?;
        debug!("Saved {} record {}", C::NAME, record.key());
        Ok(())
    }

    /// Remove the record if present; absent keys are not an error
    pub async fn delete<C: Collection>(&self, id: &str) -> Result<()> {
        C::remove(self.pool().await?, id).await?;
        debug!("Deleted {} record {}", C::NAME, id);
        Ok(())
    }

    pub async fn get_profile(&self) -> Result<Option<UserProfile>> {
        profile::fetch(self.pool().await?).await
    }

    /// Write the singleton profile (id and traits are normalized first)
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        profile::upsert(self.pool().await?, profile).await
    }

    /// Close the pool if it was ever opened
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
        }
    }
}
