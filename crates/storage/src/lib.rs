use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{NewSponsor, Session, Sponsor, SponsorId};

mod rest;

pub use rest::{RestSponsorStore, RestStoreConfig};

/// Read/insert/delete access to the `sponsors` collection.
///
/// Writes carry the acting session so hosted backends can authorise them
/// with the user's own access token.
#[async_trait]
pub trait SponsorStore: Send + Sync {
    /// Every persisted sponsor, ordered by title ascending.
    async fn list_sponsors(&self) -> Result<Vec<Sponsor>>;
    async fn insert_sponsor(&self, session: &Session, sponsor: &NewSponsor) -> Result<()>;
    async fn delete_sponsor(&self, session: &Session, id: &SponsorId) -> Result<()>;
    async fn health_check(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct SqliteSponsorStore {
    pool: Pool<Sqlite>,
}

impl SqliteSponsorStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every in-memory connection is its own database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn count_sponsors(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sponsors")
            .fetch_one(&self.pool)
            .await
            .context("failed to count sponsors")?;
        Ok(count)
    }

    /// Inserts and returns the generated id. The trait method discards it;
    /// callers that need it (the maintenance CLI) use this directly.
    pub async fn insert_returning_id(&self, sponsor: &NewSponsor) -> Result<SponsorId> {
        let id = SponsorId(uuid::Uuid::new_v4().to_string());
        sqlx::query(
            "INSERT INTO sponsors (id, title, image, location, maplink, text, websitelink, user_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(&sponsor.title)
        .bind(&sponsor.image)
        .bind(&sponsor.location)
        .bind(&sponsor.maplink)
        .bind(&sponsor.text)
        .bind(&sponsor.websitelink)
        .bind(sponsor.user_id.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to insert sponsor '{}'", sponsor.title))?;
        Ok(id)
    }

    /// Removes one row; `false` when no row had that id.
    pub async fn delete_by_id(&self, id: &SponsorId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sponsors WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete sponsor {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SponsorStore for SqliteSponsorStore {
    async fn list_sponsors(&self) -> Result<Vec<Sponsor>> {
        let rows = sqlx::query(
            "SELECT id, title, image, location, maplink, text, websitelink, created_at
             FROM sponsors
             ORDER BY title ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list sponsors")?;

        rows.iter().map(sponsor_from_row).collect()
    }

    async fn insert_sponsor(&self, _session: &Session, sponsor: &NewSponsor) -> Result<()> {
        self.insert_returning_id(sponsor).await?;
        Ok(())
    }

    async fn delete_sponsor(&self, _session: &Session, id: &SponsorId) -> Result<()> {
        self.delete_by_id(id).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

fn sponsor_from_row(row: &SqliteRow) -> Result<Sponsor> {
    let id: String = row.try_get("id")?;
    let created_at: Option<DateTime<Utc>> = row.try_get("created_at").ok();
    Ok(Sponsor {
        id: Some(SponsorId(id)),
        title: row.try_get("title")?,
        image: row.try_get("image")?,
        location: row.try_get("location")?,
        maplink: row.try_get("maplink")?,
        text: row.try_get("text")?,
        websitelink: row.try_get("websitelink")?,
        created_at,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
