//! Sponsor store backed by the hosted database's PostgREST endpoint.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use shared::domain::{NewSponsor, Session, Sponsor, SponsorId};
use tracing::warn;

use crate::SponsorStore;

const SPONSORS_TABLE: &str = "sponsors";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestStoreConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub base_url: String,
    /// Public anon key; sent on every request and used to authorise reads.
    pub anon_key: String,
}

pub struct RestSponsorStore {
    http: Client,
    config: RestStoreConfig,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for SponsorId {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Text(text) => SponsorId(text),
            RawId::Number(number) => SponsorId(number.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SponsorRow {
    id: Option<RawId>,
    title: String,
    image: String,
    location: String,
    maplink: String,
    text: String,
    websitelink: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<SponsorRow> for Sponsor {
    fn from(row: SponsorRow) -> Self {
        Sponsor {
            id: row.id.map(SponsorId::from),
            title: row.title,
            image: row.image,
            location: row.location,
            maplink: row.maplink,
            text: row.text,
            websitelink: row.websitelink,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    title: &'a str,
    image: &'a str,
    location: &'a str,
    maplink: &'a str,
    text: &'a str,
    websitelink: &'a str,
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
}

impl RestSponsorStore {
    pub fn new(config: RestStoreConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: RestStoreConfig) -> Self {
        Self { http, config }
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{SPONSORS_TABLE}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn authorize(&self, request: RequestBuilder, bearer: &str) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }
}

#[async_trait]
impl SponsorStore for RestSponsorStore {
    async fn list_sponsors(&self) -> Result<Vec<Sponsor>> {
        let response = self
            .authorize(self.http.get(self.table_url()), &self.config.anon_key)
            .query(&[("select", "*"), ("order", "title.asc")])
            .send()
            .await
            .context("sponsor list request failed")?;
        let rows: Vec<SponsorRow> = check_status(response, "list sponsors")
            .await?
            .json()
            .await
            .context("invalid sponsor list payload")?;
        Ok(rows.into_iter().map(Sponsor::from).collect())
    }

    async fn insert_sponsor(&self, session: &Session, sponsor: &NewSponsor) -> Result<()> {
        let body = [InsertRow {
            title: &sponsor.title,
            image: &sponsor.image,
            location: &sponsor.location,
            maplink: &sponsor.maplink,
            text: &sponsor.text,
            websitelink: &sponsor.websitelink,
            user_id: sponsor.user_id.as_str(),
        }];
        let response = self
            .authorize(self.http.post(self.table_url()), &session.access_token)
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await
            .context("sponsor insert request failed")?;
        check_status(response, "insert sponsor").await?;
        Ok(())
    }

    async fn delete_sponsor(&self, session: &Session, id: &SponsorId) -> Result<()> {
        let filter = format!("eq.{id}");
        let response = self
            .authorize(self.http.delete(self.table_url()), &session.access_token)
            .query(&[("id", filter.as_str())])
            .send()
            .await
            .context("sponsor delete request failed")?;
        check_status(response, "delete sponsor").await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .authorize(self.http.get(self.table_url()), &self.config.anon_key)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
            .context("sponsor store unreachable")?;
        check_status(response, "health check").await?;
        Ok(())
    }
}

async fn check_status(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<PostgrestError>(&body)
        .ok()
        .and_then(|err| err.message)
        .unwrap_or(body);
    warn!(%status, operation, %message, "sponsor store rejected request");
    Err(anyhow!("{operation} failed ({status}): {message}"))
}

#[cfg(test)]
#[path = "tests/rest_tests.rs"]
mod tests;
