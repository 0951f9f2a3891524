//! Upstream SWAPI client and response shapes.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{CatalogError, CatalogResult};

pub const PEOPLE_RESOURCE: &str = "people";
pub const FILMS_RESOURCE: &str = "films";

#[derive(Debug, Clone)]
pub struct SwapiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub page_size: u32,
}

impl Default for SwapiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.swapi.tech/api".to_string(),
            timeout: Duration::from_secs(30),
            page_size: 100,
        }
    }
}

impl SwapiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

impl FromEnv for SwapiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_or_default("SWAPI_BASE_URL", "https://www.swapi.tech/api");
        let timeout_secs: u64 = env_parse("SWAPI_TIMEOUT_SECS", "30")?;
        let page_size: u32 = env_parse("SWAPI_PAGE_SIZE", "100")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
            page_size,
        })
    }
}

/// One page of an expanded listing.
///
/// People pages carry `results` and paging fields; the films listing uses
/// `result` and comes back as a single page.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapiPage<T> {
    #[serde(alias = "result", default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> SwapiPage<T> {
    /// Whether `page` is the last one to fetch.
    pub fn is_last(&self, page: u32) -> bool {
        let no_next = self.next.as_deref().is_none_or(str::is_empty);
        let past_total = self.total_pages.is_none_or(|total| page >= total);
        no_next || past_total || self.results.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonRecord {
    pub uid: String,
    pub properties: PersonProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonProperties {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    pub homeworld: String,
    pub films: Vec<String>,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilmRecord {
    pub uid: String,
    pub properties: FilmProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilmProperties {
    pub title: String,
    pub opening_crawl: String,
    pub characters: Vec<String>,
    pub url: String,
}

/// Source of records to mirror
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceApi: Send + Sync {
    async fn fetch_people_page(&self, page: u32) -> CatalogResult<SwapiPage<PersonRecord>>;

    async fn fetch_films_page(&self, page: u32) -> CatalogResult<SwapiPage<FilmRecord>>;
}

#[derive(Debug, Clone)]
pub struct SwapiClient {
    client: reqwest::Client,
    config: SwapiConfig,
}

impl SwapiClient {
    pub fn new(config: SwapiConfig) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::Upstream(format!("Failed to build client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn fetch_page<T>(&self, resource: &str, page: u32) -> CatalogResult<SwapiPage<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.config.base_url, resource);
        debug!(%url, page, "Fetching upstream page");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("page", page.to_string()),
                ("limit", self.config.page_size.to_string()),
                ("expanded", "true".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            CatalogError::MalformedResponse(format!("{} page {}: {}", resource, page, e))
        })
    }
}

#[async_trait]
impl SourceApi for SwapiClient {
    #[instrument(skip(self))]
    async fn fetch_people_page(&self, page: u32) -> CatalogResult<SwapiPage<PersonRecord>> {
        self.fetch_page(PEOPLE_RESOURCE, page).await
    }

    #[instrument(skip(self))]
    async fn fetch_films_page(&self, page: u32) -> CatalogResult<SwapiPage<FilmRecord>> {
        self.fetch_page(FILMS_RESOURCE, page).await
    }
}
