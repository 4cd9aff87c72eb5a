//! Read-only client for the model hub listing API.
//!
//! Listings are cached per URL for `cache_ttl`. Model listings from several
//! authors are fetched in parallel and concatenated in configured order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Url;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::models::{CatalogEntry, OrgData};

type ListingCache = Arc<Mutex<HashMap<String, (Instant, Vec<CatalogEntry>)>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Models,
    Datasets,
}

impl ListingKind {
    fn path(self) -> &'static str {
        match self {
            ListingKind::Models => "models",
            ListingKind::Datasets => "datasets",
        }
    }
}

#[derive(Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base: String,
    limit: u32,
    ttl: Duration,
    model_authors: Arc<Vec<String>>,
    dataset_authors: Arc<Vec<String>>,
    cache: ListingCache,
}

impl HubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Upstream {
                url: config.hub_api_base.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base: config.hub_api_base.clone(),
            limit: config.list_limit,
            ttl: config.cache_ttl,
            model_authors: Arc::new(config.model_authors.clone()),
            dataset_authors: Arc::new(config.dataset_authors.clone()),
            cache: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    fn listing_url(&self, kind: ListingKind, author: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.base, kind.path());
        let limit = self.limit.to_string();
        Url::parse_with_params(&raw, &[("author", author), ("limit", limit.as_str())])
            .map_err(|e| CatalogError::Upstream {
                url: raw,
                message: e.to_string(),
            })
    }

    pub async fn fetch_models(&self, author: &str) -> Result<Vec<CatalogEntry>> {
        self.fetch_listing(ListingKind::Models, author, false).await
    }

    pub async fn fetch_datasets(&self, author: &str) -> Result<Vec<CatalogEntry>> {
        self.fetch_listing(ListingKind::Datasets, author, false).await
    }

    async fn fetch_listing(
        &self,
        kind: ListingKind,
        author: &str,
        force: bool,
    ) -> Result<Vec<CatalogEntry>> {
        let url = self.listing_url(kind, author)?;
        let key = url.to_string();

        if !force {
            let cache = self.cache.lock().await;
            if let Some((stored_at, entries)) = cache.get(&key) {
                if stored_at.elapsed() < self.ttl {
                    debug!("Cache hit for {}", key);
                    return Ok(entries.clone());
                }
            }
        }

        debug!("Fetching {}", key);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Upstream {
                url: key.clone(),
                message: e.to_string(),
            })?;

        if !res.status().is_success() {
            return Err(CatalogError::UpstreamStatus {
                url: key,
                status: res.status().as_u16(),
            });
        }

        let entries: Vec<CatalogEntry> = res.json().await.map_err(|e| CatalogError::Upstream {
            url: key.clone(),
            message: format!("malformed listing: {}", e),
        })?;

        self.cache
            .lock()
            .await
            .insert(key, (Instant::now(), entries.clone()));
        Ok(entries)
    }

    /// All listings of one kind, concatenated in author order. Any failure
    /// fails the whole group.
    async fn fetch_group(
        &self,
        kind: ListingKind,
        authors: &[String],
        force: bool,
    ) -> Result<Vec<CatalogEntry>> {
        let mut tasks = JoinSet::new();
        for (index, author) in authors.iter().enumerate() {
            let client = self.clone();
            let author = author.clone();
            tasks.spawn(async move { (index, client.fetch_listing(kind, &author, force).await) });
        }

        let mut parts: Vec<Vec<CatalogEntry>> = vec![Vec::new(); authors.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.map_err(|e| CatalogError::Upstream {
                url: self.base.clone(),
                message: e.to_string(),
            })?;
            parts[index] = result?;
        }
        Ok(parts.concat())
    }

    async fn fetch_all(&self, force: bool) -> Result<OrgData> {
        let (models, datasets) = tokio::try_join!(
            self.fetch_group(ListingKind::Models, &self.model_authors, force),
            self.fetch_group(ListingKind::Datasets, &self.dataset_authors, force),
        )?;
        Ok(OrgData { models, datasets })
    }

    pub async fn fetch_org_data(&self) -> Result<OrgData> {
        self.fetch_all(false).await
    }

    /// Re-fetch every listing regardless of cache age.
    pub async fn refresh(&self) -> Result<OrgData> {
        self.fetch_all(true).await
    }

    pub async fn models_or_empty(&self) -> Vec<CatalogEntry> {
        self.fetch_group(ListingKind::Models, &self.model_authors, false)
            .await
            .unwrap_or_else(|e| {
                warn!("Error fetching models: {}", e);
                Vec::new()
            })
    }

    pub async fn datasets_or_empty(&self) -> Vec<CatalogEntry> {
        self.fetch_group(ListingKind::Datasets, &self.dataset_authors, false)
            .await
            .unwrap_or_else(|e| {
                warn!("Error fetching datasets: {}", e);
                Vec::new()
            })
    }
}
