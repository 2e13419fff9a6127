//! HTTP implementation of the catalog source.
//!
//! # Responsibility
//! - Issue one `GET /items?page=N&per_page=M` per fetch.
//! - Map transport outcomes into the `SourceError` taxonomy.
//!
//! # Invariants
//! - No internal retry or backoff.
//! - DTO shapes stay private to this module; callers only see `CatalogItem`.

use crate::model::item::CatalogItem;
use crate::remote::source::{CatalogSource, PageRequest, SourceError, SourceResult};
use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Construction parameters for [`HttpCatalogSource`].
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Catalog base URL; a trailing slash is tolerated and trimmed.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl HttpSourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Catalog source over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogSource {
    /// Builds the client with the configured timeout.
    pub fn new(config: HttpSourceConfig) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(SourceError::from_reqwest)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn page_url(&self, request: PageRequest) -> String {
        format!(
            "{}/items?page={}&per_page={}",
            self.base_url, request.page, request.per_page
        )
    }
}

/// Wire shape of one catalog record.
#[derive(Debug, Deserialize)]
struct CatalogItemDto {
    id: i64,
    name: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    image_url: Option<String>,
}

impl CatalogItemDto {
    fn into_item(self) -> CatalogItem {
        CatalogItem {
            id: self.id,
            name: self.name,
            summary: self.summary,
            image_url: self.image_url,
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_page(&self, request: PageRequest) -> SourceResult<Vec<CatalogItem>> {
        let url = self.page_url(request);
        debug!("event=fetch_page module=http status=start url={url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(SourceError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "event=fetch_page module=http status=error http_status={} url={url}",
                status.as_u16()
            );
            return Err(SourceError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let page: Vec<CatalogItemDto> =
            response.json().await.map_err(SourceError::from_reqwest)?;

        debug!(
            "event=fetch_page module=http status=ok url={url} items={}",
            page.len()
        );
        Ok(page.into_iter().map(CatalogItemDto::into_item).collect())
    }
}
