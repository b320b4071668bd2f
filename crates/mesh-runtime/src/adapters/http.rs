//! # Storefront REST Adapter
//!
//! One HTTP client for every storefront remote API: stock pushes for the
//! propagation dispatcher and paginated catalog listings for mapping
//! refresh. Authentication is HTTP Basic with the site's consumer
//! key/secret from the registry entry.
//!
//! ## Failure Classification
//!
//! - connect/timeout/5xx/429 → transient (the dispatcher retries)
//! - any other non-success status → permanent (dead-lettered)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use mesh_mapping::{MappingError, ProductKind, RemoteCatalog, RemoteProduct, RemoteVariation};
use mesh_propagation::{PushError, RemoteStockWriter};
use shared_types::{RemoteProductRef, Site};

/// Page size for catalog listings.
const PAGE_SIZE: usize = 100;

/// REST client shared by all sites; per-site state is the registry entry
/// passed into each call.
#[derive(Clone)]
pub struct RestStorefrontClient {
    http: reqwest::Client,
}

impl RestStorefrontClient {
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { http }
    }

    fn product_url(site: &Site, remote: &RemoteProductRef) -> String {
        let base = site.base_url.trim_end_matches('/');
        match remote.variation_id {
            Some(variation_id) => format!(
                "{base}/products/{}/variations/{variation_id}",
                remote.product_id
            ),
            None => format!("{base}/products/{}", remote.product_id),
        }
    }

    fn classify_status(status: StatusCode, body: &str) -> PushError {
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            PushError::Transient(format!("remote returned {status}"))
        } else {
            PushError::Permanent(format!("remote rejected request ({status}): {body}"))
        }
    }

    /// Page through a listing endpoint until a short page arrives.
    async fn fetch_pages<T: for<'de> Deserialize<'de>>(
        &self,
        site: &Site,
        url: &str,
    ) -> Result<Vec<T>, MappingError> {
        let mut items = Vec::new();
        let mut page = 1usize;

        loop {
            let response = self
                .http
                .get(url)
                .basic_auth(&site.api_key, Some(&site.api_secret))
                .query(&[("per_page", PAGE_SIZE), ("page", page)])
                .send()
                .await
                .map_err(|e| MappingError::Remote(e.to_string()))?;

            if !response.status().is_success() {
                return Err(MappingError::Remote(format!(
                    "listing {url} returned {}",
                    response.status()
                )));
            }

            let batch: Vec<T> = response
                .json()
                .await
                .map_err(|e| MappingError::Remote(e.to_string()))?;

            let short_page = batch.len() < PAGE_SIZE;
            items.extend(batch);
            if short_page {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

#[async_trait]
impl RemoteStockWriter for RestStorefrontClient {
    async fn set_stock(
        &self,
        site: &Site,
        remote: &RemoteProductRef,
        quantity: i64,
    ) -> Result<(), PushError> {
        let url = Self::product_url(site, remote);
        let payload = serde_json::json!({
            "manage_stock": true,
            "stock_quantity": quantity,
        });

        let response = self
            .http
            .put(&url)
            .basic_auth(&site.api_key, Some(&site.api_secret))
            .json(&payload)
            .send()
            .await
            .map_err(|e| PushError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(site = %site.site_id, url, quantity, "stock pushed");
            return Ok(());
        }

        let body: String = response.text().await.unwrap_or_default();
        let body = body.chars().take(300).collect::<String>();
        Err(Self::classify_status(status, &body))
    }
}

/// Catalog product payload from the remote listing.
#[derive(Debug, Deserialize)]
struct CatalogProduct {
    id: u64,
    #[serde(default)]
    sku: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Variation payload from the remote listing.
#[derive(Debug, Deserialize)]
struct CatalogVariation {
    id: u64,
    #[serde(default)]
    sku: String,
}

#[async_trait]
impl RemoteCatalog for RestStorefrontClient {
    async fn products(&self, site: &Site) -> Result<Vec<RemoteProduct>, MappingError> {
        let base = site.base_url.trim_end_matches('/');
        let url = format!("{base}/products");

        let listed: Vec<CatalogProduct> = self.fetch_pages(site, &url).await?;
        Ok(listed
            .into_iter()
            .map(|p| RemoteProduct {
                id: p.id,
                sku: p.sku,
                name: p.name,
                kind: if p.kind == "variable" {
                    ProductKind::Variable
                } else {
                    ProductKind::Simple
                },
            })
            .collect())
    }

    async fn variations(
        &self,
        site: &Site,
        product_id: u64,
    ) -> Result<Vec<RemoteVariation>, MappingError> {
        let base = site.base_url.trim_end_matches('/');
        let url = format!("{base}/products/{product_id}/variations");

        let listed: Vec<CatalogVariation> = self.fetch_pages(site, &url).await?;
        Ok(listed
            .into_iter()
            .map(|v| RemoteVariation {
                id: v.id,
                sku: v.sku,
            })
            .collect())
    }
}
