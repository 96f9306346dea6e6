//! Remote product catalog client.
//!
//! Products and categories live in collections of a remote document store
//! and are read-only from the storefront's perspective. Responses are cached
//! in-process for a few minutes; the catalog changes rarely and the shop
//! page re-requests it on every navigation.

mod filter;
mod types;

pub use filter::{ProductFilter, filter_products};
pub use types::{Category, Product};

pub(crate) use types::first_image_url;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use export_apparels_core::ProductId;

use crate::config::DocumentStoreConfig;

/// How long cached catalog responses stay fresh.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Upper bound on cached entries; the catalog is small, this is a backstop.
const CACHE_CAPACITY: u64 = 1024;

/// Errors that can occur when reading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Base URL or request path could not be parsed.
    #[error("invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Document not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products,
    Categories,
    Product(ProductId),
}

/// Cached response values.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Categories(Arc<Vec<Category>>),
    Product(Arc<Product>),
}

/// Read-only client for the product catalog.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(config: &DocumentStoreConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &config.api_key {
            let auth_value = format!("Bearer {}", api_key.expose_secret());
            headers.insert(
                "Authorization",
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| CatalogError::Parse(format!("Invalid API key format: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let mut base_url = Url::parse(&config.base_url)?;
        // Url::join replaces the last path segment unless the base ends in a
        // slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            client,
            base_url,
            cache,
        })
    }

    /// Fetch the full product list, cached.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the request or response parsing fails.
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.cache.get(&CacheKey::Products).await {
            return Ok(products);
        }

        let products: Arc<Vec<Product>> = Arc::new(self.fetch_json("products").await?);
        self.cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Fetch the category list, cached.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the request or response parsing fails.
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache.get(&CacheKey::Categories).await
        {
            return Ok(categories);
        }

        let categories: Arc<Vec<Category>> = Arc::new(self.fetch_json("categories").await?);
        self.cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    /// Fetch a single product document, cached.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no document has this id, or
    /// another [`CatalogError`] on transport and parse failures.
    pub async fn product(&self, id: &ProductId) -> Result<Arc<Product>, CatalogError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            return Ok(product);
        }

        let product: Arc<Product> =
            Arc::new(self.fetch_json(&format!("products/{id}")).await?);
        self.cache
            .insert(key, CacheValue::Product(product.clone()))
            .await;
        Ok(product)
    }

    /// Fetch the product list and apply a filter, preserving catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the underlying fetch fails.
    pub async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        let products = self.products().await?;
        Ok(filter_products(&products, filter)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = self.base_url.join(path)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_owned()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> DocumentStoreConfig {
        DocumentStoreConfig {
            base_url: base_url.to_owned(),
            api_key: None,
        }
    }

    #[test]
    fn test_new_normalizes_base_url() {
        let client = CatalogClient::new(&config("https://docs.example.com/v1")).unwrap();
        assert_eq!(
            client.base_url.join("products").unwrap().as_str(),
            "https://docs.example.com/v1/products"
        );
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        assert!(matches!(
            CatalogClient::new(&config("not a url")),
            Err(CatalogError::InvalidUrl(_))
        ));
    }
}
