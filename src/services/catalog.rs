//! Catalog service
//!
//! Read-side of the storefront: categories, products, news and promotions.
//! Every read goes through the cache; admin writes drop the affected prefixes.

use crate::cache::{Cache, CacheLayer};
use crate::client::{ApiClient, ClientError};
use crate::models::{Category, NewsArticle, Page, Product, Promotion, DEFAULT_PAGE_SIZE};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Cache key prefixes
pub(crate) const CACHE_KEY_CATEGORIES: &str = "categories:";
pub(crate) const CACHE_KEY_PRODUCTS: &str = "products:";
pub(crate) const CACHE_KEY_NEWS: &str = "news:";
pub(crate) const CACHE_KEY_PROMOTIONS: &str = "promotions:";

/// Error types for catalog service operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Requested item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The Remote API call failed
    #[error(transparent)]
    Api(#[from] ClientError),
}

impl CatalogError {
    /// Message suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::NotFound(what) => format!("{} could not be found.", what),
            CatalogError::Api(e) => e.user_message(),
        }
    }
}

/// Catalog service for storefront reads
pub struct CatalogService {
    client: ApiClient,
    cache: Arc<Cache>,
}

impl CatalogService {
    /// Create a new catalog service
    pub fn new(client: ApiClient, cache: Arc<Cache>) -> Self {
        Self { client, cache }
    }

    /// All categories, sorted by name (case-insensitive)
    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        let key = format!("{}list", CACHE_KEY_CATEGORIES);
        let mut categories: Vec<Category> = self.cached(&key, "/categories").await?;
        categories.sort_by_key(|c| c.name.to_lowercase());
        Ok(categories)
    }

    /// Full product list
    pub async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        let key = format!("{}all", CACHE_KEY_PRODUCTS);
        self.cached(&key, "/products").await
    }

    /// One page of products, `size` defaults to 10
    pub async fn products_page(
        &self,
        page: u32,
        size: Option<u32>,
    ) -> Result<Page<Product>, CatalogError> {
        let size = page_size(size);
        let key = format!("{}page:{}:{}", CACHE_KEY_PRODUCTS, page, size);
        let path = format!("/products?page={}&size={}", page, size);
        self.cached(&key, &path).await
    }

    /// Products of one category
    ///
    /// # Errors
    /// - `NotFound` if the server does not know the slug
    pub async fn products_by_category(&self, slug: &str) -> Result<Vec<Product>, CatalogError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(CatalogError::NotFound("Category".to_string()));
        }

        let key = format!("{}category:{}", CACHE_KEY_PRODUCTS, slug);
        let path = format!("/categories/{}/products", urlencoding::encode(slug));
        self.cached(&key, &path).await.map_err(|e| match e {
            CatalogError::Api(ClientError::Rejected { status: 404, .. }) => {
                CatalogError::NotFound(format!("Category '{}'", slug))
            }
            other => other,
        })
    }

    /// Latest news for the home page
    pub async fn latest_news(&self) -> Result<Vec<NewsArticle>, CatalogError> {
        let key = format!("{}latest", CACHE_KEY_NEWS);
        self.cached(&key, "/news/latest").await
    }

    /// Currently running promotions
    pub async fn active_promotions(
        &self,
        page: u32,
        size: Option<u32>,
    ) -> Result<Page<Promotion>, CatalogError> {
        let size = page_size(size);
        let key = format!("{}page:{}:{}", CACHE_KEY_PROMOTIONS, page, size);
        let path = format!("/promotions?page={}&size={}", page, size);
        self.cached(&key, &path).await
    }

    async fn cached<T>(&self, key: &str, path: &str) -> Result<T, CatalogError>
    where
        T: DeserializeOwned + Serialize + Send + Sync,
    {
        if let Some(value) = self.cache.get::<T>(key).await.ok().flatten() {
            return Ok(value);
        }

        let value: T = self.client.get_json(path).await?;
        if let Err(e) = self.cache.set(key, &value).await {
            tracing::debug!("Failed to cache {}: {}", key, e);
        }
        Ok(value)
    }
}

fn page_size(size: Option<u32>) -> u32 {
    match size {
        Some(0) | None => DEFAULT_PAGE_SIZE,
        Some(size) => size,
    }
}

/// Drop cached catalog entries under the given prefixes
pub(crate) async fn invalidate(cache: &Cache, prefixes: &[&str]) {
    for prefix in prefixes {
        if let Err(e) = cache.delete_prefix(prefix).await {
            tracing::warn!("Failed to invalidate cache prefix {}: {}", prefix, e);
        }
    }
}
