//! Admin service
//!
//! Implements the back-office operations:
//! - Category management (create with slug generation, delete, image)
//! - Product management
//! - News management and machine translation
//! - Promotion management
//!
//! Every call requires a session holding `ROLE_ADMIN`. The role is checked
//! locally before any request; the server still has the final say.

use crate::cache::Cache;
use crate::client::{ApiClient, ClientError};
use crate::models::{
    Category, CategoryImageUpdate, NewCategory, NewProduct, NewsArticle, NewsArticleInput,
    NewsTranslation, Page, Product, Promotion, PromotionInput, TranslationRequest,
    DEFAULT_PAGE_SIZE, ROLE_ADMIN,
};
use crate::services::catalog::{
    invalidate, CACHE_KEY_CATEGORIES, CACHE_KEY_NEWS, CACHE_KEY_PRODUCTS, CACHE_KEY_PROMOTIONS,
};
use crate::services::session::SessionManager;
use std::sync::Arc;

/// Error types for admin service operations
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Current session is missing or lacks the admin role
    #[error("Administrator access required")]
    NotAuthorized,

    /// Input rejected before anything was sent
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Target does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The Remote API call failed
    #[error(transparent)]
    Api(#[from] ClientError),
}

impl AdminError {
    /// Message suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            AdminError::NotAuthorized => "Please sign in as an administrator.".to_string(),
            AdminError::ValidationError(message) => message.clone(),
            AdminError::NotFound(what) => format!("{} could not be found.", what),
            AdminError::Api(e) => e.user_message(),
        }
    }
}

/// Admin service for back-office writes
pub struct AdminService {
    client: ApiClient,
    sessions: Arc<SessionManager>,
    cache: Arc<Cache>,
}

impl AdminService {
    /// Create a new admin service
    ///
    /// `client` must carry the session's bearer token (see
    /// [`ApiClient::with_token_source`]).
    pub fn new(client: ApiClient, sessions: Arc<SessionManager>, cache: Arc<Cache>) -> Self {
        Self {
            client,
            sessions,
            cache,
        }
    }

    fn ensure_admin(&self) -> Result<(), AdminError> {
        if self.sessions.has_role(ROLE_ADMIN) {
            Ok(())
        } else {
            Err(AdminError::NotAuthorized)
        }
    }

    // ========================================================================
    // Categories
    // ========================================================================

    /// Create a category; the slug is generated from the name when omitted
    pub async fn create_category(
        &self,
        name: &str,
        slug: Option<&str>,
    ) -> Result<Category, AdminError> {
        self.ensure_admin()?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AdminError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }
        let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => slug.to_string(),
            None => generate_slug(name),
        };
        if slug.is_empty() {
            return Err(AdminError::ValidationError(format!(
                "Cannot derive a slug from '{}'",
                name
            )));
        }

        let input = NewCategory {
            name: name.to_string(),
            slug,
        };
        let category: Category = self.client.post_json("/admin/categories", &input).await?;
        invalidate(&self.cache, &[CACHE_KEY_CATEGORIES, CACHE_KEY_PRODUCTS]).await;
        tracing::info!("Created category '{}' ({})", category.name, category.slug);
        Ok(category)
    }

    /// Delete a category
    pub async fn delete_category(&self, id: i64) -> Result<(), AdminError> {
        self.ensure_admin()?;
        self.client
            .delete(&format!("/admin/categories/{}", id))
            .await
            .map_err(not_found("Category"))?;
        invalidate(&self.cache, &[CACHE_KEY_CATEGORIES, CACHE_KEY_PRODUCTS]).await;
        tracing::info!("Deleted category {}", id);
        Ok(())
    }

    /// Set the image of a category
    pub async fn update_category_image(
        &self,
        id: i64,
        image_url: &str,
    ) -> Result<Category, AdminError> {
        self.ensure_admin()?;
        let body = CategoryImageUpdate {
            image_url: image_url.trim(),
        };
        let category: Category = self
            .client
            .put_json(&format!("/admin/categories/{}/image", id), &body)
            .await
            .map_err(not_found("Category"))?;
        invalidate(&self.cache, &[CACHE_KEY_CATEGORIES, CACHE_KEY_PRODUCTS]).await;
        Ok(category)
    }

    // ========================================================================
    // Products
    // ========================================================================

    /// Create a product
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, AdminError> {
        self.ensure_admin()?;
        validate_product(&input)?;
        let product: Product = self.client.post_json("/products", &input).await?;
        invalidate(&self.cache, &[CACHE_KEY_PRODUCTS]).await;
        tracing::info!("Created product {} '{}'", product.id, product.name);
        Ok(product)
    }

    /// Update a product
    pub async fn update_product(&self, id: i64, input: NewProduct) -> Result<Product, AdminError> {
        self.ensure_admin()?;
        validate_product(&input)?;
        let product: Product = self
            .client
            .put_json(&format!("/products/{}", id), &input)
            .await
            .map_err(not_found("Product"))?;
        invalidate(&self.cache, &[CACHE_KEY_PRODUCTS]).await;
        Ok(product)
    }

    /// Delete a product
    pub async fn delete_product(&self, id: i64) -> Result<(), AdminError> {
        self.ensure_admin()?;
        self.client
            .delete(&format!("/products/{}", id))
            .await
            .map_err(not_found("Product"))?;
        invalidate(&self.cache, &[CACHE_KEY_PRODUCTS]).await;
        tracing::info!("Deleted product {}", id);
        Ok(())
    }

    // ========================================================================
    // News
    // ========================================================================

    /// One page of all news articles, newest first
    pub async fn news_page(
        &self,
        page: u32,
        size: Option<u32>,
    ) -> Result<Page<NewsArticle>, AdminError> {
        self.ensure_admin()?;
        let size = size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);
        let page = self
            .client
            .get_json(&format!("/admin/news/all?page={}&size={}", page, size))
            .await?;
        Ok(page)
    }

    /// Publish a news article
    pub async fn create_news(&self, input: NewsArticleInput) -> Result<NewsArticle, AdminError> {
        self.ensure_admin()?;
        validate_news(&input)?;
        let article: NewsArticle = self.client.post_json("/admin/news", &input).await?;
        invalidate(&self.cache, &[CACHE_KEY_NEWS]).await;
        tracing::info!("Published news article {}", article.id);
        Ok(article)
    }

    /// Update a news article
    pub async fn update_news(
        &self,
        id: i64,
        input: NewsArticleInput,
    ) -> Result<NewsArticle, AdminError> {
        self.ensure_admin()?;
        validate_news(&input)?;
        let article = self
            .client
            .put_json(&format!("/admin/news/{}", id), &input)
            .await
            .map_err(not_found("News article"))?;
        invalidate(&self.cache, &[CACHE_KEY_NEWS]).await;
        Ok(article)
    }

    /// Delete a news article
    pub async fn delete_news(&self, id: i64) -> Result<(), AdminError> {
        self.ensure_admin()?;
        self.client
            .delete(&format!("/admin/news/{}", id))
            .await
            .map_err(not_found("News article"))?;
        invalidate(&self.cache, &[CACHE_KEY_NEWS]).await;
        Ok(())
    }

    /// Machine-translate German title and content into the other languages
    pub async fn translate_news(
        &self,
        title_de: &str,
        content_de: &str,
    ) -> Result<NewsTranslation, AdminError> {
        self.ensure_admin()?;
        if title_de.trim().is_empty() || content_de.trim().is_empty() {
            return Err(AdminError::ValidationError(
                "German title and content are required for translation".to_string(),
            ));
        }
        let request = TranslationRequest {
            title_de: title_de.trim(),
            content_de: content_de.trim(),
        };
        let translation = self
            .client
            .post_json("/admin/news/translate", &request)
            .await?;
        Ok(translation)
    }

    // ========================================================================
    // Promotions
    // ========================================================================

    /// One page of all promotions, including past and future ones
    pub async fn promotions_page(
        &self,
        page: u32,
        size: Option<u32>,
    ) -> Result<Page<Promotion>, AdminError> {
        self.ensure_admin()?;
        let size = size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);
        let page = self
            .client
            .get_json(&format!("/admin/promotions?page={}&size={}", page, size))
            .await?;
        Ok(page)
    }

    /// Create a promotion
    pub async fn create_promotion(&self, input: PromotionInput) -> Result<Promotion, AdminError> {
        self.ensure_admin()?;
        validate_promotion(&input)?;
        let promotion: Promotion = self.client.post_json("/admin/promotions", &input).await?;
        invalidate(&self.cache, &[CACHE_KEY_PROMOTIONS]).await;
        tracing::info!("Created promotion {}", promotion.id);
        Ok(promotion)
    }

    /// Update a promotion
    pub async fn update_promotion(
        &self,
        id: i64,
        input: PromotionInput,
    ) -> Result<Promotion, AdminError> {
        self.ensure_admin()?;
        validate_promotion(&input)?;
        let promotion = self
            .client
            .put_json(&format!("/admin/promotions/{}", id), &input)
            .await
            .map_err(not_found("Promotion"))?;
        invalidate(&self.cache, &[CACHE_KEY_PROMOTIONS]).await;
        Ok(promotion)
    }

    /// Delete a promotion
    pub async fn delete_promotion(&self, id: i64) -> Result<(), AdminError> {
        self.ensure_admin()?;
        self.client
            .delete(&format!("/admin/promotions/{}", id))
            .await
            .map_err(not_found("Promotion"))?;
        invalidate(&self.cache, &[CACHE_KEY_PROMOTIONS]).await;
        Ok(())
    }
}

fn not_found(what: &'static str) -> impl FnOnce(ClientError) -> AdminError {
    move |e| match e {
        ClientError::Rejected { status: 404, .. } => AdminError::NotFound(what.to_string()),
        other => AdminError::Api(other),
    }
}

fn validate_price(price: f64) -> Result<(), AdminError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AdminError::ValidationError(format!(
            "Price must be zero or positive, got {}",
            price
        )));
    }
    Ok(())
}

fn validate_product(input: &NewProduct) -> Result<(), AdminError> {
    if input.name.trim().is_empty() {
        return Err(AdminError::ValidationError(
            "Product name cannot be empty".to_string(),
        ));
    }
    if input.category_id <= 0 {
        return Err(AdminError::ValidationError(
            "A product needs a category".to_string(),
        ));
    }
    validate_price(input.price)
}

fn validate_news(input: &NewsArticleInput) -> Result<(), AdminError> {
    if input.title_de.trim().is_empty() {
        return Err(AdminError::ValidationError(
            "German title cannot be empty".to_string(),
        ));
    }
    if input.content_de.trim().is_empty() {
        return Err(AdminError::ValidationError(
            "German content cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_promotion(input: &PromotionInput) -> Result<(), AdminError> {
    if input.name_de.trim().is_empty() {
        return Err(AdminError::ValidationError(
            "German name cannot be empty".to_string(),
        ));
    }
    validate_price(input.price)?;
    if input.end_date < input.start_date {
        return Err(AdminError::ValidationError(format!(
            "Promotion ends ({}) before it starts ({})",
            input.end_date, input.start_date
        )));
    }
    Ok(())
}

/// Generate a URL-friendly slug from a category name
///
/// German umlauts and ß are transliterated; other non-ASCII letters are kept.
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        match c {
            'ä' => slug.push_str("ae"),
            'ö' => slug.push_str("oe"),
            'ü' => slug.push_str("ue"),
            'ß' => slug.push_str("ss"),
            c if c.is_ascii_alphanumeric() => slug.push(c),
            c if !c.is_ascii() && c.is_alphanumeric() => slug.push(c),
            _ => slug.push('-'),
        }
    }

    // Collapse hyphen runs and trim them from both ends
    let mut result = String::with_capacity(slug.len());
    let mut prev_hyphen = true;
    for c in slug.chars() {
        if c == '-' {
            if !prev_hyphen {
                result.push(c);
            }
            prev_hyphen = true;
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }
    result.trim_end_matches('-').to_string()
}
