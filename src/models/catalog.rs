//! Catalog models
//!
//! Categories and products as served by the storefront API.

use serde::{Deserialize, Serialize};

/// Product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// URL-friendly slug
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in euros
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
    pub category: Category,
}

/// Input for creating or updating a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    pub category_id: i64,
}

/// Input for creating a category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoryImageUpdate<'a> {
    pub image_url: &'a str,
}
