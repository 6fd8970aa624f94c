//! Promotion model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::language::{pick, Language};

/// Promoted product offer valid between two dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: i64,
    pub name_de: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub name_fr: Option<String>,
    #[serde(default)]
    pub name_ru: Option<String>,
    #[serde(default)]
    pub name_uk: Option<String>,
    #[serde(default)]
    pub description_de: String,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub description_fr: Option<String>,
    #[serde(default)]
    pub description_ru: Option<String>,
    #[serde(default)]
    pub description_uk: Option<String>,
    /// Price in euros
    pub price: f64,
    /// Free-form dimensions, e.g. "200x90 cm"
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub image_url: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub created_at: String,
}

impl Promotion {
    /// Name in the given language, German if untranslated
    pub fn name(&self, lang: Language) -> &str {
        pick(
            lang,
            &self.name_de,
            &self.name_en,
            &self.name_fr,
            &self.name_ru,
            &self.name_uk,
        )
    }

    /// Description in the given language, German if untranslated
    pub fn description(&self, lang: Language) -> &str {
        pick(
            lang,
            &self.description_de,
            &self.description_en,
            &self.description_fr,
            &self.description_ru,
            &self.description_uk,
        )
    }

    /// Check if the promotion runs on the given day (both ends inclusive)
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

/// Input for creating or updating a promotion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionInput {
    pub name_de: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_fr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ru: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_uk: Option<String>,
    pub description_de: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_fr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_ru: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_uk: Option<String>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub image_url: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PromotionInput {
    /// Create an input with German text only
    pub fn new(
        name_de: impl Into<String>,
        description_de: impl Into<String>,
        price: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            name_de: name_de.into(),
            name_en: None,
            name_fr: None,
            name_ru: None,
            name_uk: None,
            description_de: description_de.into(),
            description_en: None,
            description_fr: None,
            description_ru: None,
            description_uk: None,
            price,
            size: None,
            image_url: String::new(),
            start_date,
            end_date,
        }
    }
}
