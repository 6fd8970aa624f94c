//! News article model

use serde::{Deserialize, Serialize};

use super::language::{pick, Language};

/// News article with German source text and optional translations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: i64,
    pub title_de: String,
    pub content_de: String,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub content_en: Option<String>,
    #[serde(default)]
    pub title_fr: Option<String>,
    #[serde(default)]
    pub content_fr: Option<String>,
    #[serde(default)]
    pub title_ru: Option<String>,
    #[serde(default)]
    pub content_ru: Option<String>,
    #[serde(default)]
    pub title_uk: Option<String>,
    #[serde(default)]
    pub content_uk: Option<String>,
    #[serde(default)]
    pub image_url: String,
    /// Creation timestamp as sent by the server
    #[serde(default)]
    pub created_at: String,
}

impl NewsArticle {
    /// Title in the given language, German if untranslated
    pub fn title(&self, lang: Language) -> &str {
        pick(
            lang,
            &self.title_de,
            &self.title_en,
            &self.title_fr,
            &self.title_ru,
            &self.title_uk,
        )
    }

    /// Content in the given language, German if untranslated
    pub fn content(&self, lang: Language) -> &str {
        pick(
            lang,
            &self.content_de,
            &self.content_en,
            &self.content_fr,
            &self.content_ru,
            &self.content_uk,
        )
    }
}

/// Input for creating or updating a news article (all fields are sent)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticleInput {
    pub title_de: String,
    pub content_de: String,
    pub image_url: String,
    pub title_en: String,
    pub content_en: String,
    pub title_fr: String,
    pub content_fr: String,
    pub title_ru: String,
    pub content_ru: String,
    pub title_uk: String,
    pub content_uk: String,
}

impl NewsArticleInput {
    /// Start an input from the German source text
    pub fn new(title_de: impl Into<String>, content_de: impl Into<String>) -> Self {
        Self {
            title_de: title_de.into(),
            content_de: content_de.into(),
            ..Self::default()
        }
    }

    /// Set the image URL
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Fill every translation from a machine translation result
    pub fn with_translation(mut self, translation: NewsTranslation) -> Self {
        self.title_en = translation.title_en;
        self.content_en = translation.content_en;
        self.title_fr = translation.title_fr;
        self.content_fr = translation.content_fr;
        self.title_ru = translation.title_ru;
        self.content_ru = translation.content_ru;
        self.title_uk = translation.title_uk;
        self.content_uk = translation.content_uk;
        self
    }
}

/// Machine translation of a German news article
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsTranslation {
    pub title_en: String,
    pub content_en: String,
    pub title_fr: String,
    pub content_fr: String,
    pub title_ru: String,
    pub content_ru: String,
    pub title_uk: String,
    pub content_uk: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranslationRequest<'a> {
    pub title_de: &'a str,
    pub content_de: &'a str,
}
