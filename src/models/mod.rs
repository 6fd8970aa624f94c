//! Data models
//!
//! This module contains all data structures used throughout the furnika client.
//! Models represent:
//! - The client-held session record
//! - Catalog entities (Category, Product, NewsArticle, Promotion)
//! - API request/response types

mod catalog;
mod language;
mod news;
mod page;
mod promotion;
mod session;

pub use catalog::{Category, NewCategory, NewProduct, Product};
pub(crate) use catalog::CategoryImageUpdate;
pub use language::Language;
pub use news::{NewsArticle, NewsArticleInput, NewsTranslation};
pub(crate) use news::TranslationRequest;
pub use page::{Page, DEFAULT_PAGE_SIZE};
pub use promotion::{Promotion, PromotionInput};
pub use session::{SessionRecord, ROLE_ADMIN, ROLE_USER};
pub(crate) use session::{merge_roles, OneOrMany};
