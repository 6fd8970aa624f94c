//! Services layer - Business logic
//!
//! This module contains the client-side services of the furnika storefront.
//! Services are responsible for:
//! - Owning the session lifecycle (login, OAuth, expiry, logout)
//! - Deciding which screens a session may see
//! - Reading the catalog through the cache
//! - Back-office writes and the cache invalidation they imply

pub mod admin;
pub mod catalog;
pub mod guard;
pub mod session;
pub mod token;

pub use admin::{generate_slug, AdminError, AdminService};
pub use catalog::{CatalogError, CatalogService};
pub use guard::{landing_route, GuardDecision, RouteGuard};
pub use session::{
    is_authorized, AuthError, LoginInput, OAuthFailure, RegisterInput, SessionManager,
};
pub use token::{decode_claims, TokenClaims, TokenError};
