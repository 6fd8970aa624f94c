//! furnika - client core for a furniture storefront
//!
//! This library provides the session lifecycle, route guarding, catalog reads
//! and back-office operations used by the storefront front end.

pub mod cache;
pub mod client;
pub mod config;
pub mod models;
pub mod services;
pub mod storage;

#[cfg(test)]
mod test_support;
