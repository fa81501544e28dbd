// ============================================================================
// Storefront Library
// ============================================================================

//! Persistence and identity for a small storefront.
//!
//! - `storage` - a single JSON document of collections, read and rewritten
//!   whole on every operation (DocumentStore)
//! - `auth` - bcrypt credentials, signed tokens, registration, login and
//!   role gating
//! - `services` - category and product services over the store
//! - `facade` - wires one store handle into every service (Storefront)

pub mod auth;
pub mod config;
pub mod core;
pub mod facade;
pub mod services;
pub mod storage;

// Re-export main types for convenience
pub use crate::config::{StoreConfig, VerificationChannel};
pub use crate::core::{Record, RecordId, Result, ShopError};
pub use crate::facade::Storefront;
pub use crate::storage::DocumentStore;
