//! Catalog services: thin CRUD and query layers over the document store.

pub mod category;
pub mod product;

use serde::Serialize;

pub use category::{CATEGORIES, CategoryService, NewCategory};
pub use product::{NewProduct, PRODUCTS, ProductQuery, ProductService};

/// Confirmation returned by a successful delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub message: String,
}
