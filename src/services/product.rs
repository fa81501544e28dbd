use crate::core::{Record, RecordId, Result, ShopError};
use crate::services::Deleted;
use crate::services::category::CATEGORIES;
use crate::storage::DocumentStore;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::info;

pub const PRODUCTS: &str = "products";

const CATEGORY_ID_FIELD: &str = "categoryId";
const CATEGORY_NAME_FIELD: &str = "category";
const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(rename = "categoryId")]
    pub category_id: RecordId,
}

/// Listing filters. Search wins over the category filter when both are set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, rename = "categoryId")]
    pub category_id: Option<String>,
}

/// Product catalog queries, joined with category names
#[derive(Debug, Clone)]
pub struct ProductService {
    store: DocumentStore,
}

impl ProductService {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Every product with its category name under `category`.
    pub async fn get_all(&self) -> Result<Vec<Record>> {
        let products = self.store.get_all(PRODUCTS).await?;
        let categories = self.store.get_all(CATEGORIES).await?;

        Ok(products
            .into_iter()
            .map(|product| with_category_name(product, &categories))
            .collect())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Record> {
        let id = RecordId::coerce(id).ok_or_else(not_found)?;
        let product = self
            .store
            .get_by_id(PRODUCTS, id)
            .await?
            .ok_or_else(not_found)?;

        let categories = self.store.get_all(CATEGORIES).await?;
        Ok(with_category_name(product, &categories))
    }

    /// Case-insensitive substring match on name and description.
    pub async fn search(&self, query: &str) -> Result<Vec<Record>> {
        let products = self.get_all().await?;
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return Ok(products);
        }

        Ok(products
            .into_iter()
            .filter(|product| {
                text_of(product, "name").contains(&term)
                    || text_of(product, "description").contains(&term)
            })
            .collect())
    }

    pub async fn filter_by_category(&self, category_id: &str) -> Result<Vec<Record>> {
        let products = self.get_all().await?;
        if category_id.trim().is_empty() {
            return Ok(products);
        }

        let Some(wanted) = RecordId::coerce(category_id) else {
            return Ok(Vec::new());
        };

        Ok(products
            .into_iter()
            .filter(|product| category_of(product) == Some(wanted))
            .collect())
    }

    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<Record>> {
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            return self.search(search).await;
        }
        if let Some(category_id) = query.category_id.as_deref().filter(|s| !s.is_empty()) {
            return self.filter_by_category(category_id).await;
        }
        self.get_all().await
    }

    pub async fn create(&self, product: NewProduct) -> Result<Record> {
        let name = product.name.trim();
        if name.is_empty() {
            return Err(ShopError::validation("product name is required"));
        }
        validate_price(&JsonValue::from(product.price))?;
        self.ensure_category_exists(product.category_id).await?;

        let mut fields = Record::new();
        fields.insert("name".to_string(), JsonValue::String(name.to_string()));
        fields.insert("description".to_string(), JsonValue::String(product.description));
        fields.insert("price".to_string(), JsonValue::from(product.price));
        fields.insert(CATEGORY_ID_FIELD.to_string(), product.category_id.into());

        let created = self.store.create(PRODUCTS, fields).await?;
        info!(id = ?RecordId::of(&created), category = %product.category_id, "product created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, patch: Record) -> Result<Record> {
        if let Some(name) = patch.get("name")
            && name.as_str().is_none_or(|name| name.trim().is_empty())
        {
            return Err(ShopError::validation("product name is required"));
        }
        if let Some(price) = patch.get("price") {
            validate_price(price)?;
        }
        if let Some(category) = patch.get(CATEGORY_ID_FIELD) {
            let category_id = RecordId::from_json(category)
                .ok_or_else(|| ShopError::validation("categoryId must be a positive integer"))?;
            self.ensure_category_exists(category_id).await?;
        }

        let id = RecordId::coerce(id).ok_or_else(not_found)?;
        let updated = self
            .store
            .update(PRODUCTS, id, patch)
            .await?
            .ok_or_else(not_found)?;

        info!(%id, "product updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<Deleted> {
        let id = RecordId::coerce(id).ok_or_else(not_found)?;
        if !self.store.delete(PRODUCTS, id).await? {
            return Err(not_found());
        }

        info!(%id, "product deleted");
        Ok(Deleted {
            message: "product deleted successfully".to_string(),
        })
    }

    async fn ensure_category_exists(&self, id: RecordId) -> Result<()> {
        if self.store.get_by_id(CATEGORIES, id).await?.is_none() {
            return Err(ShopError::validation(format!("category {} does not exist", id)));
        }
        Ok(())
    }
}

fn with_category_name(mut product: Record, categories: &[Record]) -> Record {
    let name = category_of(&product)
        .and_then(|id| categories.iter().find(|c| RecordId::of(c) == Some(id)))
        .map(|category| category.get("name").cloned().unwrap_or(JsonValue::Null))
        .unwrap_or_else(|| JsonValue::String(UNKNOWN_CATEGORY.to_string()));

    product.insert(CATEGORY_NAME_FIELD.to_string(), name);
    product
}

fn category_of(product: &Record) -> Option<RecordId> {
    product.get(CATEGORY_ID_FIELD).and_then(RecordId::from_json)
}

fn text_of(product: &Record, field: &str) -> String {
    product
        .get(field)
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_lowercase()
}

fn validate_price(price: &JsonValue) -> Result<()> {
    match price.as_f64() {
        Some(value) if value.is_finite() && value >= 0.0 => Ok(()),
        _ => Err(ShopError::validation("price must be a non-negative number")),
    }
}

fn not_found() -> ShopError {
    ShopError::not_found("product not found")
}
