use crate::core::{Record, RecordId, Result, ShopError};
use crate::services::Deleted;
use crate::storage::DocumentStore;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::info;

pub const CATEGORIES: &str = "categories";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Category CRUD over the `categories` collection
#[derive(Debug, Clone)]
pub struct CategoryService {
    store: DocumentStore,
}

impl CategoryService {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<Record>> {
        self.store.get_all(CATEGORIES).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Record> {
        let id = RecordId::coerce(id).ok_or_else(not_found)?;
        self.store
            .get_by_id(CATEGORIES, id)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn create(&self, category: NewCategory) -> Result<Record> {
        let name = category.name.trim();
        if name.is_empty() {
            return Err(ShopError::validation("category name is required"));
        }

        let mut fields = Record::new();
        fields.insert("name".to_string(), JsonValue::String(name.to_string()));
        if let Some(description) = category.description {
            fields.insert("description".to_string(), JsonValue::String(description));
        }

        let created = self.store.create(CATEGORIES, fields).await?;
        info!(id = ?RecordId::of(&created), "category created");
        Ok(created)
    }

    /// Shallow-merges `patch` into the category.
    pub async fn update(&self, id: &str, patch: Record) -> Result<Record> {
        if let Some(name) = patch.get("name") {
            let blank = name.as_str().is_none_or(|name| name.trim().is_empty());
            if blank {
                return Err(ShopError::validation("category name is required"));
            }
        }

        let id = RecordId::coerce(id).ok_or_else(not_found)?;
        let updated = self
            .store
            .update(CATEGORIES, id, patch)
            .await?
            .ok_or_else(not_found)?;

        info!(%id, "category updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<Deleted> {
        let id = RecordId::coerce(id).ok_or_else(not_found)?;
        if !self.store.delete(CATEGORIES, id).await? {
            return Err(not_found());
        }

        info!(%id, "category deleted");
        Ok(Deleted {
            message: "category deleted successfully".to_string(),
        })
    }
}

fn not_found() -> ShopError {
    ShopError::not_found("category not found")
}
