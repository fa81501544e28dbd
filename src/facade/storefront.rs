use crate::auth::{AuthGuard, AuthService, PasswordHasher, TokenIssuer, strategy_for};
use crate::config::StoreConfig;
use crate::services::{CategoryService, ProductService};
use crate::storage::DocumentStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// The storefront backend, wired once at start-up.
///
/// Owns the single [`DocumentStore`] handle; every service receives a clone
/// of it, so all mutations go through one write lock.
///
/// # Examples
///
/// ```
/// use storefront::{Storefront, StoreConfig};
/// use storefront::auth::RegisterRequest;
///
/// # tokio_test::block_on(async {
/// # let dir = tempfile::tempdir()?;
/// let config = StoreConfig::new(dir.path().join("database.json")).hash_cost(4);
/// let shop = Storefront::open(config)?;
///
/// let registered = shop
///     .auth()
///     .register(RegisterRequest::new("Ann", "a@x.com", "secret"))
///     .await?;
/// assert_eq!(shop.auth().verify_token(&registered.token)?.email, "a@x.com");
/// # Ok::<(), anyhow::Error>(())
/// # }).unwrap();
/// ```
pub struct Storefront {
    config: StoreConfig,
    store: DocumentStore,
    auth: AuthService,
    guard: AuthGuard,
    categories: CategoryService,
    products: ProductService,
}

impl Storefront {
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate().context("invalid storefront configuration")?;

        let store = DocumentStore::open(&config.database_path);
        let tokens = Arc::new(TokenIssuer::new(&config.token_secret, config.token_ttl));

        let auth = AuthService::new(
            store.clone(),
            PasswordHasher::new(config.hash_cost),
            Arc::clone(&tokens),
        )
        .with_verification_strategy(strategy_for(config.verification_channel));

        info!(
            path = %config.database_path.display(),
            channel = ?config.verification_channel,
            "storefront opened"
        );

        Ok(Self {
            guard: AuthGuard::new(tokens),
            categories: CategoryService::new(store.clone()),
            products: ProductService::new(store.clone()),
            auth,
            store,
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthService {
        &mut self.auth
    }

    pub fn guard(&self) -> &AuthGuard {
        &self.guard
    }

    pub fn categories(&self) -> &CategoryService {
        &self.categories
    }

    pub fn products(&self) -> &ProductService {
        &self.products
    }
}
