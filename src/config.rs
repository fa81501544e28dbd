use anyhow::{Context, Result};
use chrono::Duration;
use std::env;
use std::path::PathBuf;

/// Cost range bcrypt accepts
pub const MIN_HASH_COST: u32 = 4;
pub const MAX_HASH_COST: u32 = 31;

/// Channel used to notify a user after registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationChannel {
    #[default]
    Email,
    WhatsApp,
}

impl VerificationChannel {
    fn from_env(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "email" | "mail" => Ok(Self::Email),
            "whatsapp" | "wa" => Ok(Self::WhatsApp),
            _ => Err(anyhow::anyhow!(
                "STOREFRONT_VERIFICATION_CHANNEL must be one of: email, whatsapp"
            )),
        }
    }
}

/// Storefront configuration
///
/// Holds everything fixed for the life of the process: where the document
/// lives, the token signing key and lifetime, and the password hashing cost.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the JSON document
    pub database_path: PathBuf,

    /// Token signing key
    pub token_secret: String,

    /// Token lifetime
    pub token_ttl: Duration,

    /// bcrypt cost factor
    pub hash_cost: u32,

    /// Post-registration notification channel
    pub verification_channel: VerificationChannel,
}

impl StoreConfig {
    pub const DEFAULT_DATABASE_PATH: &'static str = "database.json";
    pub const DEFAULT_TOKEN_SECRET: &'static str = "change-me-in-production";
    pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
    pub const DEFAULT_HASH_COST: u32 = 10;

    /// Create a configuration with defaults for everything but the document path
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            token_secret: Self::DEFAULT_TOKEN_SECRET.to_string(),
            token_ttl: Duration::hours(Self::DEFAULT_TOKEN_TTL_HOURS),
            hash_cost: Self::DEFAULT_HASH_COST,
            verification_channel: VerificationChannel::default(),
        }
    }

    /// Set the token signing key
    pub fn token_secret(mut self, secret: &str) -> Self {
        self.token_secret = secret.to_string();
        self
    }

    /// Set the token lifetime
    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set the bcrypt cost factor
    pub fn hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Set the notification channel
    pub fn verification_channel(mut self, channel: VerificationChannel) -> Self {
        self.verification_channel = channel;
        self
    }

    /// Load configuration from the environment (and `.env`, when present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_path = env::var("STOREFRONT_DATABASE_PATH")
            .unwrap_or_else(|_| Self::DEFAULT_DATABASE_PATH.to_string());

        let token_secret = env::var("STOREFRONT_TOKEN_SECRET")
            .unwrap_or_else(|_| Self::DEFAULT_TOKEN_SECRET.to_string());

        let ttl_hours = env::var("STOREFRONT_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| Self::DEFAULT_TOKEN_TTL_HOURS.to_string())
            .parse::<i64>()
            .context("STOREFRONT_TOKEN_TTL_HOURS must be a valid integer")?;

        let hash_cost = env::var("STOREFRONT_HASH_COST")
            .unwrap_or_else(|_| Self::DEFAULT_HASH_COST.to_string())
            .parse::<u32>()
            .context("STOREFRONT_HASH_COST must be a valid u32")?;

        let verification_channel = VerificationChannel::from_env(
            &env::var("STOREFRONT_VERIFICATION_CHANNEL").unwrap_or_else(|_| "email".to_string()),
        )?;

        let config = Self::new(database_path)
            .token_secret(&token_secret)
            .token_ttl(Duration::hours(ttl_hours))
            .hash_cost(hash_cost)
            .verification_channel(verification_channel);

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the hashing and token layers cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&self.hash_cost) {
            return Err(anyhow::anyhow!(
                "hash cost must be between {} and {}, got {}",
                MIN_HASH_COST,
                MAX_HASH_COST,
                self.hash_cost
            ));
        }

        if self.token_secret.is_empty() {
            return Err(anyhow::anyhow!("token secret must not be empty"));
        }

        if self.token_ttl <= Duration::zero() {
            return Err(anyhow::anyhow!("token lifetime must be positive"));
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DATABASE_PATH)
    }
}
