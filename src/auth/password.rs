use crate::config::StoreConfig;
use crate::core::{Result, ShopError};

/// One-way password hashing with bcrypt
///
/// Each hash embeds a fresh random salt, so hashing the same password twice
/// gives two different digests that both verify.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes a password using bcrypt with the configured cost
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        bcrypt::hash(plaintext, self.cost)
            .map_err(|e| ShopError::storage(format!("Failed to hash password: {}", e)))
    }

    /// Verifies password against bcrypt hash
    ///
    /// Returns false for a mismatch and for a digest bcrypt cannot parse.
    /// The comparison itself is constant-time.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        bcrypt::verify(plaintext, digest).unwrap_or(false)
    }

    /// [`hash`](Self::hash) on the blocking pool
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext)).await?
    }

    /// [`verify`](Self::verify) on the blocking pool
    pub async fn verify_blocking(&self, plaintext: String, digest: String) -> Result<bool> {
        let hasher = *self;
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest)).await?)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(StoreConfig::DEFAULT_HASH_COST)
    }
}
