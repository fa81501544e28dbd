use crate::auth::user::UserView;
use crate::config::VerificationChannel;
use crate::core::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Outcome of a post-registration notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub method: String,
    pub verified: bool,
}

impl Verification {
    pub fn sent(method: &str) -> Self {
        Self {
            method: method.to_string(),
            verified: true,
        }
    }

    pub fn failed(method: &str) -> Self {
        Self {
            method: method.to_string(),
            verified: false,
        }
    }
}

/// Channel that notifies a user after registration.
///
/// Injected into [`AuthService`](crate::auth::AuthService); registration
/// does not depend on which channel is used.
#[async_trait]
pub trait VerificationStrategy: Send + Sync {
    fn method(&self) -> &'static str;

    async fn verify(&self, user: &UserView) -> Result<Verification>;
}

/// Email channel. Delivery is not wired up; the dispatch is logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailVerification;

#[async_trait]
impl VerificationStrategy for EmailVerification {
    fn method(&self) -> &'static str {
        "email"
    }

    async fn verify(&self, user: &UserView) -> Result<Verification> {
        info!(method = self.method(), email = %user.email, "verification sent");
        Ok(Verification::sent(self.method()))
    }
}

/// WhatsApp channel. Delivery is not wired up; the dispatch is logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatsAppVerification;

#[async_trait]
impl VerificationStrategy for WhatsAppVerification {
    fn method(&self) -> &'static str {
        "whatsapp"
    }

    async fn verify(&self, user: &UserView) -> Result<Verification> {
        info!(method = self.method(), email = %user.email, "verification sent");
        Ok(Verification::sent(self.method()))
    }
}

pub fn strategy_for(channel: VerificationChannel) -> Arc<dyn VerificationStrategy> {
    match channel {
        VerificationChannel::Email => Arc::new(EmailVerification),
        VerificationChannel::WhatsApp => Arc::new(WhatsAppVerification),
    }
}
