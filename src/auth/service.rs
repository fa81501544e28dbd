use crate::auth::password::PasswordHasher;
use crate::auth::token::{Claims, TokenIssuer};
use crate::auth::user::{
    LoginResponse, NewUser, RegisterRequest, RegisterResponse, UserRecord, UserView,
};
use crate::auth::verification::{EmailVerification, Verification, VerificationStrategy};
use crate::core::{Result, ShopError, record_from};
use crate::storage::DocumentStore;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{info, warn};

pub const USERS: &str = "users";

const DUMMY_PASSWORD: &str = "storefront-dummy-password";

/// Registration and login over the `users` collection
pub struct AuthService {
    store: DocumentStore,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
    verification: Arc<dyn VerificationStrategy>,
    /// Held across the email check and the insert of a registration
    registration: Mutex<()>,
    /// Digest verified against when the email is unknown
    dummy_digest: OnceCell<String>,
}

impl AuthService {
    /// Creates a service notifying new users by email
    pub fn new(store: DocumentStore, hasher: PasswordHasher, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            store,
            hasher,
            tokens,
            verification: Arc::new(EmailVerification),
            registration: Mutex::new(()),
            dummy_digest: OnceCell::new(),
        }
    }

    pub fn with_verification_strategy(mut self, strategy: Arc<dyn VerificationStrategy>) -> Self {
        self.verification = strategy;
        self
    }

    pub fn set_verification_strategy(&mut self, strategy: Arc<dyn VerificationStrategy>) {
        self.verification = strategy;
    }

    pub fn tokens(&self) -> &Arc<TokenIssuer> {
        &self.tokens
    }

    /// Registers a new user and signs them in
    ///
    /// Fails with `AlreadyExists` when the email is taken. The notification
    /// outcome is reported, never fatal: a failed dispatch is logged and
    /// comes back as `verified: false`.
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse> {
        let name = request.name.trim();
        let email = request.email.trim();
        require("name", name)?;
        require("email", email)?;
        require("password", &request.password)?;
        let role = request.role.unwrap_or_default();

        let user = {
            let _guard = self.registration.lock().await;

            if self.find_by_email(email).await?.is_some() {
                warn!(email, "registration rejected: email taken");
                return Err(ShopError::AlreadyExists("user already exists".to_string()));
            }

            let password_hash = self.hasher.hash_blocking(request.password.clone()).await?;
            let fields = NewUser {
                name,
                email,
                password_hash: &password_hash,
                role,
                verified: false,
            }
            .into_record()?;

            UserRecord::from_record(self.store.create(USERS, fields).await?)?
        };

        let view = user.view();
        let verification = self.dispatch_verification(&view).await;
        let token = self.tokens.issue(&view)?;

        info!(id = %view.id, role = %view.role, "user registered");
        Ok(RegisterResponse {
            token,
            user: view,
            verification,
        })
    }

    /// Signs a user in
    ///
    /// Unknown email and wrong password fail identically with
    /// `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let Some(user) = self.find_by_email(email.trim()).await? else {
            self.verify_against_dummy(password).await?;
            warn!("login rejected");
            return Err(ShopError::InvalidCredentials);
        };

        let valid = self
            .hasher
            .verify_blocking(password.to_string(), user.password_hash.clone())
            .await?;
        if !valid {
            warn!("login rejected");
            return Err(ShopError::InvalidCredentials);
        }

        let view = user.view();
        let token = self.tokens.issue(&view)?;

        info!(id = %view.id, role = %view.role, "user logged in");
        Ok(LoginResponse { token, user: view })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        self.tokens.verify(token).map_err(|_| ShopError::InvalidToken)
    }

    /// Public view of the user a token was issued to
    pub async fn current_user(&self, claims: &Claims) -> Result<UserView> {
        let record = self
            .store
            .get_by_id(USERS, claims.id)
            .await?
            .ok_or_else(|| ShopError::not_found("user not found"))?;

        Ok(UserRecord::from_record(record)?.view())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.store
            .find_one(USERS, &record_from(json!({ "email": email })))
            .await?
            .map(UserRecord::from_record)
            .transpose()
    }

    async fn verify_against_dummy(&self, password: &str) -> Result<()> {
        let digest = self
            .dummy_digest
            .get_or_try_init(|| self.hasher.hash_blocking(DUMMY_PASSWORD.to_string()))
            .await?;

        self.hasher
            .verify_blocking(password.to_string(), digest.clone())
            .await?;
        Ok(())
    }

    async fn dispatch_verification(&self, user: &UserView) -> Verification {
        let method = self.verification.method();
        match self.verification.verify(user).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(method, id = %user.id, error = %err, "verification dispatch failed");
                Verification::failed(method)
            }
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ShopError::validation(format!("{} is required", field)));
    }
    Ok(())
}
