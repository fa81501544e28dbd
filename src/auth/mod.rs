//! Identity: credential hashing, signed tokens, registration and login,
//! and request gating by role.
//!
//! - `password.rs` - bcrypt hashing (PasswordHasher)
//! - `token.rs` - HS256 token issue and verification (TokenIssuer, Claims)
//! - `verification.rs` - post-registration notification channels
//! - `service.rs` - registration and login over the `users` collection
//! - `middleware.rs` - bearer extraction and role checks (AuthGuard)

pub mod middleware;
pub mod password;
pub mod service;
pub mod token;
pub mod user;
pub mod verification;

pub use middleware::{Access, AuthGuard, identity};
pub use password::PasswordHasher;
pub use service::{AuthService, USERS};
pub use token::{Claims, TokenIssuer};
pub use user::{LoginResponse, RegisterRequest, RegisterResponse, Role, UserRecord, UserView};
pub use verification::{
    EmailVerification, Verification, VerificationStrategy, WhatsAppVerification, strategy_for,
};
