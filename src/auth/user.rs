use crate::auth::verification::Verification;
use crate::core::{Record, RecordId, Result, ShopError};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// User role. Closed set; anything else fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }

    #[inline]
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            other => Err(ShopError::validation(format!("unknown role '{}'", other))),
        }
    }
}

/// A stored user, as found in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    /// bcrypt digest; the plaintext is never stored
    #[serde(rename = "password")]
    pub password_hash: String,
    pub role: Role,
    #[serde(default)]
    pub verified: bool,
}

impl UserRecord {
    pub fn from_record(record: Record) -> Result<Self> {
        serde_json::from_value(JsonValue::Object(record))
            .map_err(|e| ShopError::storage(format!("malformed user record: {}", e)))
    }

    /// Public view without the password digest or verification flag.
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Fields written for a freshly registered user.
#[derive(Serialize)]
pub(crate) struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    #[serde(rename = "password")]
    pub password_hash: &'a str,
    pub role: Role,
    pub verified: bool,
}

impl NewUser<'_> {
    pub fn into_record(self) -> Result<Record> {
        match serde_json::to_value(self)? {
            JsonValue::Object(map) => Ok(map),
            _ => Err(ShopError::storage("user fields did not serialize to an object")),
        }
    }
}

/// User as handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl RegisterRequest {
    pub fn new(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: None,
        }
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub token: String,
    pub user: UserView,
    pub verification: Verification,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record_from;
    use serde_json::json;

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!("admin"));
        assert_eq!(serde_json::from_value::<Role>(json!("customer")).unwrap(), Role::Customer);
        assert!(serde_json::from_value::<Role>(json!("superuser")).is_err());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_record_reads_password_field() {
        let record = record_from(json!({
            "id": 3,
            "name": "Ann",
            "email": "a@x.com",
            "password": "$2b$04$digest",
            "role": "customer",
            "verified": false
        }));

        let user = UserRecord::from_record(record).unwrap();
        assert_eq!(user.id, RecordId::new(3));
        assert_eq!(user.password_hash, "$2b$04$digest");
        assert!(!user.role.is_admin());
    }

    #[test]
    fn test_user_record_with_unknown_role_is_rejected() {
        let record = record_from(json!({
            "id": 1, "name": "Eve", "email": "e@x.com", "password": "h", "role": "root"
        }));

        assert!(UserRecord::from_record(record).is_err());
    }

    #[test]
    fn test_view_hides_secret_fields() {
        let user = UserRecord {
            id: RecordId::new(1),
            name: "Ann".into(),
            email: "a@x.com".into(),
            password_hash: "digest".into(),
            role: Role::Customer,
            verified: true,
        };

        let view = serde_json::to_value(user.view()).unwrap();
        assert_eq!(view, json!({"id": 1, "name": "Ann", "email": "a@x.com", "role": "customer"}));
    }

    #[test]
    fn test_register_request_debug_redacts_password() {
        let request = RegisterRequest::new("Ann", "a@x.com", "secret");
        let printed = format!("{:?}", request);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }
}
