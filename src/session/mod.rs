//! Session provider boundary.
//!
//! The API client depends on exactly two things from whoever owns the user's session:
//!
//! - a [`CredentialSupplier`] it can pull the *current* bearer token from on every request, and
//! - an optional [`UnauthorizedHandler`] it notifies whenever the gateway answers 401.
//!
//! Both are implemented for plain closures. [`Session`] is an in-memory provider that implements
//! both and exposes the authentication state the application shell gates rendering on.

mod claims;
mod store;

pub use claims::{decode_claims, expiry_from_claims};
pub use store::Session;

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Source of the current bearer token.
///
/// Called once per outgoing request. Must be cheap and must not fail: `None` means "no usable
/// credential right now" and the request is sent without an `Authorization` header.
pub trait CredentialSupplier: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

impl<F> CredentialSupplier for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn access_token(&self) -> Option<String> {
        self()
    }
}

/// Notified once per 401 response.
///
/// Several in-flight requests can hit the same expired token, so implementations must tolerate
/// repeated calls. An `Err` is logged by the client; the original 401 is still returned to the
/// caller.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self) -> anyhow::Result<()>;
}

impl<F> UnauthorizedHandler for F
where
    F: Fn() + Send + Sync,
{
    fn on_unauthorized(&self) -> anyhow::Result<()> {
        self();
        Ok(())
    }
}

/// Bearer token plus the expiry the provider knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: Option<SystemTime>,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at: Option<SystemTime>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

/// Identity of the signed-in user, read from the identity provider's profile claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    #[serde(skip_serializing)]
    pub access_token: String,
}

impl AuthUser {
    /// Build a user from profile claims. `sub` is required; missing `email`/`name` become empty
    /// strings and missing `roles` an empty list.
    pub fn from_claims(claims: &serde_json::Value, access_token: impl Into<String>) -> Option<Self> {
        let sub = claims.get("sub")?.as_str()?.to_string();
        let text = |key: &str| {
            claims
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let roles = claims
            .get("roles")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|r| r.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            sub,
            email: text("email"),
            name: text("name"),
            roles,
            access_token: access_token.into(),
        })
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Authentication status as seen by the application shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Session not determined yet.
    Loading,
    Authenticated(AuthUser),
    Unauthenticated,
    /// The provider reported an error (e.g. a failed sign-in callback).
    Failed(String),
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AuthState::Failed(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_closures_are_suppliers() {
        let supplier = || Some("tok123".to_string());
        assert_eq!(supplier.access_token().as_deref(), Some("tok123"));

        let none = || None::<String>;
        assert!(none.access_token().is_none());
    }

    #[test]
    fn test_closures_are_unauthorized_handlers() {
        let hits = std::sync::atomic::AtomicUsize::new(0);
        let handler = || {
            hits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        };
        handler.on_unauthorized().unwrap();
        handler.on_unauthorized().unwrap();
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_user_from_claims_defaults() {
        let user = AuthUser::from_claims(&json!({"sub": "abc"}), "t").unwrap();
        assert_eq!(user.email, "");
        assert_eq!(user.name, "");
        assert!(user.roles.is_empty());

        let user = AuthUser::from_claims(
            &json!({"sub": "abc", "email": "a@b.c", "name": "Ada", "roles": ["admin", 7, "billing"]}),
            "t",
        )
        .unwrap();
        assert_eq!(user.roles, vec!["admin", "billing"]);
        assert!(user.has_role("admin"));

        assert!(AuthUser::from_claims(&json!({"email": "a@b.c"}), "t").is_none());
    }

    #[test]
    fn test_user_serialization_omits_token() {
        let user = AuthUser::from_claims(&json!({"sub": "abc"}), "secret").unwrap();
        let v = serde_json::to_value(&user).unwrap();
        assert!(v.get("accessToken").is_none());
    }

    #[test]
    fn test_credential_expiry() {
        let now = SystemTime::now();
        assert!(!Credential::new("t", None).is_expired_at(now));
        assert!(Credential::new("t", Some(now)).is_expired_at(now));
        assert!(!Credential::new("t", Some(now + Duration::from_secs(60))).is_expired_at(now));
    }

    #[test]
    fn test_auth_state_predicates() {
        assert!(AuthState::Loading.is_loading());
        assert!(!AuthState::Unauthenticated.is_authenticated());
        assert_eq!(AuthState::Failed("nope".into()).error(), Some("nope"));
    }
}
