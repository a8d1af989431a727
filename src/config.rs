//! Application start-up configuration.
//!
//! Values come from the environment (or a YAML file) once, at start-up:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `RESELLER_API_BASE_URL` | [`AppConfig::api_base_url`] |
//! | `RESELLER_OIDC_AUTHORITY` | [`OidcAppConfig::authority`] |
//! | `RESELLER_OIDC_CLIENT_ID` | [`OidcAppConfig::client_id`] |
//! | `RESELLER_OIDC_REDIRECT_URI` | [`OidcAppConfig::redirect_uri`] |
//! | `RESELLER_OIDC_POST_LOGOUT_REDIRECT_URI` | [`OidcAppConfig::post_logout_redirect_uri`] (optional) |
//! | `RESELLER_OIDC_SCOPE` | [`OidcAppConfig::scope`] (optional) |
//!
//! The OIDC values configure the session provider, not the API client, but they must be present
//! before the client's credential supplier can return anything usable.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

pub const DEFAULT_SCOPE: &str = "openid profile email";

/// Which console this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Console {
    Admin,
    User,
}

impl Console {
    pub fn as_str(&self) -> &'static str {
        match self {
            Console::Admin => "admin",
            Console::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcAppConfig {
    /// Base URL of the identity provider realm.
    pub authority: String,
    /// Public client id registered at the identity provider.
    pub client_id: String,
    /// Post-login callback URL for this console.
    pub redirect_uri: String,
    /// Defaults to the origin of `redirect_uri`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_logout_redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Settings handed to the identity-provider library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OidcSettings {
    pub authority: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub post_logout_redirect_uri: String,
    pub scope: String,
    pub response_type: String,
    /// Silent renewal reuses the login callback.
    pub silent_redirect_uri: String,
    pub automatic_silent_renew: bool,
    pub monitor_session: bool,
    /// Tokens stay in memory only.
    pub persist_tokens: bool,
}

impl OidcAppConfig {
    pub fn validate(&self) -> Result<()> {
        require_absolute(&self.authority, "oidc.authority")?;
        require_absolute(&self.redirect_uri, "oidc.redirect_uri")?;
        if let Some(uri) = &self.post_logout_redirect_uri {
            require_absolute(uri, "oidc.post_logout_redirect_uri")?;
        }
        if self.client_id.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "client id must not be empty",
                ErrorContext::new()
                    .with_field_path("oidc.client_id")
                    .with_source("app_config"),
            ));
        }
        Ok(())
    }

    /// Expand into the full provider settings (authorization-code flow, silent renew, session
    /// monitoring).
    pub fn settings(&self) -> Result<OidcSettings> {
        self.validate()?;
        let post_logout_redirect_uri = match &self.post_logout_redirect_uri {
            Some(uri) => uri.clone(),
            None => origin_of(&self.redirect_uri)?,
        };
        Ok(OidcSettings {
            authority: self.authority.clone(),
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            post_logout_redirect_uri,
            scope: self
                .scope
                .clone()
                .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            response_type: "code".to_string(),
            silent_redirect_uri: self.redirect_uri.clone(),
            automatic_silent_renew: true,
            monitor_session: true,
            persist_tokens: false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub console: Console,
    pub api_base_url: String,
    pub oidc: OidcAppConfig,
}

impl AppConfig {
    pub fn from_env(console: Console) -> Result<Self> {
        Self::from_lookup(console, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as missing.
    pub fn from_lookup<F>(console: Console, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                Error::configuration_with_context(
                    format!("missing required environment variable {}", key),
                    ErrorContext::new()
                        .with_field_path(key)
                        .with_source("app_config"),
                )
            })
        };

        let config = Self {
            console,
            api_base_url: require("RESELLER_API_BASE_URL")?,
            oidc: OidcAppConfig {
                authority: require("RESELLER_OIDC_AUTHORITY")?,
                client_id: require("RESELLER_OIDC_CLIENT_ID")?,
                redirect_uri: require("RESELLER_OIDC_REDIRECT_URI")?,
                post_logout_redirect_uri: get("RESELLER_OIDC_POST_LOGOUT_REDIRECT_URI"),
                scope: get("RESELLER_OIDC_SCOPE"),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid configuration file: {}", e),
                ErrorContext::new().with_source("app_config"),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_details(path.display().to_string()),
            },
            other => other,
        })
    }

    pub fn validate(&self) -> Result<()> {
        require_absolute(&self.api_base_url, "api_base_url")?;
        self.oidc.validate()
    }
}

/// Parse `raw` as an absolute http(s) URL with a host.
pub(crate) fn require_absolute(raw: &str, field: &str) -> Result<Url> {
    let invalid = |details: String| {
        Error::configuration_with_context(
            "expected an absolute http(s) URL",
            ErrorContext::new()
                .with_field_path(field)
                .with_details(details)
                .with_source("app_config"),
        )
    };
    let url = Url::parse(raw).map_err(|e| invalid(format!("{}: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(invalid(raw.to_string()));
    }
    Ok(url)
}

fn origin_of(raw: &str) -> Result<String> {
    let url = require_absolute(raw, "oidc.redirect_uri")?;
    Ok(url.origin().ascii_serialization())
}
