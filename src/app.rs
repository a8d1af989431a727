//! Application context: the explicit bundle each console threads through its code instead of
//! reaching for globals.

use crate::client::ApiClient;
use crate::config::{AppConfig, Console, OidcSettings};
use crate::session::Session;
use crate::Result;
use tracing::info;

/// Everything a console needs to talk to the gateway, constructed once at start-up.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub session: Session,
    pub client: ApiClient,
}

impl AppContext {
    /// Build with a fresh session in the `Loading` state.
    pub fn new(config: AppConfig) -> Result<Self> {
        Self::with_session(config, Session::new())
    }

    /// Build around an existing session. The session is both the client's credential supplier
    /// and its 401 handler.
    pub fn with_session(config: AppConfig, session: Session) -> Result<Self> {
        config.validate()?;
        let client = ApiClient::builder()
            .base_url(config.api_base_url.as_str())
            .credential_supplier(session.clone())
            .unauthorized_handler(session.clone())
            .build()?;

        info!(
            console = config.console.as_str(),
            base_url = client.base_url().as_str(),
            "application context ready"
        );

        Ok(Self {
            config,
            session,
            client,
        })
    }

    pub fn from_env(console: Console) -> Result<Self> {
        Self::new(AppConfig::from_env(console)?)
    }

    pub fn console(&self) -> Console {
        self.config.console
    }

    pub fn oidc_settings(&self) -> Result<OidcSettings> {
        self.config.oidc.settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OidcAppConfig;
    use crate::session::{AuthUser, CredentialSupplier};

    fn config() -> AppConfig {
        AppConfig {
            console: Console::User,
            api_base_url: "https://gw.example.com/api".into(),
            oidc: OidcAppConfig {
                authority: "https://id.example.com/realms/reseller".into(),
                client_id: "user-console".into(),
                redirect_uri: "https://app.example.com/callback".into(),
                post_logout_redirect_uri: None,
                scope: None,
            },
        }
    }

    #[test]
    fn test_context_wires_session_into_client() {
        let ctx = AppContext::new(config()).unwrap();
        assert!(ctx.session.state().is_loading());
        assert_eq!(ctx.client.base_url().as_str(), "https://gw.example.com/api");
        assert_eq!(
            ctx.client.interceptor_names(),
            vec!["bearer_auth", "unauthorized_notifier"]
        );

        let user = AuthUser::from_claims(&serde_json::json!({"sub": "u1"}), "tok").unwrap();
        ctx.session.sign_in(user, None);
        assert_eq!(
            ctx.client.config().credentials.access_token().as_deref(),
            Some("tok")
        );
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut bad = config();
        bad.api_base_url = "gw.example.com".into();
        assert!(AppContext::new(bad).is_err());
    }

    #[test]
    fn test_oidc_settings_from_context() {
        let ctx = AppContext::new(config()).unwrap();
        let settings = ctx.oidc_settings().unwrap();
        assert_eq!(settings.client_id, "user-console");
        assert_eq!(settings.post_logout_redirect_uri, "https://app.example.com");
        assert_eq!(ctx.console(), Console::User);
    }
}
