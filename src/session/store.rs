use super::claims::{decode_claims, expiry_from_claims};
use super::{AuthState, AuthUser, Credential, CredentialSupplier, UnauthorizedHandler};
use crate::{Error, ErrorContext, Result};
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::watch;
use tracing::{debug, warn};

/// In-memory session provider.
///
/// The credential lives in an [`ArcSwapOption`] so a background renewal can replace it without
/// the API client noticing; the next request simply pulls the new value. State transitions are
/// published on a `watch` channel for the application shell. Tokens are never persisted.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    credential: ArcSwapOption<Credential>,
    state: watch::Sender<AuthState>,
    unauthorized: AtomicU64,
}

impl Session {
    /// A session whose state is not determined yet.
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self {
            inner: Arc::new(SessionInner {
                credential: ArcSwapOption::empty(),
                state,
                unauthorized: AtomicU64::new(0),
            }),
        }
    }

    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Credential and state change together under the channel's write lock, so a concurrent
    /// 401 or renewal observes either both updates or neither.
    pub fn sign_in(&self, user: AuthUser, expires_at: Option<SystemTime>) {
        debug!(sub = user.sub.as_str(), "session signed in");
        let credential = Arc::new(Credential::new(user.access_token.clone(), expires_at));
        self.inner.state.send_modify(|state| {
            self.inner.credential.store(Some(credential));
            *state = AuthState::Authenticated(user);
        });
    }

    /// Sign in from a JWT access token, reading profile claims and `exp` from its payload.
    pub fn sign_in_with_token(&self, access_token: &str) -> Result<AuthUser> {
        let claims = decode_claims(access_token)?;
        let user = AuthUser::from_claims(&claims, access_token).ok_or_else(|| {
            Error::decode_with_context(
                "token payload has no subject",
                ErrorContext::new()
                    .with_field_path("sub")
                    .with_source("session"),
            )
        })?;
        self.sign_in(user.clone(), expiry_from_claims(&claims));
        Ok(user)
    }

    /// Swap in a renewed token. Ignored unless the session is authenticated, so a renewal that
    /// races a sign-out cannot revive the session. Returns whether the token was applied.
    pub fn renew(&self, access_token: impl Into<String>, expires_at: Option<SystemTime>) -> bool {
        let token = access_token.into();
        let applied = self.inner.state.send_if_modified(|state| match state {
            AuthState::Authenticated(user) => {
                self.inner
                    .credential
                    .store(Some(Arc::new(Credential::new(token.clone(), expires_at))));
                user.access_token = token;
                true
            }
            _ => false,
        });
        if applied {
            debug!("session credential renewed");
        }
        applied
    }

    pub fn sign_out(&self) {
        self.replace_state(AuthState::Unauthenticated);
        debug!("session signed out");
    }

    /// Record a provider error and drop the credential.
    pub fn fail(&self, message: impl Into<String>) {
        self.replace_state(AuthState::Failed(message.into()));
    }

    fn replace_state(&self, next: AuthState) {
        self.inner.state.send_modify(|state| {
            self.inner.credential.store(None);
            *state = next;
        });
    }

    pub fn credential(&self) -> Option<Credential> {
        self.inner.credential.load_full().map(|c| (*c).clone())
    }

    /// Number of 401 notifications received over the session's lifetime.
    pub fn unauthorized_count(&self) -> u64 {
        self.inner.unauthorized.load(Ordering::SeqCst)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSupplier for Session {
    fn access_token(&self) -> Option<String> {
        let guard = self.inner.credential.load();
        let credential = (*guard).as_ref()?;
        if credential.is_expired_at(SystemTime::now()) {
            return None;
        }
        Some(credential.token.clone())
    }
}

impl UnauthorizedHandler for Session {
    /// Tear the session down so the shell drives re-authentication. Repeated calls only count.
    fn on_unauthorized(&self) -> anyhow::Result<()> {
        let n = self.inner.unauthorized.fetch_add(1, Ordering::SeqCst) + 1;
        let torn_down = self.inner.state.send_if_modified(|state| {
            self.inner.credential.store(None);
            if state.is_authenticated() {
                *state = AuthState::Unauthenticated;
                true
            } else {
                false
            }
        });
        if torn_down {
            warn!(unauthorized_count = n, "session invalidated after 401; re-authentication required");
        } else {
            debug!(unauthorized_count = n, "401 received for an already invalidated session");
        }
        Ok(())
    }
}
