//! Auth gateway: the boundary between the console and the remote
//! identity provider.
//!
//! The gateway holds no session state of its own — it validates input
//! locally, talks to the provider, maps provider errors into the local
//! [`AuthError`] taxonomy and instructs the [`SessionStore`]. Navigation
//! is the caller's job; the gateway only produces results.

use std::sync::Arc;

use crate::errors::AuthError;
use crate::identity::models::IdentitySession;
use crate::identity::provider::{IdentityProvider, ProviderError, ProviderSession, SignupMetadata};
use crate::identity::store::SessionStore;
use crate::observability::AUTH_ATTEMPTS;

/// Role key attached to every new signup. Fixed policy, not
/// configurable.
const DEFAULT_SIGNUP_ROLE: &str = "user";

/// Signup form payload.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
}

/// Stateless boundary service in front of the identity provider.
pub struct AuthGateway {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<SessionStore>,
}

impl AuthGateway {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<SessionStore>) -> Self {
        Self { provider, store }
    }

    /// Shared handle to the store this gateway writes to.
    pub fn store(&self) -> Arc<SessionStore> {
        self.store.clone()
    }

    /// Exchange credentials for a session and install it in the store.
    ///
    /// Both fields are validated locally before any network call. On
    /// success subscribers of the store are notified so cached
    /// authorization-dependent views revalidate. If a logout raced this
    /// call the fresh session is discarded instead of resurrecting the
    /// cleared store; the returned session still describes the
    /// authenticated account.
    pub async fn login(&self, email: &str, password: &str) -> Result<Arc<IdentitySession>, AuthError> {
        require_fields(&[("email", email), ("password", password)])?;

        let epoch = self.store.epoch();
        let provider_session = self
            .provider
            .sign_in(email, password)
            .await
            .map_err(|e| self.fail("login", map_sign_in_error(e)))?;

        let session = assemble_session(provider_session);
        AUTH_ATTEMPTS.with_label_values(&["login", "ok"]).inc();

        match self.store.adopt_if_current(epoch, session.clone()) {
            Some(installed) => Ok(installed),
            None => {
                tracing::warn!(email, "login response superseded by logout; session discarded");
                Ok(Arc::new(session))
            }
        }
    }

    /// Register a new account with the default `"user"` role.
    ///
    /// The account is not signed in on success; the caller prompts for
    /// email confirmation instead.
    pub async fn signup(&self, request: &SignupRequest) -> Result<(), AuthError> {
        require_fields(&[
            ("email", &request.email),
            ("password", &request.password),
            ("full_name", &request.full_name),
            ("phone", &request.phone),
        ])?;

        let metadata = SignupMetadata {
            full_name: request.full_name.clone(),
            phone: request.phone.clone(),
            role: DEFAULT_SIGNUP_ROLE.to_string(),
        };

        self.provider
            .sign_up(&request.email, &request.password, metadata)
            .await
            .map_err(|e| {
                self.fail(
                    "signup",
                    match e {
                        ProviderError::RateLimited => AuthError::RateLimited,
                        other => AuthError::SignupFailed(other.to_string()),
                    },
                )
            })?;

        AUTH_ATTEMPTS.with_label_values(&["signup", "ok"]).inc();
        Ok(())
    }

    /// Change the account password, re-proving knowledge of the current
    /// one first.
    ///
    /// Step 1 re-authenticates with `current_password`; only if that
    /// yields a valid session is the update issued with `new_password`.
    /// A failed re-auth fails closed: the update call is never made.
    /// Success does not alter the active session's identity.
    pub async fn update_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        require_fields(&[
            ("email", email),
            ("current_password", current_password),
            ("new_password", new_password),
        ])?;

        // Step 1: re-authenticate. Guards against a hijacked but still
        // valid session changing the password without knowing it.
        if let Err(e) = self.provider.sign_in(email, current_password).await {
            tracing::warn!(email, error = %e, "password change re-authentication failed");
            return Err(self.fail("update_password", AuthError::ReauthFailed));
        }

        // Step 2: only reached after a successful re-auth.
        self.provider
            .update_password(new_password)
            .await
            .map_err(|e| self.fail("update_password", AuthError::UpdateFailed(e.to_string())))?;

        AUTH_ATTEMPTS.with_label_values(&["update_password", "ok"]).inc();
        Ok(())
    }

    /// Drop the local session and best-effort invalidate the remote one.
    ///
    /// The store is cleared before the provider call, so local logout
    /// never blocks on network failure (fail open for logout only).
    pub async fn logout(&self) {
        self.store.clear();

        if let Err(e) = self.provider.sign_out().await {
            tracing::warn!(error = %e, "remote sign-out failed; local session already cleared");
        }
        AUTH_ATTEMPTS.with_label_values(&["logout", "ok"]).inc();
    }

    /// Re-fetch the current session from the provider.
    ///
    /// Used by the bootstrap sequence and after mutations that change
    /// authorization state elsewhere. Any provider error resolves to
    /// anonymous (fail safe toward "not logged in"); a result arriving
    /// after a logout or a newer login is discarded.
    pub async fn refresh_session(&self) {
        let ticket = self.store.begin_load();

        let outcome = match self.provider.current_session().await {
            Ok(session) => session.map(assemble_session),
            Err(e) => {
                tracing::warn!(error = %e, "session fetch failed; treating as anonymous");
                None
            }
        };

        if !self.store.resolve_load(ticket, outcome) {
            tracing::debug!("session fetch superseded; result discarded");
        }
    }

    fn fail(&self, operation: &str, error: AuthError) -> AuthError {
        AUTH_ATTEMPTS.with_label_values(&[operation, error.code()]).inc();
        error
    }
}

/// Build the local session entity from the provider payload, logging
/// the profile/assignment organization mismatch as a data-quality
/// warning.
fn assemble_session(provider_session: ProviderSession) -> IdentitySession {
    let session = IdentitySession {
        user_id: provider_session.user.id,
        email: provider_session.user.email,
        email_confirmed_at: provider_session.user.email_confirmed_at,
        profile: provider_session.profile,
        organization: provider_session.organization,
        roles: provider_session.roles,
    };

    if !session.organization_consistent() {
        tracing::warn!(
            user_id = %session.user_id,
            "profile organization does not match any active role assignment"
        );
    }

    session
}

fn require_fields(fields: &[(&str, &str)]) -> Result<(), AuthError> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| (*name).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AuthError::MissingFields(missing))
    }
}

fn map_sign_in_error(error: ProviderError) -> AuthError {
    match error {
        ProviderError::InvalidCredentials => AuthError::InvalidCredentials,
        ProviderError::EmailNotConfirmed => AuthError::Unconfirmed,
        ProviderError::RateLimited => AuthError::RateLimited,
        // An unverifiable login is treated as unauthenticated
        ProviderError::Rejected { .. } | ProviderError::Transport(_) => AuthError::InvalidCredentials,
    }
}
