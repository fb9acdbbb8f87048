//! Identity-provider adapter seam.
//!
//! The remote identity provider is an external collaborator; this trait
//! is everything the core knows about it. Implementations translate the
//! provider's wire shapes into [`ProviderSession`] payloads and the
//! closed [`ProviderError`] taxonomy, so gateway logic never depends on
//! provider-specific representations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::identity::models::{Organization, UserProfile, UserRoleAssignment};

/// Account data the provider returns with a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    pub email: String,
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

/// Raw session payload from the provider, before it is assembled into
/// an `IdentitySession` by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSession {
    pub user: ProviderUser,
    pub profile: Option<UserProfile>,
    pub organization: Option<Organization>,
    pub roles: Vec<UserRoleAssignment>,
}

/// Profile metadata attached to a signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupMetadata {
    pub full_name: String,
    pub phone: String,
    /// Role key assigned at signup; the gateway always sets `"user"`
    pub role: String,
}

/// Adapter-level error taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email not confirmed")]
    EmailNotConfirmed,

    #[error("rate limited")]
    RateLimited,

    /// Any other provider rejection, with its status and message
    #[error("provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Network/transport failure before a provider answer was received
    #[error("transport error: {0}")]
    Transport(String),
}

/// Boundary to the remote identity provider.
///
/// All operations are asynchronous and may suspend on network I/O; the
/// caller must not assume completion ordering between overlapping calls.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, ProviderError>;

    /// Register an account. The account is not signed in on success;
    /// the provider sends a confirmation email instead.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignupMetadata,
    ) -> Result<(), ProviderError>;

    /// Update the authenticated account's password.
    async fn update_password(&self, new_password: &str) -> Result<(), ProviderError>;

    /// Retrieve the currently valid session, if any. `Ok(None)` means
    /// the provider answered and there is no session.
    async fn current_session(&self) -> Result<Option<ProviderSession>, ProviderError>;

    /// Invalidate the remote session. Best effort; callers treat a
    /// failure as non-blocking.
    async fn sign_out(&self) -> Result<(), ProviderError>;
}
