//! Error taxonomy surfaced by the auth gateway.
//!
//! A closed set: provider-SDK error shapes never leak past the adapter
//! layer, and every variant is recoverable at the UI boundary (retry,
//! inline message, or redirect). Nothing here is fatal to the process.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Local pre-network validation failure; lists the offending fields
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Provider rejected the credentials
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Account exists but the email was never confirmed
    #[error("email address not confirmed")]
    Unconfirmed,

    /// Provider throttled the request
    #[error("too many attempts, try again later")]
    RateLimited,

    /// Provider rejected the signup
    #[error("signup failed: {0}")]
    SignupFailed(String),

    /// Re-authentication before a password change failed; the update
    /// call was never issued
    #[error("current password could not be verified")]
    ReauthFailed,

    /// Re-auth succeeded but the password update itself was rejected
    #[error("password update failed: {0}")]
    UpdateFailed(String),
}

impl AuthError {
    /// Stable machine code for redirect query parameters and logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "missing_fields",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Unconfirmed => "unconfirmed",
            Self::RateLimited => "rate_limited",
            Self::SignupFailed(_) => "signup_failed",
            Self::ReauthFailed => "reauth_failed",
            Self::UpdateFailed(_) => "update_failed",
        }
    }
}
