//! Talentdesk console core: session and authorization subsystem for
//! the recruiting admin console.
//!
//! Presentational components receive resolved state from here; they
//! never talk to the identity provider directly.

pub mod config;
pub mod errors;
pub mod identity;
pub mod observability;
pub mod routing;

// Re-export commonly used types for convenience
pub use config::ConsoleConfig;
pub use errors::AuthError;
pub use identity::{
    AuthGateway, HttpIdentityProvider, IdentityProvider, IdentitySession, PermissionKey,
    RoleResolver, SessionState, SessionStore, SignupRequest,
};
pub use routing::{RouteDecision, RouteGuard, RoutePolicy};
