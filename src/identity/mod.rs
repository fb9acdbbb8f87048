//! Session and authorization subsystem.
//!
//! This module covers the console's security core:
//! - the identity/role data model
//! - the process-wide session store and its lifecycle
//! - the auth gateway to the remote identity provider
//! - permission resolution over role assignments

pub mod gateway;
pub mod http;
pub mod models;
pub mod provider;
pub mod rbac;
pub mod store;

// Re-export commonly used types
pub use gateway::{AuthGateway, SignupRequest};
pub use http::HttpIdentityProvider;
pub use models::{IdentitySession, Organization, PermissionKey, PermissionValue, Role, UserProfile, UserRoleAssignment};
pub use provider::{IdentityProvider, ProviderError, ProviderSession, ProviderUser, SignupMetadata};
pub use rbac::RoleResolver;
pub use store::{SessionState, SessionStore};
