//! Identity and role models for the console.
//!
//! This module defines the core data structures for the authenticated
//! actor: profile, organization (tenant), role assignments and the
//! permission mapping carried by each role.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Known console capabilities, with an escape hatch for tenant-defined keys.
///
/// Keys are parsed at the boundary and unknown keys fall back to
/// [`PermissionKey::Custom`]; resolution treats an absent key as not
/// granted rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PermissionKey {
    /// Create/edit/close job postings
    ManageJobs,
    /// View and manage candidate lists
    ManageCandidates,
    /// Access the dashboard
    ViewDashboard,
    /// Invite/deactivate console members
    ManageMembers,
    /// Create and assign roles
    ManageRoles,
    /// Export candidate/report data
    ExportReports,
    /// Quota: maximum concurrently open job postings
    JobPostLimit,
    /// Tenant-defined permission key
    Custom(String),
}

impl FromStr for PermissionKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "manage_jobs" => Self::ManageJobs,
            "manage_candidates" => Self::ManageCandidates,
            "view_dashboard" => Self::ViewDashboard,
            "manage_members" => Self::ManageMembers,
            "manage_roles" => Self::ManageRoles,
            "export_reports" => Self::ExportReports,
            "job_post_limit" => Self::JobPostLimit,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ManageJobs => "manage_jobs",
            Self::ManageCandidates => "manage_candidates",
            Self::ViewDashboard => "view_dashboard",
            Self::ManageMembers => "manage_members",
            Self::ManageRoles => "manage_roles",
            Self::ExportReports => "export_reports",
            Self::JobPostLimit => "job_post_limit",
            Self::Custom(name) => name.as_str(),
        };
        f.write_str(s)
    }
}

/// Value attached to a permission key: usually a flag, sometimes a
/// quota or a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PermissionValue {
    /// Whether this value grants the permission.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty(),
        }
    }
}

/// Named bundle of permissions assignable to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    /// Machine key, e.g. `"admin"`, `"recruiter"`, `"user"`
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    /// Permission-key -> value mapping; string keys as stored by the provider
    pub permissions: HashMap<String, PermissionValue>,
}

impl Role {
    /// Look up a permission value by parsed key.
    pub fn permission(&self, key: &PermissionKey) -> Option<&PermissionValue> {
        self.permissions.get(&key.to_string())
    }
}

/// Tenant boundary; role scoping and profile association are
/// organization-relative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile data attached to an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub organization_id: Option<Uuid>,
    pub full_name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A role granted to a user, optionally scoped to one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleAssignment {
    pub id: Uuid,
    pub role: Role,
    /// `None` means the assignment is global
    pub scoped_organization: Option<Organization>,
    pub assigned_by: Option<Uuid>,
    pub assigned_at: DateTime<Utc>,
    pub is_active: bool,
}

/// The authenticated actor: identity, profile and authorization data.
///
/// Owned exclusively by the session store; consumers receive shared
/// read-only views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySession {
    /// Opaque stable identifier issued by the identity provider
    pub user_id: Uuid,
    pub email: String,
    /// `None` means the email has not been verified yet
    pub email_confirmed_at: Option<DateTime<Utc>>,
    pub profile: Option<UserProfile>,
    /// Tenant the user belongs to; `None` for unaffiliated users
    pub organization: Option<Organization>,
    /// Assignment order is preserved; inactive entries never grant
    pub roles: Vec<UserRoleAssignment>,
}

impl IdentitySession {
    /// Active assignments applicable in the given organization context.
    ///
    /// A `None` scope on the assignment means global; a `None` context
    /// matches only global assignments.
    pub fn applicable_roles(&self, organization: Option<Uuid>) -> impl Iterator<Item = &UserRoleAssignment> {
        self.roles.iter().filter(move |a| {
            a.is_active
                && match (&a.scoped_organization, organization) {
                    (None, _) => true,
                    (Some(scope), Some(ctx)) => scope.id == ctx,
                    (Some(_), None) => false,
                }
        })
    }

    /// Check the profile/assignment organization consistency expectation.
    ///
    /// The provider does not enforce it, so a mismatch is reported as a
    /// data-quality warning by the caller, never treated as a failure.
    pub fn organization_consistent(&self) -> bool {
        let Some(profile_org) = self.profile.as_ref().and_then(|p| p.organization_id) else {
            return true;
        };
        self.roles.iter().any(|a| {
            a.is_active
                && a.scoped_organization
                    .as_ref()
                    .is_some_and(|o| o.id == profile_org)
        })
    }

    /// Email has been confirmed by the provider.
    pub fn is_email_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}
