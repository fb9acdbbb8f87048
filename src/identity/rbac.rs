//! Role-based permission resolution.
//!
//! Answers "does the current identity hold permission P, optionally
//! scoped to organization O?" over the role assignments carried by an
//! [`IdentitySession`]. Permissions are additive: a key is granted if
//! any applicable role maps it to a truthy value. Absence of a key is
//! not-granted, never an error.

use uuid::Uuid;

use crate::identity::models::{IdentitySession, PermissionKey, PermissionValue};

/// Permission resolver over a session's role assignments.
///
/// Stateless; all methods are pure functions of the session passed in.
pub struct RoleResolver;

impl RoleResolver {
    /// Whether any active, scope-applicable role grants `key`.
    ///
    /// Inactive assignments are ignored. An assignment scoped to an
    /// organization only contributes when `organization` matches it;
    /// a null-scoped assignment is global. Empty role sets and unknown
    /// keys resolve to `false`.
    pub fn has(session: &IdentitySession, key: &PermissionKey, organization: Option<Uuid>) -> bool {
        session
            .applicable_roles(organization)
            .filter_map(|a| a.role.permission(key))
            .any(PermissionValue::is_truthy)
    }

    /// Resolve the effective value for `key`, for quota-style permissions.
    ///
    /// When several applicable roles carry numeric values for the same
    /// key the largest wins (most permissive, matching the additive OR
    /// of boolean grants). Otherwise the first applicable assignment in
    /// order wins.
    pub fn value_of(
        session: &IdentitySession,
        key: &PermissionKey,
        organization: Option<Uuid>,
    ) -> Option<PermissionValue> {
        let values: Vec<&PermissionValue> = session
            .applicable_roles(organization)
            .filter_map(|a| a.role.permission(key))
            .collect();

        let max_number = values
            .iter()
            .filter_map(|v| match v {
                PermissionValue::Number(n) => Some(*n),
                _ => None,
            })
            .fold(None, |acc: Option<f64>, n| {
                Some(acc.map_or(n, |a| a.max(n)))
            });

        if let Some(n) = max_number {
            return Some(PermissionValue::Number(n));
        }

        values.first().map(|v| (*v).clone())
    }

    /// Whether the session carries an active assignment of the named role.
    pub fn has_role(session: &IdentitySession, role_name: &str, organization: Option<Uuid>) -> bool {
        session
            .applicable_roles(organization)
            .any(|a| a.role.name == role_name)
    }
}
