//! Core access control types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Organization identifier
pub type OrgId = i64;

/// Granted scopes keyed by action for a single organization
pub type OrgPermissions = HashMap<String, Vec<String>>;

/// Granted scopes keyed by organization, then action
pub type Permissions = HashMap<OrgId, OrgPermissions>;

/// Signed-in principal with its cached permission set
///
/// `permissions` is populated by the permission store before evaluation.
/// `None` means the set was never loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInUser {
    /// User identifier
    pub user_id: i64,

    /// Organization the user is currently acting in
    pub org_id: OrgId,

    /// Login name, used for diagnostics only
    #[serde(default)]
    pub login: String,

    /// Cached permissions, keyed by organization
    #[serde(default)]
    pub permissions: Option<Permissions>,
}

impl SignedInUser {
    /// Create a user in an organization with no permissions loaded
    pub fn new(user_id: i64, org_id: OrgId, login: impl Into<String>) -> Self {
        Self {
            user_id,
            org_id,
            login: login.into(),
            permissions: None,
        }
    }

    /// Grant scopes for an action in an organization
    pub fn with_permissions<I, S>(mut self, org_id: OrgId, action: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .get_or_insert_with(HashMap::new)
            .entry(org_id)
            .or_default()
            .entry(action.into())
            .or_default()
            .extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Permissions for the current organization, if any are loaded
    pub fn org_permissions(&self) -> Option<&OrgPermissions> {
        self.permissions.as_ref()?.get(&self.org_id)
    }
}

/// Anything that exposes the scopes identifying it
pub trait Resource {
    /// Scopes identifying this resource, e.g. `dashboards:uid:abc`
    fn scopes(&self) -> Vec<String>;
}

/// A resource described only by its scopes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedResource {
    pub scopes: Vec<String>,
}

impl ScopedResource {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }
}

impl Resource for ScopedResource {
    fn scopes(&self) -> Vec<String> {
        self.scopes.clone()
    }
}
