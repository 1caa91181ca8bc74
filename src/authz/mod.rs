//! Role-based authorization engine.
//!
//! A pure decision function over a static role/action policy table. Every
//! privileged HTTP handler must call [`authorize`] before touching state;
//! the engine itself performs no I/O and keeps no mutable state.

use std::collections::HashSet;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    /// The caller is authenticated but the role or tenant scope denies the
    /// action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Reserved for upstream authentication failures. Never produced by
    /// [`authorize`] itself; the HTTP layer raises it when no valid caller
    /// identity is present.
    #[error("unauthorized")]
    Unauthorized,
}

/// Authorization level granted to a caller. Unknown role strings parse to
/// the least-privileged role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Operator,
    Viewer,
}

impl Role {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "operator" => Role::Operator,
            _ => Role::Viewer,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::Viewer => "viewer",
        }
    }
}

/// A permissionable operation within the server API surface. Stable,
/// append-only vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TenantsRead,
    TenantsWrite,
    JoinTokensRead,
    JoinTokensWrite,
    PackagesGenerate,
    AgentsRead,
    AgentsWrite,
    AgentsDelete,
    SettingsFleetRead,
    SettingsFleetWrite,
}

impl Action {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::TenantsRead => "tenants.read",
            Action::TenantsWrite => "tenants.write",
            Action::JoinTokensRead => "join_tokens.read",
            Action::JoinTokensWrite => "join_tokens.write",
            Action::PackagesGenerate => "packages.generate",
            Action::AgentsRead => "agents.read",
            Action::AgentsWrite => "agents.write",
            Action::AgentsDelete => "agents.delete",
            Action::SettingsFleetRead => "settings.fleet.read",
            Action::SettingsFleetWrite => "settings.fleet.write",
        }
    }
}

/// Contextual identifiers for the target resource. Empty tenant IDs mean
/// the resource is not tenant-scoped.
#[derive(Debug, Clone, Default)]
pub struct ResourceRef {
    pub tenant_ids: Vec<String>,
}

impl ResourceRef {
    #[must_use]
    pub fn global() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tenant(id: impl Into<String>) -> Self {
        Self {
            tenant_ids: vec![id.into()],
        }
    }
}

/// The caller being authorized. Constructed per-request from the
/// authentication context; never persisted.
#[derive(Debug, Clone)]
pub struct Subject {
    pub role: Role,
    pub allowed_tenant_ids: Vec<String>,
    /// Global administrators bypass tenant-scope checks. This flag, not the
    /// role, is the bypass.
    pub is_admin: bool,
}

impl Subject {
    #[must_use]
    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            allowed_tenant_ids: Vec::new(),
            is_admin: true,
        }
    }

    #[must_use]
    pub fn scoped(role: Role, tenant_ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            role,
            allowed_tenant_ids: tenant_ids.into_iter().map(Into::into).collect(),
            is_admin: false,
        }
    }
}

/// Ordered pattern lists per role. Patterns are `"*"`, an exact action
/// string, or a prefix wildcard like `"agents.*"`. Kept as plain data so
/// new actions and roles are additions, not code changes.
fn role_patterns(role: Role) -> &'static [&'static str] {
    match role {
        Role::Admin => &["*"],
        Role::Operator => &["agents.*", "packages.generate"],
        Role::Viewer => &["agents.read"],
    }
}

fn role_allows(role: Role, action: Action) -> bool {
    let needle = action.as_str();
    for pattern in role_patterns(role) {
        if *pattern == "*" {
            return true;
        }
        if pattern.eq_ignore_ascii_case(needle) {
            return true;
        }
        if let Some(prefix) = pattern.strip_suffix(".*") {
            if needle.starts_with(prefix)
                && needle.as_bytes().get(prefix.len()) == Some(&b'.')
            {
                return true;
            }
        }
    }
    false
}

/// Ensures `subject` can perform `action` on `resource`. Deny-by-default:
/// an unmatched action or any resource tenant outside the subject's allowed
/// set is rejected.
pub fn authorize(
    subject: &Subject,
    action: Action,
    resource: &ResourceRef,
) -> Result<(), AuthzError> {
    if !role_allows(subject.role, action) {
        return Err(AuthzError::Forbidden(format!(
            "role {} cannot perform {}",
            subject.role.as_str(),
            action.as_str()
        )));
    }

    if !resource.tenant_ids.is_empty() && !subject.is_admin {
        let allowed: HashSet<&str> = subject
            .allowed_tenant_ids
            .iter()
            .map(String::as_str)
            .collect();
        for tid in &resource.tenant_ids {
            if tid.is_empty() {
                continue;
            }
            if !allowed.contains(tid.as_str()) {
                return Err(AuthzError::Forbidden(format!("tenant {tid} not permitted")));
            }
        }
    }

    Ok(())
}
