use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer tenant. Never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contact_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contact_phone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub business_unit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub billing_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    /// Canonicalized login domain; globally unique across tenants when
    /// non-empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub login_domain: String,
    pub created_at: DateTime<Utc>,
}

/// A short-lived token an agent presents to bind itself to one tenant.
/// One-time tokens are consumed by deletion on first successful validation.
#[derive(Debug, Clone, Serialize)]
pub struct JoinToken {
    pub id: String,
    /// Raw secret. Masked before appearing in logs or list responses.
    #[serde(skip_serializing)]
    pub token: String,
    pub tenant_id: String,
    pub expires_at: DateTime<Utc>,
    pub one_time: bool,
    pub created_at: DateTime<Utc>,
}

/// A registered fleet agent, upserted on successful token registration.
#[derive(Debug, Clone, Serialize)]
pub struct Agent {
    pub agent_id: String,
    pub name: String,
    pub hostname: String,
    pub ip: String,
    pub platform: String,
    pub version: String,
    pub protocol_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub os_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub architecture: String,
    /// Issued long-lived credential.
    #[serde(skip_serializing)]
    pub token: String,
    pub tenant_id: String,
    pub status: String,
    pub registered_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingStatus {
    Pending,
    Approved,
    Rejected,
}

/// An onboarding attempt whose token was recognized but expired. Created
/// only for known-expired tokens, never for unknown ones.
#[derive(Debug, Clone, Serialize)]
pub struct PendingAgentRegistration {
    pub id: i64,
    pub agent_id: String,
    pub name: String,
    pub hostname: String,
    pub ip: String,
    pub platform: String,
    pub agent_version: String,
    pub protocol_version: String,
    /// The token that matched but was expired.
    pub expired_token_id: String,
    /// Tenant hint from the expired token; approval may assign a different
    /// tenant.
    pub expired_tenant_id: String,
    pub status: PendingStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reviewed_by: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

/// Canonicalizes a tenant login domain for comparison. Trims whitespace,
/// strips scheme/user/path/port portions, and lowercases the remaining
/// domain. Returns an empty string when no usable domain segment remains.
#[must_use]
pub fn normalize_login_domain(value: &str) -> String {
    let mut domain = value.trim().to_ascii_lowercase();
    if let Some(idx) = domain.find("://") {
        domain = domain[idx + 3..].to_string();
    }
    if let Some(at) = domain.rfind('@') {
        domain = domain[at + 1..].to_string();
    }
    if let Some(slash) = domain.find(['/', '?']) {
        domain.truncate(slash);
    }
    if let Some(colon) = domain.find(':') {
        domain.truncate(colon);
    }
    domain.trim_matches('.').to_string()
}

/// Masks a token value for audit logs and error messages: first four and
/// last two characters survive. Full token values must never be logged.
#[must_use]
pub fn mask_token(token: &str) -> String {
    let token = token.trim();
    if token.len() <= 8 {
        return token.to_string();
    }
    format!("{}...{}", &token[..4], &token[token.len() - 2..])
}
