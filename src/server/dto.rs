use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::PolicySpec;
use crate::types::{JoinToken, PendingStatus, mask_token};

#[derive(Debug, Deserialize)]
pub struct TenantPayload {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub business_unit: String,
    #[serde(default)]
    pub billing_code: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub login_domain: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateJoinTokenRequest {
    pub tenant_id: String,
    #[serde(default)]
    pub ttl_minutes: i64,
    #[serde(default)]
    pub one_time: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateJoinTokenResponse {
    pub token: String,
    pub token_id: String,
    pub tenant_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Join token as it appears in admin list responses: the secret is masked.
#[derive(Debug, Serialize)]
pub struct JoinTokenResponse {
    pub id: String,
    pub token: String,
    pub tenant_id: String,
    pub expires_at: DateTime<Utc>,
    pub one_time: bool,
    pub created_at: DateTime<Utc>,
}

impl From<JoinToken> for JoinTokenResponse {
    fn from(jt: JoinToken) -> Self {
        Self {
            id: jt.id,
            token: mask_token(&jt.token),
            tenant_id: jt.tenant_id,
            expires_at: jt.expires_at,
            one_time: jt.one_time,
            created_at: jt.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListJoinTokensParams {
    #[serde(default)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RevokeJoinTokenRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterWithTokenRequest {
    pub token: String,
    pub agent_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub agent_version: String,
    #[serde(default)]
    pub protocol_version: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub os_version: String,
    #[serde(default)]
    pub architecture: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPendingParams {
    #[serde(default)]
    pub status: Option<PendingStatus>,
}

/// Admin resolution of a pending registration. Exactly two payload shapes,
/// discriminated by the `action` tag.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ResolvePendingRequest {
    Approve {
        tenant_id: String,
    },
    Reject {
        #[serde(default)]
        notes: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct PackageRequest {
    pub tenant_id: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub ttl_minutes: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PackageParams {
    #[serde(default)]
    pub one_time_download: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PackageResponse {
    pub script: String,
    pub filename: String,
    pub download_url: String,
    pub one_liner: String,
}

/// PUT body for update policies: `{"policy": {...}}`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyPayload {
    pub policy: PolicySpec,
}

#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub tenant_id: String,
    pub policy: PolicySpec,
    pub updated_at: DateTime<Utc>,
}
