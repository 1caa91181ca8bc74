use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::json;

use super::AppState;
use super::dto::{
    CreateJoinTokenRequest, CreateJoinTokenResponse, JoinTokenResponse, ListJoinTokensParams,
    RevokeJoinTokenRequest,
};
use super::response::ApiError;
use crate::audit::AuditEntry;
use crate::auth::RequireIdentity;
use crate::authz::{Action, ResourceRef, authorize};
use crate::error::Error;
use crate::types::mask_token;

pub async fn create_join_token(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateJoinTokenRequest>,
) -> Result<Json<CreateJoinTokenResponse>, ApiError> {
    state.require_tenancy_enabled()?;

    let tenant_id = req.tenant_id.trim().to_string();
    let resource = if tenant_id.is_empty() {
        ResourceRef::global()
    } else {
        ResourceRef::tenant(&tenant_id)
    };
    authorize(&identity.0.subject, Action::JoinTokensWrite, &resource)?;

    let ttl_minutes = if req.ttl_minutes <= 0 { 60 } else { req.ttl_minutes };
    let jt = match state
        .store
        .create_join_token(&tenant_id, ttl_minutes, req.one_time)
    {
        Ok(jt) => jt,
        Err(Error::TenantNotFound) => return Err(ApiError::not_found("tenant not found")),
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        token_id = %jt.id,
        tenant_id = %jt.tenant_id,
        ttl_minutes,
        one_time = jt.one_time,
        "join token created"
    );

    state.record_audit(
        AuditEntry::new("join_token.create", "join_token")
            .actor(&identity.0.name)
            .target(jt.id.clone())
            .tenant(jt.tenant_id.clone())
            .details(format!("Join token created for tenant {}", jt.tenant_id))
            .metadata(json!({
                "token_prefix": mask_token(&jt.token),
                "ttl_minutes": ttl_minutes,
                "one_time": jt.one_time,
                "expires_at": jt.expires_at.to_rfc3339(),
            })),
    );

    Ok(Json(CreateJoinTokenResponse {
        token: jt.token,
        token_id: jt.id,
        tenant_id: jt.tenant_id,
        expires_at: jt.expires_at,
    }))
}

pub async fn list_join_tokens(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListJoinTokensParams>,
) -> Result<Json<Vec<JoinTokenResponse>>, ApiError> {
    state.require_tenancy_enabled()?;

    let tenant_id = params
        .tenant_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("tenant_id required"))?;
    authorize(
        &identity.0.subject,
        Action::JoinTokensRead,
        &ResourceRef::tenant(tenant_id),
    )?;

    let tokens = state.store.list_join_tokens(tenant_id)?;
    Ok(Json(tokens.into_iter().map(JoinTokenResponse::from).collect()))
}

pub async fn revoke_join_token(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RevokeJoinTokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.require_tenancy_enabled()?;
    authorize(&identity.0.subject, Action::JoinTokensWrite, &ResourceRef::global())?;

    if req.id.is_empty() {
        return Err(ApiError::bad_request("id required"));
    }

    if !state.store.revoke_join_token(&req.id)? {
        return Err(ApiError::not_found("token not found"));
    }

    state.record_audit(
        AuditEntry::new("join_token.revoke", "join_token")
            .actor(&identity.0.name)
            .target(req.id.clone())
            .details("Join token revoked"),
    );
    Ok(Json(json!({ "success": true })))
}
