use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use super::AppState;
use super::dto::{PolicyPayload, PolicyResponse};
use super::response::ApiError;
use crate::audit::AuditEntry;
use crate::auth::RequireIdentity;
use crate::authz::{Action, ResourceRef, Subject, authorize};
use crate::policy::{
    FleetUpdatePolicy, display_tenant_ref, normalize_spec, resolve_tenant_ref, validate_spec,
};

fn to_response(policy: FleetUpdatePolicy) -> PolicyResponse {
    PolicyResponse {
        tenant_id: display_tenant_ref(&policy.tenant_id).to_string(),
        policy: policy.spec,
        updated_at: policy.updated_at,
    }
}

/// Operations on a real tenant's policy are tenant-scoped; operations on
/// the global default need the distinct unscoped fleet-settings permission.
/// A tenant-scoped operator must never be able to touch the global default.
fn authorize_policy(
    subject: &Subject,
    tenant_id: &str,
    is_global: bool,
    write: bool,
) -> Result<(), ApiError> {
    let (action, resource) = if is_global {
        let action = if write {
            Action::SettingsFleetWrite
        } else {
            Action::SettingsFleetRead
        };
        (action, ResourceRef::global())
    } else {
        let action = if write {
            Action::TenantsWrite
        } else {
            Action::TenantsRead
        };
        (action, ResourceRef::tenant(tenant_id))
    };
    authorize(subject, action, &resource)?;
    Ok(())
}

fn resolve_ref(tenant_ref: &str) -> Result<(String, bool), ApiError> {
    resolve_tenant_ref(tenant_ref).ok_or_else(|| ApiError::bad_request("tenant id required"))
}

pub async fn list_policies(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PolicyResponse>>, ApiError> {
    authorize(&identity.0.subject, Action::TenantsRead, &ResourceRef::global())?;

    let mut policies = state.store.list_update_policies()?;
    policies.sort_by(|a, b| {
        display_tenant_ref(&a.tenant_id).cmp(display_tenant_ref(&b.tenant_id))
    });
    Ok(Json(policies.into_iter().map(to_response).collect()))
}

pub async fn get_policy(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(tenant_ref): Path<String>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let (tenant_id, is_global) = resolve_ref(&tenant_ref)?;
    authorize_policy(&identity.0.subject, &tenant_id, is_global, false)?;

    let policy = state
        .store
        .get_update_policy(&tenant_id)?
        .ok_or_else(|| ApiError::not_found("policy not configured"))?;
    Ok(Json(to_response(policy)))
}

pub async fn put_policy(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(tenant_ref): Path<String>,
    Json(payload): Json<PolicyPayload>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let (tenant_id, is_global) = resolve_ref(&tenant_ref)?;
    authorize_policy(&identity.0.subject, &tenant_id, is_global, true)?;

    let spec = normalize_spec(payload.policy);
    let issues = validate_spec(&spec);
    if !issues.is_empty() {
        return Err(ApiError::validation(issues));
    }

    let persisted = state.store.upsert_update_policy(&tenant_id, spec.clone())?;

    state.record_audit(
        AuditEntry::new("tenant.update_policy.write", "tenant_update_policy")
            .actor(&identity.0.name)
            .target(display_tenant_ref(&tenant_id))
            .tenant(if is_global { String::new() } else { tenant_id.clone() })
            .details(format!(
                "Updated fleet update policy ({})",
                identity.0.name
            ))
            .metadata(json!({
                "tenant_id": display_tenant_ref(&tenant_id),
                "update_check_days": spec.update_check_days,
                "version_pin_strategy": spec.version_pin_strategy,
                "allow_major_upgrade": spec.allow_major_upgrade,
            })),
    );
    Ok(Json(to_response(persisted)))
}

pub async fn delete_policy(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(tenant_ref): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (tenant_id, is_global) = resolve_ref(&tenant_ref)?;
    authorize_policy(&identity.0.subject, &tenant_id, is_global, true)?;

    state.store.delete_update_policy(&tenant_id)?;

    state.record_audit(
        AuditEntry::new("tenant.update_policy.delete", "tenant_update_policy")
            .actor(&identity.0.name)
            .target(display_tenant_ref(&tenant_id))
            .tenant(if is_global { String::new() } else { tenant_id })
            .details(format!(
                "Deleted fleet update policy ({})",
                identity.0.name
            )),
    );
    Ok(StatusCode::NO_CONTENT)
}
