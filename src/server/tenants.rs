use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde_json::json;

use super::AppState;
use super::dto::TenantPayload;
use super::response::ApiError;
use crate::audit::AuditEntry;
use crate::auth::RequireIdentity;
use crate::authz::{Action, ResourceRef, authorize};
use crate::error::Error;
use crate::types::{Tenant, normalize_login_domain};

fn tenant_from_payload(payload: TenantPayload) -> Tenant {
    Tenant {
        id: payload.id.trim().to_string(),
        name: payload.name,
        description: payload.description,
        contact_name: payload.contact_name,
        contact_email: payload.contact_email,
        contact_phone: payload.contact_phone,
        business_unit: payload.business_unit,
        billing_code: payload.billing_code,
        address: payload.address,
        login_domain: payload.login_domain,
        created_at: Utc::now(),
    }
}

fn tenant_audit_metadata(tenant: &Tenant) -> serde_json::Value {
    json!({
        "name": tenant.name,
        "description": tenant.description,
        "contact_name": tenant.contact_name,
        "contact_email": tenant.contact_email,
        "business_unit": tenant.business_unit,
        "billing_code": tenant.billing_code,
        "login_domain": normalize_login_domain(&tenant.login_domain),
    })
}

pub async fn list_tenants(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Tenant>>, ApiError> {
    state.require_tenancy_enabled()?;
    authorize(&identity.0.subject, Action::TenantsRead, &ResourceRef::global())?;

    let tenants = state.store.list_tenants()?;
    Ok(Json(tenants))
}

pub async fn create_tenant(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TenantPayload>,
) -> Result<Json<Tenant>, ApiError> {
    state.require_tenancy_enabled()?;
    authorize(&identity.0.subject, Action::TenantsWrite, &ResourceRef::global())?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("name required"));
    }

    let tenant = state.store.create_tenant(tenant_from_payload(payload))?;
    tracing::info!(id = %tenant.id, name = %tenant.name, "tenant created");

    state.record_audit(
        AuditEntry::new("tenant.create", "tenant")
            .actor(&identity.0.name)
            .target(tenant.id.clone())
            .tenant(tenant.id.clone())
            .details(format!("Created tenant {}", tenant.name))
            .metadata(tenant_audit_metadata(&tenant)),
    );
    Ok(Json(tenant))
}

pub async fn get_tenant(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Tenant>, ApiError> {
    state.require_tenancy_enabled()?;
    authorize(&identity.0.subject, Action::TenantsRead, &ResourceRef::tenant(&id))?;

    let tenant = state
        .store
        .get_tenant(&id)?
        .ok_or_else(|| ApiError::not_found("tenant not found"))?;
    Ok(Json(tenant))
}

pub async fn update_tenant(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<TenantPayload>,
) -> Result<Json<Tenant>, ApiError> {
    state.require_tenancy_enabled()?;
    authorize(&identity.0.subject, Action::TenantsWrite, &ResourceRef::tenant(&id))?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("name required"));
    }

    let before = state
        .store
        .get_tenant(&id)?
        .ok_or_else(|| ApiError::not_found("tenant not found"))?;

    let updated = match state.store.update_tenant(&id, tenant_from_payload(payload)) {
        Ok(tenant) => tenant,
        Err(Error::TenantNotFound) => return Err(ApiError::not_found("tenant not found")),
        Err(err) => return Err(err.into()),
    };

    state.record_audit(
        AuditEntry::new("tenant.update", "tenant")
            .actor(&identity.0.name)
            .target(updated.id.clone())
            .tenant(updated.id.clone())
            .details(format!("Updated tenant {}", updated.name))
            .metadata(json!({
                "before": tenant_audit_metadata(&before),
                "after": tenant_audit_metadata(&updated),
            })),
    );
    Ok(Json(updated))
}
