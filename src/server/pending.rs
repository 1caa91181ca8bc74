use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use super::AppState;
use super::dto::{ListPendingParams, ResolvePendingRequest};
use super::response::ApiError;
use crate::audit::AuditEntry;
use crate::auth::RequireIdentity;
use crate::authz::{Action, ResourceRef, authorize};
use crate::error::Error;
use crate::events::{EVENT_PENDING_APPROVED, EVENT_PENDING_DELETED, EVENT_PENDING_REJECTED};
use crate::types::PendingAgentRegistration;

pub async fn list_pending_registrations(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPendingParams>,
) -> Result<Json<Vec<PendingAgentRegistration>>, ApiError> {
    state.require_tenancy_enabled()?;
    authorize(&identity.0.subject, Action::AgentsRead, &ResourceRef::global())?;

    let list = state.store.list_pending_registrations(params.status)?;
    Ok(Json(list))
}

pub async fn get_pending_registration(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<PendingAgentRegistration>, ApiError> {
    state.require_tenancy_enabled()?;
    authorize(&identity.0.subject, Action::AgentsRead, &ResourceRef::global())?;

    let reg = state
        .store
        .get_pending_registration(id)?
        .ok_or_else(|| ApiError::not_found("registration not found"))?;
    Ok(Json(reg))
}

pub async fn resolve_pending_registration(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ResolvePendingRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.require_tenancy_enabled()?;
    authorize(&identity.0.subject, Action::AgentsWrite, &ResourceRef::global())?;

    match req {
        ResolvePendingRequest::Approve { tenant_id } => {
            let tenant_id = tenant_id.trim().to_string();
            if tenant_id.is_empty() {
                return Err(ApiError::bad_request("tenant_id required for approval"));
            }
            approve(&state, &identity, id, &tenant_id)
        }
        ResolvePendingRequest::Reject { notes } => reject(&state, &identity, id, &notes),
    }
}

fn approve(
    state: &Arc<AppState>,
    identity: &RequireIdentity,
    id: i64,
    tenant_id: &str,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state
        .store
        .approve_pending_registration(id, tenant_id, &identity.0.name)
    {
        Ok(()) => {}
        Err(Error::NotFound) => return Err(ApiError::not_found("registration not found")),
        Err(Error::AlreadyResolved) => {
            return Err(ApiError::conflict("registration already resolved"));
        }
        Err(err) => return Err(err.into()),
    }

    // Exactly one fresh token per approval: a 24h one-time token the agent
    // retries with. A mint failure leaves the approval in place.
    let mut resp = json!({ "success": true });
    match state.store.create_join_token(tenant_id, 60 * 24, true) {
        Ok(jt) => {
            resp["join_token"] = json!(jt.token);
            resp["token_expires"] = json!(jt.expires_at);
        }
        Err(err) => {
            tracing::warn!(%err, tenant_id, "failed to mint approval token");
        }
    }

    state.emit_event(
        EVENT_PENDING_APPROVED,
        json!({ "id": id, "tenant_id": tenant_id }),
    );
    state.record_audit(
        AuditEntry::new("pending_registration.approve", "pending_registration")
            .actor(&identity.0.name)
            .target(id.to_string())
            .tenant(tenant_id)
            .details(format!(
                "Pending registration approved for tenant {tenant_id}"
            )),
    );
    Ok(Json(resp))
}

fn reject(
    state: &Arc<AppState>,
    identity: &RequireIdentity,
    id: i64,
    notes: &str,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state
        .store
        .reject_pending_registration(id, &identity.0.name, notes)
    {
        Ok(()) => {}
        Err(Error::NotFound) => return Err(ApiError::not_found("registration not found")),
        Err(Error::AlreadyResolved) => {
            return Err(ApiError::conflict("registration already resolved"));
        }
        Err(err) => return Err(err.into()),
    }

    state.emit_event(EVENT_PENDING_REJECTED, json!({ "id": id }));
    state.record_audit(
        AuditEntry::new("pending_registration.reject", "pending_registration")
            .actor(&identity.0.name)
            .target(id.to_string())
            .details("Pending registration rejected"),
    );
    Ok(Json(json!({ "success": true })))
}

pub async fn delete_pending_registration(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.require_tenancy_enabled()?;
    authorize(&identity.0.subject, Action::AgentsWrite, &ResourceRef::global())?;

    if !state.store.delete_pending_registration(id)? {
        return Err(ApiError::not_found("registration not found"));
    }

    state.emit_event(EVENT_PENDING_DELETED, json!({ "id": id }));
    state.record_audit(
        AuditEntry::new("pending_registration.delete", "pending_registration")
            .actor(&identity.0.name)
            .target(id.to_string())
            .details("Pending registration deleted"),
    );
    Ok(Json(json!({ "success": true })))
}
