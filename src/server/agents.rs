use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::Utc;
use rand::RngCore;
use serde_json::json;

use super::AppState;
use super::dto::RegisterWithTokenRequest;
use super::response::ApiError;
use crate::audit::{AuditEntry, AuditSeverity};
use crate::error::Error;
use crate::events::{EVENT_AGENT_REGISTERED, EVENT_PENDING_CREATED};
use crate::types::{Agent, PendingAgentRegistration, PendingStatus, mask_token};

/// Issues a fresh long-lived agent credential (256 bits, base64url).
fn generate_agent_token() -> String {
    let mut buf = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut buf);
    URL_SAFE.encode(buf)
}

/// Public, unauthenticated registration endpoint. Three outcomes:
/// a valid token registers the agent, a recognized-but-expired token is
/// captured as a pending registration for admin review, and an unknown
/// token is rejected outright without leaving any trace an attacker could
/// probe for.
pub async fn register_with_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterWithTokenRequest>,
) -> Response {
    if req.token.is_empty() || req.agent_id.is_empty() {
        return ApiError::bad_request("token and agent_id required").into_response();
    }

    tracing::info!(
        agent_id = %req.agent_id,
        hostname = %req.hostname,
        platform = %req.platform,
        version = %req.agent_version,
        "registration request received"
    );

    match state.store.validate_join_token(&req.token) {
        Ok(jt) => register_agent(&state, &req, &jt.tenant_id),
        Err(Error::TokenExpired {
            token_id,
            tenant_id,
        }) => capture_expired(&state, &req, &token_id, &tenant_id),
        Err(_) => reject_unknown(&state, &req),
    }
}

fn register_agent(state: &Arc<AppState>, req: &RegisterWithTokenRequest, tenant_id: &str) -> Response {
    let token = generate_agent_token();
    let now = Utc::now();
    let agent = Agent {
        agent_id: req.agent_id.clone(),
        name: req.name.clone(),
        hostname: req.hostname.clone(),
        ip: req.ip.clone(),
        platform: req.platform.clone(),
        version: req.agent_version.clone(),
        protocol_version: req.protocol_version.clone(),
        os_version: req.os_version.clone(),
        architecture: req.architecture.clone(),
        token: token.clone(),
        tenant_id: tenant_id.to_string(),
        status: "active".to_string(),
        registered_at: now,
        last_seen: now,
    };

    if let Err(err) = state.store.register_agent(agent) {
        tracing::error!(agent_id = %req.agent_id, %err, "failed to persist agent");
        return ApiError::internal("failed to register agent").into_response();
    }

    tracing::info!(agent_id = %req.agent_id, tenant_id, "agent registered via join token");

    state.emit_event(
        EVENT_AGENT_REGISTERED,
        json!({
            "agent_id": req.agent_id,
            "name": req.name,
            "hostname": req.hostname,
            "platform": req.platform,
            "version": req.agent_version,
            "tenant_id": tenant_id,
            "status": "active",
        }),
    );
    state.record_audit(
        AuditEntry::new("agent.register.token", "agent")
            .agent_actor(&req.agent_id, &req.name)
            .tenant(tenant_id)
            .details("Agent registered via join token")
            .metadata(json!({
                "tenant_id": tenant_id,
                "platform": req.platform.trim(),
                "hostname": req.hostname.trim(),
                "agent_version": req.agent_version.trim(),
            })),
    );

    Json(json!({
        "success": true,
        "tenant_id": tenant_id,
        "agent_token": token,
    }))
    .into_response()
}

fn capture_expired(
    state: &Arc<AppState>,
    req: &RegisterWithTokenRequest,
    token_id: &str,
    tenant_id: &str,
) -> Response {
    // Capture only when the issuing tenant still resolves; otherwise the
    // attempt is treated like any unknown token.
    let tenant_known =
        !tenant_id.is_empty() && matches!(state.store.get_tenant(tenant_id), Ok(Some(_)));
    if !tenant_known {
        return reject_unknown(state, req);
    }

    tracing::info!(
        agent_id = %req.agent_id,
        expired_tenant_id = %tenant_id,
        token_id = %token_id,
        "capturing expired-token registration"
    );

    let pending = PendingAgentRegistration {
        id: 0,
        agent_id: req.agent_id.clone(),
        name: req.name.clone(),
        hostname: req.hostname.clone(),
        ip: req.ip.clone(),
        platform: req.platform.clone(),
        agent_version: req.agent_version.clone(),
        protocol_version: req.protocol_version.clone(),
        expired_token_id: token_id.to_string(),
        expired_tenant_id: tenant_id.to_string(),
        status: PendingStatus::Pending,
        created_at: Utc::now(),
        reviewed_at: None,
        reviewed_by: String::new(),
        notes: String::new(),
    };
    match state.store.create_pending_registration(pending) {
        Ok(id) => {
            state.emit_event(
                EVENT_PENDING_CREATED,
                json!({
                    "id": id,
                    "agent_id": req.agent_id,
                    "expired_tenant_id": tenant_id,
                }),
            );
        }
        Err(err) => {
            tracing::warn!(%err, "failed to create pending registration");
        }
    }

    // Benign terminal state: informational, not a security warning.
    state.record_audit(
        AuditEntry::new("agent.register.pending", "agent")
            .agent_actor(&req.agent_id, &req.name)
            .details("Agent registration captured: expired token - pending admin review")
            .metadata(json!({
                "token_prefix": mask_token(&req.token),
                "hostname": req.hostname.trim(),
                "platform": req.platform.trim(),
                "expired_tenant_id": tenant_id,
            })),
    );

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "token expired - registration pending admin approval" })),
    )
        .into_response()
}

fn reject_unknown(state: &Arc<AppState>, req: &RegisterWithTokenRequest) -> Response {
    tracing::warn!(
        agent_id = %req.agent_id,
        token_prefix = %mask_token(&req.token),
        "registration denied: invalid or unknown token"
    );

    state.record_audit(
        AuditEntry::new("agent.register.token", "agent")
            .agent_actor(&req.agent_id, &req.name)
            .severity(AuditSeverity::Warn)
            .details("Agent registration denied: invalid or unknown token")
            .metadata(json!({
                "token_prefix": mask_token(&req.token),
                "hostname": req.hostname.trim(),
                "platform": req.platform.trim(),
            })),
    );

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "invalid or expired token" })),
    )
        .into_response()
}
