use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use serde_json::json;

use super::AppState;
use super::dto::{PackageParams, PackageRequest, PackageResponse};
use super::response::ApiError;
use crate::audit::AuditEntry;
use crate::auth::RequireIdentity;
use crate::authz::{Action, ResourceRef, authorize};
use crate::error::Error;
use crate::install::InstallEntry;
use crate::install::script::{build_bootstrap_script, normalize_platform};

/// Generates a bootstrap install script for a tenant: mints a one-time join
/// token, renders the platform template, and parks the script under a
/// random short code with its own TTL.
pub async fn generate_package(
    identity: RequireIdentity,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<PackageParams>,
    Json(req): Json<PackageRequest>,
) -> Result<Json<PackageResponse>, ApiError> {
    state.require_tenancy_enabled()?;

    let tenant_id = req.tenant_id.trim().to_string();
    if tenant_id.is_empty() {
        return Err(ApiError::bad_request("tenant_id required"));
    }
    authorize(
        &identity.0.subject,
        Action::PackagesGenerate,
        &ResourceRef::tenant(&tenant_id),
    )?;

    if state.store.get_tenant(&tenant_id)?.is_none() {
        return Err(ApiError::not_found("tenant not found"));
    }

    let ttl_minutes = if req.ttl_minutes <= 0 { 10 } else { req.ttl_minutes };
    let platform = normalize_platform(&req.platform);

    let jt = match state.store.create_join_token(&tenant_id, ttl_minutes, true) {
        Ok(jt) => jt,
        Err(Error::TenantNotFound) => return Err(ApiError::not_found("tenant not found")),
        Err(err) => return Err(err.into()),
    };

    let server_url = state.base_url(&headers);
    let (script, filename) = build_bootstrap_script(&platform, &server_url, &jt.token);

    let one_time_download = params.one_time_download.unwrap_or(true);
    let code = state.installs.insert(InstallEntry {
        script: script.clone(),
        filename: filename.clone(),
        expires_at: Utc::now() + Duration::minutes(ttl_minutes),
        one_time: one_time_download,
    });

    let download_url = format!("{server_url}/install/{code}/{filename}");
    let one_liner = if platform == "windows" {
        format!("irm \"{download_url}\" | iex")
    } else {
        format!("curl -fsSL \"{download_url}\" | sh")
    };

    state.record_audit(
        AuditEntry::new("package.generate", "install_package")
            .actor(&identity.0.name)
            .target(tenant_id.clone())
            .tenant(tenant_id)
            .details("Bootstrap package generated")
            .metadata(json!({
                "platform": platform,
                "ttl_minutes": ttl_minutes,
                "one_time_download": one_time_download,
            })),
    );

    Ok(Json(PackageResponse {
        script,
        filename,
        download_url,
        one_liner,
    }))
}

pub async fn download_install(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    serve_install(&state, &code)
}

pub async fn download_install_named(
    State(state): State<Arc<AppState>>,
    Path((code, _filename)): Path<(String, String)>,
) -> Response {
    serve_install(&state, &code)
}

/// Serves a hosted install script by short code. 404 once expired or, for
/// one-time entries, once already served.
fn serve_install(state: &AppState, code: &str) -> Response {
    let Some(entry) = state.installs.fetch(code) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let content_type = if entry.filename.ends_with(".sh") {
        "application/x-sh"
    } else {
        "text/plain; charset=utf-8"
    };

    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", entry.filename),
            ),
            (header::CACHE_CONTROL, "no-store".to_string()),
            (header::PRAGMA, "no-cache".to_string()),
        ],
        entry.script,
    )
        .into_response()
}
