use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderMap;
use axum::http::header::HOST;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{get, post},
};

use super::response::ApiError;
use super::{agents, packages, pending, policies, tenants, tokens};
use crate::audit::{AuditEntry, AuditSink};
use crate::auth::Authenticator;
use crate::events::EventSink;
use crate::install::InstallStore;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub installs: Arc<InstallStore>,
    pub authenticator: Arc<dyn Authenticator>,
    pub audit: Arc<dyn AuditSink>,
    pub events: Arc<dyn EventSink>,
    /// Whether administrator-facing tenancy routes are active. The public
    /// registration route stays reachable regardless.
    pub tenancy_enabled: bool,
    /// Public base URL for external access. Used for install-script
    /// download URLs; derived from the Host header when unset.
    pub public_base_url: Option<String>,
}

impl AppState {
    /// Guard for admin-facing tenancy routes: a bare 404 when the feature
    /// is disabled, indistinguishable from an unregistered route.
    pub fn require_tenancy_enabled(&self) -> Result<(), ApiError> {
        if self.tenancy_enabled {
            Ok(())
        } else {
            Err(ApiError::route_not_found())
        }
    }

    /// Best-effort audit recording after the authoritative state change.
    pub fn record_audit(&self, entry: AuditEntry) {
        self.audit.record(entry);
    }

    /// Best-effort lifecycle event emission.
    pub fn emit_event(&self, event: &str, data: serde_json::Value) {
        self.events.emit(event, data);
    }

    pub fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(url) = &self.public_base_url {
            return url.trim_end_matches('/').to_string();
        }
        let host = headers
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("localhost");
        format!("http://{host}")
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route(
            "/api/v1/tenants",
            get(tenants::list_tenants).post(tenants::create_tenant),
        )
        .route(
            "/api/v1/tenants/{id}",
            get(tenants::get_tenant).put(tenants::update_tenant),
        )
        .route("/api/v1/join-token", post(tokens::create_join_token))
        .route("/api/v1/join-tokens", get(tokens::list_join_tokens))
        .route("/api/v1/join-token/revoke", post(tokens::revoke_join_token))
        // Registration must remain public and reachable even when the
        // tenancy feature is administratively disabled.
        .route(
            "/api/v1/agents/register-with-token",
            post(agents::register_with_token),
        )
        .route(
            "/api/v1/pending-registrations",
            get(pending::list_pending_registrations),
        )
        .route(
            "/api/v1/pending-registrations/{id}",
            get(pending::get_pending_registration)
                .post(pending::resolve_pending_registration)
                .delete(pending::delete_pending_registration),
        )
        .route("/api/v1/packages", post(packages::generate_package))
        .route("/install/{code}", get(packages::download_install))
        .route(
            "/install/{code}/{filename}",
            get(packages::download_install_named),
        );

    // Update-policy routes follow the tenancy feature flag the way the
    // original leaves them unregistered when disabled.
    if state.tenancy_enabled {
        router = router
            .route("/api/v1/update-policies", get(policies::list_policies))
            .route(
                "/api/v1/update-policies/{tenant_ref}",
                get(policies::get_policy)
                    .put(policies::put_policy)
                    .delete(policies::delete_policy),
            );
    }

    router
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
