mod common;

use chrono::{Duration, Utc};
use drover::store::Store;
use drover::types::JoinToken;
use reqwest::StatusCode;
use serde_json::{Value, json};

use common::{ADMIN_TOKEN, OPERATOR_TOKEN, VIEWER_TOKEN, TestServer, client};

async fn create_acme(server: &TestServer) {
    let resp = client()
        .post(server.url("/api/v1/tenants"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"id": "acme", "name": "Acme"}))
        .send()
        .await
        .expect("create tenant");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn tenant_crud_round_trip() {
    let server = TestServer::start().await;
    create_acme(&server).await;

    let tenants: Value = client()
        .get(server.url("/api/v1/tenants"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tenants.as_array().unwrap().len(), 1);
    assert_eq!(tenants[0]["id"], "acme");

    let single: Value = client()
        .get(server.url("/api/v1/tenants/acme"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(single["name"], "Acme");

    let updated: Value = client()
        .put(server.url("/api/v1/tenants/acme"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"name": "Acme Corp", "contact_email": "ops@acme.com"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["name"], "Acme Corp");
    assert_eq!(updated["id"], "acme");

    let resp = client()
        .put(server.url("/api/v1/tenants/ghost"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"name": "Ghost"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tenant_create_requires_name() {
    let server = TestServer::start().await;
    let resp = client()
        .post(server.url("/api/v1/tenants"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"name": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_login_domain_conflicts() {
    let server = TestServer::start().await;
    let resp = client()
        .post(server.url("/api/v1/tenants"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"id": "a", "name": "A", "login_domain": "acme.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Same domain, different casing/decoration still conflicts.
    let resp = client()
        .post(server.url("/api/v1/tenants"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"id": "b", "name": "B", "login_domain": "https://ACME.com/login"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Updating a tenant to keep its own domain is fine.
    let resp = client()
        .put(server.url("/api/v1/tenants/a"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"name": "A", "login_domain": "acme.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn join_token_registration_flow() {
    let server = TestServer::start().await;
    create_acme(&server).await;

    let token_resp: Value = client()
        .post(server.url("/api/v1/join-token"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"tenant_id": "acme", "ttl_minutes": 5, "one_time": true}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = token_resp["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());
    assert_eq!(token_resp["tenant_id"], "acme");

    let register: Value = client()
        .post(server.url("/api/v1/agents/register-with-token"))
        .json(&json!({"token": token, "agent_id": "agent-1", "hostname": "host-1"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(register["success"], true);
    assert_eq!(register["tenant_id"], "acme");
    assert!(!register["agent_token"].as_str().unwrap().is_empty());

    // One-time token: a second registration is rejected.
    let resp = client()
        .post(server.url("/api/v1/agents/register-with-token"))
        .json(&json!({"token": token, "agent_id": "agent-2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid or expired token");
}

#[tokio::test]
async fn join_token_requires_existing_tenant() {
    let server = TestServer::start().await;
    let resp = client()
        .post(server.url("/api/v1/join-token"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"tenant_id": "ghost", "ttl_minutes": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_and_revoke_join_tokens() {
    let server = TestServer::start().await;
    create_acme(&server).await;

    let token_resp: Value = client()
        .post(server.url("/api/v1/join-token"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"tenant_id": "acme"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token_id = token_resp["token_id"].as_str().unwrap().to_string();
    let raw_token = token_resp["token"].as_str().unwrap().to_string();

    let list: Value = client()
        .get(server.url("/api/v1/join-tokens?tenant_id=acme"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entries = list.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    // The raw secret never appears in list responses.
    let masked = entries[0]["token"].as_str().unwrap();
    assert_ne!(masked, raw_token);
    assert!(masked.contains("..."));

    let resp = client()
        .post(server.url("/api/v1/join-token/revoke"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"id": token_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Revoked token no longer registers.
    let resp = client()
        .post(server.url("/api/v1/agents/register-with-token"))
        .json(&json!({"token": raw_token, "agent_id": "agent-1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Second revoke is a 404.
    let resp = client()
        .post(server.url("/api/v1/join-token/revoke"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"id": token_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

fn expired_token(tenant_id: &str, secret: &str) -> JoinToken {
    JoinToken {
        id: format!("expired-{secret}"),
        token: secret.to_string(),
        tenant_id: tenant_id.to_string(),
        expires_at: Utc::now() - Duration::minutes(1),
        one_time: true,
        created_at: Utc::now() - Duration::minutes(30),
    }
}

#[tokio::test]
async fn expired_token_captured_as_pending_registration() {
    let server = TestServer::start().await;
    create_acme(&server).await;
    server
        .store
        .create_join_token_with_secret(expired_token("acme", "stale-secret"))
        .unwrap();

    let resp = client()
        .post(server.url("/api/v1/agents/register-with-token"))
        .json(&json!({"token": "stale-secret", "agent_id": "agent-9", "hostname": "laggard"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["error"],
        "token expired - registration pending admin approval"
    );

    // Exactly one pending registration, no agent record.
    let pending: Value = client()
        .get(server.url("/api/v1/pending-registrations"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entries = pending.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["agent_id"], "agent-9");
    assert_eq!(entries[0]["expired_tenant_id"], "acme");
    assert_eq!(entries[0]["status"], "pending");
    assert!(server.store.get_agent("agent-9").unwrap().is_none());

    // A retry with the lazily deleted token is now an unknown token and
    // must not create a second pending registration.
    let resp = client()
        .post(server.url("/api/v1/agents/register-with-token"))
        .json(&json!({"token": "stale-secret", "agent_id": "agent-9"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid or expired token");

    let pending: Value = client()
        .get(server.url("/api/v1/pending-registrations"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pending.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_token_rejected_without_pending_registration() {
    let server = TestServer::start().await;
    create_acme(&server).await;

    let resp = client()
        .post(server.url("/api/v1/agents/register-with-token"))
        .json(&json!({"token": "never-issued", "agent_id": "agent-1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let pending: Value = client()
        .get(server.url("/api/v1/pending-registrations"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(pending.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn approve_pending_registration_mints_single_token() {
    let server = TestServer::start().await;
    create_acme(&server).await;
    // Approval may assign a different tenant than the expired hint.
    let resp = client()
        .post(server.url("/api/v1/tenants"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"id": "globex", "name": "Globex"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    server
        .store
        .create_join_token_with_secret(expired_token("acme", "stale-secret"))
        .unwrap();
    let resp = client()
        .post(server.url("/api/v1/agents/register-with-token"))
        .json(&json!({"token": "stale-secret", "agent_id": "agent-9"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let approve: Value = client()
        .post(server.url("/api/v1/pending-registrations/1"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"action": "approve", "tenant_id": "globex"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(approve["success"], true);
    let fresh = approve["join_token"].as_str().unwrap().to_string();

    let reg: Value = client()
        .get(server.url("/api/v1/pending-registrations/1"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reg["status"], "approved");

    // Second approval is rejected and mints nothing.
    let resp = client()
        .post(server.url("/api/v1/pending-registrations/1"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"action": "approve", "tenant_id": "globex"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(server.store.list_join_tokens("globex").unwrap().len(), 1);

    // The agent retries with the freshly minted token and lands in the
    // assigned tenant.
    let register: Value = client()
        .post(server.url("/api/v1/agents/register-with-token"))
        .json(&json!({"token": fresh, "agent_id": "agent-9"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(register["tenant_id"], "globex");
}

#[tokio::test]
async fn reject_and_delete_pending_registration() {
    let server = TestServer::start().await;
    create_acme(&server).await;
    server
        .store
        .create_join_token_with_secret(expired_token("acme", "stale-secret"))
        .unwrap();
    client()
        .post(server.url("/api/v1/agents/register-with-token"))
        .json(&json!({"token": "stale-secret", "agent_id": "agent-9"}))
        .send()
        .await
        .unwrap();

    let resp = client()
        .post(server.url("/api/v1/pending-registrations/1"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"action": "reject", "notes": "unknown device"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let reg: Value = client()
        .get(server.url("/api/v1/pending-registrations/1"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reg["status"], "rejected");
    assert_eq!(reg["notes"], "unknown device");

    // Delete works regardless of status.
    let resp = client()
        .delete(server.url("/api/v1/pending-registrations/1"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client()
        .get(server.url("/api/v1/pending-registrations/1"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // A malformed action tag is rejected at decode time.
    let resp = client()
        .post(server.url("/api/v1/pending-registrations/1"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"action": "escalate"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn package_generation_and_one_time_download() {
    let server = TestServer::start().await;
    create_acme(&server).await;

    let package: Value = client()
        .post(server.url("/api/v1/packages"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"tenant_id": "acme", "platform": "linux", "ttl_minutes": 5}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(package["filename"], "install.sh");
    let script = package["script"].as_str().unwrap();
    assert!(script.starts_with("#!/bin/sh"));
    let one_liner = package["one_liner"].as_str().unwrap();
    assert!(one_liner.starts_with("curl -fsSL"));
    let download_url = package["download_url"].as_str().unwrap();

    let resp = client().get(download_url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .contains("install.sh")
    );
    let served = resp.text().await.unwrap();
    assert_eq!(served, script);

    // One-time download: gone after the first fetch.
    let resp = client().get(download_url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn windows_package_uses_powershell() {
    let server = TestServer::start().await;
    create_acme(&server).await;

    let package: Value = client()
        .post(server.url("/api/v1/packages?one_time_download=false"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"tenant_id": "acme", "platform": "win"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(package["filename"], "install.ps1");
    assert!(package["one_liner"].as_str().unwrap().starts_with("irm"));
    assert_eq!(server.installs.len(), 1);

    // Reusable download survives multiple fetches.
    let download_url = package["download_url"].as_str().unwrap();
    for _ in 0..2 {
        let resp = client().get(download_url).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn policy_round_trip_with_global_alias() {
    let server = TestServer::start().await;
    create_acme(&server).await;

    let resp = client()
        .get(server.url("/api/v1/update-policies/acme"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let put: Value = client()
        .put(server.url("/api/v1/update-policies/acme"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"policy": {
            "update_check_days": 7,
            "version_pin_strategy": "minor",
            "maintenance_window": {
                "enabled": true,
                "timezone": "UTC",
                "start_hour": 1,
                "end_hour": 3,
                "days_of_week": [5, 1, 3, 1]
            }
        }}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(put["tenant_id"], "acme");
    assert_eq!(put["policy"]["update_check_days"], 7);
    // Days are deduplicated and sorted on write.
    assert_eq!(put["policy"]["maintenance_window"]["days_of_week"], json!([1, 3, 5]));
    assert!(put["updated_at"].is_string());

    let got: Value = client()
        .get(server.url("/api/v1/update-policies/acme"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(got["policy"]["maintenance_window"]["timezone"], "UTC");

    // Global alias stores under the sentinel and displays as "global".
    let put: Value = client()
        .put(server.url("/api/v1/update-policies/global"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"policy": {"update_check_days": 14, "version_pin_strategy": "weekly"}}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(put["tenant_id"], "global");
    // Unrecognized pin strategy normalizes to minor instead of erroring.
    assert_eq!(put["policy"]["version_pin_strategy"], "minor");

    // Global sorts first in the listing ("acme" > "global" is false —
    // plain lexicographic order of display refs).
    let list: Value = client()
        .get(server.url("/api/v1/update-policies"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entries = list.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["tenant_id"], "acme");
    assert_eq!(entries[1]["tenant_id"], "global");

    let resp = client()
        .delete(server.url("/api/v1/update-policies/acme"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client()
        .get(server.url("/api/v1/update-policies/acme"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn policy_validation_reports_every_violation() {
    let server = TestServer::start().await;
    create_acme(&server).await;

    let resp = client()
        .put(server.url("/api/v1/update-policies/acme"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"policy": {
            "update_check_days": -1,
            "maintenance_window": {"enabled": true}
        }}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid policy");
    let details = body["details"].as_array().unwrap();
    assert!(details.len() >= 3);
    assert!(details.iter().any(|d| d.as_str().unwrap().contains("timezone")));
    assert!(details.iter().any(|d| d.as_str().unwrap().contains("days_of_week")));
}

#[tokio::test]
async fn authorization_matrix_over_http() {
    let server = TestServer::start().await;
    create_acme(&server).await;

    // No credentials at all: 401.
    let resp = client().get(server.url("/api/v1/tenants")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key("www-authenticate"));

    // Viewer lacks tenants.read: 403.
    let resp = client()
        .get(server.url("/api/v1/tenants"))
        .bearer_auth(VIEWER_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Operator lacks tenants.write: 403.
    let resp = client()
        .post(server.url("/api/v1/tenants"))
        .bearer_auth(OPERATOR_TOKEN)
        .json(&json!({"name": "Nope"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Viewer can read pending registrations (agents.read).
    let resp = client()
        .get(server.url("/api/v1/pending-registrations"))
        .bearer_auth(VIEWER_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Viewer cannot resolve them (agents.write).
    let resp = client()
        .post(server.url("/api/v1/pending-registrations/1"))
        .bearer_auth(VIEWER_TOKEN)
        .json(&json!({"action": "reject"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Operator can generate packages for its own tenant...
    let resp = client()
        .post(server.url("/api/v1/packages"))
        .bearer_auth(OPERATOR_TOKEN)
        .json(&json!({"tenant_id": "acme"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // ...but not for a tenant outside its scope.
    let resp = client()
        .post(server.url("/api/v1/packages"))
        .bearer_auth(OPERATOR_TOKEN)
        .json(&json!({"tenant_id": "globex"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Tenant-scoped callers never touch the global default policy.
    let resp = client()
        .put(server.url("/api/v1/update-policies/global"))
        .bearer_auth(OPERATOR_TOKEN)
        .json(&json!({"policy": {"update_check_days": 1}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn disabled_tenancy_hides_admin_routes_but_not_registration() {
    let server = TestServer::start_with(false).await;

    // Admin-facing routes 404 even with valid credentials.
    let resp = client()
        .get(server.url("/api/v1/tenants"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client()
        .post(server.url("/api/v1/join-token"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"tenant_id": "acme"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client()
        .get(server.url("/api/v1/update-policies"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The public registration endpoint stays reachable: a bad token is a
    // 401, not a 404.
    let resp = client()
        .post(server.url("/api/v1/agents/register-with-token"))
        .json(&json!({"token": "whatever", "agent_id": "agent-1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let server = TestServer::start().await;
    let resp = client().get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "OK");
}
