use std::sync::Arc;

use drover::audit::TracingAuditSink;
use drover::auth::{Identity, TokenAuthenticator};
use drover::authz::{Role, Subject};
use drover::events::TracingEventSink;
use drover::install::InstallStore;
use drover::server::{AppState, create_router};
use drover::store::{MemoryStore, Store};

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const OPERATOR_TOKEN: &str = "test-operator-token";
pub const VIEWER_TOKEN: &str = "test-viewer-token";

/// In-process server on an ephemeral port. The operator and viewer
/// identities are scoped to tenant "acme"; tests create that tenant
/// themselves.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub installs: Arc<InstallStore>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(true).await
    }

    pub async fn start_with(tenancy_enabled: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        let installs = Arc::new(InstallStore::new());

        let authenticator = TokenAuthenticator::new();
        authenticator.register(
            ADMIN_TOKEN,
            Identity {
                name: "admin".to_string(),
                subject: Subject::admin(),
            },
        );
        authenticator.register(
            OPERATOR_TOKEN,
            Identity {
                name: "opal".to_string(),
                subject: Subject::scoped(Role::Operator, ["acme"]),
            },
        );
        authenticator.register(
            VIEWER_TOKEN,
            Identity {
                name: "vera".to_string(),
                subject: Subject::scoped(Role::Viewer, ["acme"]),
            },
        );

        let dyn_store: Arc<dyn Store> = store.clone();
        let state = Arc::new(AppState {
            store: dyn_store,
            installs: Arc::clone(&installs),
            authenticator: Arc::new(authenticator),
            audit: Arc::new(TracingAuditSink),
            events: Arc::new(TracingEventSink),
            tenancy_enabled,
            public_base_url: None,
        });

        let router = create_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });

        Self {
            base_url: format!("http://{addr}"),
            store,
            installs,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}
