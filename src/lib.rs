//! # Drover
//!
//! Control plane for a fleet-management platform, usable both as a
//! standalone binary and as a library. It onboards remote agents into
//! isolated tenants via short-lived join tokens, authorizes every API
//! operation against a role/tenant matrix, and stores per-tenant (or
//! global) update rollout policies.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use drover::auth::TokenAuthenticator;
//! use drover::audit::TracingAuditSink;
//! use drover::events::TracingEventSink;
//! use drover::install::InstallStore;
//! use drover::server::{AppState, create_router};
//! use drover::store::MemoryStore;
//!
//! let state = Arc::new(AppState {
//!     store: Arc::new(MemoryStore::new()),
//!     installs: Arc::new(InstallStore::new()),
//!     authenticator: Arc::new(TokenAuthenticator::new()),
//!     audit: Arc::new(TracingAuditSink),
//!     events: Arc::new(TracingEventSink),
//!     tenancy_enabled: true,
//!     public_base_url: None,
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```

pub mod audit;
pub mod auth;
pub mod authz;
pub mod config;
pub mod error;
pub mod events;
pub mod install;
pub mod policy;
pub mod server;
pub mod store;
pub mod types;
