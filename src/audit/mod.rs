//! Audit trail sink. Entries are recorded best-effort after the
//! authoritative state change commits; a sink failure never rolls back or
//! fails the primary operation.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSeverity {
    Info,
    Warn,
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub actor_type: &'static str,
    pub actor_id: String,
    pub actor_name: String,
    pub action: &'static str,
    pub severity: AuditSeverity,
    pub target_type: &'static str,
    pub target_id: String,
    pub tenant_id: String,
    pub details: String,
    pub metadata: Value,
}

impl AuditEntry {
    #[must_use]
    pub fn new(action: &'static str, target_type: &'static str) -> Self {
        Self {
            actor_type: "user",
            actor_id: String::new(),
            actor_name: String::new(),
            action,
            severity: AuditSeverity::Info,
            target_type,
            target_id: String::new(),
            tenant_id: String::new(),
            details: String::new(),
            metadata: Value::Null,
        }
    }

    #[must_use]
    pub fn agent_actor(mut self, agent_id: &str, name: &str) -> Self {
        self.actor_type = "agent";
        self.actor_id = agent_id.trim().to_string();
        self.actor_name = name.trim().to_string();
        self
    }

    #[must_use]
    pub fn actor(mut self, name: &str) -> Self {
        self.actor_name = name.to_string();
        self
    }

    #[must_use]
    pub fn severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn target(mut self, id: impl Into<String>) -> Self {
        self.target_id = id.into();
        self
    }

    #[must_use]
    pub fn tenant(mut self, id: impl Into<String>) -> Self {
        self.tenant_id = id.into();
        self
    }

    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// Default sink: structured log lines through `tracing`.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: AuditEntry) {
        match entry.severity {
            AuditSeverity::Info => tracing::info!(
                target: "drover::audit",
                action = entry.action,
                actor_type = entry.actor_type,
                actor = %entry.actor_name,
                target_type = entry.target_type,
                target_id = %entry.target_id,
                tenant_id = %entry.tenant_id,
                metadata = %entry.metadata,
                "{}",
                entry.details
            ),
            AuditSeverity::Warn => tracing::warn!(
                target: "drover::audit",
                action = entry.action,
                actor_type = entry.actor_type,
                actor = %entry.actor_name,
                target_type = entry.target_type,
                target_id = %entry.target_id,
                tenant_id = %entry.tenant_id,
                metadata = %entry.metadata,
                "{}",
                entry.details
            ),
        }
    }
}
